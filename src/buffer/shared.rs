//! # Reference-Counted VA
//!
//! [`SharedVa`] keeps the encoding in an `Arc<[u8]>`: the count lives in the
//! same allocation as the bytes, so the buffer itself is the unit of
//! sharing. [`SharedVa::link`] adds a holder, [`SharedVa::free`] drops one and
//! the bytes are released when the last holder goes away.
//!
//! Mutation through [`VaStore`] is copy-on-write: the mutated handle gets a
//! fresh allocation and every other link keeps the old value.

use std::sync::Arc;

use super::{grown_header, stored_header, VaStore};
use crate::va::Va;

#[derive(Clone, Default)]
pub struct SharedVa {
    data: Option<Arc<[u8]>>,
}

impl SharedVa {
    pub fn new() -> Self {
        Self { data: None }
    }

    pub fn from_va(va: Va<'_>) -> Self {
        Self {
            data: Some(Arc::from(va.as_bytes())),
        }
    }

    /// Another handle to the same bytes.
    pub fn link(&self) -> SharedVa {
        self.clone()
    }

    /// Releases this handle, returning how many holders remain.
    pub fn free(self) -> usize {
        match self.data {
            Some(data) => Arc::strong_count(&data) - 1,
            None => 0,
        }
    }

    /// Holders of the current allocation, 0 if never set.
    pub fn link_count(&self) -> usize {
        self.data.as_ref().map_or(0, Arc::strong_count)
    }

    /// True if both handles point at one allocation.
    pub fn ptr_eq(&self, other: &SharedVa) -> bool {
        match (&self.data, &other.data) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl VaStore for SharedVa {
    fn raw(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }

    fn set_va(&mut self, va: Va<'_>) {
        self.data = Some(Arc::from(va.as_bytes()));
    }

    fn append_payload(&mut self, bytes: &[u8]) {
        let raw = self.raw();
        let old = stored_header(raw);
        let (new, _) = grown_header(old, bytes.len());
        let mut next = Vec::with_capacity(new.gross_len());
        new.push_to(&mut next);
        if !raw.is_empty() {
            next.extend_from_slice(&raw[old.header_len()..]);
        }
        next.extend_from_slice(bytes);
        self.data = Some(Arc::from(next));
    }

    fn clear(&mut self) {
        self.data = None;
    }
}

impl std::fmt::Debug for SharedVa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedVa")
            .field("links", &self.link_count())
            .field("bytes", &format_args!("{:02x?}", self.raw()))
            .finish()
    }
}

//! # Growable VA Buffer
//!
//! [`VaBuf`] is the plain owned form of a VA or VTPL. Capacity grows
//! geometrically by `BUF_GROWTH_FACTOR` and never below `BUF_MIN_ALLOC`, so
//! a builder appending one short field at a time reallocates O(log n) times.
//!
//! ```ignore
//! let mut key = VaBuf::from_payload(VaHeader::Short(0), &[]);
//! key.append_va(Scalar::Text("APPLE").encode().as_va());
//! key.append_va(Scalar::Int8(1).encode().as_va());
//! let tuple = key.as_vtpl();
//! ```

use eyre::Result;

use super::{grown_header, stored_header, VaStore};
use crate::config::{BUF_GROWTH_FACTOR, BUF_MIN_ALLOC};
use crate::va::{Scalar, Va, VaHeader};
use crate::vtpl::Vtpl;

#[derive(Clone, Default)]
pub struct VaBuf {
    data: Vec<u8>,
}

impl VaBuf {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity.max(BUF_MIN_ALLOC)),
        }
    }

    /// Copies one already-encoded VA.
    pub fn from_va(va: Va<'_>) -> Self {
        let mut buf = Self::new();
        buf.set_va(va);
        buf
    }

    pub fn from_scalar(value: &Scalar<'_>) -> Self {
        let mut buf = Self::with_capacity(value.encoded_len());
        value.encode_to(&mut buf.data);
        buf
    }

    /// Frames `payload` with `header`, whose net length must match.
    pub fn from_payload(header: VaHeader, payload: &[u8]) -> Self {
        debug_assert_eq!(header.net_len(), payload.len(), "header/payload mismatch");
        let mut buf = Self::with_capacity(header.gross_len());
        header.push_to(&mut buf.data);
        buf.data.extend_from_slice(payload);
        buf
    }

    /// Takes ownership of bytes that must hold exactly one encoded VA.
    pub fn from_encoded(data: Vec<u8>) -> Result<Self> {
        Va::new(&data)?;
        Ok(Self { data })
    }

    pub(crate) fn from_vec_trusted(data: Vec<u8>) -> Self {
        debug_assert!(Va::new(&data).is_ok(), "malformed VA bytes");
        Self { data }
    }

    #[inline]
    pub fn as_va(&self) -> Va<'_> {
        self.va()
    }

    #[inline]
    pub fn as_vtpl(&self) -> Vtpl<'_> {
        self.vtpl()
    }

    /// Full encoding; the NULL encoding if nothing was stored.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.va().as_bytes()
    }

    /// Encoded length. Never zero: an unset buffer reads as NULL, see
    /// [`VaStore::is_set`].
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn into_vec(self) -> Vec<u8> {
        if self.data.is_empty() {
            Va::null().as_bytes().to_vec()
        } else {
            self.data
        }
    }

    /// Appends a complete VA to the payload, as when adding a tuple field.
    pub fn append_va(&mut self, field: Va<'_>) {
        self.append_payload(field.as_bytes());
    }

    fn reserve_total(&mut self, needed: usize) {
        let cap = self.data.capacity();
        if needed <= cap {
            return;
        }
        let target = needed
            .max(cap.saturating_mul(BUF_GROWTH_FACTOR))
            .max(BUF_MIN_ALLOC);
        self.data.reserve_exact(target - self.data.len());
    }
}

impl VaStore for VaBuf {
    #[inline]
    fn raw(&self) -> &[u8] {
        &self.data
    }

    fn set_va(&mut self, va: Va<'_>) {
        self.data.clear();
        self.reserve_total(va.gross_len());
        self.data.extend_from_slice(va.as_bytes());
    }

    fn append_payload(&mut self, bytes: &[u8]) {
        let old = stored_header(&self.data);
        let (new, grew) = grown_header(old, bytes.len());
        let current = self.data.len().max(old.header_len());
        self.reserve_total(current + grew + bytes.len());
        if self.data.is_empty() {
            old.push_to(&mut self.data);
        }
        if grew > 0 {
            self.data.splice(1..1, std::iter::repeat(0).take(grew));
        }
        new.write_to(&mut self.data);
        self.data.extend_from_slice(bytes);
    }

    fn clear(&mut self) {
        self.data.clear();
    }
}

impl PartialEq for VaBuf {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for VaBuf {}

impl std::fmt::Debug for VaBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VaBuf({:02x?})", self.as_bytes())
    }
}

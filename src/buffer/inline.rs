//! # Inline/Heap Hybrid VA
//!
//! [`InlineVa<N>`] stores up to `N` encoded bytes inside the value and
//! spills to the heap beyond that. Every mutation decides independently
//! where the result lives:
//!
//! | Operation      | Result fits in `N`            | Result exceeds `N`         |
//! |----------------|-------------------------------|----------------------------|
//! | `set_va`       | inline (heap copy is dropped) | heap, reusing capacity     |
//! | `append_*`     | stays where it is             | inline→heap or heap realloc|
//! | `move_from`    | heap source: pointer moved    | heap source: pointer moved |
//! |                | inline source: copied         | -                          |
//!
//! Appends never move heap content back inline; only a fresh `set_va` of a
//! small value does.

use smallvec::SmallVec;
use tracing::trace;

use super::{grown_header, stored_header, VaStore};
use crate::config::DEFAULT_INLINE_CAPACITY;
use crate::va::Va;

pub struct InlineVa<const N: usize = DEFAULT_INLINE_CAPACITY> {
    data: SmallVec<[u8; N]>,
}

impl<const N: usize> InlineVa<N> {
    pub fn new() -> Self {
        Self {
            data: SmallVec::new(),
        }
    }

    pub fn from_va(va: Va<'_>) -> Self {
        let mut v = Self::new();
        v.set_va(va);
        v
    }

    /// True while the encoding lives inside the value.
    #[inline]
    pub fn is_inline(&self) -> bool {
        !self.data.spilled()
    }

    pub const fn inline_capacity() -> usize {
        N
    }

    /// Takes `src`'s content and leaves `src` empty.
    ///
    /// Heap-resident content changes owner without copying; inline content
    /// is copied into `self`'s storage.
    pub fn move_from(&mut self, src: &mut InlineVa<N>) {
        if src.data.spilled() {
            self.data = std::mem::take(&mut src.data);
        } else {
            let bytes: SmallVec<[u8; N]> = std::mem::take(&mut src.data);
            self.data.clear();
            if self.data.spilled() {
                self.data = SmallVec::new();
            }
            self.data.extend_from_slice(&bytes);
        }
    }
}

impl<const N: usize> VaStore for InlineVa<N> {
    #[inline]
    fn raw(&self) -> &[u8] {
        &self.data
    }

    fn set_va(&mut self, va: Va<'_>) {
        let bytes = va.as_bytes();
        if bytes.len() <= N {
            if self.data.spilled() {
                trace!(len = bytes.len(), "inline VA returns to inline storage");
                self.data = SmallVec::new();
            } else {
                self.data.clear();
            }
        } else {
            self.data.clear();
        }
        self.data.extend_from_slice(bytes);
    }

    fn append_payload(&mut self, bytes: &[u8]) {
        let old = stored_header(&self.data);
        if self.data.is_empty() {
            let (hdr, len) = old.to_bytes();
            self.data.extend_from_slice(&hdr[..len]);
        }
        let (new, grew) = grown_header(old, bytes.len());
        let was_inline = !self.data.spilled();
        if grew > 0 {
            self.data.insert_many(1, std::iter::repeat(0).take(grew));
        }
        new.write_to(&mut self.data);
        self.data.extend_from_slice(bytes);
        if was_inline && self.data.spilled() {
            trace!(len = self.data.len(), capacity = N, "inline VA spilled to heap");
        }
    }

    fn clear(&mut self) {
        self.data.clear();
    }
}

impl<const N: usize> Default for InlineVa<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Clone for InlineVa<N> {
    fn clone(&self) -> Self {
        Self {
            data: SmallVec::from_slice(&self.data),
        }
    }
}

impl<const N: usize> std::fmt::Debug for InlineVa<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineVa")
            .field("inline", &self.is_inline())
            .field("bytes", &format_args!("{:02x?}", self.raw()))
            .finish()
    }
}

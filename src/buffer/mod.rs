//! # VA Ownership Strategies
//!
//! `Va` and `Vtpl` only borrow. When an encoded value has to outlive its
//! source (a search key, a separator being built, a row under
//! construction) it lives in one of three owners:
//!
//! | Type            | Storage                         | Use                                |
//! |-----------------|---------------------------------|------------------------------------|
//! | [`VaBuf`]       | `Vec<u8>`, geometric growth     | builders, compression output       |
//! | [`SharedVa`]    | `Arc<[u8]>`, count in the block | values handed to several readers   |
//! | [`InlineVa<N>`] | `SmallVec<[u8; N]>`             | short keys without heap traffic    |
//!
//! All three store the complete encoding (header + payload) contiguously, so
//! [`VaStore::va`] is a free reinterpretation. An owner that was never set
//! reads as the NULL singleton.
//!
//! ## Appending
//!
//! [`VaStore::append_payload`] grows the net length in place. When the
//! payload crosses the short-form limit the header widens from 1 to 5 bytes
//! and the payload shifts right once; blob headers stay blob headers.

mod growable;
mod inline;
mod shared;

pub use growable::VaBuf;
pub use inline::InlineVa;
pub use shared::SharedVa;

use crate::va::{Scalar, Va, VaHeader};
use crate::vtpl::Vtpl;

/// Common surface of the owned VA representations.
pub trait VaStore {
    /// Encoded bytes, or empty if nothing was ever stored.
    fn raw(&self) -> &[u8];

    /// Replaces the content with a copy of `va`.
    fn set_va(&mut self, va: Va<'_>);

    /// Appends bytes to the payload, rewriting the header.
    fn append_payload(&mut self, bytes: &[u8]);

    /// Resets to the never-set state.
    fn clear(&mut self);

    fn va(&self) -> Va<'_> {
        let raw = self.raw();
        if raw.is_empty() {
            Va::null()
        } else {
            Va::from_bytes_trusted(raw)
        }
    }

    /// Views the content as a tuple. Only meaningful if a VTPL was stored.
    fn vtpl(&self) -> Vtpl<'_> {
        let raw = self.raw();
        if raw.is_empty() {
            Vtpl::empty()
        } else {
            Vtpl::from_bytes_trusted(raw)
        }
    }

    fn set_scalar(&mut self, value: &Scalar<'_>) {
        let buf = VaBuf::from_scalar(value);
        self.set_va(buf.as_va());
    }

    fn is_set(&self) -> bool {
        !self.raw().is_empty()
    }
}

/// Header after appending `extra` payload bytes to a VA with header `old`.
///
/// Returns the new header and how many bytes the header grew by.
#[inline]
pub(crate) fn grown_header(old: VaHeader, extra: usize) -> (VaHeader, usize) {
    let new = old.with_net_len(old.net_len() + extra);
    (new, new.header_len() - old.header_len())
}

/// Current header of stored bytes, treating the empty state as NULL.
#[inline]
pub(crate) fn stored_header(raw: &[u8]) -> VaHeader {
    if raw.is_empty() {
        VaHeader::Short(0)
    } else {
        VaHeader::parse_trusted(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grown_header_widens_at_short_limit() {
        let (h, grew) = grown_header(VaHeader::Short(249), 0);
        assert_eq!((h, grew), (VaHeader::Short(249), 0));

        let (h, grew) = grown_header(VaHeader::Short(249), 1);
        assert_eq!((h, grew), (VaHeader::Long(250), 4));

        let (h, grew) = grown_header(VaHeader::Blob(30), 5);
        assert_eq!((h, grew), (VaHeader::Blob(35), 0));
    }

    fn exercise<S: VaStore>(mut store: S) {
        assert!(!store.is_set());
        assert!(store.va().is_null());

        store.set_scalar(&Scalar::Text("ab"));
        assert_eq!(store.va().payload(), b"ab\0");

        store.append_payload(b"cd");
        assert_eq!(store.va().payload(), b"ab\0cd");
        assert_eq!(store.raw()[0], 5);

        store.clear();
        assert!(!store.is_set());
        assert!(store.vtpl().vacount() == 0);
    }

    #[test]
    fn every_owner_honours_the_store_contract() {
        exercise(VaBuf::new());
        exercise(SharedVa::new());
        exercise(InlineVa::<8>::new());
        exercise(InlineVa::<2>::new());
    }
}

//! # VA - Self-Describing Value Encoding
//!
//! A VA is a contiguous byte region: a length header followed by payload
//! bytes. [`Va`] is a zero-copy view over exactly one encoded VA; it never
//! owns memory and borrows from a page, a buffer, or a static.
//!
//! ## Layout
//!
//! ```text
//! +-----------+----------------------+
//! | header    | payload (net bytes)  |
//! | 1 or 5 B  |                      |
//! +-----------+----------------------+
//! ```
//!
//! See [`header`] for the header shapes and [`scalar`] for the payload
//! encodings of each value type.
//!
//! ## Ordering
//!
//! `Va` implements `Ord` as an unsigned lexicographic comparison of the
//! payloads, shorter first on a common prefix. Headers never participate.
//! The payload encodings are designed so this equals value order for
//! same-typed operands, without decoding anything.
//!
//! ## Singletons
//!
//! Three statics exist for sentinel use:
//!
//! - [`Va::null()`]: zero-length short form `[0x00]`
//! - [`Va::default_value()`]: bit-identical to NULL, but a different static.
//!   "No value supplied" is detected by address with [`Va::is_default`].
//! - [`Va::min()`]: also a zero-length short form, so it sorts at or below
//!   every value; identified by address with [`Va::is_min`].
//!
//! ## Thread Safety
//!
//! `Va` is `Copy` and only holds a shared slice, so it can be sent and
//! shared freely as long as the underlying bytes are.

mod blob;
pub mod header;
pub mod number;
pub mod scalar;

pub use blob::BlobRef;
pub use header::VaHeader;
pub use scalar::{Scalar, ScalarKind};

use std::cmp::Ordering;
use std::ffi::CStr;

use eyre::{ensure, Result};

use crate::config::BLOB_REF_LEN;
use crate::error::{CheckError, OutOfBounds};

static VA_NULL_BYTES: [u8; 1] = [0x00];
static VA_DEFAULT_BYTES: [u8; 1] = [0x00];
static VA_MIN_BYTES: [u8; 1] = [0x00];

#[derive(Clone, Copy)]
pub struct Va<'a> {
    data: &'a [u8],
    header: VaHeader,
}

impl Va<'static> {
    pub fn null() -> Self {
        Va {
            data: &VA_NULL_BYTES,
            header: VaHeader::Short(0),
        }
    }

    pub fn default_value() -> Self {
        Va {
            data: &VA_DEFAULT_BYTES,
            header: VaHeader::Short(0),
        }
    }

    /// Lowest sentinel. Its payload is empty, so it compares `Equal` to
    /// NULL and below every non-empty value.
    pub fn min() -> Self {
        Va {
            data: &VA_MIN_BYTES,
            header: VaHeader::Short(0),
        }
    }
}

impl<'a> Va<'a> {
    /// Views `data` as exactly one VA, validating the header and length.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let header = VaHeader::parse(data, 0)?;
        ensure!(
            data.len() == header.gross_len(),
            "VA length mismatch: header says {} bytes, buffer has {}",
            header.gross_len(),
            data.len()
        );
        Ok(Self { data, header })
    }

    /// Peels one VA off the front of `data`, returning it and the rest.
    pub fn split_first(data: &'a [u8]) -> Result<(Self, &'a [u8])> {
        Ok(Self::split_checked(data)?)
    }

    /// Like [`Va::split_first`] but reports the distinguished
    /// [`CheckError`] used by the validating entry points.
    pub fn split_checked(data: &'a [u8]) -> std::result::Result<(Self, &'a [u8]), CheckError> {
        let header = VaHeader::parse(data, 0)?;
        let gross = header.gross_len();
        if gross > data.len() {
            return Err(OutOfBounds {
                offset: 0,
                needed: gross,
                available: data.len(),
            }
            .into());
        }
        let (va, rest) = data.split_at(gross);
        Ok((Self { data: va, header }, rest))
    }

    /// Views the VA at the start of trusted `data`. Trailing bytes are ignored.
    #[inline]
    pub fn from_bytes_trusted(data: &'a [u8]) -> Self {
        let header = VaHeader::parse_trusted(data);
        let gross = header.gross_len();
        debug_assert!(
            gross <= data.len(),
            "VA header claims {} bytes but only {} available",
            gross,
            data.len()
        );
        Self {
            data: &data[..gross],
            header,
        }
    }

    #[inline]
    pub fn header(&self) -> VaHeader {
        self.header
    }

    #[inline]
    pub fn net_len(&self) -> usize {
        self.header.net_len()
    }

    #[inline]
    pub fn gross_len(&self) -> usize {
        self.data.len()
    }

    /// The full encoding, header included.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    pub fn payload(&self) -> &'a [u8] {
        &self.data[self.header.header_len()..]
    }

    /// True for every zero-length short VA, including the DEFAULT and MIN statics.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.header == VaHeader::Short(0)
    }

    /// True only for the DEFAULT singleton itself.
    #[inline]
    pub fn is_default(&self) -> bool {
        std::ptr::eq(self.data.as_ptr(), VA_DEFAULT_BYTES.as_ptr())
    }

    /// True only for the MIN singleton itself.
    #[inline]
    pub fn is_min(&self) -> bool {
        std::ptr::eq(self.data.as_ptr(), VA_MIN_BYTES.as_ptr())
    }

    #[inline]
    pub fn is_blob(&self) -> bool {
        self.header.is_blob()
    }

    /// Splits a blob payload into its data prefix and reference block.
    pub fn blob_parts(&self) -> Option<(&'a [u8], &'a BlobRef)> {
        if !self.is_blob() {
            return None;
        }
        let payload = self.payload();
        let split = payload.len().checked_sub(BLOB_REF_LEN)?;
        let (data, reference) = payload.split_at(split);
        BlobRef::from_bytes(reference)
            .ok()
            .map(|reference| (data, reference))
    }

    pub fn as_i32(&self) -> Result<i32> {
        let v = number::decode_int(self.payload())?;
        i32::try_from(v).map_err(|_| eyre::eyre!("integer {} out of i32 range", v))
    }

    pub fn as_i64(&self) -> Result<i64> {
        let v = number::decode_int(self.payload())?;
        i64::try_from(v).map_err(|_| eyre::eyre!("integer {} out of i64 range", v))
    }

    pub fn as_u64(&self) -> Result<u64> {
        let v = number::decode_int(self.payload())?;
        u64::try_from(v).map_err(|_| eyre::eyre!("integer {} out of u64 range", v))
    }

    pub fn as_f32(&self) -> Result<f32> {
        number::decode_f32(self.payload())
    }

    pub fn as_f64(&self) -> Result<f64> {
        number::decode_f64(self.payload())
    }

    pub fn as_str(&self) -> Result<&'a str> {
        match Scalar::decode(*self, ScalarKind::Text)? {
            Scalar::Text(s) => Ok(s),
            _ => eyre::bail!("VA is NULL, not text"),
        }
    }

    pub fn as_cstr(&self) -> Result<&'a CStr> {
        scalar::decode_cstr(self.payload())
    }

    /// Byte-wise order of the payloads, shorter first on a common prefix.
    #[inline]
    pub fn compare(&self, other: &Va<'_>) -> Ordering {
        self.payload().cmp(other.payload())
    }
}

impl PartialEq for Va<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.payload() == other.payload()
    }
}

impl Eq for Va<'_> {}

impl PartialOrd for Va<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Va<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl std::fmt::Debug for Va<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Va")
            .field("header", &self.header)
            .field("payload", &format_args!("{:02x?}", self.payload()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_default_are_bit_identical_but_distinct() {
        let null = Va::null();
        let default = Va::default_value();
        assert_eq!(null.as_bytes(), default.as_bytes());
        assert!(null.is_null() && default.is_null());
        assert!(default.is_default());
        assert!(!null.is_default());
    }

    #[test]
    fn default_identity_survives_copies() {
        let a = Va::default_value();
        let b = a;
        assert!(b.is_default());

        let copied = [0u8];
        assert!(!Va::new(&copied).unwrap().is_default());
    }

    #[test]
    fn min_sorts_at_or_below_every_value() {
        let min = Va::min();
        assert!(min.is_min());
        assert!(!Va::null().is_min());
        assert_eq!(min.compare(&Va::null()), Ordering::Equal);

        let smallest = Scalar::Int8(i64::MIN).encode();
        assert!(min < smallest.as_va());
        let text = Scalar::Text("").encode();
        assert!(min < text.as_va());
        let float = Scalar::Float8(f64::NEG_INFINITY).encode();
        assert!(min < float.as_va());
    }

    #[test]
    fn new_rejects_length_mismatch() {
        assert!(Va::new(&[2, b'a']).is_err());
        assert!(Va::new(&[2, b'a', b'b', b'c']).is_err());
        assert!(Va::new(&[2, b'a', b'b']).is_ok());
    }

    #[test]
    fn split_first_walks_a_stream() {
        let data = [1, b'x', 0, 2, b'y', b'z'];
        let (a, rest) = Va::split_first(&data).unwrap();
        let (b, rest) = Va::split_first(rest).unwrap();
        let (c, rest) = Va::split_first(rest).unwrap();
        assert_eq!(a.payload(), b"x");
        assert!(b.is_null());
        assert_eq!(c.payload(), b"yz");
        assert!(rest.is_empty());
    }

    #[test]
    fn split_checked_reports_overrun() {
        let err = Va::split_checked(&[5, 1, 2]).unwrap_err();
        assert_eq!(
            err,
            CheckError::OutOfBounds(OutOfBounds {
                offset: 0,
                needed: 6,
                available: 3
            })
        );
    }

    #[test]
    fn trusted_view_ignores_trailing_bytes() {
        let va = Va::from_bytes_trusted(&[1, 7, 9, 9]);
        assert_eq!(va.gross_len(), 2);
        assert_eq!(va.payload(), &[7]);
    }

    #[test]
    fn compare_is_payload_lexicographic() {
        let a = [2, b'a', b'b'];
        let b = [3, b'a', b'b', b'c'];
        let c = [1, b'b'];
        let (a, b, c) = (
            Va::new(&a).unwrap(),
            Va::new(&b).unwrap(),
            Va::new(&c).unwrap(),
        );
        assert!(a < b);
        assert!(b < c);
        assert_eq!(a.compare(&a), Ordering::Equal);
    }

    #[test]
    fn typed_accessors_decode() {
        assert_eq!(Scalar::Int8(-77).encode().as_va().as_i64().unwrap(), -77);
        assert_eq!(Scalar::Int4(5).encode().as_va().as_i32().unwrap(), 5);
        assert_eq!(Scalar::UInt8(9).encode().as_va().as_u64().unwrap(), 9);
        assert_eq!(Scalar::Float8(0.5).encode().as_va().as_f64().unwrap(), 0.5);
        assert_eq!(Scalar::Float4(0.25).encode().as_va().as_f32().unwrap(), 0.25);
        assert_eq!(Scalar::Text("hi").encode().as_va().as_str().unwrap(), "hi");
    }

    #[test]
    fn blob_parts_splits_reference() {
        let value = Scalar::Blob {
            data: b"head",
            reference: BlobRef::new(11, 22, 33, 0),
        };
        let buf = value.encode();
        let (data, reference) = buf.as_va().blob_parts().unwrap();
        assert_eq!(data, b"head");
        assert_eq!(reference.blob_id(), 11);
        assert!(Scalar::Text("x").encode().as_va().blob_parts().is_none());
    }
}

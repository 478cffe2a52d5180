//! # Scalar Values
//!
//! [`Scalar`] is the decoded form of one VA. Encoding is infallible: the
//! caller is expected to have validated sizes already, and oversized
//! payloads trip a `debug_assert!`. Decoding takes the expected
//! [`ScalarKind`] from the schema, because a VA only describes its length,
//! not its type.
//!
//! | Kind     | Rust type        | Payload                                  |
//! |----------|------------------|------------------------------------------|
//! | Int4     | i32              | integer selector scheme                  |
//! | Int8     | i64              | integer selector scheme                  |
//! | UInt8    | u64              | integer selector scheme                  |
//! | Float4   | f32              | 4 bytes, sign-flipped IEEE, BE           |
//! | Float8   | f64              | 8 bytes, sign-flipped IEEE, BE           |
//! | Text     | &str             | UTF-8 bytes + 0x00 terminator            |
//! | Binary   | &[u8]            | raw bytes                                |
//! | Blob     | data + BlobRef   | data prefix + 24-byte reference, 0xFF hdr|
//!
//! All integer kinds share one encoding, so an `Int4` and an `Int8` of the
//! same value are byte-identical and compare equal.
//!
//! A zero-length VA always decodes as [`Scalar::Null`]. Text carries a
//! terminator so that `""` stays distinct from NULL; an empty `Binary` is
//! bit-identical to NULL and decodes as such.

use std::ffi::CStr;

use eyre::{ensure, Result};
use zerocopy::IntoBytes;

use super::blob::BlobRef;
use super::header::VaHeader;
use super::number::{
    decode_f32, decode_f64, decode_int, encode_f32_to, encode_f64_to, encode_int_to,
    int_payload_len,
};
use super::Va;
use crate::buffer::VaBuf;
use crate::config::BLOB_REF_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Int4,
    Int8,
    UInt8,
    Float4,
    Float8,
    Text,
    Binary,
    Blob,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Null,
    Int4(i32),
    Int8(i64),
    UInt8(u64),
    Float4(f32),
    Float8(f64),
    Text(&'a str),
    Binary(&'a [u8]),
    Blob { data: &'a [u8], reference: BlobRef },
}

impl<'a> Scalar<'a> {
    /// A C string is stored with its terminator, byte-identical to text.
    pub fn from_cstr(value: &'a CStr) -> Self {
        Scalar::Binary(value.to_bytes_with_nul())
    }

    pub fn kind(&self) -> Option<ScalarKind> {
        match self {
            Scalar::Null => None,
            Scalar::Int4(_) => Some(ScalarKind::Int4),
            Scalar::Int8(_) => Some(ScalarKind::Int8),
            Scalar::UInt8(_) => Some(ScalarKind::UInt8),
            Scalar::Float4(_) => Some(ScalarKind::Float4),
            Scalar::Float8(_) => Some(ScalarKind::Float8),
            Scalar::Text(_) => Some(ScalarKind::Text),
            Scalar::Binary(_) => Some(ScalarKind::Binary),
            Scalar::Blob { .. } => Some(ScalarKind::Blob),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn payload_len(&self) -> usize {
        match self {
            Scalar::Null => 0,
            Scalar::Int4(v) => int_payload_len(*v as i128),
            Scalar::Int8(v) => int_payload_len(*v as i128),
            Scalar::UInt8(v) => int_payload_len(*v as i128),
            Scalar::Float4(_) => 4,
            Scalar::Float8(_) => 8,
            Scalar::Text(s) => s.len() + 1,
            Scalar::Binary(b) => b.len(),
            Scalar::Blob { data, .. } => data.len() + BLOB_REF_LEN,
        }
    }

    pub fn header(&self) -> VaHeader {
        let net = self.payload_len();
        match self {
            Scalar::Blob { .. } => VaHeader::for_blob(net),
            _ => VaHeader::for_net_len(net),
        }
    }

    /// Gross length of the encoded VA.
    pub fn encoded_len(&self) -> usize {
        self.header().gross_len()
    }

    /// Appends the full VA (header + payload) to `out`.
    pub fn encode_to(&self, out: &mut Vec<u8>) {
        out.reserve(self.encoded_len());
        self.header().push_to(out);
        self.encode_payload_to(out);
    }

    /// Appends only the payload bytes to `out`.
    pub fn encode_payload_to(&self, out: &mut Vec<u8>) {
        match self {
            Scalar::Null => {}
            Scalar::Int4(v) => encode_int_to(*v as i128, out),
            Scalar::Int8(v) => encode_int_to(*v as i128, out),
            Scalar::UInt8(v) => encode_int_to(*v as i128, out),
            Scalar::Float4(v) => encode_f32_to(*v, out),
            Scalar::Float8(v) => encode_f64_to(*v, out),
            Scalar::Text(s) => {
                debug_assert!(!s.as_bytes().contains(&0), "text contains a NUL byte");
                out.extend_from_slice(s.as_bytes());
                out.push(0);
            }
            Scalar::Binary(b) => out.extend_from_slice(b),
            Scalar::Blob { data, reference } => {
                out.extend_from_slice(data);
                out.extend_from_slice(reference.as_bytes());
            }
        }
    }

    pub fn encode(&self) -> VaBuf {
        VaBuf::from_scalar(self)
    }

    pub fn decode(va: Va<'a>, kind: ScalarKind) -> Result<Scalar<'a>> {
        if va.is_null() {
            return Ok(Scalar::Null);
        }
        let payload = va.payload();
        Ok(match kind {
            ScalarKind::Int4 => {
                let v = decode_int(payload)?;
                Scalar::Int4(
                    i32::try_from(v).map_err(|_| eyre::eyre!("integer {} out of Int4 range", v))?,
                )
            }
            ScalarKind::Int8 => {
                let v = decode_int(payload)?;
                Scalar::Int8(
                    i64::try_from(v).map_err(|_| eyre::eyre!("integer {} out of Int8 range", v))?,
                )
            }
            ScalarKind::UInt8 => {
                let v = decode_int(payload)?;
                Scalar::UInt8(
                    u64::try_from(v)
                        .map_err(|_| eyre::eyre!("integer {} out of UInt8 range", v))?,
                )
            }
            ScalarKind::Float4 => Scalar::Float4(decode_f32(payload)?),
            ScalarKind::Float8 => Scalar::Float8(decode_f64(payload)?),
            ScalarKind::Text => Scalar::Text(decode_text(payload)?),
            ScalarKind::Binary => Scalar::Binary(payload),
            ScalarKind::Blob => {
                let (data, reference) = va
                    .blob_parts()
                    .ok_or_else(|| eyre::eyre!("VA is not a well-formed blob"))?;
                Scalar::Blob {
                    data,
                    reference: *reference,
                }
            }
        })
    }
}

fn decode_text(payload: &[u8]) -> Result<&str> {
    let (last, body) = payload
        .split_last()
        .ok_or_else(|| eyre::eyre!("text payload is empty"))?;
    ensure!(*last == 0, "text payload is missing its terminator");
    std::str::from_utf8(body).map_err(|e| eyre::eyre!("text payload is not UTF-8: {}", e))
}

pub(crate) fn decode_cstr(payload: &[u8]) -> Result<&CStr> {
    CStr::from_bytes_with_nul(payload).map_err(|e| eyre::eyre!("invalid C string: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: Scalar<'_>, kind: ScalarKind) {
        let buf = value.encode();
        let decoded = Scalar::decode(buf.as_va(), kind).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn every_kind_round_trips() {
        round_trip(Scalar::Int4(-5), ScalarKind::Int4);
        round_trip(Scalar::Int4(i32::MIN), ScalarKind::Int4);
        round_trip(Scalar::Int8(i64::MAX), ScalarKind::Int8);
        round_trip(Scalar::UInt8(u64::MAX), ScalarKind::UInt8);
        round_trip(Scalar::Float4(3.5), ScalarKind::Float4);
        round_trip(Scalar::Float8(-1e-9), ScalarKind::Float8);
        round_trip(Scalar::Text("héllo"), ScalarKind::Text);
        round_trip(Scalar::Text(""), ScalarKind::Text);
        round_trip(Scalar::Binary(&[0, 1, 2, 0xFF]), ScalarKind::Binary);
        round_trip(
            Scalar::Blob {
                data: b"prefix",
                reference: BlobRef::new(9, 1000, 4, 0),
            },
            ScalarKind::Blob,
        );
    }

    #[test]
    fn null_decodes_as_null_for_any_kind() {
        let null = Scalar::Null.encode();
        assert_eq!(null.as_bytes(), &[0x00]);
        for kind in [ScalarKind::Int8, ScalarKind::Text, ScalarKind::Blob] {
            assert_eq!(Scalar::decode(null.as_va(), kind).unwrap(), Scalar::Null);
        }
    }

    #[test]
    fn empty_text_is_not_null() {
        let empty = Scalar::Text("").encode();
        assert_eq!(empty.as_bytes(), &[0x01, 0x00]);
        assert!(!empty.as_va().is_null());
    }

    #[test]
    fn int_widths_share_encoding() {
        assert_eq!(
            Scalar::Int4(300).encode().as_bytes(),
            Scalar::Int8(300).encode().as_bytes()
        );
        assert_eq!(
            Scalar::UInt8(7).encode().as_bytes(),
            Scalar::Int8(7).encode().as_bytes()
        );
    }

    #[test]
    fn narrowing_decode_reports_overflow() {
        let big = Scalar::Int8(i64::MAX).encode();
        assert!(Scalar::decode(big.as_va(), ScalarKind::Int4).is_err());

        let neg = Scalar::Int8(-1).encode();
        assert!(Scalar::decode(neg.as_va(), ScalarKind::UInt8).is_err());
    }

    #[test]
    fn blob_uses_blob_header_and_trailing_reference() {
        let value = Scalar::Blob {
            data: b"ab",
            reference: BlobRef::new(1, 2, 3, 4),
        };
        let buf = value.encode();
        assert_eq!(buf.as_bytes()[0], 0xFF);
        assert_eq!(buf.as_va().net_len(), 2 + BLOB_REF_LEN);
        assert_eq!(value.encoded_len(), 5 + 2 + BLOB_REF_LEN);
    }

    #[test]
    fn cstr_is_stored_like_text() {
        let c = CStr::from_bytes_with_nul(b"abc\0").unwrap();
        let from_c = Scalar::from_cstr(c).encode();
        let from_text = Scalar::Text("abc").encode();
        assert_eq!(from_c.as_bytes(), from_text.as_bytes());
        assert_eq!(from_c.as_va().as_cstr().unwrap(), c);
    }

    #[test]
    fn text_decode_requires_terminator() {
        let raw = Scalar::Binary(b"abc").encode();
        assert!(Scalar::decode(raw.as_va(), ScalarKind::Text).is_err());
    }

    #[test]
    fn long_text_switches_to_long_header() {
        let text = "x".repeat(300);
        let buf = Scalar::Text(&text).encode();
        assert_eq!(buf.as_bytes()[0], 0xFE);
        assert_eq!(buf.as_va().net_len(), 301);
        round_trip(Scalar::Text(&text), ScalarKind::Text);
    }
}

//! # VA Length Header
//!
//! Every VA starts with a header that frames the payload. The shape is
//! decided once, from the first byte, into a [`VaHeader`] variant:
//!
//! | First byte   | Variant      | Header | Net length            |
//! |--------------|--------------|--------|-----------------------|
//! | 0x00 - 0xF9  | `Short(b)`   | 1      | `b`                   |
//! | 0xFA - 0xFD  | invalid      | -      | -                     |
//! | 0xFE         | `Long(n)`    | 5      | next 4 bytes, LE u32  |
//! | 0xFF         | `Blob(n)`    | 5      | next 4 bytes, LE u32  |
//!
//! The gross length (header + payload) is therefore always recoverable from
//! the first 1 or 5 bytes alone.
//!
//! Writers only choose the long form for net lengths of 250 and above; the
//! blob form is chosen by value type, never by size.

use crate::config::{
    VA_BLOB_TAG, VA_LONG_HEADER_LEN, VA_LONG_TAG, VA_MAX_NET_LEN, VA_SHORT_HEADER_LEN,
    VA_SHORT_MAX,
};
use crate::error::{CheckError, OutOfBounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VaHeader {
    Short(u8),
    Long(u32),
    Blob(u32),
}

impl VaHeader {
    /// Canonical non-blob header for a payload of `net` bytes.
    #[inline]
    pub fn for_net_len(net: usize) -> Self {
        debug_assert!(net <= VA_MAX_NET_LEN, "VA net length {} too large", net);
        if net <= VA_SHORT_MAX {
            VaHeader::Short(net as u8)
        } else {
            VaHeader::Long(net as u32)
        }
    }

    #[inline]
    pub fn for_blob(net: usize) -> Self {
        debug_assert!(net <= VA_MAX_NET_LEN, "blob net length {} too large", net);
        VaHeader::Blob(net as u32)
    }

    /// Same shape as `self` (blob or not) but for a different net length.
    #[inline]
    pub fn with_net_len(self, net: usize) -> Self {
        if self.is_blob() {
            Self::for_blob(net)
        } else {
            Self::for_net_len(net)
        }
    }

    #[inline]
    pub fn net_len(self) -> usize {
        match self {
            VaHeader::Short(n) => n as usize,
            VaHeader::Long(n) | VaHeader::Blob(n) => n as usize,
        }
    }

    #[inline]
    pub fn header_len(self) -> usize {
        match self {
            VaHeader::Short(_) => VA_SHORT_HEADER_LEN,
            VaHeader::Long(_) | VaHeader::Blob(_) => VA_LONG_HEADER_LEN,
        }
    }

    #[inline]
    pub fn gross_len(self) -> usize {
        self.header_len() + self.net_len()
    }

    #[inline]
    pub fn is_blob(self) -> bool {
        matches!(self, VaHeader::Blob(_))
    }

    /// Parses a header from trusted bytes.
    ///
    /// Reserved tag bytes are a contract violation; in release builds they
    /// read as an empty short VA.
    #[inline]
    pub fn parse_trusted(buf: &[u8]) -> Self {
        let tag = buf[0];
        if tag as usize <= VA_SHORT_MAX {
            return VaHeader::Short(tag);
        }
        match tag {
            VA_LONG_TAG => VaHeader::Long(read_u32_le(&buf[1..VA_LONG_HEADER_LEN])),
            VA_BLOB_TAG => VaHeader::Blob(read_u32_le(&buf[1..VA_LONG_HEADER_LEN])),
            _ => {
                debug_assert!(false, "reserved VA header byte 0x{:02x}", tag);
                VaHeader::Short(0)
            }
        }
    }

    /// Parses a header from untrusted bytes starting at `offset` in `region`.
    pub fn parse(region: &[u8], offset: usize) -> Result<Self, CheckError> {
        let tag = *region.get(offset).ok_or(OutOfBounds {
            offset,
            needed: 1,
            available: region.len(),
        })?;
        if tag as usize <= VA_SHORT_MAX {
            return Ok(VaHeader::Short(tag));
        }
        if tag != VA_LONG_TAG && tag != VA_BLOB_TAG {
            return Err(CheckError::InvalidHeader { offset, tag });
        }
        let len_bytes = region
            .get(offset + 1..offset + VA_LONG_HEADER_LEN)
            .ok_or(OutOfBounds {
                offset,
                needed: VA_LONG_HEADER_LEN,
                available: region.len(),
            })?;
        let net = read_u32_le(len_bytes);
        if tag == VA_BLOB_TAG {
            return Ok(VaHeader::Blob(net));
        }
        // Writers use the long form only past the short limit, and the
        // compressed forms rely on one framing per non-blob length.
        if net as usize <= VA_SHORT_MAX {
            return Err(CheckError::NonCanonicalHeader {
                offset,
                net: net as usize,
            });
        }
        Ok(VaHeader::Long(net))
    }

    /// Header bytes and how many of them are used.
    #[inline]
    pub fn to_bytes(self) -> ([u8; VA_LONG_HEADER_LEN], usize) {
        let mut out = [0u8; VA_LONG_HEADER_LEN];
        match self {
            VaHeader::Short(n) => {
                out[0] = n;
                (out, VA_SHORT_HEADER_LEN)
            }
            VaHeader::Long(n) => {
                out[0] = VA_LONG_TAG;
                out[1..].copy_from_slice(&n.to_le_bytes());
                (out, VA_LONG_HEADER_LEN)
            }
            VaHeader::Blob(n) => {
                out[0] = VA_BLOB_TAG;
                out[1..].copy_from_slice(&n.to_le_bytes());
                (out, VA_LONG_HEADER_LEN)
            }
        }
    }

    #[inline]
    pub fn push_to(self, out: &mut Vec<u8>) {
        let (bytes, len) = self.to_bytes();
        out.extend_from_slice(&bytes[..len]);
    }

    /// Writes the header into `out`, returning the bytes written.
    #[inline]
    pub fn write_to(self, out: &mut [u8]) -> usize {
        let (bytes, len) = self.to_bytes();
        out[..len].copy_from_slice(&bytes[..len]);
        len
    }
}

/// Gross length of a canonical non-blob VA with `net` payload bytes.
#[inline]
pub fn gross_len_for(net: usize) -> usize {
    VaHeader::for_net_len(net).gross_len()
}

#[inline]
fn read_u32_le(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_form_covers_zero_to_249() {
        assert_eq!(VaHeader::for_net_len(0), VaHeader::Short(0));
        assert_eq!(VaHeader::for_net_len(249), VaHeader::Short(249));
        assert_eq!(VaHeader::for_net_len(249).gross_len(), 250);
    }

    #[test]
    fn long_form_starts_at_250() {
        let h = VaHeader::for_net_len(250);
        assert_eq!(h, VaHeader::Long(250));
        assert_eq!(h.header_len(), 5);
        assert_eq!(h.gross_len(), 255);

        let (bytes, len) = h.to_bytes();
        assert_eq!(&bytes[..len], &[0xFE, 250, 0, 0, 0]);
    }

    #[test]
    fn blob_header_uses_ff_tag_even_when_small() {
        let (bytes, len) = VaHeader::for_blob(30).to_bytes();
        assert_eq!(&bytes[..len], &[0xFF, 30, 0, 0, 0]);
    }

    #[test]
    fn trusted_parse_reads_every_shape() {
        assert_eq!(VaHeader::parse_trusted(&[7, 1, 2]), VaHeader::Short(7));
        assert_eq!(
            VaHeader::parse_trusted(&[0xFE, 0x00, 0x01, 0x00, 0x00]),
            VaHeader::Long(256)
        );
        assert_eq!(
            VaHeader::parse_trusted(&[0xFF, 0x20, 0, 0, 0]),
            VaHeader::Blob(32)
        );
    }

    #[test]
    fn checked_parse_rejects_reserved_tags() {
        for tag in 0xFAu8..=0xFD {
            let err = VaHeader::parse(&[tag, 0, 0, 0, 0], 0).unwrap_err();
            assert_eq!(err, CheckError::InvalidHeader { offset: 0, tag });
        }
    }

    #[test]
    fn checked_parse_reports_truncated_long_header() {
        let err = VaHeader::parse(&[0xFE, 1, 0], 0).unwrap_err();
        assert!(matches!(err, CheckError::OutOfBounds(_)));

        let err = VaHeader::parse(&[], 0).unwrap_err();
        assert!(matches!(err, CheckError::OutOfBounds(_)));
    }

    #[test]
    fn checked_parse_rejects_long_form_for_short_lengths() {
        let err = VaHeader::parse(&[9, 0xFE, 3, 0, 0, 0, b'a', b'b', b'c'], 1).unwrap_err();
        assert_eq!(err, CheckError::NonCanonicalHeader { offset: 1, net: 3 });

        let err = VaHeader::parse(&[0xFE, 249, 0, 0, 0], 0).unwrap_err();
        assert_eq!(err, CheckError::NonCanonicalHeader { offset: 0, net: 249 });

        assert_eq!(
            VaHeader::parse(&[0xFE, 250, 0, 0, 0], 0).unwrap(),
            VaHeader::Long(250)
        );
        assert_eq!(
            VaHeader::parse(&[0xFF, 3, 0, 0, 0], 0).unwrap(),
            VaHeader::Blob(3)
        );
    }

    #[test]
    fn with_net_len_keeps_blob_shape() {
        assert!(VaHeader::Blob(40).with_net_len(3).is_blob());
        assert_eq!(VaHeader::Long(300).with_net_len(3), VaHeader::Short(3));
    }
}

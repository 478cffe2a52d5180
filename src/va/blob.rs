//! # Blob Reference Block
//!
//! A blob VA keeps a data prefix inline and points at the rest of the value
//! through a fixed 24-byte reference block stored at the end of its payload:
//!
//! ```text
//! +------+-----------+------------------+---------------------------+
//! | 0xFF | net (u32) | data prefix      | BlobRef (24 bytes)        |
//! +------+-----------+------------------+---------------------------+
//!                     <-- net - 24 --->  blob_id | total_len |
//!                                        first_page | flags
//! ```
//!
//! The codec never interprets the block: comparison and compression treat it
//! as ordinary payload bytes. `BlobRef` exists so the blob store can read and
//! write it without hand-rolled offsets.
//!
//! All multi-byte fields are little-endian through zerocopy wrappers.

use eyre::{ensure, Result};
use zerocopy::little_endian::{U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::config::BLOB_REF_LEN;

#[repr(C)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned,
)]
pub struct BlobRef {
    blob_id: U64,
    total_len: U64,
    first_page: U32,
    flags: U32,
}

const _: () = assert!(std::mem::size_of::<BlobRef>() == BLOB_REF_LEN);

impl BlobRef {
    pub fn new(blob_id: u64, total_len: u64, first_page: u32, flags: u32) -> Self {
        Self {
            blob_id: U64::new(blob_id),
            total_len: U64::new(total_len),
            first_page: U32::new(first_page),
            flags: U32::new(flags),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        ensure!(
            bytes.len() == BLOB_REF_LEN,
            "blob reference must be {} bytes, got {}",
            BLOB_REF_LEN,
            bytes.len()
        );
        Self::ref_from_bytes(bytes).map_err(|e| eyre::eyre!("failed to read BlobRef: {:?}", e))
    }

    zerocopy_accessors! {
        blob_id: u64,
        total_len: u64,
        first_page: u32,
        flags: u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_ref_is_24_bytes() {
        assert_eq!(size_of::<BlobRef>(), BLOB_REF_LEN);
    }

    #[test]
    fn blob_ref_fields_are_little_endian() {
        let r = BlobRef::new(0x0102, 7, 9, 1);
        let bytes = r.as_bytes();
        assert_eq!(&bytes[..2], &[0x02, 0x01]);
        assert_eq!(bytes[8], 7);
        assert_eq!(bytes[16], 9);
        assert_eq!(bytes[20], 1);
    }

    #[test]
    fn blob_ref_reads_back_through_accessors() {
        let mut r = BlobRef::new(42, 1 << 40, 3, 0);
        r.set_flags(5);
        let parsed = BlobRef::from_bytes(r.as_bytes()).unwrap();
        assert_eq!(parsed.blob_id(), 42);
        assert_eq!(parsed.total_len(), 1 << 40);
        assert_eq!(parsed.first_page(), 3);
        assert_eq!(parsed.flags(), 5);
    }

    #[test]
    fn blob_ref_rejects_wrong_length() {
        assert!(BlobRef::from_bytes(&[0u8; 23]).is_err());
    }
}

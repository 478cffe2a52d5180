//! # vtkey Configuration Constants
//!
//! This module centralizes all configuration constants, grouping interdependent
//! values together and documenting their relationships. Constants that depend
//! on each other are co-located to prevent mismatch bugs.
//!
//! ## Dependency Graph
//!
//! ```text
//! VA header byte (0x00-0xFF)
//!       │
//!       ├─> 0x00..=VA_SHORT_MAX (249)   short form, net length = byte
//!       ├─> 0xFA..=0xFD                 invalid, reported as corruption
//!       ├─> VA_LONG_TAG (0xFE)          long form, u32 LE net length
//!       └─> VA_BLOB_TAG (0xFF)          blob form, u32 LE net length
//!                 │
//!                 └─> BLOB_REF_LEN (24) trailing reference block
//!
//! Integer selector byte (first payload byte)
//!       │
//!       ├─> 0x00                         invalid
//!       ├─> INT_NEG_BASE-8..INT_NEG_BASE negative, 8..1 magnitude bytes
//!       ├─> INT_NEG_BASE..=INT_POS_BASE  folded -119..=119, no payload
//!       └─> INT_POS_BASE+1..=0xFF        positive, 1..8 magnitude bytes
//! ```
//!
//! ## Critical Invariants
//!
//! These invariants are enforced by compile-time assertions:
//!
//! 1. Short form never collides with the long/blob sentinels
//! 2. The folded integer range ends exactly where the multi-byte ranges begin
//! 3. Selector 0x00 is never produced
//! 4. Buffer floors are non-zero and growth is geometric
//!
//! ## Usage
//!
//! ```ignore
//! use crate::config::{VA_SHORT_MAX, BLOB_REF_LEN};
//! ```

// ============================================================================
// VA HEADER LAYOUT
// On-disk format, changing any of these breaks every stored key
// ============================================================================

/// Largest net length stored in the single-byte short form.
pub const VA_SHORT_MAX: usize = 249;

/// Sentinel byte announcing a 4-byte little-endian net length.
pub const VA_LONG_TAG: u8 = 254;

/// Sentinel byte announcing a blob VA (data prefix + blob reference).
pub const VA_BLOB_TAG: u8 = 255;

/// Header length of the short form.
pub const VA_SHORT_HEADER_LEN: usize = 1;

/// Header length of the long and blob forms.
pub const VA_LONG_HEADER_LEN: usize = 5;

/// Largest representable net length.
pub const VA_MAX_NET_LEN: usize = u32::MAX as usize;

/// Size of the opaque reference block that terminates a blob payload.
pub const BLOB_REF_LEN: usize = 24;

const _: () = assert!(
    VA_SHORT_MAX < VA_LONG_TAG as usize,
    "short form lengths must not reach the long-form sentinel"
);

const _: () = assert!(
    VA_LONG_TAG != VA_BLOB_TAG,
    "long and blob sentinels must be distinct"
);

const _: () = assert!(
    VA_LONG_HEADER_LEN == 1 + std::mem::size_of::<u32>(),
    "long header is one tag byte plus a u32 length"
);

// ============================================================================
// INTEGER SELECTOR LAYOUT
// The selector byte must order negatives < folded values < positives
// ============================================================================

/// Selector byte that encodes the value zero.
pub const INT_FOLD_CENTER: u8 = 0x80;

/// Smallest value folded into the selector byte.
pub const INT_FOLD_MIN: i128 = -119;

/// Largest value folded into the selector byte.
pub const INT_FOLD_MAX: i128 = 119;

/// Lowest folded selector; negative selectors are `INT_NEG_BASE - n`.
pub const INT_NEG_BASE: u8 = 0x09;

/// Highest folded selector; positive selectors are `INT_POS_BASE + n`.
pub const INT_POS_BASE: u8 = 0xF7;

/// Maximum magnitude bytes following a selector.
pub const INT_MAX_MAGNITUDE_LEN: usize = 8;

const _: () = assert!(
    INT_FOLD_CENTER as i128 + INT_FOLD_MAX == INT_POS_BASE as i128,
    "folded range must end at INT_POS_BASE"
);

const _: () = assert!(
    INT_FOLD_CENTER as i128 + INT_FOLD_MIN == INT_NEG_BASE as i128,
    "folded range must start at INT_NEG_BASE"
);

const _: () = assert!(
    INT_NEG_BASE as usize > INT_MAX_MAGNITUDE_LEN,
    "selector 0x00 must stay unused"
);

const _: () = assert!(
    INT_POS_BASE as usize + INT_MAX_MAGNITUDE_LEN == 0xFF,
    "positive selectors must use the top of the byte range"
);

// ============================================================================
// BUFFER MANAGEMENT
// Allocation policy for the owned and inline ownership strategies
// ============================================================================

/// Smallest allocation made by a growable VA buffer.
/// Repeated small appends would otherwise reallocate on every call.
pub const BUF_MIN_ALLOC: usize = 32;

/// Capacity multiplier applied when a growable buffer must reallocate.
pub const BUF_GROWTH_FACTOR: usize = 2;

/// Default inline capacity of `InlineVa` in bytes.
pub const DEFAULT_INLINE_CAPACITY: usize = 32;

/// Field count kept inline by small field-boundary arrays.
pub const FIELD_INLINE_COUNT: usize = 16;

/// Initial byte capacity of an expand cache.
pub const EXPAND_CACHE_INITIAL: usize = 256;

const _: () = assert!(BUF_MIN_ALLOC > 0, "allocation floor must be non-zero");

const _: () = assert!(BUF_GROWTH_FACTOR >= 2, "growth must be geometric");

const _: () = assert!(
    DEFAULT_INLINE_CAPACITY >= VA_LONG_HEADER_LEN,
    "inline capacity must hold at least a long header"
);

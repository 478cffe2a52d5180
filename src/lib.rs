//! # vtkey - Order-Preserving Key Encoding for B-Tree Indexes
//!
//! vtkey is the key-encoding and comparison core of a relational storage
//! engine. It defines how single values and composite keys are laid out as
//! bytes, how those bytes are compared without decoding, and how sorted runs
//! of keys are prefix-compressed inside B-tree pages.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   B-Tree page layer (caller)         │
//! ├──────────────────┬──────────────────┤
//! │ compress/expand  │  search state    │
//! │ expand cache     │  (page search)   │
//! ├──────────────────┴──────────────────┤
//! │   VTPL: composite keys / rows        │
//! ├─────────────────────────────────────┤
//! │   VA: one self-describing value      │
//! ├─────────────────────────────────────┤
//! │   Ownership: VaBuf / SharedVa /      │
//! │              InlineVa<N>             │
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Byte Formats
//!
//! A VA is a length header followed by payload bytes:
//!
//! ```text
//! 0x00-0xF9        short form, net length = header byte
//! 0xFE [u32 LE]    long form, net length in the next 4 bytes
//! 0xFF [u32 LE]    blob form, payload = data prefix + 24-byte BlobRef
//! ```
//!
//! A VTPL has the same outer framing and its payload is a concatenation of
//! complete VAs. Payload encodings are chosen so that comparing two payloads
//! with `memcmp` (shorter first on a common prefix) matches value order.
//!
//! ## Module Overview
//!
//! - [`va`]: Header parsing, scalar codecs, the `Va` view and singletons
//! - [`vtpl`]: Composite tuples, builder, ORDER BY style comparator
//! - [`buffer`]: The three ownership strategies behind [`buffer::VaStore`]
//! - [`compress`]: Prefix compression, expansion, separators, expand cache
//! - [`search`]: Incremental comparison state for page searches
//! - [`config`]: Centralized format and tuning constants
//!
//! ## Concurrency
//!
//! Everything here is synchronous and lock-free. Views borrow caller memory;
//! `SearchState` and `ExpandState` belong to exactly one scan at a time.

#[macro_use]
mod macros;

pub mod buffer;
pub mod compress;
pub mod config;
pub mod error;
pub mod search;
pub mod va;
pub mod vtpl;

pub use buffer::{InlineVa, SharedVa, VaBuf, VaStore};
pub use compress::{
    compress, expand, expand_checked, find_split, Compressed, CompressedRun, ExpandState,
    SearchResult,
};
pub use error::{CheckError, OutOfBounds};
pub use search::{SearchState, TieBreak};
pub use va::{BlobRef, Scalar, ScalarKind, Va, VaHeader};
pub use vtpl::{compare_with_order, NullOrder, SortSpec, Vtpl, VtplBuilder};

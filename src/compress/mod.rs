//! # Prefix Compression
//!
//! Sorted keys inside a B-tree page share long prefixes. Each entry is stored
//! as `(mismatch_index, suffix)` against the entry immediately before it:
//!
//! ```text
//! prev   ("APPLE", "1")     tokens  A P P L E \0 END 1 \0 END EOT
//! next   ("APPLE", "2")     tokens  A P P L E \0 END 2 \0 END EOT
//!                                                    ^ mismatch index 7
//! stored (7, ["2"])
//! ```
//!
//! The suffix is itself a VTPL. Its first field holds the rest of the field
//! the mismatch falls in (`next.field[f][o..]`); the remaining fields are
//! copied whole. Expansion takes `prev`'s fields before `f`, `prev`'s first
//! `o` bytes of field `f`, and glues the suffix on.
//!
//! ## Contracts
//!
//! - `compress` requires `prev <= next`; equal tuples store an empty suffix
//!   at the EOT position.
//! - `expand` requires the true predecessor. Violations trip
//!   `debug_assert!`s; [`expand_checked`] validates everything instead.
//! - Header shapes are preserved field by field, so a blob field expands
//!   as a blob even when a plain field with the same bytes precedes it.
//!   Non-blob headers are always canonical short/long form; the checked
//!   parse rejects anything else.
//!
//! ## Separators
//!
//! [`find_split`] builds the shortest tuple strictly above `prev` and at or
//! below `next`: `prev`'s shared fields, then the shared in-field prefix and
//! one byte of `next`. Separators are always plain (non-blob) fields, and
//! they split at the first differing token even where a shape change made
//! the stored mismatch index smaller.

mod cursor;
mod expand_state;
mod run;

pub use cursor::{compare_tokens, mismatch_index, Cursor};
pub use expand_state::ExpandState;
pub use run::{CompressedRun, SearchResult};

use tracing::debug;

use crate::buffer::VaBuf;
use crate::config::{VA_LONG_HEADER_LEN, VA_MAX_NET_LEN, VA_SHORT_HEADER_LEN, VA_SHORT_MAX};
use crate::error::CheckError;
use crate::va::{Va, VaHeader};
use crate::vtpl::{Fields, Vtpl};

/// One compressed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compressed {
    pub mismatch_index: usize,
    pub suffix: VaBuf,
}

pub fn compress(prev: &Vtpl<'_>, next: &Vtpl<'_>) -> Compressed {
    debug_assert!(prev <= next, "compress requires prev <= next");
    let mi = mismatch_index(prev, next);
    let cursor = match Cursor::locate(next, mi) {
        Some(c) => c,
        None => {
            debug_assert!(false, "mismatch index {} past end of next", mi);
            return Compressed {
                mismatch_index: mi,
                suffix: Vtpl::empty().to_buf(),
            };
        }
    };

    let body = next.body();
    let mut out = Vec::with_capacity(body.len() - cursor.byte + 5);
    match cursor.field_va(next) {
        None => VaHeader::Short(0).push_to(&mut out),
        Some(field) => {
            let tail = &field.payload()[cursor.offset..];
            let rest = &body[cursor.byte + field.gross_len()..];
            let head = field.header().with_net_len(tail.len());
            VaHeader::for_net_len(head.gross_len() + rest.len()).push_to(&mut out);
            head.push_to(&mut out);
            out.extend_from_slice(tail);
            out.extend_from_slice(rest);
        }
    }
    Compressed {
        mismatch_index: mi,
        suffix: VaBuf::from_vec_trusted(out),
    }
}

/// Rebuilds the entry stored as `(mismatch_index, suffix)` after `prev`.
pub fn expand(prev: &Vtpl<'_>, suffix: &Vtpl<'_>, mismatch_index: usize) -> VaBuf {
    let cursor = Cursor::locate(prev, mismatch_index);
    debug_assert!(
        cursor.is_some(),
        "mismatch index {} past end of prev",
        mismatch_index
    );
    let cursor = cursor.unwrap_or_else(|| end_cursor(prev));
    let (prefix, partial) = split_at_cursor(prev, &cursor);
    debug_assert!(
        suffix.vacount() > 0 || cursor.at_end(prev),
        "empty suffix at mid-tuple mismatch index {}",
        mismatch_index
    );

    let mut out = Vec::with_capacity(assembled_len(prefix, partial, suffix));
    assemble(prefix, partial, suffix, &mut out);
    VaBuf::from_vec_trusted(out)
}

/// [`expand`] over untrusted regions: both inputs are validated and every
/// inconsistency between them is reported instead of asserted.
pub fn expand_checked(
    prev: &[u8],
    suffix: &[u8],
    mismatch_index: usize,
) -> Result<VaBuf, CheckError> {
    let (prev, _) = Vtpl::validate(prev)?;
    let (suffix, _) = Vtpl::validate(suffix)?;
    let cursor = checked_cursor(&prev, &suffix, mismatch_index)?;
    let (prefix, partial) = split_at_cursor(&prev, &cursor);

    let len = assembled_body_len(prefix, partial, &suffix);
    if len > VA_MAX_NET_LEN {
        debug!(len, "rejected oversized expansion");
        return Err(CheckError::TooLong { len });
    }
    let mut out = Vec::with_capacity(len + VA_LONG_HEADER_LEN);
    assemble(prefix, partial, &suffix, &mut out);
    Ok(VaBuf::from_vec_trusted(out))
}

/// Shortest separator `s` with `prev < s <= next`, where `next` is the entry
/// stored as `(mismatch_index, suffix)` after `prev`.
pub fn find_split(
    prev: &Vtpl<'_>,
    suffix: &Vtpl<'_>,
    mismatch_index: usize,
) -> Result<VaBuf, CheckError> {
    let cursor = checked_cursor(prev, suffix, mismatch_index)?;
    if suffix.vacount() == 0 {
        return Err(CheckError::TruncatedSuffix { mismatch_index });
    }
    // A header-shape change stores tokens both entries share; skip them.
    let (shared_tokens, _) = compare_tokens(
        cursor.remaining(prev),
        suffix.fields().map(|f| f.payload()),
    );
    let truncated = CheckError::TruncatedSuffix { mismatch_index };
    let cursor = cursor
        .seek(prev, mismatch_index + shared_tokens)
        .ok_or(truncated)?;
    let next_at = Cursor::locate(suffix, shared_tokens).ok_or(truncated)?;

    let body = prev.body();
    let prefix = &body[..cursor.byte];

    let mut field = Vec::new();
    match cursor.field_va(prev) {
        Some(shared) => {
            let distinguishing = suffix
                .field_at(next_at.field)
                .payload()
                .get(next_at.offset)
                .copied()
                .ok_or(truncated)?;
            let common = &shared.payload()[..cursor.offset];
            VaHeader::for_net_len(common.len() + 1).push_to(&mut field);
            field.extend_from_slice(common);
            field.push(distinguishing);
        }
        None => field.extend_from_slice(Va::null().as_bytes()),
    }

    let mut out = Vec::with_capacity(prefix.len() + field.len() + 5);
    VaHeader::for_net_len(prefix.len() + field.len()).push_to(&mut out);
    out.extend_from_slice(prefix);
    out.extend_from_slice(&field);
    Ok(VaBuf::from_vec_trusted(out))
}

fn checked_cursor(
    prev: &Vtpl<'_>,
    suffix: &Vtpl<'_>,
    mismatch_index: usize,
) -> Result<Cursor, CheckError> {
    let Some(cursor) = Cursor::locate(prev, mismatch_index) else {
        let positions = prev.position_count();
        debug!(mismatch_index, positions, "mismatch index past end of previous entry");
        return Err(CheckError::MismatchPastEnd {
            mismatch_index,
            positions,
        });
    };
    if suffix.vacount() == 0 && !cursor.at_end(prev) {
        debug!(mismatch_index, "empty suffix inside previous entry");
        return Err(CheckError::TruncatedSuffix { mismatch_index });
    }
    Ok(cursor)
}

fn end_cursor(tuple: &Vtpl<'_>) -> Cursor {
    Cursor {
        position: tuple.position_count(),
        field: tuple.vacount(),
        offset: 0,
        byte: tuple.body().len(),
    }
}

/// Complete framed fields before the cursor and the open field's bytes.
fn split_at_cursor<'a>(tuple: &Vtpl<'a>, cursor: &Cursor) -> (&'a [u8], &'a [u8]) {
    let prefix = &tuple.body()[..cursor.byte];
    let partial = cursor
        .field_va(tuple)
        .map_or(&[][..], |f| &f.payload()[..cursor.offset]);
    (prefix, partial)
}

/// Gross length of `prefix ++ (partial ++ suffix.f0) ++ suffix.rest`.
pub(crate) fn assembled_len(prefix: &[u8], partial: &[u8], suffix: &Vtpl<'_>) -> usize {
    VaHeader::for_net_len(assembled_body_len(prefix, partial, suffix)).gross_len()
}

fn assembled_body_len(prefix: &[u8], partial: &[u8], suffix: &Vtpl<'_>) -> usize {
    let mut fields = suffix.fields();
    let spliced = match fields.next() {
        None => 0,
        Some(first) => {
            let net = partial.len() + first.net_len();
            let header = if first.is_blob() || net > VA_SHORT_MAX {
                VA_LONG_HEADER_LEN
            } else {
                VA_SHORT_HEADER_LEN
            };
            header + net + fields.remaining().len()
        }
    };
    prefix.len() + spliced
}

pub(crate) fn assemble(prefix: &[u8], partial: &[u8], suffix: &Vtpl<'_>, out: &mut Vec<u8>) {
    let start = out.len();
    out.resize(start + assembled_len(prefix, partial, suffix), 0);
    assemble_into(prefix, partial, suffix, &mut out[start..]);
}

/// Writes the assembled tuple into `dest`, which must hold
/// [`assembled_len`] bytes. Returns the bytes written.
pub(crate) fn assemble_into(
    prefix: &[u8],
    partial: &[u8],
    suffix: &Vtpl<'_>,
    dest: &mut [u8],
) -> usize {
    let body = assembled_body_len(prefix, partial, suffix);
    let mut at = VaHeader::for_net_len(body).write_to(dest);
    let mut put = |bytes: &[u8], at: &mut usize| {
        dest[*at..*at + bytes.len()].copy_from_slice(bytes);
        *at += bytes.len();
    };
    put(prefix, &mut at);

    let mut fields: Fields<'_> = suffix.fields();
    if let Some(first) = fields.next() {
        let (header, len) = first
            .header()
            .with_net_len(partial.len() + first.net_len())
            .to_bytes();
        put(&header[..len], &mut at);
        put(partial, &mut at);
        put(first.payload(), &mut at);
        put(fields.remaining(), &mut at);
    } else {
        debug_assert!(partial.is_empty(), "open field without a suffix");
    }
    at
}

//! # Incremental Expansion Cache
//!
//! Expanding every entry of a page from scratch costs
//! `entries × average prefix length`. A forward scan instead keeps the
//! previous entry's first `mismatch_index` tokens in a cache and adjusts it
//! per entry:
//!
//! ```text
//! entry mi smaller than cache   truncate cache (pop fields, shorten open field)
//! entry mi larger than cache    extend cache from the previous entry's suffix
//! then                          output = cache ++ entry suffix
//! ```
//!
//! The cache is split into complete framed fields, a per-field end table
//! (token position and byte offset after each field) and the payload of the
//! one field still open at the cache boundary. The open field gets its
//! header only when it is closed or materialized, because its final length
//! and shape come from whichever suffix continues it.
//!
//! The previous entry is never re-read from the page: its tail is exactly
//! the suffix handed to the last [`ExpandState::advance`], which the state
//! keeps a copy of.

use smallvec::SmallVec;
use tracing::trace;

use super::{assemble_into, assembled_len};
use crate::buffer::VaBuf;
use crate::config::{EXPAND_CACHE_INITIAL, FIELD_INLINE_COUNT};
use crate::error::CheckError;
use crate::va::{Va, VaHeader};
use crate::vtpl::Vtpl;

#[derive(Debug, Clone, Copy)]
struct FieldEnd {
    /// Token position just past the field's END.
    position: usize,
    /// Byte offset just past the framed field.
    byte: usize,
}

#[derive(Debug, Clone)]
pub struct ExpandState {
    fields: Vec<u8>,
    ends: SmallVec<[FieldEnd; FIELD_INLINE_COUNT]>,
    partial: Vec<u8>,
    suffix: Vec<u8>,
    entries: usize,
}

impl Default for ExpandState {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpandState {
    pub fn new() -> Self {
        Self {
            fields: Vec::with_capacity(EXPAND_CACHE_INITIAL),
            ends: SmallVec::new(),
            partial: Vec::new(),
            suffix: Vec::new(),
            entries: 0,
        }
    }

    /// Forgets everything; the next entry must carry mismatch index 0.
    pub fn reset(&mut self) {
        trace!(entries = self.entries, "expand state reset");
        self.fields.clear();
        self.ends.clear();
        self.partial.clear();
        self.suffix.clear();
        self.entries = 0;
    }

    /// Entries advanced over since construction or the last reset.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Token positions currently cached.
    pub fn cached_positions(&self) -> usize {
        self.open_start() + self.partial.len()
    }

    /// Token count of the most recent entry.
    pub fn current_positions(&self) -> usize {
        self.cached_positions() + self.suffix_view().position_count()
    }

    /// Moves to the next entry, stored as `(mismatch_index, suffix)`.
    pub fn advance(&mut self, mismatch_index: usize, suffix: &Vtpl<'_>) {
        debug_assert!(
            mismatch_index <= self.current_positions(),
            "mismatch index {} past end of previous entry ({} positions)",
            mismatch_index,
            self.current_positions()
        );
        debug_assert!(
            suffix.vacount() > 0 || mismatch_index == self.current_positions(),
            "empty suffix must repeat the previous entry"
        );
        self.adjust(mismatch_index);
        self.suffix.clear();
        self.suffix.extend_from_slice(suffix.as_bytes());
        self.entries += 1;
    }

    /// [`ExpandState::advance`] for a suffix read from an untrusted region.
    pub fn advance_checked(
        &mut self,
        mismatch_index: usize,
        suffix: &[u8],
    ) -> Result<(), CheckError> {
        let (suffix, _) = Vtpl::validate(suffix)?;
        let positions = self.current_positions();
        if mismatch_index > positions {
            return Err(CheckError::MismatchPastEnd {
                mismatch_index,
                positions,
            });
        }
        if suffix.vacount() == 0 && mismatch_index != positions {
            return Err(CheckError::TruncatedSuffix { mismatch_index });
        }
        self.advance(mismatch_index, &suffix);
        Ok(())
    }

    /// Writes the current entry into `dest` if it fits. Returns the length
    /// the entry needs either way.
    pub fn materialize(&self, dest: &mut [u8]) -> usize {
        let suffix = self.suffix_view();
        let required = assembled_len(&self.fields, &self.partial, &suffix);
        if dest.len() >= required {
            assemble_into(&self.fields, &self.partial, &suffix, dest);
        }
        required
    }

    pub fn to_buf(&self) -> VaBuf {
        let mut out = vec![0; self.materialize(&mut [])];
        self.materialize(&mut out);
        VaBuf::from_vec_trusted(out)
    }

    fn suffix_view(&self) -> Vtpl<'_> {
        if self.suffix.is_empty() {
            Vtpl::empty()
        } else {
            Vtpl::from_bytes_trusted(&self.suffix)
        }
    }

    #[inline]
    fn open_start(&self) -> usize {
        self.ends.last().map_or(0, |e| e.position)
    }

    fn adjust(&mut self, target: usize) {
        let cached = self.cached_positions();
        if target < cached {
            self.truncate(target);
        } else if target > cached {
            let previous = std::mem::take(&mut self.suffix);
            self.extend(target, &previous);
            self.suffix = previous;
        }
    }

    fn truncate(&mut self, target: usize) {
        let open_start = self.open_start();
        if target >= open_start {
            self.partial.truncate(target - open_start);
            return;
        }
        self.partial.clear();
        while let Some(end) = self.ends.last().copied() {
            if end.position <= target {
                break;
            }
            self.ends.pop();
            let (start_pos, start_byte) = self
                .ends
                .last()
                .map_or((0, 0), |e| (e.position, e.byte));
            if target >= start_pos {
                let field = Va::from_bytes_trusted(&self.fields[start_byte..]);
                self.partial
                    .extend_from_slice(&field.payload()[..target - start_pos]);
            }
            self.fields.truncate(start_byte);
        }
    }

    /// Appends tokens of the previous entry, whose tail is `previous`.
    fn extend(&mut self, target: usize, previous: &[u8]) {
        let mut need = target - self.cached_positions();
        let view = if previous.is_empty() {
            Vtpl::empty()
        } else {
            Vtpl::from_bytes_trusted(previous)
        };
        let mut fields = view.fields();

        if let Some(first) = fields.next() {
            let payload = first.payload();
            let take = need.min(payload.len());
            self.partial.extend_from_slice(&payload[..take]);
            need -= take;
            if need > 0 {
                self.close_open_field(first.header());
                need -= 1;
            }
        }

        while need > 0 {
            let Some(field) = fields.next() else {
                debug_assert!(false, "cache extension ran past the previous entry");
                return;
            };
            let n = field.net_len();
            if need > n {
                let position = self.open_start() + n + 1;
                self.fields.extend_from_slice(field.as_bytes());
                self.ends.push(FieldEnd {
                    position,
                    byte: self.fields.len(),
                });
                need -= n + 1;
            } else {
                self.partial.extend_from_slice(&field.payload()[..need]);
                need = 0;
            }
        }
    }

    fn close_open_field(&mut self, shape: VaHeader) {
        let position = self.open_start() + self.partial.len() + 1;
        shape
            .with_net_len(self.partial.len())
            .push_to(&mut self.fields);
        self.fields.extend_from_slice(&self.partial);
        self.partial.clear();
        self.ends.push(FieldEnd {
            position,
            byte: self.fields.len(),
        });
    }
}

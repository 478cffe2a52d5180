//! # Incremental Page Search
//!
//! Searching a page of compressed entries for a key would normally expand
//! every candidate and compare it from byte 0. [`SearchState`] avoids both:
//! it walks candidates in ascending order and uses each candidate's stored
//! mismatch index to classify most of them without touching their bytes.
//!
//! ## State
//!
//! - `matched`: common token prefix between the key and the last candidate
//!   that compared `<=` the key, with a cursor into the key at that point.
//! - `first_greater` / `greater_mismatch`: set once a candidate compares
//!   greater than the key. From then on every candidate is greater.
//!
//! ## Transitions
//!
//! For a candidate stored as `(mi, suffix)` against the previous candidate:
//!
//! ```text
//! latched            -> Less     (key < candidate), no bytes read
//! mi > matched       -> Greater  candidate shares the previous one's
//!                                smaller token at `matched`
//! mi == matched      -> resume the token compare from the key cursor
//!                       against the suffix; on Greater or Equal move the
//!                       cursor forward by the newly matched tokens
//! mi < matched       -> compare the key from `mi` against the suffix
//! ```
//!
//! With `mi < matched` the candidate usually diverged upward where the
//! previous one still matched, and the first suffix token settles it as
//! Less. Only a header shape change lets the suffix open with tokens the
//! key still shares, which is why that case is compared rather than
//! assumed. Apart from it no key byte is compared twice across a scan.
//! The tie-break hook runs only when key and candidate are identical to
//! their ends.
//!
//! ## Off-by-one Mismatch
//!
//! `greater_mismatch` is the common prefix between the key and the first
//! greater candidate, the entry right after the key's insertion point. With
//! `mismatch_index()` (the prefix shared with the entry before it) a caller
//! can compress the key against both neighbours without another compare.
//! Both are token prefixes: they equal [`crate::compress::mismatch_index`]
//! unless a shared field differs in header shape, where compression stops
//! on that field's END instead.

use std::cmp::Ordering;

use tracing::debug;

use crate::compress::{compare_tokens, Cursor};
use crate::error::{CheckError, OutOfBounds};
use crate::vtpl::{rebase, Vtpl};

/// Decides ties between a key and a byte-identical candidate.
pub trait TieBreak {
    /// Returns `key.cmp(candidate)` for the candidate at `ordinal`.
    fn tie_break(&mut self, ordinal: usize) -> Ordering;
}

impl<F> TieBreak for F
where
    F: FnMut(usize) -> Ordering,
{
    fn tie_break(&mut self, ordinal: usize) -> Ordering {
        self(ordinal)
    }
}

pub struct SearchState<'k> {
    key: Vtpl<'k>,
    cursor: Cursor,
    ordinal: usize,
    first_greater: Option<usize>,
    greater_mismatch: Option<usize>,
    tie_break: Option<Box<dyn TieBreak + 'k>>,
}

impl<'k> SearchState<'k> {
    pub fn new(key: Vtpl<'k>) -> Self {
        Self {
            key,
            cursor: Cursor::default(),
            ordinal: 0,
            first_greater: None,
            greater_mismatch: None,
            tie_break: None,
        }
    }

    pub fn with_tie_break(mut self, tie_break: impl TieBreak + 'k) -> Self {
        self.tie_break = Some(Box::new(tie_break));
        self
    }

    /// Restarts the scan from the first entry of a run, keeping key and
    /// tie-break.
    pub fn reset(&mut self) {
        self.cursor = Cursor::default();
        self.ordinal = 0;
        self.first_greater = None;
        self.greater_mismatch = None;
    }

    pub fn key(&self) -> Vtpl<'k> {
        self.key
    }

    /// Common token prefix of the key and the last candidate `<=` it.
    pub fn mismatch_index(&self) -> usize {
        self.cursor.position
    }

    /// Ordinal of the first candidate found greater than the key.
    pub fn first_greater(&self) -> Option<usize> {
        self.first_greater
    }

    /// Common token prefix of the key and that first greater candidate.
    pub fn greater_mismatch(&self) -> Option<usize> {
        self.greater_mismatch
    }

    /// Candidates classified so far.
    pub fn compared(&self) -> usize {
        self.ordinal
    }

    /// Classifies the next candidate, returning `key.cmp(candidate)`.
    pub fn compare(&mut self, mismatch_index: usize, suffix: &Vtpl<'_>) -> Ordering {
        let ordinal = self.ordinal;
        self.ordinal += 1;
        if self.first_greater.is_some() {
            return Ordering::Less;
        }

        let from = match mismatch_index.cmp(&self.cursor.position) {
            Ordering::Greater => return Ordering::Greater,
            Ordering::Equal => self.cursor,
            // The suffix may open with tokens the previous candidate shared
            // when only a field's header shape changed, so resume there.
            Ordering::Less => match Cursor::locate(&self.key, mismatch_index) {
                Some(cursor) => cursor,
                None => {
                    self.latch(ordinal, mismatch_index);
                    return Ordering::Less;
                }
            },
        };

        let (common, mut ord) = compare_tokens(
            from.remaining(&self.key),
            suffix.fields().map(|f| f.payload()),
        );
        if ord == Ordering::Equal {
            if let Some(tie_break) = self.tie_break.as_mut() {
                ord = tie_break.tie_break(ordinal);
            }
        }

        if ord == Ordering::Less {
            self.latch(ordinal, from.position + common);
        } else {
            self.cursor = from;
            self.advance(from.position + common);
        }
        ord
    }

    /// [`SearchState::compare`] for a suffix at `offset` in an untrusted
    /// region. Reports the problem instead of reading past the region.
    pub fn compare_checked(
        &mut self,
        region: &[u8],
        offset: usize,
        mismatch_index: usize,
    ) -> Result<Ordering, CheckError> {
        let tail = region.get(offset..).ok_or(OutOfBounds {
            offset,
            needed: 1,
            available: region.len(),
        })?;
        let (suffix, _) = Vtpl::validate(tail).map_err(|e| {
            let e = rebase(e, offset);
            debug!(error = %e, ordinal = self.ordinal, "rejected corrupted candidate");
            e
        })?;
        Ok(self.compare(mismatch_index, &suffix))
    }

    fn latch(&mut self, ordinal: usize, mismatch: usize) {
        self.first_greater = Some(ordinal);
        self.greater_mismatch = Some(mismatch);
    }

    fn advance(&mut self, target: usize) {
        match self.cursor.seek(&self.key, target) {
            Some(cursor) => self.cursor = cursor,
            None => debug_assert!(false, "match position {} past end of key", target),
        }
    }
}

impl std::fmt::Debug for SearchState<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchState")
            .field("key", &self.key)
            .field("matched", &self.cursor.position)
            .field("compared", &self.ordinal)
            .field("first_greater", &self.first_greater)
            .field("greater_mismatch", &self.greater_mismatch)
            .field("tie_break", &self.tie_break.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::VaBuf;
    use crate::compress::{compress, mismatch_index, Compressed};
    use crate::va::{BlobRef, Scalar};
    use crate::vtpl::VtplBuilder;

    fn texts(values: &[&str]) -> VaBuf {
        let mut b = VtplBuilder::new();
        for v in values {
            b.push(&Scalar::Text(v));
        }
        b.finish()
    }

    fn compress_all(rows: &[VaBuf]) -> Vec<Compressed> {
        let mut prev = Vtpl::empty().to_buf();
        rows.iter()
            .map(|row| {
                let c = compress(&prev.as_vtpl(), &row.as_vtpl());
                prev = row.clone();
                c
            })
            .collect()
    }

    fn page() -> Vec<VaBuf> {
        vec![
            texts(&["APPLE", "1"]),
            texts(&["APPLE", "2"]),
            texts(&["APRICOT"]),
            texts(&["BANANA"]),
            texts(&["BANANA", "split"]),
            texts(&["CHERRY"]),
        ]
    }

    fn classify_all(key: &VaBuf, rows: &[VaBuf]) -> Vec<Ordering> {
        let entries = compress_all(rows);
        let mut state = SearchState::new(key.as_vtpl());
        entries
            .iter()
            .map(|c| state.compare(c.mismatch_index, &c.suffix.as_vtpl()))
            .collect()
    }

    #[test]
    fn classification_matches_direct_compare() {
        let rows = page();
        let keys = [
            texts(&["APPLE", "2"]),
            texts(&["APPLE", "15"]),
            texts(&["AP"]),
            texts(&["BANANA", "s"]),
            texts(&["ZEBRA"]),
            texts(&[]),
        ];
        for key in &keys {
            let expected: Vec<Ordering> = rows
                .iter()
                .map(|row| key.as_vtpl().compare(&row.as_vtpl()))
                .collect();
            assert_eq!(classify_all(key, &rows), expected, "key {:?}", key);
        }
    }

    #[test]
    fn latches_on_first_greater_candidate() {
        let rows = page();
        let entries = compress_all(&rows);
        let key = texts(&["APPLE", "15"]);
        let mut state = SearchState::new(key.as_vtpl());
        for c in &entries {
            state.compare(c.mismatch_index, &c.suffix.as_vtpl());
        }
        assert_eq!(state.first_greater(), Some(1));
        assert_eq!(
            state.greater_mismatch(),
            Some(mismatch_index(&key.as_vtpl(), &rows[1].as_vtpl()))
        );
        assert_eq!(
            state.mismatch_index(),
            mismatch_index(&key.as_vtpl(), &rows[0].as_vtpl())
        );
        assert_eq!(state.compared(), rows.len());
    }

    #[test]
    fn exact_match_advances_to_key_end() {
        let rows = page();
        let entries = compress_all(&rows);
        let key = texts(&["APRICOT"]);
        let mut state = SearchState::new(key.as_vtpl());
        let results: Vec<Ordering> = entries[..3]
            .iter()
            .map(|c| state.compare(c.mismatch_index, &c.suffix.as_vtpl()))
            .collect();
        assert_eq!(
            results,
            vec![Ordering::Greater, Ordering::Greater, Ordering::Equal]
        );
        assert_eq!(state.mismatch_index(), key.as_vtpl().position_count());
        assert_eq!(state.first_greater(), None);
    }

    #[test]
    fn tie_break_runs_only_on_identical_entries() {
        let rows = page();
        let entries = compress_all(&rows);
        let key = texts(&["BANANA"]);
        let mut calls = Vec::new();
        {
            let mut state =
                SearchState::new(key.as_vtpl()).with_tie_break(|ordinal: usize| {
                    calls.push(ordinal);
                    Ordering::Less
                });
            let results: Vec<Ordering> = entries
                .iter()
                .map(|c| state.compare(c.mismatch_index, &c.suffix.as_vtpl()))
                .collect();
            assert_eq!(results[3], Ordering::Less);
            assert_eq!(state.first_greater(), Some(3));
        }
        assert_eq!(calls, vec![3]);
    }

    #[test]
    fn compare_checked_reports_corruption() {
        let key = texts(&["k"]);
        let mut state = SearchState::new(key.as_vtpl());

        let err = state.compare_checked(&[1, 2, 3], 7, 0).unwrap_err();
        assert!(matches!(err, CheckError::OutOfBounds(_)));

        let err = state.compare_checked(&[9, 9, 6, 1], 2, 0).unwrap_err();
        assert_eq!(
            err,
            CheckError::OutOfBounds(OutOfBounds {
                offset: 2,
                needed: 7,
                available: 4
            })
        );

        let candidate = texts(&["j"]);
        let mut region = vec![0xEE; 3];
        region.extend_from_slice(candidate.as_bytes());
        assert_eq!(
            state.compare_checked(&region, 3, 0).unwrap(),
            Ordering::Greater
        );
    }

    /// Rows whose first field has the same bytes but alternates between
    /// plain and blob headers.
    fn shape_page() -> (VaBuf, Vec<VaBuf>) {
        let blob = Scalar::Blob {
            data: b"ab",
            reference: BlobRef::new(7, 1 << 20, 40, 0),
        }
        .encode();
        let plain = Scalar::Binary(blob.as_va().payload()).encode();
        let mut b = VtplBuilder::new();
        let mut row = |field: &VaBuf, tail: &str| {
            b.push_va(field.as_va()).push(&Scalar::Text(tail));
            b.finish()
        };
        let rows = vec![
            row(&plain, "x"),
            row(&blob, "y"),
            row(&plain, "y2"),
            row(&blob, "z"),
        ];
        (plain, rows)
    }

    #[test]
    fn shape_change_resumes_compare_inside_shared_prefix() {
        let (plain, rows) = shape_page();
        let key_with = |tail: &str| {
            let mut b = VtplBuilder::new();
            b.push_va(plain.as_va()).push(&Scalar::Text(tail));
            b.finish()
        };
        for tail in ["a", "x", "xa", "y", "y1", "y3", "z", "zz"] {
            let key = key_with(tail);
            let expected: Vec<Ordering> = rows
                .iter()
                .map(|row| key.as_vtpl().compare(&row.as_vtpl()))
                .collect();
            assert_eq!(classify_all(&key, &rows), expected, "key tail {tail}");
        }
    }

    #[test]
    fn shape_change_latches_token_prefix() {
        let (plain, rows) = shape_page();
        let entries = compress_all(&rows);
        let mut b = VtplBuilder::new();
        b.push_va(plain.as_va()).push(&Scalar::Text("xa"));
        let key = b.finish();

        let mut state = SearchState::new(key.as_vtpl());
        for c in &entries {
            state.compare(c.mismatch_index, &c.suffix.as_vtpl());
        }
        assert_eq!(state.first_greater(), Some(1));
        // Tokens agree through the shared field's END, one past the stored
        // compression index.
        let shared = plain.as_va().net_len();
        assert_eq!(entries[1].mismatch_index, shared);
        assert_eq!(state.greater_mismatch(), Some(shared + 1));
        assert_eq!(state.mismatch_index(), shared + 2);
    }
}

//! # Compressed Runs
//!
//! [`CompressedRun`] is the in-memory shape of a page's key area: a sorted
//! sequence of entries, each stored as `(mismatch_index, suffix)` against its
//! predecessor. It ties the pieces together the way the page layer uses
//! them:
//!
//! - [`CompressedRun::push`] compresses each new entry against the last one
//! - [`CompressedRun::search`] scans with a [`SearchState`]
//! - [`CompressedRun::iter`] expands forward through an [`ExpandState`]
//! - [`CompressedRun::separator`] builds the split key between two entries

use std::cmp::Ordering;

use eyre::{ensure, Result};

use super::{compress, find_split, Compressed, ExpandState};
use crate::buffer::VaBuf;
use crate::search::SearchState;
use crate::vtpl::Vtpl;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchResult {
    Found(usize),
    NotFound(usize),
}

#[derive(Debug, Clone, Default)]
pub struct CompressedRun {
    entries: Vec<Compressed>,
    last: VaBuf,
}

impl CompressedRun {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compresses `rows`, which must already be in ascending order.
    pub fn from_sorted<'a>(rows: impl IntoIterator<Item = Vtpl<'a>>) -> Result<Self> {
        let mut run = Self::new();
        for row in rows {
            run.push(row)?;
        }
        Ok(run)
    }

    pub fn push(&mut self, next: Vtpl<'_>) -> Result<()> {
        let last = self.last.as_vtpl();
        ensure!(
            last <= next,
            "entry {} is out of order: {:?} sorts before {:?}",
            self.entries.len(),
            next,
            last
        );
        let entry = compress(&last, &next);
        self.entries.push(entry);
        self.last = next.to_buf();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored form of entry `index`.
    pub fn entry(&self, index: usize) -> Option<(usize, Vtpl<'_>)> {
        self.entries
            .get(index)
            .map(|c| (c.mismatch_index, c.suffix.as_vtpl()))
    }

    /// Bytes taken by all stored suffixes.
    pub fn stored_len(&self) -> usize {
        self.entries.iter().map(|c| c.suffix.len()).sum()
    }

    /// Last entry pushed, uncompressed.
    pub fn last(&self) -> Option<Vtpl<'_>> {
        (!self.is_empty()).then(|| self.last.as_vtpl())
    }

    pub fn search(&self, key: &Vtpl<'_>) -> SearchResult {
        let mut state = SearchState::new(*key);
        self.search_with(&mut state)
    }

    /// Scans with a caller-prepared state, e.g. one carrying a tie-break.
    pub fn search_with(&self, state: &mut SearchState<'_>) -> SearchResult {
        state.reset();
        for (i, c) in self.entries.iter().enumerate() {
            match state.compare(c.mismatch_index, &c.suffix.as_vtpl()) {
                Ordering::Equal => return SearchResult::Found(i),
                Ordering::Less => return SearchResult::NotFound(i),
                Ordering::Greater => {}
            }
        }
        SearchResult::NotFound(self.entries.len())
    }

    /// Expands entry `index`, walking the run from the start.
    pub fn get(&self, index: usize) -> Option<VaBuf> {
        self.iter().nth(index)
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            entries: &self.entries,
            state: ExpandState::new(),
            index: 0,
        }
    }

    /// Shortest key separating entry `index - 1` from entry `index`.
    pub fn separator(&self, index: usize) -> Result<VaBuf> {
        ensure!(
            index > 0 && index < self.entries.len(),
            "separator index {} outside 1..{}",
            index,
            self.entries.len()
        );
        let prev = self
            .get(index - 1)
            .ok_or_else(|| eyre::eyre!("entry {} missing", index - 1))?;
        let entry = &self.entries[index];
        Ok(find_split(
            &prev.as_vtpl(),
            &entry.suffix.as_vtpl(),
            entry.mismatch_index,
        )?)
    }
}

/// Forward iterator expanding each entry through one cache.
pub struct Iter<'r> {
    entries: &'r [Compressed],
    state: ExpandState,
    index: usize,
}

impl Iterator for Iter<'_> {
    type Item = VaBuf;

    fn next(&mut self) -> Option<VaBuf> {
        let entry = self.entries.get(self.index)?;
        self.index += 1;
        self.state
            .advance(entry.mismatch_index, &entry.suffix.as_vtpl());
        Some(self.state.to_buf())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.entries.len() - self.index;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Iter<'_> {}

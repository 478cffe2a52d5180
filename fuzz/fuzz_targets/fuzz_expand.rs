//! Fuzz testing for checked expansion of compressed entries.
//!
//! Feeds arbitrary previous entries, suffixes and mismatch indexes through
//! the validating paths. Corrupt input must come back as a `CheckError`;
//! anything accepted must be a well-formed tuple that the expansion cache
//! reproduces byte for byte.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use vtkey::{expand_checked, ExpandState, SearchState, Vtpl};

#[derive(Debug, Arbitrary)]
struct ExpandInput {
    prev: Vec<u8>,
    suffixes: Vec<(u8, Vec<u8>)>,
    key: Vec<u8>,
}

fuzz_target!(|input: ExpandInput| {
    let _ = Vtpl::validate(&input.prev);

    let mut state = ExpandState::new();
    let mut prev = Vtpl::empty().to_buf();
    let key = Vtpl::validate(&input.key).ok().map(|(k, _)| k);
    let mut search = key.map(SearchState::new);

    for (mi, suffix) in &input.suffixes {
        let mi = *mi as usize;
        let direct = expand_checked(prev.as_bytes(), suffix, mi);
        let cached = state.advance_checked(mi, suffix);
        match direct {
            Ok(next) => {
                assert!(cached.is_ok());
                assert!(Vtpl::new(next.as_bytes()).is_ok());
                assert_eq!(state.to_buf(), next);
                if let Some(search) = search.as_mut() {
                    let _ = search.compare_checked(suffix, 0, mi);
                }
                prev = next;
            }
            Err(_) => break,
        }
    }

    if let Ok(out) = expand_checked(&input.prev, &input.key, 0) {
        assert!(Vtpl::new(out.as_bytes()).is_ok());
    }
});

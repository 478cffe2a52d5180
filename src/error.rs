//! # Validation Errors
//!
//! Trusted entry points (`Va::from_bytes_trusted`, `expand`, `SearchState::compare`)
//! assume well-formed input and only carry `debug_assert!`s. The checked
//! entry points (`Vtpl::validate`, `expand_checked`, `SearchState::compare_checked`)
//! read from storage that may be corrupted and report problems through the
//! types in this module instead of panicking.
//!
//! Both types implement `std::error::Error`, so they convert into
//! `eyre::Report` with `?` wherever the caller works in `eyre::Result`.

/// A read would have gone past the end of the caller-supplied region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfBounds {
    pub offset: usize,
    pub needed: usize,
    pub available: usize,
}

impl std::fmt::Display for OutOfBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "out of bounds: {} bytes needed at offset {} but region holds {}",
            self.needed, self.offset, self.available
        )
    }
}

impl std::error::Error for OutOfBounds {}

/// Failure reported by a checked (untrusted input) entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckError {
    OutOfBounds(OutOfBounds),
    /// Header byte in the reserved range 0xFA..=0xFD.
    InvalidHeader { offset: usize, tag: u8 },
    /// Long header framing a length that fits the short form.
    NonCanonicalHeader { offset: usize, net: usize },
    /// Field lengths do not exactly consume the tuple's net length.
    FieldOverrun { field: usize },
    /// Mismatch index points past the end of the previous entry.
    MismatchPastEnd { mismatch_index: usize, positions: usize },
    /// Suffix is empty but the mismatch index ends inside a field.
    TruncatedSuffix { mismatch_index: usize },
    /// Expanded tuple would exceed the largest representable length.
    TooLong { len: usize },
}

impl std::fmt::Display for CheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckError::OutOfBounds(e) => e.fmt(f),
            CheckError::InvalidHeader { offset, tag } => {
                write!(f, "invalid VA header byte 0x{:02x} at offset {}", tag, offset)
            }
            CheckError::NonCanonicalHeader { offset, net } => write!(
                f,
                "long VA header at offset {} frames {} bytes, short form required",
                offset, net
            ),
            CheckError::FieldOverrun { field } => {
                write!(f, "field {} overruns the tuple length", field)
            }
            CheckError::MismatchPastEnd {
                mismatch_index,
                positions,
            } => write!(
                f,
                "mismatch index {} past end of previous entry ({} positions)",
                mismatch_index, positions
            ),
            CheckError::TruncatedSuffix { mismatch_index } => write!(
                f,
                "empty suffix cannot complete a field split at mismatch index {}",
                mismatch_index
            ),
            CheckError::TooLong { len } => write!(f, "expanded length {} too large", len),
        }
    }
}

impl std::error::Error for CheckError {}

impl From<OutOfBounds> for CheckError {
    fn from(e: OutOfBounds) -> Self {
        CheckError::OutOfBounds(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_converts_into_check_error() {
        let e = OutOfBounds {
            offset: 3,
            needed: 5,
            available: 4,
        };
        let c: CheckError = e.into();
        assert_eq!(c, CheckError::OutOfBounds(e));
        assert!(c.to_string().contains("offset 3"));
    }

    #[test]
    fn check_error_wraps_into_eyre_report() {
        fn fails() -> eyre::Result<()> {
            Err(CheckError::InvalidHeader {
                offset: 0,
                tag: 0xFB,
            })?;
            Ok(())
        }
        let err = fails().unwrap_err();
        assert!(err.to_string().contains("0xfb"));
    }
}

//! # VTPL - Composite Keys and Rows
//!
//! A VTPL is a VA-shaped outer frame whose payload is a concatenation of
//! complete VAs, its fields. There are no separators: each field's own
//! header says where the next one starts.
//!
//! ```text
//! +--------+----------------+----------------+-----+----------------+
//! | header | field 0 (VA)   | field 1 (VA)   | ... | field N-1 (VA) |
//! +--------+----------------+----------------+-----+----------------+
//!          <------------- outer net length -------------------->
//! ```
//!
//! The sum of the fields' gross lengths must exactly consume the outer net
//! length. [`Vtpl::new`] and [`Vtpl::validate`] check this; the trusted
//! constructor only asserts it in debug builds.
//!
//! ## Ordering
//!
//! Fields are compared pairwise with the VA rule (payload bytes, shorter
//! first). If every compared field is equal, the tuple with fewer fields
//! sorts first. Equivalently, a tuple is the token stream
//! `F0 bytes, END, F1 bytes, END, ..., EOT` with `EOT < END < any byte`,
//! which is the view the compression engine builds on.
//!
//! ## Schema Growth
//!
//! [`Vtpl::field_at`] returns the NULL singleton for indexes past the stored
//! field count, so rows written before a column was added read that column
//! as NULL. [`Vtpl::normalize`] strips trailing NULL fields so such rows
//! compare and compress identically to their longer forms.

mod builder;
mod order;

pub use builder::VtplBuilder;
pub use order::{compare_with_order, NullOrder, SortSpec};

use std::cmp::Ordering;

use eyre::Result;
use tracing::debug;

use crate::buffer::VaBuf;
use crate::error::{CheckError, OutOfBounds};
use crate::va::{Va, VaHeader};

static EMPTY_VTPL_BYTES: [u8; 1] = [0x00];

#[derive(Clone, Copy)]
pub struct Vtpl<'a> {
    va: Va<'a>,
}

impl Vtpl<'static> {
    /// The tuple with zero fields.
    pub fn empty() -> Self {
        Vtpl {
            va: Va::from_bytes_trusted(&EMPTY_VTPL_BYTES),
        }
    }
}

impl<'a> Vtpl<'a> {
    /// Views `data` as exactly one well-formed VTPL.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let va = Va::new(data)?;
        Ok(Self::from_va(va)?)
    }

    /// Reinterprets a VA as a tuple, checking that its fields fit exactly.
    pub fn from_va(va: Va<'a>) -> std::result::Result<Self, CheckError> {
        check_fields(va.payload(), va.header().header_len())?;
        Ok(Self { va })
    }

    /// Validates the VTPL at the start of an untrusted `region`, returning it
    /// and the bytes after it.
    pub fn validate(region: &'a [u8]) -> std::result::Result<(Self, &'a [u8]), CheckError> {
        let (va, rest) = Va::split_checked(region)?;
        match check_fields(va.payload(), va.header().header_len()) {
            Ok(()) => Ok((Self { va }, rest)),
            Err(e) => {
                debug!(error = %e, "rejected corrupted tuple");
                Err(e)
            }
        }
    }

    /// Views the VTPL at the start of trusted `data`.
    #[inline]
    pub fn from_bytes_trusted(data: &'a [u8]) -> Self {
        let va = Va::from_bytes_trusted(data);
        debug_assert!(
            check_fields(va.payload(), va.header().header_len()).is_ok(),
            "malformed VTPL fields"
        );
        Self { va }
    }

    #[inline]
    pub fn as_va(&self) -> Va<'a> {
        self.va
    }

    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.va.as_bytes()
    }

    /// Concatenated field encodings.
    #[inline]
    pub fn body(&self) -> &'a [u8] {
        self.va.payload()
    }

    #[inline]
    pub fn gross_len(&self) -> usize {
        self.va.gross_len()
    }

    #[inline]
    pub fn fields(&self) -> Fields<'a> {
        Fields::new(self.body())
    }

    pub fn vacount(&self) -> usize {
        self.fields().count()
    }

    /// Field `index`, or the NULL singleton past the stored field count.
    pub fn field_at(&self, index: usize) -> Va<'a> {
        self.fields().nth(index).unwrap_or_else(|| Va::null())
    }

    /// Number of positions in the token stream before EOT: every payload
    /// byte plus one END per field.
    pub fn position_count(&self) -> usize {
        self.fields().map(|f| f.net_len() + 1).sum()
    }

    /// Body length once trailing NULL fields are stripped.
    pub fn normalized_body_len(&self) -> usize {
        let mut keep = 0;
        let mut offset = 0;
        for field in self.fields() {
            offset += field.gross_len();
            if !field.is_null() {
                keep = offset;
            }
        }
        keep
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized_body_len() == self.body().len()
    }

    /// Copy of this tuple without trailing zero-length fields.
    pub fn normalize(&self) -> VaBuf {
        let body = &self.body()[..self.normalized_body_len()];
        VaBuf::from_payload(VaHeader::for_net_len(body.len()), body)
    }

    pub fn to_buf(&self) -> VaBuf {
        VaBuf::from_va(self.va)
    }

    pub fn compare(&self, other: &Vtpl<'_>) -> Ordering {
        let mut a = self.fields();
        let mut b = other.fields();
        loop {
            match (a.next(), b.next()) {
                (Some(x), Some(y)) => match x.compare(&y) {
                    Ordering::Equal => continue,
                    unequal => return unequal,
                },
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (None, None) => return Ordering::Equal,
            }
        }
    }
}

/// Compares two tuples read from untrusted regions.
pub fn compare_checked(a: &[u8], b: &[u8]) -> std::result::Result<Ordering, CheckError> {
    let (a, _) = Vtpl::validate(a)?;
    let (b, _) = Vtpl::validate(b)?;
    Ok(a.compare(&b))
}

fn check_fields(body: &[u8], base: usize) -> std::result::Result<(), CheckError> {
    let mut offset = 0;
    let mut field = 0;
    while offset < body.len() {
        let header = VaHeader::parse(body, offset).map_err(|e| rebase(e, base))?;
        let end = offset + header.gross_len();
        if end > body.len() {
            return Err(CheckError::FieldOverrun { field });
        }
        offset = end;
        field += 1;
    }
    Ok(())
}

pub(crate) fn rebase(e: CheckError, base: usize) -> CheckError {
    match e {
        CheckError::OutOfBounds(oob) => CheckError::OutOfBounds(OutOfBounds {
            offset: oob.offset + base,
            needed: oob.needed,
            available: oob.available + base,
        }),
        CheckError::InvalidHeader { offset, tag } => CheckError::InvalidHeader {
            offset: offset + base,
            tag,
        },
        CheckError::NonCanonicalHeader { offset, net } => CheckError::NonCanonicalHeader {
            offset: offset + base,
            net,
        },
        other => other,
    }
}

/// Iterator over the fields of a trusted tuple.
#[derive(Clone)]
pub struct Fields<'a> {
    rest: &'a [u8],
}

impl<'a> Fields<'a> {
    /// Iterates the framed fields laid out back to back in `body`.
    #[inline]
    pub(crate) fn new(body: &'a [u8]) -> Self {
        Self { rest: body }
    }

    /// Bytes not yet yielded, starting at the next field's header.
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        self.rest
    }
}

impl<'a> Iterator for Fields<'a> {
    type Item = Va<'a>;

    #[inline]
    fn next(&mut self) -> Option<Va<'a>> {
        if self.rest.is_empty() {
            return None;
        }
        let va = Va::from_bytes_trusted(self.rest);
        self.rest = &self.rest[va.gross_len()..];
        Some(va)
    }
}

impl PartialEq for Vtpl<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Vtpl<'_> {}

impl PartialOrd for Vtpl<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Vtpl<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl std::fmt::Debug for Vtpl<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.fields()).finish()
    }
}

//! # Token Positions
//!
//! Compression, expansion and page search all address a tuple by *position*
//! in its token stream:
//!
//! ```text
//! ("APPLE", "1") as Text fields:
//!
//! position  0 1 2 3 4 5  6    7 8  9    10
//! token     A P P L E \0 END  1 \0 END  EOT
//!           <-- field 0 -->   <field 1>
//! ```
//!
//! `EOT < END < any byte`, so comparing two streams token by token is the
//! tuple order, and the length of the common token prefix is the mismatch
//! index stored with every compressed entry. Header shape is not a token;
//! [`mismatch_index`] instead ends the prefix early where two otherwise
//! equal fields differ in it.
//!
//! A [`Cursor`] is a position resolved to `(field, offset)` plus the byte
//! offset of that field inside the tuple body. Offset may equal the field's
//! length, meaning the cursor sits on the field's END token.

use std::cmp::Ordering;

use crate::va::Va;
use crate::vtpl::{Fields, Vtpl};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub position: usize,
    pub field: usize,
    pub offset: usize,
    /// Body offset of the field's header.
    pub byte: usize,
}

impl Cursor {
    /// Resolves `position` in `tuple`, or `None` past its EOT.
    pub fn locate(tuple: &Vtpl<'_>, position: usize) -> Option<Cursor> {
        Cursor::default().seek(tuple, position)
    }

    /// Moves forward to `target`, walking only the fields in between.
    pub fn seek(self, tuple: &Vtpl<'_>, target: usize) -> Option<Cursor> {
        debug_assert!(target >= self.position, "cursor can only move forward");
        let body = tuple.body();
        let mut field = self.field;
        let mut byte = self.byte;
        let mut field_start = self.position - self.offset;
        loop {
            if byte >= body.len() {
                return (target == field_start).then_some(Cursor {
                    position: target,
                    field,
                    offset: 0,
                    byte,
                });
            }
            let va = Va::from_bytes_trusted(&body[byte..]);
            let n = va.net_len();
            if target <= field_start + n {
                return Some(Cursor {
                    position: target,
                    field,
                    offset: target - field_start,
                    byte,
                });
            }
            field_start += n + 1;
            byte += va.gross_len();
            field += 1;
        }
    }

    /// True when the cursor is on the tuple's EOT token.
    #[inline]
    pub fn at_end(&self, tuple: &Vtpl<'_>) -> bool {
        self.byte >= tuple.body().len()
    }

    /// Field at the cursor, if any.
    #[inline]
    pub fn field_va<'a>(&self, tuple: &Vtpl<'a>) -> Option<Va<'a>> {
        Fields::new(&tuple.body()[self.byte..]).next()
    }

    /// Payload slices of the token stream from the cursor onward: the rest
    /// of the current field, then every later field.
    pub fn remaining<'a>(&self, tuple: &Vtpl<'a>) -> impl Iterator<Item = &'a [u8]> {
        let mut fields = Fields::new(&tuple.body()[self.byte..]);
        let offset = self.offset;
        let first = fields.next().map(|va| &va.payload()[offset..]);
        first.into_iter().chain(fields.map(|va| va.payload()))
    }
}

/// Compares two token streams given as field payload sequences.
///
/// Returns the length of the common token prefix and the order of the
/// first differing token.
pub fn compare_tokens<'a, 'b>(
    mut a: impl Iterator<Item = &'a [u8]>,
    mut b: impl Iterator<Item = &'b [u8]>,
) -> (usize, Ordering) {
    let mut position = 0;
    loop {
        match (a.next(), b.next()) {
            (Some(x), Some(y)) => {
                let n = common_prefix(x, y);
                if n < x.len() && n < y.len() {
                    return (position + n, x[n].cmp(&y[n]));
                }
                if x.len() != y.len() {
                    return (position + n, x.len().cmp(&y.len()));
                }
                position += n + 1;
            }
            (None, None) => return (position, Ordering::Equal),
            (None, Some(_)) => return (position, Ordering::Less),
            (Some(_), None) => return (position, Ordering::Greater),
        }
    }
}

/// Mismatch index of `b` against `a`.
///
/// Usually the common token prefix. A field whose bytes match but whose
/// header shape differs (blob against plain) stops the prefix on that
/// field's END, so the suffix starts inside the field and carries `b`'s
/// header. The tokens at the returned position may then be equal.
pub fn mismatch_index(a: &Vtpl<'_>, b: &Vtpl<'_>) -> usize {
    let mut position = 0;
    for (x, y) in a.fields().zip(b.fields()) {
        let (xp, yp) = (x.payload(), y.payload());
        let n = common_prefix(xp, yp);
        if n < xp.len() || n < yp.len() || x.is_blob() != y.is_blob() {
            return position + n;
        }
        position += n + 1;
    }
    position
}

#[inline]
fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

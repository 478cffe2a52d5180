//! # ORDER BY Comparison
//!
//! [`compare_with_order`] compares two tuples field by field with a
//! direction per field, for sorts that do not follow the stored key order.
//!
//! NULL handling for descending fields is selectable:
//!
//! - [`NullOrder::Low`]: NULL is the lowest value, so a descending field
//!   lists it last.
//! - [`NullOrder::First`]: NULL is listed first in either direction.
//!
//! Ascending fields always list NULL first. Fields beyond the `SortSpec` slice
//! compare ascending, and a tuple shorter than the other reads its missing
//! fields as NULL.

use std::cmp::Ordering;

use super::Vtpl;
use crate::va::Va;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullOrder {
    #[default]
    Low,
    First,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub descending: bool,
    pub nulls: NullOrder,
}

impl SortSpec {
    pub const fn asc() -> Self {
        Self {
            descending: false,
            nulls: NullOrder::Low,
        }
    }

    pub const fn desc() -> Self {
        Self {
            descending: true,
            nulls: NullOrder::Low,
        }
    }

    pub const fn desc_nulls_first() -> Self {
        Self {
            descending: true,
            nulls: NullOrder::First,
        }
    }

    fn compare(&self, x: Va<'_>, y: Va<'_>) -> Ordering {
        match (x.is_null(), y.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => self.null_vs_value(),
            (false, true) => self.null_vs_value().reverse(),
            (false, false) => {
                let ord = x.compare(&y);
                if self.descending {
                    ord.reverse()
                } else {
                    ord
                }
            }
        }
    }

    fn null_vs_value(&self) -> Ordering {
        match (self.descending, self.nulls) {
            (true, NullOrder::Low) => Ordering::Greater,
            _ => Ordering::Less,
        }
    }
}

pub fn compare_with_order(a: &Vtpl<'_>, b: &Vtpl<'_>, specs: &[SortSpec]) -> Ordering {
    let mut xs = a.fields();
    let mut ys = b.fields();
    let mut i = 0;
    loop {
        let (x, y) = match (xs.next(), ys.next()) {
            (None, None) => return Ordering::Equal,
            (x, y) => (x.unwrap_or_else(|| Va::null()), y.unwrap_or_else(|| Va::null())),
        };
        let spec = specs.get(i).copied().unwrap_or_default();
        match spec.compare(x, y) {
            Ordering::Equal => i += 1,
            unequal => return unequal,
        }
    }
}

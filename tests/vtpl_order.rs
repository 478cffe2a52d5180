//! # Tuple Order
//!
//! A tuple of binary fields must order exactly like `Vec<Vec<u8>>`: fields
//! pairwise, shorter field first on a common prefix, fewer fields first.

use std::cmp::Ordering;

use proptest::prelude::*;
use vtkey::{compare_with_order, Scalar, SortSpec, VaBuf, Vtpl, VtplBuilder};

fn tuple(fields: &[Vec<u8>]) -> VaBuf {
    let mut b = VtplBuilder::new();
    for f in fields {
        b.push(&Scalar::Binary(f));
    }
    b.finish()
}

fn fields() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(0u8..4, 0..4), 0..4)
}

#[test]
fn schema_growth_reads_missing_columns_as_null() {
    let old_row = tuple(&[b"id".to_vec()]);
    let t = old_row.as_vtpl();
    assert!(t.field_at(1).is_null());
    assert!(t.field_at(100).is_null());

    let new_row = tuple(&[b"id".to_vec(), Vec::new(), Vec::new()]);
    assert_eq!(new_row.as_vtpl().normalize(), old_row);
}

#[test]
fn mixed_types_build_and_read_back() {
    let mut b = VtplBuilder::new();
    b.push(&Scalar::Int8(-42))
        .push(&Scalar::Text("name"))
        .push(&Scalar::Float8(2.5))
        .push_null();
    let row = b.finish();
    let t = row.as_vtpl();
    assert_eq!(t.vacount(), 4);
    assert_eq!(t.field_at(0).as_i64().unwrap(), -42);
    assert_eq!(t.field_at(1).as_str().unwrap(), "name");
    assert_eq!(t.field_at(2).as_f64().unwrap(), 2.5);
    assert!(t.field_at(3).is_null());
    assert!(Vtpl::new(row.as_bytes()).is_ok());
}

proptest! {
    #[test]
    fn compare_matches_nested_vec_order(a in fields(), b in fields()) {
        let (x, y) = (tuple(&a), tuple(&b));
        prop_assert_eq!(x.as_vtpl().compare(&y.as_vtpl()), a.cmp(&b));
    }

    #[test]
    fn compare_is_antisymmetric(a in fields(), b in fields()) {
        let (x, y) = (tuple(&a), tuple(&b));
        prop_assert_eq!(
            x.as_vtpl().compare(&y.as_vtpl()),
            y.as_vtpl().compare(&x.as_vtpl()).reverse()
        );
    }

    #[test]
    fn compare_is_transitive(a in fields(), b in fields(), c in fields()) {
        let mut rows = [tuple(&a), tuple(&b), tuple(&c)];
        rows.sort_by(|x, y| x.as_vtpl().compare(&y.as_vtpl()));
        prop_assert!(rows[0].as_vtpl() <= rows[2].as_vtpl());
    }

    #[test]
    fn ascending_spec_equals_plain_compare_for_equal_arity(
        a in prop::collection::vec(prop::collection::vec(1u8..4, 1..4), 3),
        b in prop::collection::vec(prop::collection::vec(1u8..4, 1..4), 3),
    ) {
        let (x, y) = (tuple(&a), tuple(&b));
        prop_assert_eq!(
            compare_with_order(&x.as_vtpl(), &y.as_vtpl(), &[SortSpec::asc(); 3]),
            x.as_vtpl().compare(&y.as_vtpl())
        );
    }

    #[test]
    fn all_descending_reverses_non_null_rows(
        a in prop::collection::vec(prop::collection::vec(1u8..4, 1..4), 2),
        b in prop::collection::vec(prop::collection::vec(1u8..4, 1..4), 2),
    ) {
        let (x, y) = (tuple(&a), tuple(&b));
        let plain = x.as_vtpl().compare(&y.as_vtpl());
        prop_assert_eq!(
            compare_with_order(&x.as_vtpl(), &y.as_vtpl(), &[SortSpec::desc(); 2]),
            plain.reverse()
        );
    }

    #[test]
    fn normalize_is_idempotent(a in fields()) {
        let once = tuple(&a).as_vtpl().normalize();
        let twice = once.as_vtpl().normalize();
        prop_assert_eq!(&once, &twice);
        prop_assert!(once.as_vtpl().is_normalized());
        prop_assert_eq!(
            compare_with_order(&once.as_vtpl(), &tuple(&a).as_vtpl(), &[]),
            Ordering::Equal
        );
    }
}

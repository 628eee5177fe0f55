use std::cmp::Ordering;

use as2js_ast::values::{string_is_number, string_to_float64};
use as2js_ast::{Arena, CompareMode, CompareResult, Float64, Int64, NodeKind};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn expected(ordering: Option<Ordering>) -> CompareResult {
    match ordering {
        Some(Ordering::Less) => CompareResult::Less,
        Some(Ordering::Equal) => CompareResult::Equal,
        Some(Ordering::Greater) => CompareResult::Greater,
        None => CompareResult::Unordered,
    }
}

fn any_float() -> impl Strategy<Value = f64> {
    prop_oneof![
        any::<f64>(),
        Just(f64::NAN),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
        Just(0.0),
        Just(-0.0),
    ]
}

proptest! {
    #[test]
    fn float_compare_follows_ieee_ordering(a in any_float(), b in any_float()) {
        let result = Float64::new(a).compare(Float64::new(b));
        prop_assert_eq!(result, expected(a.partial_cmp(&b)));
        if a.is_nan() || b.is_nan() {
            prop_assert_eq!(result, CompareResult::Unordered);
        }
    }

    #[test]
    fn int_compare_is_a_total_order(a in any::<i64>(), b in any::<i64>()) {
        let forward = Int64::new(a).compare(Int64::new(b));
        let backward = Int64::new(b).compare(Int64::new(a));
        prop_assert_eq!(forward, expected(Some(a.cmp(&b))));
        prop_assert!(forward.is_ordered());
        prop_assert_eq!(forward == CompareResult::Equal, backward == CompareResult::Equal);
        prop_assert_eq!(forward == CompareResult::Less, backward == CompareResult::Greater);
    }

    #[test]
    fn printed_integers_are_numbers(value in any::<i64>()) {
        let text = value.to_string();
        prop_assert!(string_is_number(&text));
        #[allow(clippy::cast_precision_loss)]
        let as_float = value as f64;
        prop_assert_eq!(string_to_float64(&text), as_float);
    }
}

#[test]
fn infinities_are_ordered_and_classified() {
    let negative = Float64::new(f64::NEG_INFINITY);
    let positive = Float64::new(f64::INFINITY);
    assert_eq!(negative.compare(Float64::new(f64::MIN)), CompareResult::Less);
    assert_eq!(positive.compare(Float64::new(f64::MAX)), CompareResult::Greater);
    assert_eq!(positive.compare(positive), CompareResult::Equal);
    assert_eq!(
        (negative.classified_infinity(), positive.classified_infinity()),
        (-1, 1)
    );
    assert_eq!(Float64::new(1.5).classified_infinity(), 0);
}

#[test]
fn literal_nodes_compare_by_value() {
    let mut arena = Arena::new();
    let one = arena.create(NodeKind::Int64);
    arena.set_int64(one, Int64::new(1)).unwrap();
    let one_and_a_half = arena.create(NodeKind::Float64);
    arena.set_float64(one_and_a_half, Float64::new(1.5)).unwrap();
    let nan = arena.create(NodeKind::Float64);
    arena.set_float64(nan, Float64::new(f64::NAN)).unwrap();

    assert_eq!(
        arena.compare(one, one_and_a_half, CompareMode::Loose),
        CompareResult::Less
    );
    assert_eq!(
        arena.compare(one, one_and_a_half, CompareMode::Strict),
        CompareResult::Unordered
    );
    assert_eq!(
        arena.compare(nan, nan, CompareMode::Strict),
        CompareResult::Unordered
    );
}

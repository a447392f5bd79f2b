use proptest::prelude::*;
use stencil_value::ops::{arith, text};
use stencil_value::{DiagnosticPolicy, Diagnostics, IntWidth, Severity, Value};

fn diag() -> Diagnostics {
    Diagnostics::new(DiagnosticPolicy::silent())
}

fn int_width() -> impl Strategy<Value = IntWidth> {
    prop_oneof![
        Just(IntWidth::I8),
        Just(IntWidth::I16),
        Just(IntWidth::I32),
        Just(IntWidth::I64),
        Just(IntWidth::U8),
        Just(IntWidth::U16),
        Just(IntWidth::U32),
        Just(IntWidth::U64),
    ]
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i32>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        "[a-z ]{0,8}".prop_map(Value::from),
        (-1.0e6f64..1.0e6).prop_map(Value::from),
    ]
}

fn nested() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::seq),
            prop::collection::btree_map("[a-c]", inner, 0..4)
                .prop_map(|m| Value::map(m.into_iter())),
        ]
    })
}

/// Same kinds at the same positions.
fn same_shape(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Sequence(x), Value::Sequence(y)) => {
            x.len() == y.len() && x.items.iter().zip(&y.items).all(|(p, q)| same_shape(p, q))
        }
        (Value::Mapping(x), Value::Mapping(y)) => {
            x.len() == y.len()
                && x.iter()
                    .zip(y.iter())
                    .all(|((ka, va), (kb, vb))| ka == kb && same_shape(va, vb))
        }
        (a, b) => a.kind() == b.kind(),
    }
}

proptest! {
    #[test]
    fn upper_preserves_shape(value in nested()) {
        let mut d = diag();
        let out = text::upper(&value, &mut d);
        prop_assert!(same_shape(&value, &out));
    }

    #[test]
    fn multiply_preserves_shape(value in nested(), factor in -100i64..100) {
        let mut d = diag();
        let out = arith::multiply(&Value::from(factor), &value, &mut d);
        prop_assert!(same_shape(&value, &out));
    }

    #[test]
    fn round_zero_is_identity_on_integers(raw in any::<i64>(), width in int_width()) {
        let mut d = diag();
        let value = Value::Int(width.wrap(raw), width);
        let out = arith::round(&Value::from(0), &value, &mut d);
        prop_assert_eq!(out, value);
        prop_assert!(d.is_empty());
    }

    #[test]
    fn divide_by_zero_returns_target(value in nested()) {
        let mut d = diag();
        let out = arith::divide(&Value::from(0), &value, &mut d);
        prop_assert_eq!(out, value);
        prop_assert!(d.has(Severity::Error));
    }

    #[test]
    fn add_then_subtract_restores_distinct_sequences(
        xs in prop::collection::btree_set(0i64..50, 0..8),
        ys in prop::collection::btree_set(50i64..100, 0..8),
    ) {
        let mut d = diag();
        let x = Value::seq(xs.into_iter().map(Value::from));
        let y = Value::seq(ys.into_iter().map(Value::from));
        let sum = arith::add(&y, &x, &mut d);
        let back = arith::subtract(&y, &sum, &mut d);
        prop_assert_eq!(back, x);
        prop_assert!(d.is_empty());
    }
}

#[test]
fn test_add_scalar_to_sequence() {
    let mut d = diag();
    let out = arith::add(
        &Value::from(5),
        &Value::seq([Value::from(10), Value::from(20)]),
        &mut d,
    );
    assert_eq!(out, Value::seq([Value::from(15), Value::from(30)]));
}

#[test]
fn test_subtract_mapping_drops_emptied_keys() {
    let mut d = diag();
    let out = arith::subtract(
        &Value::map([("remove", Value::from("v"))]),
        &Value::map([("from", Value::from("f")), ("remove", Value::from("v"))]),
        &mut d,
    );
    assert_eq!(out, Value::map([("from", Value::from("f"))]));
}

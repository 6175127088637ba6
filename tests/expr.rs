//! End-to-end tests for expression construction, broadcasting, and the
//! three traversal paths.

use approx::assert_relative_eq;
use num_complex::Complex64;

use fnexpr_rs::{
    add, div, equal, fma, less, mul, neg, not_equal, sub, BatchRepr, Bools, DenseArray,
    ExprError, F64s, FlatCursor, Layout, Operand, ScalarOperand, Stepper,
};

fn matrix_2x3() -> DenseArray<f64> {
    DenseArray::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap()
}

fn row_3() -> DenseArray<f64> {
    DenseArray::from_vec(vec![10.0, 20.0, 30.0], &[3]).unwrap()
}

#[test]
fn broadcast_sum_of_matrix_and_row() {
    let m = matrix_2x3();
    let v = row_3();
    let e = add(&m, &v);

    assert_eq!(e.shape().unwrap(), &[2, 3]);
    assert_eq!(e.dimension(), 2);
    assert_eq!(e.size().unwrap(), 6);
    assert!(!e.is_trivial_broadcast().unwrap());

    assert_relative_eq!(e.value_at(&[0, 0]).unwrap(), 11.0);
    assert_relative_eq!(e.value_at(&[0, 2]).unwrap(), 33.0);
    assert_relative_eq!(e.value_at(&[1, 0]).unwrap(), 14.0);
    assert_relative_eq!(e.value_at(&[1, 2]).unwrap(), 36.0);
}

#[test]
fn flat_iteration_of_elementwise_product() {
    let a = DenseArray::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
    let b = DenseArray::from_vec(vec![5.0, 6.0, 7.0, 8.0], &[2, 2]).unwrap();
    let e = mul(&a, &b);

    assert!(e.is_trivial_broadcast().unwrap());
    let values: Vec<f64> = e.flat_values().unwrap().collect();
    assert_eq!(values, vec![5.0, 12.0, 21.0, 32.0]);
}

#[test]
fn traversal_paths_agree_on_trivial_expression() {
    let a = matrix_2x3();
    let b = DenseArray::from_elem(0.5f64, &[2, 3]);
    let e = sub(&a, &b);
    let shape = e.shape().unwrap().to_vec();

    let mut direct = Vec::new();
    for i in 0..shape[0] {
        for j in 0..shape[1] {
            direct.push(e.value_at(&[i, j]).unwrap());
        }
    }

    let flat: Vec<f64> = e.flat_values().unwrap().collect();
    assert_eq!(direct, flat);

    let mut st = e.stepper_begin(&shape);
    let mut stepped = vec![st.value()];
    for _ in 1..shape[0] * shape[1] {
        stepped.push(st.step_leading());
    }
    assert_eq!(direct, stepped);
}

#[test]
fn stepper_walks_broadcast_expression() {
    let m = matrix_2x3();
    let v = row_3();
    let e = add(&m, &v);
    let shape = e.shape().unwrap().to_vec();

    let mut st = e.stepper_begin(&shape);
    let mut values = vec![st.value()];
    // Row-major odometer: step the trailing axis, reset on rollover.
    for _ in 0..shape[0] {
        for _ in 1..shape[1] {
            st.step(1, 1);
            values.push(st.value());
        }
        if values.len() < shape[0] * shape[1] {
            st.reset(1);
            st.step(0, 1);
            values.push(st.value());
        }
    }
    assert_eq!(values, vec![11.0, 22.0, 33.0, 14.0, 25.0, 36.0]);
}

#[test]
fn nested_tree_with_scalar() {
    let m = matrix_2x3();
    let v = row_3();
    let e = div(mul(add(&m, &v), ScalarOperand(2.0f64)), ScalarOperand(4.0f64));

    assert_eq!(e.shape().unwrap(), &[2, 3]);
    assert_relative_eq!(e.value_at(&[0, 0]).unwrap(), 5.5);
    assert_relative_eq!(e.value_at(&[1, 2]).unwrap(), 18.0);
}

#[test]
fn ternary_fused_multiply_add() {
    let a = DenseArray::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
    let b = DenseArray::from_elem(10.0f64, &[2, 2]);
    let c = DenseArray::from_vec(vec![0.1, 0.2, 0.3, 0.4], &[2, 2]).unwrap();
    let e = fma(&a, &b, &c);

    let values: Vec<f64> = e.flat_values().unwrap().collect();
    for (got, want) in values.iter().zip([10.1, 20.2, 30.3, 40.4]) {
        assert_relative_eq!(*got, want, max_relative = 1e-12);
    }
}

#[test]
fn comparison_yields_bool_expression() {
    let a = matrix_2x3();
    let b = DenseArray::from_elem(3.5f64, &[2, 3]);
    let e = less(&a, &b);

    assert_eq!(e.value_at(&[0, 0]).unwrap(), true);
    assert_eq!(e.value_at(&[1, 2]).unwrap(), false);
    let values: Vec<bool> = e.flat_values().unwrap().collect();
    assert_eq!(values, vec![true, true, true, false, false, false]);
}

#[test]
fn negation_is_unary() {
    let a = matrix_2x3();
    let e = neg(&a);
    assert_eq!(e.shape().unwrap(), &[2, 3]);
    assert_relative_eq!(e.value_at(&[1, 1]).unwrap(), -5.0);
}

#[test]
fn complex_expression_values() {
    let a = DenseArray::from_vec(
        vec![Complex64::new(1.0, 1.0), Complex64::new(2.0, -1.0)],
        &[2],
    )
    .unwrap();
    let e = mul(&a, ScalarOperand(Complex64::new(0.0, 1.0)));
    assert_eq!(e.value_at(&[0]).unwrap(), Complex64::new(-1.0, 1.0));
    assert_eq!(e.value_at(&[1]).unwrap(), Complex64::new(1.0, 2.0));
}

#[test]
fn complex_equality_comparison() {
    // Complex numbers have no ordering, only equality.
    let a = DenseArray::from_vec(
        vec![Complex64::new(1.0, 1.0), Complex64::new(2.0, -1.0)],
        &[2],
    )
    .unwrap();
    let e = equal(&a, ScalarOperand(Complex64::new(1.0, 1.0)));
    let values: Vec<bool> = e.flat_values().unwrap().collect();
    assert_eq!(values, vec![true, false]);

    let n = not_equal(&a, ScalarOperand(Complex64::new(1.0, 1.0)));
    assert_eq!(n.value_at(&[0]).unwrap(), false);
    assert_eq!(n.value_at(&[1]).unwrap(), true);
}

#[test]
fn batch_path_matches_scalar_path() {
    let a = matrix_2x3();
    let b = row_3();
    // Same shapes so flat positions line up for the batch load.
    let bb = DenseArray::from_vec(
        vec![10.0, 20.0, 30.0, 10.0, 20.0, 30.0],
        &[2, 3],
    )
    .unwrap();
    let e = add(&a, &bb);

    let batch: F64s = e.load_simd(0);
    let flat: Vec<f64> = e.flat_values().unwrap().collect();
    assert_eq!(&batch.to_array()[..], &flat[..4]);

    // And the broadcast expression agrees element-for-element.
    let broadcast = add(&a, &b);
    for i in 0..2 {
        for j in 0..3 {
            assert_relative_eq!(
                broadcast.value_at(&[i, j]).unwrap(),
                e.value_at(&[i, j]).unwrap()
            );
        }
    }
}

#[test]
fn batch_comparison_produces_mask() {
    let a = DenseArray::from_vec(vec![1.0, 5.0, 3.0, 7.0], &[4]).unwrap();
    let b = DenseArray::from_elem(4.0f64, &[4]);
    let e = less(&a, &b);
    let mask: Bools = e.load_simd(0);
    assert_eq!(mask.to_array(), [true, false, true, false]);
}

#[test]
fn column_major_operands_iterate_flat() {
    let a = DenseArray::from_vec_column_major(vec![1.0, 3.0, 2.0, 4.0], &[2, 2]).unwrap();
    let b = DenseArray::from_vec_column_major(vec![10.0, 30.0, 20.0, 40.0], &[2, 2]).unwrap();
    let e = add(&a, &b);

    assert_eq!(e.layout(), Layout::ColumnMajor);
    // Flat order is the shared storage order, not row-major.
    let values: Vec<f64> = e.flat_values().unwrap().collect();
    assert_eq!(values, vec![11.0, 33.0, 22.0, 44.0]);
}

#[test]
fn mixed_layout_falls_back_to_steppers() {
    let a = DenseArray::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
    let b = DenseArray::from_vec_column_major(vec![10.0, 30.0, 20.0, 40.0], &[2, 2]).unwrap();
    let e = add(&a, &b);

    assert_eq!(e.layout(), Layout::Dynamic);
    assert!(matches!(e.flat_values(), Err(ExprError::NotFlatTraversable)));

    // Coordinate access still works.
    assert_relative_eq!(e.value_at(&[1, 0]).unwrap(), 33.0);
}

#[test]
fn incompatible_shapes_error_on_resolution() {
    let a = matrix_2x3();
    let b = DenseArray::from_vec(vec![0.0; 4], &[2, 2]).unwrap();
    let e = add(&a, &b);
    assert!(matches!(
        e.shape(),
        Err(ExprError::BroadcastMismatch {
            axis: 1,
            operand: 2,
            resolved: 3
        })
    ));
}

#[test]
fn scalar_expression_behaves_as_value() {
    let e = mul(ScalarOperand(6.0f64), ScalarOperand(7.0f64));
    assert_eq!(e.dimension(), 0);
    assert_eq!(e.scalar(), Some(42.0));
    assert_eq!(e.value_at(&[]).unwrap(), 42.0);
    assert!(e.value_at(&[0]).is_err());
}

#[test]
fn expression_nests_as_operand_in_broadcast() {
    // A resolved (1, 3) node merged under a (2, 3) parent.
    let narrow = DenseArray::from_vec(vec![1.0, 2.0, 3.0], &[1, 3]).unwrap();
    let inner = add(&narrow, ScalarOperand(1.0f64));
    inner.shape().unwrap();

    let m = matrix_2x3();
    let outer = mul(&m, &inner);
    assert_eq!(outer.shape().unwrap(), &[2, 3]);
    assert!(!outer.is_trivial_broadcast().unwrap());
    assert_relative_eq!(outer.value_at(&[1, 1]).unwrap(), 15.0);
}

#[test]
fn cursor_distance_counts_positions() {
    let a = matrix_2x3();
    let e = add(&a, ScalarOperand(0.0f64));
    let mut begin = e.cursor_begin();
    let end = e.cursor_end();
    assert_eq!(begin.distance_to(&end), 6);
    assert!(begin < end);
    begin.advance(6);
    assert_eq!(begin.distance_to(&end), 0);
    assert!(begin == end);
}

#[test]
fn linear_assign_requires_matching_strides() {
    let a = matrix_2x3();
    let e = add(&a, ScalarOperand(1.0f64));
    // Row-major (2, 3) destination strides.
    assert!(e.has_linear_assign(&[3, 1]));
    assert!(!e.has_linear_assign(&[1, 2]));
}

#[test]
fn unchecked_access_after_resolution() {
    let m = matrix_2x3();
    let v = row_3();
    let e = add(&m, &v);
    e.shape().unwrap();
    let value = unsafe { e.value_at_unchecked(&[1, 1]) };
    assert_relative_eq!(value, 25.0);
}

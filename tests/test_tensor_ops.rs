// Tests for tensor primitives: matmul, transpose, add_bias, and argmax.

use approx::assert_relative_eq;
use dnn_engine::Tensor;

#[test]
fn test_matmul_shape() {
    let a = Tensor::new(3, 4);
    let b = Tensor::new(4, 5);
    let c = a.matmul(&b);
    assert_eq!(c.rows(), 3);
    assert_eq!(c.cols(), 5);
}

#[test]
fn test_matmul_values() {
    // [1 2]   [5 6]   [19 22]
    // [3 4] · [7 8] = [43 50]
    let a = Tensor::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
    let b = Tensor::from_vec(2, 2, vec![5.0, 6.0, 7.0, 8.0]);
    let c = a.matmul(&b);

    assert_relative_eq!(c[(0, 0)], 19.0);
    assert_relative_eq!(c[(0, 1)], 22.0);
    assert_relative_eq!(c[(1, 0)], 43.0);
    assert_relative_eq!(c[(1, 1)], 50.0);
}

#[test]
fn test_matmul_identity() {
    let a = Tensor::from_vec(2, 2, vec![1.5, -2.0, 0.25, 3.0]);
    let identity = Tensor::from_vec(2, 2, vec![1.0, 0.0, 0.0, 1.0]);
    assert_eq!(a.matmul(&identity), a);
}

#[test]
#[should_panic(expected = "matmul dimension mismatch")]
fn test_matmul_inner_dimension_mismatch() {
    let a = Tensor::new(2, 3);
    let b = Tensor::new(4, 2);
    let _ = a.matmul(&b);
}

#[test]
fn test_transpose_values() {
    let a = Tensor::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let t = a.transpose();

    assert_eq!(t.rows(), 3);
    assert_eq!(t.cols(), 2);
    assert_eq!(t[(0, 0)], 1.0);
    assert_eq!(t[(0, 1)], 4.0);
    assert_eq!(t[(2, 1)], 6.0);
}

#[test]
fn test_transpose_involution() {
    let a = Tensor::from_vec(2, 3, vec![1.0, -2.0, 3.5, 0.0, 5.0, -6.25]);
    assert_eq!(a.transpose().transpose(), a);
}

#[test]
fn test_add_bias_on_zero_matrix() {
    // Every row of a zero matrix plus bias b must equal b.
    let mut a = Tensor::new(3, 2);
    let bias = [0.5, -1.5];
    a.add_bias(&bias);

    for i in 0..3 {
        assert_eq!(a.row(i), &bias);
    }
}

#[test]
fn test_add_bias_in_place() {
    let mut a = Tensor::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
    a.add_bias(&[10.0, 20.0]);
    assert_eq!(a.data(), &[11.0, 22.0, 13.0, 24.0]);
}

#[test]
#[should_panic(expected = "Bias length")]
fn test_add_bias_length_mismatch() {
    let mut a = Tensor::new(2, 3);
    a.add_bias(&[1.0, 2.0]);
}

#[test]
fn test_argmax_single_row() {
    let t = Tensor::from_vec(1, 3, vec![0.1, 0.9, 0.3]);
    assert_eq!(t.argmax(), 1);
}

#[test]
fn test_argmax_tie_breaks_to_first() {
    let t = Tensor::from_vec(1, 2, vec![0.5, 0.5]);
    assert_eq!(t.argmax(), 0);
}

#[test]
fn test_argmax_multi_row_is_column_of_flat_max() {
    // Flat max is at index 5 (value 9.0), column 5 % 3 = 2.
    let t = Tensor::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 9.0]);
    assert_eq!(t.argmax(), 2);
}

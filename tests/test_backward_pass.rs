// Tests for the dense-layer backward pass: hand-computed gradients, bias
// column sums, the returned input gradient, gradient overwrite semantics,
// and a finite-difference check of the weight gradient through an MSE loss.

use approx::assert_relative_eq;
use dnn_engine::utils::SimpleRng;
use dnn_engine::{ActivationKind, DenseLayer, Loss, LossKind, Model, Target, Tensor};

fn layer_with(
    input_size: usize,
    output_size: usize,
    kind: ActivationKind,
    weights: Vec<f32>,
    biases: Vec<f32>,
) -> DenseLayer {
    let mut rng = SimpleRng::new(1);
    let mut layer = DenseLayer::new(input_size, output_size, kind, &mut rng);
    layer.set_weights(weights);
    layer.set_biases(biases);
    layer
}

#[test]
fn test_linear_backward_hand_computed() {
    // x = [1, 2], W = [[1, 2], [3, 4]], dout = [1, 1].
    let mut layer = layer_with(
        2,
        2,
        ActivationKind::Linear,
        vec![1.0, 2.0, 3.0, 4.0],
        vec![0.0, 0.0],
    );
    layer.forward(&Tensor::from_vec(1, 2, vec![1.0, 2.0]));
    let dx = layer.backward(&Tensor::from_vec(1, 2, vec![1.0, 1.0]));

    // grad_W = xᵀ · dout = [[1, 1], [2, 2]]
    assert_eq!(layer.grad_weights().data(), &[1.0, 1.0, 2.0, 2.0]);
    // grad_b = column sums of dout
    assert_eq!(layer.grad_biases(), &[1.0, 1.0]);
    // dX = dout · Wᵀ = [3, 7]
    assert_eq!(dx.data(), &[3.0, 7.0]);
}

#[test]
fn test_relu_backward_masks_negative_preactivations() {
    // Pre-activations: [-3, 3]; ReLU kills the gradient on the first unit.
    let mut layer = layer_with(
        2,
        2,
        ActivationKind::Relu,
        vec![1.0, 0.0, 0.0, 1.0],
        vec![0.0, 0.0],
    );
    layer.forward(&Tensor::from_vec(1, 2, vec![-3.0, 3.0]));
    let dx = layer.backward(&Tensor::from_vec(1, 2, vec![1.0, 1.0]));

    assert_eq!(layer.grad_biases(), &[0.0, 1.0]);
    assert_eq!(dx.data(), &[0.0, 1.0]);
}

#[test]
fn test_grad_bias_sums_over_batch() {
    let mut layer = layer_with(
        2,
        2,
        ActivationKind::Linear,
        vec![1.0, 0.0, 0.0, 1.0],
        vec![0.0, 0.0],
    );
    layer.forward(&Tensor::from_vec(3, 2, vec![1.0; 6]));
    layer.backward(&Tensor::from_vec(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));

    assert_eq!(layer.grad_biases(), &[9.0, 12.0]);
}

#[test]
fn test_backward_overwrites_gradients() {
    // Each backward call represents exactly one batch; gradients must not
    // accumulate across calls.
    let mut layer = layer_with(
        2,
        2,
        ActivationKind::Linear,
        vec![1.0, 0.0, 0.0, 1.0],
        vec![0.0, 0.0],
    );
    let x = Tensor::from_vec(1, 2, vec![1.0, 1.0]);
    let dout = Tensor::from_vec(1, 2, vec![1.0, 1.0]);

    layer.forward(&x);
    layer.backward(&dout);
    let first = layer.grad_weights().clone();

    layer.forward(&x);
    layer.backward(&dout);
    assert_eq!(layer.grad_weights(), &first);
}

#[test]
#[should_panic(expected = "does not match output_size")]
fn test_backward_rejects_wrong_width() {
    let mut layer = layer_with(
        2,
        2,
        ActivationKind::Linear,
        vec![1.0, 0.0, 0.0, 1.0],
        vec![0.0, 0.0],
    );
    layer.forward(&Tensor::from_vec(1, 2, vec![1.0, 1.0]));
    layer.backward(&Tensor::new(1, 3));
}

#[test]
fn test_weight_gradient_matches_finite_difference() {
    // Analytic grad_W from backprop against central differences of the MSE
    // loss, perturbing one weight at a time.
    let weights = vec![0.3, -0.2, 0.5, 0.1, -0.4, 0.2];
    let biases = vec![0.05, -0.05];
    let x = Tensor::from_vec(1, 3, vec![0.7, -1.2, 0.4]);
    let truth = Tensor::from_vec(1, 2, vec![1.0, 0.0]);
    let loss = Loss::new(LossKind::MeanSquaredError, 0);

    let loss_at = |w: &[f32]| -> f32 {
        let mut layer = layer_with(3, 2, ActivationKind::Sigmoid, w.to_vec(), biases.clone());
        let pred = layer.forward(&x);
        loss.forward(&pred, Target::Values(&truth)).unwrap()
    };

    let mut layer = layer_with(3, 2, ActivationKind::Sigmoid, weights.clone(), biases.clone());
    let pred = layer.forward(&x);
    let grad = loss.backward(&pred, Target::Values(&truth)).unwrap();
    layer.backward(&grad);

    let h = 1e-2f32;
    for idx in 0..weights.len() {
        let mut plus = weights.clone();
        plus[idx] += h;
        let mut minus = weights.clone();
        minus[idx] -= h;
        let numerical = (loss_at(&plus) - loss_at(&minus)) / (2.0 * h);
        let analytic = layer.grad_weights().data()[idx];
        assert_relative_eq!(analytic, numerical, epsilon = 1e-3, max_relative = 1e-2);
    }
}

#[test]
fn test_model_backward_reverses_layer_order() {
    // Identity first layer, scale-by-2 second layer (both linear):
    // dX = dout · (W2·W1)ᵀ = 2 · dout.
    let mut model = Model::new();
    model.add(layer_with(
        2,
        2,
        ActivationKind::Linear,
        vec![1.0, 0.0, 0.0, 1.0],
        vec![0.0, 0.0],
    ));
    model.add(layer_with(
        2,
        2,
        ActivationKind::Linear,
        vec![2.0, 0.0, 0.0, 2.0],
        vec![0.0, 0.0],
    ));

    model.forward(&Tensor::from_vec(1, 2, vec![1.0, 1.0]));
    let dx = model.backward(&Tensor::from_vec(1, 2, vec![1.0, -1.0]));
    assert_eq!(dx.data(), &[2.0, -2.0]);
}

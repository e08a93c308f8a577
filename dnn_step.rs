use std::error::Error;
use std::time::Instant;

use dnn_engine::utils::{io, SimpleRng};
use dnn_engine::{ActivationKind, DenseLayer, Loss, LossKind, Model, Sgd, Tensor};

// Network layout matching the TensorFlow baseline.
const INPUT_DIM: usize = 80;
const NUM_CLASSES: usize = 10;
const LAYER_SIZES: [(usize, usize); 4] = [(80, 256), (256, 128), (128, 64), (64, 10)];
// Forward/backward latency iteration counts.
const FORWARD_ITERS: usize = 100;
const BACKWARD_ITERS: usize = 100;
// Training hyperparameters for the single correctness step.
const LEARNING_RATE: f32 = 0.01;
const MOMENTUM: f32 = 0.9;

// Load the externally trained weight/bias buffers into every layer.
fn load_all_weights(model: &mut Model) -> Result<(), Box<dyn Error>> {
    for (i, (input_size, output_size)) in LAYER_SIZES.iter().enumerate() {
        let weights = io::load_weights(
            format!("weights/dense{}_W.bin", i + 1),
            input_size * output_size,
        )?;
        let biases = io::load_weights(format!("weights/dense{}_b.bin", i + 1), *output_size)?;
        model.layer_mut(i).set_weights(weights);
        model.layer_mut(i).set_biases(biases);
    }
    Ok(())
}

fn save_updated_weights(model: &Model) -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all("updated_weights")?;
    for i in 0..LAYER_SIZES.len() {
        io::save_weights(
            format!("updated_weights/dense{}_W_updated.bin", i + 1),
            model.layer(i).weights().data(),
        )?;
        io::save_weights(
            format!("updated_weights/dense{}_b_updated.bin", i + 1),
            model.layer(i).biases(),
        )?;
    }
    Ok(())
}

fn run_one_training_step(model: &mut Model, x: &Tensor, label: usize) -> Result<f32, Box<dyn Error>> {
    Ok(model.train_step(x, &[label])?)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    println!("\n===== DNN Forward + Backward (Rust) =====");

    // 1. Load input + label.
    let x = io::load_input("data/test_input.txt", INPUT_DIM)?;
    let label = io::load_label("data/test_label.txt")?;

    // 2. Build the model. The RNG initialization is immediately replaced
    //    by the baseline weights below.
    let mut rng = SimpleRng::new(42);
    let mut model = Model::new();
    model.add(DenseLayer::new(80, 256, ActivationKind::Relu, &mut rng));
    model.add(DenseLayer::new(256, 128, ActivationKind::Relu, &mut rng));
    model.add(DenseLayer::new(128, 64, ActivationKind::Relu, &mut rng));
    model.add(DenseLayer::new(64, 10, ActivationKind::Softmax, &mut rng));
    model.compile(
        Loss::new(LossKind::SparseCategoricalCrossEntropy, NUM_CLASSES),
        Box::new(Sgd::with_momentum(LEARNING_RATE, MOMENTUM)),
    )?;

    // 3. Load baseline weights (trained externally).
    load_all_weights(&mut model)?;

    // 4. Forward warm-up.
    model.predict(&x);

    // 5. Forward latency.
    let start = Instant::now();
    let mut output = Tensor::default();
    for _ in 0..FORWARD_ITERS {
        output = model.predict(&x);
    }
    let forward_latency_ms = start.elapsed().as_secs_f64() * 1000.0 / FORWARD_ITERS as f64;

    // 6. Print forward output.
    println!("\nOutput probabilities:");
    for (class, &p) in output.data().iter().enumerate() {
        println!("Class {}: {:.3}", class, p);
    }
    println!("\nForward latency: {:.4} ms", forward_latency_ms);

    // 7. One backward + update step (correctness), then save the updated
    //    weights for comparison against the baseline trainer.
    run_one_training_step(&mut model, &x, label)?;
    save_updated_weights(&model)?;
    println!("\nUpdated weights saved (correctness)");

    // 8. Backward + update latency, measured from the baseline weights.
    load_all_weights(&mut model)?;
    run_one_training_step(&mut model, &x, label)?; // warm-up

    let start = Instant::now();
    for _ in 0..BACKWARD_ITERS {
        run_one_training_step(&mut model, &x, label)?;
    }
    let backward_latency_ms = start.elapsed().as_secs_f64() * 1000.0 / BACKWARD_ITERS as f64;

    println!("\nBackward + update latency: {:.4} ms", backward_latency_ms);
    println!("\n===== Rust Forward & Backward Complete =====");
    Ok(())
}

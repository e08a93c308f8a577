// Config parsing, validation, and building tests.

use dnn_engine::config::{
    build_layers, build_loss, build_model, build_optimizer, build_rng, load_network,
    train_from_config, validate_network, validate_training, NetworkConfig, TrainingConfig,
};
use dnn_engine::utils::SimpleRng;
use dnn_engine::{ActivationKind, LossKind, NetError, Tensor};

fn network_json() -> &'static str {
    r#"{
        "layers": [
            { "input_size": 4, "output_size": 8, "activation": "relu" },
            { "input_size": 8, "output_size": 3, "activation": "softmax" }
        ]
    }"#
}

fn training_json() -> &'static str {
    r#"{
        "loss": "sparse_categorical_cross_entropy",
        "num_classes": 3,
        "optimizer": "sgd",
        "learning_rate": 0.01,
        "momentum": 0.9,
        "epochs": 5
    }"#
}

fn parse_network(json: &str) -> NetworkConfig {
    serde_json::from_str(json).unwrap()
}

fn parse_training(json: &str) -> TrainingConfig {
    serde_json::from_str(json).unwrap()
}

#[test]
fn test_parse_network_config() {
    let config = parse_network(network_json());
    assert_eq!(config.layers.len(), 2);
    assert_eq!(config.layers[0].input_size, 4);
    assert_eq!(config.layers[0].output_size, 8);
    assert_eq!(config.layers[0].activation, "relu");
    assert!(config.layers[0].alpha.is_none());
    assert!(validate_network(&config).is_ok());
}

#[test]
fn test_parse_training_config() {
    let config = parse_training(training_json());
    assert_eq!(config.loss, "sparse_categorical_cross_entropy");
    assert_eq!(config.num_classes, Some(3));
    assert_eq!(config.optimizer, "sgd");
    assert_eq!(config.epochs, 5);
    assert!(validate_training(&config).is_ok());
}

#[test]
fn test_load_network_from_file() {
    let dir = std::env::temp_dir().join("dnn_engine_config_test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("network.json");
    std::fs::write(&path, network_json()).unwrap();

    let config = load_network(path.to_str().unwrap()).unwrap();
    assert_eq!(config.layers.len(), 2);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_load_network_missing_file() {
    assert!(load_network("/nonexistent/network.json").is_err());
}

#[test]
fn test_validate_rejects_empty_layers() {
    let config = parse_network(r#"{ "layers": [] }"#);
    assert!(matches!(
        validate_network(&config).unwrap_err(),
        NetError::InvalidConfig(_)
    ));
}

#[test]
fn test_validate_rejects_zero_sizes() {
    let config = parse_network(
        r#"{ "layers": [ { "input_size": 0, "output_size": 3, "activation": "relu" } ] }"#,
    );
    assert!(validate_network(&config).is_err());

    let config = parse_network(
        r#"{ "layers": [ { "input_size": 3, "output_size": 0, "activation": "relu" } ] }"#,
    );
    assert!(validate_network(&config).is_err());
}

#[test]
fn test_validate_rejects_unknown_activation() {
    let config = parse_network(
        r#"{ "layers": [ { "input_size": 3, "output_size": 3, "activation": "softplus" } ] }"#,
    );
    let err = validate_network(&config).unwrap_err();
    assert!(err.to_string().contains("softplus"));
}

#[test]
fn test_validate_rejects_chain_mismatch() {
    let config = parse_network(
        r#"{
            "layers": [
                { "input_size": 4, "output_size": 8, "activation": "relu" },
                { "input_size": 7, "output_size": 3, "activation": "softmax" }
            ]
        }"#,
    );
    let err = validate_network(&config).unwrap_err();
    assert!(err.to_string().contains("mismatch"));
}

#[test]
fn test_validate_training_rejects_bad_values() {
    let mut config = parse_training(training_json());
    config.loss = "hinge".to_string();
    assert!(validate_training(&config).is_err());

    let mut config = parse_training(training_json());
    config.optimizer = "adagrad".to_string();
    assert!(validate_training(&config).is_err());

    let mut config = parse_training(training_json());
    config.learning_rate = 0.0;
    assert!(validate_training(&config).is_err());

    let mut config = parse_training(training_json());
    config.momentum = Some(1.0);
    assert!(validate_training(&config).is_err());

    let mut config = parse_training(training_json());
    config.beta2 = Some(-0.1);
    assert!(validate_training(&config).is_err());

    let mut config = parse_training(training_json());
    config.epsilon = Some(0.0);
    assert!(validate_training(&config).is_err());
}

#[test]
fn test_build_layers_matches_config() {
    let config = parse_network(network_json());
    let mut rng = SimpleRng::new(42);
    let layers = build_layers(&config, &mut rng).unwrap();

    assert_eq!(layers.len(), 2);
    assert_eq!(layers[0].weights().rows(), 4);
    assert_eq!(layers[0].weights().cols(), 8);
    assert_eq!(layers[0].activation_kind(), ActivationKind::Relu);
    assert_eq!(layers[1].activation_kind(), ActivationKind::Softmax);
}

#[test]
fn test_build_loss_and_optimizer() {
    let config = parse_training(training_json());
    let loss = build_loss(&config).unwrap();
    assert_eq!(loss.kind(), LossKind::SparseCategoricalCrossEntropy);
    assert_eq!(loss.num_classes(), 3);

    let optimizer = build_optimizer(&config).unwrap();
    assert!((optimizer.learning_rate() - 0.01).abs() < 1e-9);
}

#[test]
fn test_build_rng_reproducible_with_seed() {
    let mut config = parse_training(training_json());
    config.seed = Some(42);

    let mut a = build_rng(&config);
    let mut b = build_rng(&config);
    for _ in 0..10 {
        assert_eq!(a.next_u32(), b.next_u32());
    }

    // The explicit seed must match constructing the RNG directly.
    let mut direct = SimpleRng::new(42);
    let mut c = build_rng(&config);
    assert_eq!(c.next_u32(), direct.next_u32());
}

#[test]
fn test_build_rng_without_seed_is_usable() {
    // No seed configured: the stream is time-seeded, still in range.
    let config = parse_training(training_json());
    assert!(config.seed.is_none());
    let mut rng = build_rng(&config);
    for _ in 0..100 {
        let v = rng.next_f32();
        assert!((0.0..1.0).contains(&v));
    }
}

#[test]
fn test_build_model_from_configs() {
    let network = parse_network(network_json());
    let mut training = parse_training(training_json());
    training.seed = Some(42);

    let mut model = build_model(&network, &training).unwrap();
    assert_eq!(model.num_layers(), 2);
    assert_eq!(model.parameter_count(), (4 * 8 + 8) + (8 * 3 + 3));

    // Compiled: a training step on a width-4 input must succeed.
    let x = Tensor::from_vec(1, 4, vec![0.5, -0.5, 1.0, 0.0]);
    assert!(model.train_step(&x, &[1]).unwrap().is_finite());
}

#[test]
fn test_train_from_config_runs_configured_epochs() {
    let network = parse_network(network_json());
    let mut training = parse_training(training_json());
    training.seed = Some(42);
    training.epochs = 50;

    let inputs = vec![
        Tensor::from_vec(1, 4, vec![1.0, 0.0, -1.0, 0.0]),
        Tensor::from_vec(1, 4, vec![-1.0, 0.0, 1.0, 0.0]),
        Tensor::from_vec(1, 4, vec![0.0, 1.0, 0.0, -1.0]),
    ];
    let labels = vec![0usize, 1, 2];

    // Same seed: the untrained model is the exact starting point of the
    // trained one, so training must lower the evaluation loss.
    let mut untrained = build_model(&network, &training).unwrap();
    let (loss_before, _) = untrained.evaluate(&inputs, &labels).unwrap();

    let mut trained = train_from_config(&network, &training, &inputs, &labels).unwrap();
    let (loss_after, _) = trained.evaluate(&inputs, &labels).unwrap();

    assert!(loss_after < loss_before);
}

#[test]
fn test_build_optimizer_variants() {
    let mut config = parse_training(training_json());
    config.optimizer = "rmsprop".to_string();
    assert!(build_optimizer(&config).is_ok());

    config.optimizer = "Adam".to_string();
    assert!(build_optimizer(&config).is_ok());
}

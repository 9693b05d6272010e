use std::{env, fs, num::NonZeroUsize, process};

use neural_network::{
    MlErr,
    arch::{
        Network,
        activations::ActFn,
        cost::Cost,
        layers::{Layer, LayerDesc},
    },
    dataset::Dataset,
    initialization::seeded_rng,
    optimization::{Adam, GradientDescent},
    storage::TensorList,
    tensor::{Shape, Tensor},
    training::{TrainDesc, checkpoint_path},
};

fn assert_close(got: &[f32], expected: &[f32], tol: f32) {
    assert_eq!(got.len(), expected.len());
    for (g, e) in got.iter().zip(expected) {
        assert!((g - e).abs() <= tol, "got {got:?}, expected {expected:?}");
    }
}

fn linear_network() -> Network {
    let descs = [LayerDesc::input(Shape::d1(4)), LayerDesc::dense(2)];
    let mut network = Network::new(&descs, true, &mut seeded_rng(Some(0))).unwrap();

    let mut params = TensorList::new();
    params.insert("weight_1", Tensor::new(Shape::d2(2, 4)));
    params.insert("bias_1", Tensor::new(Shape::d1(2)));
    network.load_params(&params).unwrap();
    network
}

fn deep_layout() -> Vec<LayerDesc> {
    vec![
        LayerDesc::input(Shape::d1(3)),
        LayerDesc::dense(4),
        LayerDesc::activation(ActFn::Tanh),
        LayerDesc::dense(2),
        LayerDesc::activation(ActFn::Sigmoid),
    ]
}

fn deep_dataset() -> Dataset {
    let inputs = (0..24).map(|i| ((i * 7) % 11) as f32 / 11. - 0.5).collect();
    let outputs = (0..16).map(|i| (i % 3 == 0) as u8 as f32).collect();
    Dataset::from_flat(3, inputs, 2, outputs).unwrap()
}

#[test]
fn gradient_descent_step_matches_closed_form() {
    let mut network = linear_network();
    let dataset = Dataset::from_flat(
        4,
        vec![1., 0., 0., 0., 0., 1., 0., 0.],
        2,
        vec![1., 0., 0., 1.],
    )
    .unwrap();

    let desc = TrainDesc::new(
        &dataset,
        Cost::MeanSquaredError,
        GradientDescent::new(0.1).unwrap(),
    );
    let report = network.train(&desc).unwrap();

    let params = network.save_params();
    assert_close(
        params.get("weight_1").unwrap().as_slice(),
        &[0.1, 0., -0.01, 0.1, 0., 0., 0., 0.],
        1e-6,
    );
    assert_close(params.get("bias_1").unwrap().as_slice(), &[0.09, 0.1], 1e-6);
    assert_close(&[report.final_cost().unwrap()], &[0.25125], 1e-6);
}

#[test]
fn gradients_do_not_depend_on_the_thread_count() {
    let dataset = deep_dataset();
    let mut results = Vec::new();

    for threads in [1, 3, 8] {
        let mut network = Network::new(&deep_layout(), true, &mut seeded_rng(Some(9))).unwrap();
        let mut desc = TrainDesc::new(
            &dataset,
            Cost::MeanSquaredError,
            GradientDescent::new(0.05).unwrap(),
        );
        desc.batch_size = NonZeroUsize::new(8).unwrap();
        desc.num_threads = NonZeroUsize::new(threads).unwrap();
        desc.seed = Some(1);

        network.train(&desc).unwrap();
        results.push(network.save_params());
    }

    for params in &results[1..] {
        for (name, tensor) in results[0].iter() {
            assert_close(params.get(name).unwrap().as_slice(), tensor.as_slice(), 1e-5);
        }
    }
}

#[test]
fn accumulators_are_zero_after_training() {
    let dataset = deep_dataset();
    let mut network = Network::new(&deep_layout(), true, &mut seeded_rng(Some(2))).unwrap();
    let mut desc = TrainDesc::new(
        &dataset,
        Cost::MeanSquaredError,
        Adam::with_learning_rate(0.01).unwrap(),
    );
    desc.epochs = NonZeroUsize::new(3).unwrap();
    desc.batch_size = NonZeroUsize::new(3).unwrap();
    desc.num_threads = NonZeroUsize::new(2).unwrap();

    network.train(&desc).unwrap();

    let mut dense_layers = 0;
    for layer in network.layers() {
        if let Layer::Dense(dense) = layer {
            dense_layers += 1;
            for change in dense.changes().unwrap() {
                assert!(change.change().as_slice().iter().all(|&g| g == 0.));
                // 8 samples in batches of 3 make 3 batches per epoch.
                assert_eq!(change.moments().steps(), 9);
            }
        }
    }

    assert_eq!(dense_layers, 2);
}

#[test]
fn checkpoints_restore_the_trained_network() {
    let dataset = deep_dataset();
    let prefix = env::temp_dir().join(format!("ml_checkpoint_{}_", process::id()));

    let mut network = Network::new(&deep_layout(), true, &mut seeded_rng(Some(4))).unwrap();
    let mut desc = TrainDesc::new(
        &dataset,
        Cost::MeanSquaredError,
        GradientDescent::new(0.1).unwrap(),
    );
    desc.epochs = NonZeroUsize::new(4).unwrap();
    desc.save_interval = 2;
    desc.save_path = prefix.clone();

    network.train(&desc).unwrap();

    let first = checkpoint_path(&prefix, 1);
    let last = checkpoint_path(&prefix, 2);
    assert!(first.exists());
    assert!(!checkpoint_path(&prefix, 3).exists());

    let restored = Network::load(&last, false).unwrap();
    assert_eq!(restored.layout(), network.layout());

    let (x, _) = dataset.sample(5).unwrap();
    assert_eq!(restored.feedforward(&x).unwrap(), network.feedforward(&x).unwrap());

    fs::remove_file(first).unwrap();
    fs::remove_file(last).unwrap();
}

#[test]
fn failed_checkpoints_do_not_stop_training() {
    let dataset = deep_dataset();
    let mut network = Network::new(&deep_layout(), true, &mut seeded_rng(Some(4))).unwrap();
    let mut desc = TrainDesc::new(
        &dataset,
        Cost::MeanSquaredError,
        GradientDescent::new(0.1).unwrap(),
    );
    desc.epochs = NonZeroUsize::new(2).unwrap();
    desc.save_interval = 1;
    desc.save_path = env::temp_dir().join("ml_missing_dir").join("nested").join("ckpt_");

    let report = network.train(&desc).unwrap();
    assert_eq!(report.epochs.len(), 2);
}

#[test]
fn setup_errors_abort_training() {
    let dataset = deep_dataset();

    let mut frozen = Network::new(&deep_layout(), false, &mut seeded_rng(Some(0))).unwrap();
    let desc = TrainDesc::new(
        &dataset,
        Cost::MeanSquaredError,
        GradientDescent::new(0.1).unwrap(),
    );
    assert!(matches!(frozen.train(&desc), Err(MlErr::NotTrainable)));

    let mut network = Network::new(&deep_layout(), true, &mut seeded_rng(Some(0))).unwrap();
    let before = network.save_params();

    let wrong = Dataset::from_flat(2, vec![0.; 4], 2, vec![0.; 4]).unwrap();
    let desc = TrainDesc::new(&wrong, Cost::MeanSquaredError, GradientDescent::new(0.1).unwrap());
    assert!(matches!(network.train(&desc), Err(MlErr::SizeMismatch { .. })));

    let mut desc = TrainDesc::new(
        &dataset,
        Cost::MeanSquaredError,
        GradientDescent::new(0.1).unwrap(),
    );
    desc.accuracy_test = true;
    assert!(matches!(network.train(&desc), Err(MlErr::MissingTestSet)));

    assert_eq!(network.save_params(), before);
}

#[test]
fn seeded_training_is_reproducible() {
    let dataset = deep_dataset();
    let layout = [
        deep_layout(),
        vec![LayerDesc::dropout(0.3), LayerDesc::dense(2)],
    ]
    .concat();

    let run = || {
        let mut network = Network::new(&layout, true, &mut seeded_rng(Some(5))).unwrap();
        let mut desc = TrainDesc::new(
            &dataset,
            Cost::MeanSquaredError,
            GradientDescent::new(0.1).unwrap(),
        );
        desc.epochs = NonZeroUsize::new(2).unwrap();
        desc.batch_size = NonZeroUsize::new(4).unwrap();
        desc.num_threads = NonZeroUsize::new(2).unwrap();
        desc.shuffle = true;
        desc.seed = Some(13);
        network.train(&desc).unwrap();
        network.save_params()
    };

    assert_eq!(run(), run());
}

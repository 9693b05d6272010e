#![cfg(test)]

use std::num::NonZeroUsize;

use crate::{
    arch::{Network, activations::ActFn, cost::Cost, layers::LayerDesc},
    dataset::Dataset,
    initialization::seeded_rng,
    optimization::{Adam, GradientDescent},
    tensor::Shape,
    training::TrainDesc,
};

fn xor() -> Dataset {
    Dataset::from_flat(
        2,
        vec![0., 0., 0., 1., 1., 0., 1., 1.],
        2,
        vec![1., 0., 0., 1., 0., 1., 1., 0.],
    )
    .unwrap()
}

fn layout(act_fn: ActFn) -> Vec<LayerDesc> {
    vec![
        LayerDesc::input(Shape::d1(2)),
        LayerDesc::dense(8),
        LayerDesc::activation(act_fn),
        LayerDesc::dense(2),
        LayerDesc::activation(ActFn::Softmax),
    ]
}

#[test]
fn test_ml_xor_convergence_with_adam() {
    let dataset = xor();
    let mut network = Network::new(&layout(ActFn::Tanh), true, &mut seeded_rng(Some(42))).unwrap();

    let mut desc = TrainDesc::new(
        &dataset,
        Cost::CategoricalCrossEntropy,
        Adam::with_learning_rate(0.05).unwrap(),
    );
    desc.epochs = NonZeroUsize::new(500).unwrap();
    desc.batch_size = NonZeroUsize::new(4).unwrap();
    desc.num_threads = NonZeroUsize::new(2).unwrap();
    desc.accuracy_test = true;
    desc.test = Some(&dataset);
    desc.seed = Some(7);

    let report = network.train(&desc).unwrap();

    assert_eq!(report.epochs.len(), 500);
    assert_eq!(report.final_accuracy(), Some(1.));
    assert!(report.final_cost().unwrap() < report.epochs[0].cost);
}

#[test]
fn test_ml_xor_cost_decreases_with_gradient_descent() {
    let dataset = xor();
    let mut network =
        Network::new(&layout(ActFn::Sigmoid), true, &mut seeded_rng(Some(3))).unwrap();

    let mut desc = TrainDesc::new(
        &dataset,
        Cost::MeanSquaredError,
        GradientDescent::new(0.5).unwrap(),
    );
    desc.epochs = NonZeroUsize::new(200).unwrap();
    desc.shuffle = true;
    desc.seed = Some(11);

    let report = network.train(&desc).unwrap();

    assert!(report.final_cost().unwrap() < report.epochs[0].cost);
    assert!(report.epochs.iter().all(|epoch| epoch.skipped == 0));
}

use std::num::NonZeroUsize;

use neural_network::{
    arch::{Network, cost::Cost, layers::LayerDesc},
    dataset::Dataset,
    initialization::seeded_rng,
    optimization::Adam,
    tensor::Shape,
    training::TrainDesc,
};
use rayon::ThreadPoolBuilder;

// Kept alone in its own test binary, the global pool can only be started once per process.
#[test]
fn training_stays_inside_its_own_pool() {
    let dataset = Dataset::from_flat(2, vec![0., 1., 1., 0.], 1, vec![1., 0.]).unwrap();
    let descs = [LayerDesc::input(Shape::d1(2)), LayerDesc::dense(1)];
    let mut network = Network::new(&descs, true, &mut seeded_rng(Some(0))).unwrap();

    let mut desc = TrainDesc::new(
        &dataset,
        Cost::MeanSquaredError,
        Adam::with_learning_rate(0.01).unwrap(),
    );
    desc.epochs = NonZeroUsize::new(3).unwrap();
    desc.accuracy_test = true;
    desc.test = Some(&dataset);

    network.train(&desc).unwrap();

    assert!(ThreadPoolBuilder::new().build_global().is_ok());
}

use std::{env, error::Error, num::NonZeroUsize};

use log::info;
use neural_network::{
    arch::{
        Network,
        activations::ActFn,
        cost::Cost,
        layers::LayerDesc,
    },
    config::{LayoutSpec, TrainConfig},
    dataset::Dataset,
    initialization::seeded_rng,
    optimization::{Adam, OptimizerKind},
    tensor::{Shape, Tensor},
    training::TrainDesc,
};

const EPOCHS: NonZeroUsize = NonZeroUsize::new(300).unwrap();
const BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(4).unwrap();
const NUM_THREADS: NonZeroUsize = NonZeroUsize::new(2).unwrap();

/// Trains a small network on the XOR truth table, or on the layout and configuration passed as
/// the two arguments.
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let xor = Dataset::from_flat(
        2,
        vec![0., 0., 0., 1., 1., 0., 1., 1.],
        2,
        vec![1., 0., 0., 1., 0., 1., 1., 0.],
    )?;

    let args: Vec<String> = env::args().skip(1).collect();
    let (layout, desc) = match args.as_slice() {
        [layout, config] => {
            let layout = LayoutSpec::from_file(layout)?;
            let desc = TrainConfig::from_file(config)?.into_desc(&xor, Some(&xor))?;
            (layout, desc)
        }
        _ => {
            let layout = LayoutSpec {
                layers: vec![
                    LayerDesc::input(Shape::d1(2)),
                    LayerDesc::dense(8),
                    LayerDesc::activation(ActFn::Tanh),
                    LayerDesc::dense(2),
                    LayerDesc::activation(ActFn::Softmax),
                ],
            };

            let optimizer = OptimizerKind::Adam(Adam::with_learning_rate(0.05)?);
            let mut desc = TrainDesc::new(&xor, Cost::CategoricalCrossEntropy, optimizer);
            desc.epochs = EPOCHS;
            desc.batch_size = BATCH_SIZE;
            desc.num_threads = NUM_THREADS;
            desc.accuracy_test = true;
            desc.test = Some(&xor);
            desc.seed = Some(42);
            (layout, desc)
        }
    };

    let mut network: Network = layout.build(true, &mut seeded_rng(desc.seed))?;
    println!("{network}");

    let report = network.train(&desc)?;
    info!("trained in {:?}", report.elapsed);

    for i in 0..xor.len() {
        let (x, y) = xor.sample(i)?;
        let out: Tensor = network.feedforward(&x)?;
        println!("{:?} -> {:?} (expected {:?})", x.as_slice(), out.as_slice(), y.as_slice());
    }

    if let Some(accuracy) = report.final_accuracy() {
        println!("accuracy: {accuracy}");
    }

    Ok(())
}

use std::{num::NonZeroUsize, path::PathBuf};

use crate::{arch::cost::Cost, dataset::Dataset, optimization::Optimizer};

/// Everything `Network::train` needs to know.
#[derive(Debug, Clone)]
pub struct TrainDesc<'a, O: Optimizer> {
    pub epochs: NonZeroUsize,
    pub batch_size: NonZeroUsize,
    pub num_threads: NonZeroUsize,
    pub cost: Cost,
    pub optimizer: O,
    /// Save a checkpoint every this many epochs, `0` disables checkpointing.
    pub save_interval: usize,
    /// The prefix of the checkpoint files, followed by the zero padded checkpoint number.
    pub save_path: PathBuf,
    pub train: &'a Dataset,
    /// Whether to measure the accuracy on `test` after every epoch.
    pub accuracy_test: bool,
    pub test: Option<&'a Dataset>,
    /// The seed of the training generators, `None` to draw one from the operating system.
    pub seed: Option<u64>,
    /// Whether to visit the training samples in a new random order every epoch.
    pub shuffle: bool,
}

impl<'a, O: Optimizer> TrainDesc<'a, O> {
    /// Creates a new `TrainDesc` running a single epoch of single sample batches on one thread,
    /// without checkpoints nor accuracy tests.
    ///
    /// # Arguments
    /// * `train` - The training samples.
    /// * `cost` - The cost function to minimize.
    /// * `optimizer` - The optimizer updating the parameters after every batch.
    pub fn new(train: &'a Dataset, cost: Cost, optimizer: O) -> Self {
        Self {
            epochs: NonZeroUsize::MIN,
            batch_size: NonZeroUsize::MIN,
            num_threads: NonZeroUsize::MIN,
            cost,
            optimizer,
            save_interval: 0,
            save_path: PathBuf::from("checkpoint_"),
            train,
            accuracy_test: false,
            test: None,
            seed: None,
            shuffle: false,
        }
    }
}

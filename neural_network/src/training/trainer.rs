use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use log::{debug, error, info, warn};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};

use super::{EpochReport, TrainDesc, TrainReport, accuracy};
use crate::{
    MlErr, Result,
    arch::{Gradients, Network, cost::Cost, layers::ActivationCache},
    dataset::Dataset,
    initialization::seeded_rng,
    optimization::Optimizer,
    tensor::Tensor,
};

/// What a worker hands back after going through its share of a batch.
struct WorkerOutput {
    grads: Gradients,
    cost: f32,
    trained: usize,
    skipped: usize,
}

impl Network {
    /// Trains this network.
    ///
    /// Every batch is split among `desc.num_threads` workers, each one accumulating its own
    /// gradients. Once all of them are done the gradients are added up in worker order and the
    /// optimizer is applied once.
    ///
    /// # Arguments
    /// * `desc` - The training configuration.
    ///
    /// # Returns
    /// The per epoch results, or an error if the configuration doesn't fit this network. Errors
    /// found while processing a single sample are logged and the sample is skipped.
    pub fn train<O: Optimizer>(&mut self, desc: &TrainDesc<'_, O>) -> Result<TrainReport> {
        self.check_setup(desc)?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(desc.num_threads.get())
            .build()?;

        let mut rng = seeded_rng(desc.seed);
        let mut order: Vec<usize> = (0..desc.train.len()).collect();
        let mut report = TrainReport::default();
        let start = Instant::now();

        info!(
            epochs = desc.epochs.get(),
            samples = desc.train.len(),
            threads = desc.num_threads.get();
            "starting training"
        );

        for epoch in 1..=desc.epochs.get() {
            let epoch_start = Instant::now();
            if desc.shuffle {
                order.shuffle(&mut rng);
            }

            let (mut cost, mut trained, mut skipped) = (0., 0, 0);
            for (i, batch) in order.chunks(desc.batch_size.get()).enumerate() {
                let outputs = self.run_batch(&pool, desc, batch, &mut rng);

                for output in &outputs {
                    self.accumulate(&output.grads)?;
                    cost += output.cost;
                    trained += output.trained;
                    skipped += output.skipped;
                }

                pool.install(|| self.apply_changes(&desc.optimizer))?;
                debug!(epoch = epoch, batch = i; "applied batch of {} samples", batch.len());
            }

            if desc.save_interval > 0 && epoch % desc.save_interval == 0 {
                self.checkpoint(&desc.save_path, epoch / desc.save_interval);
            }

            let accuracy = match desc.test {
                Some(test) if desc.accuracy_test => Some(self.test_accuracy(&pool, test)?),
                _ => None,
            };

            let cost = if trained > 0 { cost / trained as f32 } else { 0. };
            match accuracy {
                Some(accuracy) => {
                    info!(epoch = epoch, cost = cost, accuracy = accuracy; "finished epoch")
                }
                None => info!(epoch = epoch, cost = cost; "finished epoch"),
            }

            report.epochs.push(EpochReport {
                epoch,
                cost,
                accuracy,
                skipped,
                elapsed: epoch_start.elapsed(),
            });
        }

        report.elapsed = start.elapsed();
        Ok(report)
    }

    /// Runs every sample of a test set through the network on `pool` and measures the accuracy.
    fn test_accuracy(&self, pool: &ThreadPool, test: &Dataset) -> Result<f32> {
        let (predictions, targets): (Vec<_>, Vec<_>) = pool.install(|| {
            (0..test.len())
                .into_par_iter()
                .map(|i| -> Result<(Tensor, Tensor)> {
                    let (input, target) = test.sample(i)?;
                    Ok((self.feedforward(&input)?, target))
                })
                .collect::<Result<Vec<_>>>()
        })?
        .into_iter()
        .unzip();

        accuracy(&predictions, &targets)
    }

    /// Splits `batch` in contiguous slices and runs one worker per slice on `pool`.
    ///
    /// # Returns
    /// The output of every worker, in slice order.
    fn run_batch<O: Optimizer>(
        &self,
        pool: &ThreadPool,
        desc: &TrainDesc<'_, O>,
        batch: &[usize],
        rng: &mut StdRng,
    ) -> Vec<WorkerOutput> {
        let slice_len = batch.len().div_ceil(desc.num_threads.get());
        let slices: Vec<&[usize]> = batch.chunks(slice_len.max(1)).collect();
        let seeds: Vec<u64> = slices.iter().map(|_| rng.random()).collect();

        pool.install(|| {
            slices
                .into_par_iter()
                .zip(seeds)
                .map(|(samples, seed)| {
                    self.run_worker(desc.cost, desc.train, samples, StdRng::seed_from_u64(seed))
                })
                .collect()
        })
    }

    fn run_worker(
        &self,
        cost: Cost,
        dataset: &Dataset,
        samples: &[usize],
        rng: StdRng,
    ) -> WorkerOutput {
        let mut output = WorkerOutput {
            grads: Gradients::new(self),
            cost: 0.,
            trained: 0,
            skipped: 0,
        };

        let mut sample_grads = output.grads.clone();
        let mut cache = ActivationCache::new(rng);

        for &i in samples {
            match self.train_sample(cost, dataset, i, &mut cache, &mut sample_grads) {
                Ok(sample_cost) => match output.grads.add(&sample_grads) {
                    Ok(()) => {
                        output.cost += sample_cost;
                        output.trained += 1;
                    }
                    Err(e) => {
                        error!(sample = i; "failed to gather gradients: {e}");
                        output.skipped += 1;
                    }
                },
                Err(e) => {
                    warn!(sample = i; "skipping sample: {e}");
                    output.skipped += 1;
                }
            }

            sample_grads.zero();
            cache.clear();
        }

        output
    }

    /// Runs the forward and backward passes of the sample `i`, writing its gradients to `grads`.
    ///
    /// # Returns
    /// The cost of the sample.
    fn train_sample(
        &self,
        cost: Cost,
        dataset: &Dataset,
        i: usize,
        cache: &mut ActivationCache,
        grads: &mut Gradients,
    ) -> Result<f32> {
        let (mut x, target) = dataset.sample(i)?;
        self.feedforward_cached(&mut x, cache)?;

        let target = target.reshape(x.shape())?;
        let sample_cost = cost.evaluate(&x, &target)?;
        cost.gradient(&mut x, &target)?;
        self.backprop(&mut x, cache, grads)?;

        Ok(sample_cost)
    }

    /// Validates `desc` against this network before any work is done.
    fn check_setup<O: Optimizer>(&self, desc: &TrainDesc<'_, O>) -> Result<()> {
        if !self.training_mode() {
            return Err(MlErr::NotTrainable);
        }

        self.check_dataset("training", desc.train)?;

        if desc.accuracy_test {
            let test = desc.test.ok_or(MlErr::MissingTestSet)?;
            self.check_dataset("test", test)?;
        }

        Ok(())
    }

    fn check_dataset(&self, what: &'static str, dataset: &Dataset) -> Result<()> {
        let sizes = [
            (dataset.input_size(), self.input_shape().size()),
            (dataset.output_size(), self.output_shape().size()),
        ];

        for (got, expected) in sizes {
            if got != expected {
                return Err(MlErr::SizeMismatch {
                    what,
                    got,
                    expected,
                });
            }
        }

        Ok(())
    }

    fn checkpoint(&self, prefix: &Path, index: usize) {
        let path = checkpoint_path(prefix, index);
        match self.save(&path) {
            Ok(()) => info!("saved checkpoint {}", path.display()),
            Err(e) => error!("failed to save checkpoint {}: {e}", path.display()),
        }
    }
}

/// The path of the checkpoint number `index`, `<prefix><index:04>.safetensors`.
pub fn checkpoint_path(prefix: &Path, index: usize) -> PathBuf {
    let mut path = prefix.as_os_str().to_owned();
    path.push(format!("{index:04}.safetensors"));
    PathBuf::from(path)
}

use std::{
    fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    MlErr, Result,
    arch::cost::Cost,
    dataset::Dataset,
    optimization::{Adam, GradientDescent, OptimizerKind},
    training::TrainDesc,
};

fn one() -> NonZeroUsize {
    NonZeroUsize::MIN
}

fn beta1() -> f32 {
    0.9
}

fn beta2() -> f32 {
    0.999
}

fn epsilon() -> f32 {
    1e-7
}

fn save_path() -> PathBuf {
    PathBuf::from("checkpoint_")
}

/// The specification for the `Optimizer` trait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerSpec {
    Adam {
        learning_rate: f32,
        #[serde(default = "beta1")]
        beta1: f32,
        #[serde(default = "beta2")]
        beta2: f32,
        #[serde(default = "epsilon")]
        epsilon: f32,
    },
    GradientDescent {
        learning_rate: f32,
    },
}

impl OptimizerSpec {
    /// Builds the optimizer, validating its hyperparameters.
    pub fn build(&self) -> Result<OptimizerKind> {
        let optimizer = match *self {
            Self::Adam {
                learning_rate,
                beta1,
                beta2,
                epsilon,
            } => OptimizerKind::Adam(Adam::new(learning_rate, beta1, beta2, epsilon)?),
            Self::GradientDescent { learning_rate } => {
                OptimizerKind::GradientDescent(GradientDescent::new(learning_rate)?)
            }
        };

        Ok(optimizer)
    }
}

/// The hyperparameters of a training run, as read from a configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TrainConfig {
    pub epochs: NonZeroUsize,
    #[serde(default = "one")]
    pub batch_size: NonZeroUsize,
    #[serde(default = "one")]
    pub num_threads: NonZeroUsize,
    pub cost: Cost,
    pub optimizer: OptimizerSpec,
    #[serde(default)]
    pub save_interval: usize,
    #[serde(default = "save_path")]
    pub save_path: PathBuf,
    #[serde(default)]
    pub accuracy_test: bool,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub shuffle: bool,
}

impl TrainConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON training configuration from the file at `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Pairs this configuration with the datasets it will run on.
    ///
    /// # Arguments
    /// * `train` - The training samples.
    /// * `test` - The samples the accuracy is measured on, required if `accuracy_test` is set.
    ///
    /// # Returns
    /// The training description or an error if the optimizer is invalid or a test set is
    /// missing.
    pub fn into_desc<'a>(
        self,
        train: &'a Dataset,
        test: Option<&'a Dataset>,
    ) -> Result<TrainDesc<'a, OptimizerKind>> {
        if self.accuracy_test && test.is_none() {
            return Err(MlErr::MissingTestSet);
        }

        Ok(TrainDesc {
            epochs: self.epochs,
            batch_size: self.batch_size,
            num_threads: self.num_threads,
            cost: self.cost,
            optimizer: self.optimizer.build()?,
            save_interval: self.save_interval,
            save_path: self.save_path,
            train,
            accuracy_test: self.accuracy_test,
            test,
            seed: self.seed,
            shuffle: self.shuffle,
        })
    }
}

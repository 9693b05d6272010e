use std::time::Duration;

/// The outcome of a single training epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochReport {
    pub epoch: usize,
    /// The mean cost of the samples trained on.
    pub cost: f32,
    pub accuracy: Option<f32>,
    /// The amount of samples skipped because of an error.
    pub skipped: usize,
    pub elapsed: Duration,
}

/// The outcome of a call to `Network::train`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainReport {
    pub epochs: Vec<EpochReport>,
    pub elapsed: Duration,
}

impl TrainReport {
    pub fn final_cost(&self) -> Option<f32> {
        self.epochs.last().map(|epoch| epoch.cost)
    }

    pub fn final_accuracy(&self) -> Option<f32> {
        self.epochs.last().and_then(|epoch| epoch.accuracy)
    }
}

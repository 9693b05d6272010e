mod desc;
mod metrics;
mod report;
mod trainer;

pub use desc::TrainDesc;
pub use metrics::accuracy;
pub use report::{EpochReport, TrainReport};
pub use trainer::checkpoint_path;

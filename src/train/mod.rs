pub mod trainer;
pub mod sample;
pub mod train_stats;
pub mod train_config;
pub mod loop_fn;

pub use trainer::train_epoch;
pub use sample::Sample;
pub use train_stats::TrainStats;
pub use train_config::TrainConfig;
pub use loop_fn::train_loop;

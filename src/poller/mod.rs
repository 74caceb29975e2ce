mod executor;
mod scheduler;

pub use executor::Executor;
pub use scheduler::{RunSummary, Scheduler};

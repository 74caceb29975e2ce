#[cfg(test)]
pub mod mock;
mod query;
mod ssh;
mod types;

pub use query::{CorrelationError, DeviceQuery, QueryError};
pub use ssh::{SshBackend, SshSettings};
pub use types::{BackendError, CommandBackend, ITEM_PLACEHOLDER};

#[cfg(test)]
pub use types::{CommandSpec, Scope};

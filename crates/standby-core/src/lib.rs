pub mod config;
pub mod snapshot;
pub mod types;

pub use config::AssignorConfig;
pub use snapshot::{ClusterSnapshot, ProcessSnapshot};
pub use types::*;

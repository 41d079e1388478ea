//! Domain model (options, configuration sources, errors, lifecycle, runs).

pub mod config;
pub mod errors;
pub mod ids;
pub mod options;
pub mod return_values;
pub mod run;
pub mod state;

pub use config::{ExecutionContext, FlowRef, ProjectConfig, TaskConfig};
pub use errors::{Failure, FailureKind, TaskError};
pub use ids::RunId;
pub use options::{OptionSchema, OptionSpec, OptionValues};
pub use return_values::ReturnValues;
pub use run::RunRecord;
pub use state::TaskState;

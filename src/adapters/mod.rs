// Adapters layer: concrete implementations of the domain ports.

#[cfg(feature = "aws")]
pub mod aws;
pub mod dry_run;
pub mod log_notifier;

pub use dry_run::{DryRunActuator, MaybeDryRun};
pub use log_notifier::LogNotifier;

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{lambda::LambdaConfig, toml_config::TomlConfig};

pub use core::engine::{RunOutcome, RunSummary, SweepEngine};
pub use core::policy::SweepPolicy;
pub use utils::error::{Result, SweepError};

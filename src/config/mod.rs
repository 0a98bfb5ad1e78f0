#[cfg(feature = "cli")]
pub mod cli;
pub mod lambda;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::core::ConfigProvider;
use crate::utils::error::{Result, SweepError};
use crate::utils::validation::*;

pub const MAX_LOOKBACK_DAYS: u32 = 455; // CloudWatch 日粒度資料保留期限
pub const MAX_CONCURRENT_REGIONS: usize = 32;

/// Checks shared by every configuration source.
pub fn validate_provider<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_non_empty_string("exclude_tag_key", config.exclude_tag_key())?;
    validate_non_empty_string("exclude_tag_value", config.exclude_tag_value())?;

    if !config.cpu_threshold().is_finite() {
        return Err(SweepError::InvalidConfigValueError {
            field: "cpu_threshold".to_string(),
            value: config.cpu_threshold().to_string(),
            reason: "Value must be a finite number".to_string(),
        });
    }
    validate_range("cpu_threshold", config.cpu_threshold(), 0.0, 100.0)?;
    validate_range("lookback_days", config.lookback_days(), 1, MAX_LOOKBACK_DAYS)?;
    validate_range(
        "concurrent_regions",
        config.concurrent_regions(),
        1,
        MAX_CONCURRENT_REGIONS,
    )?;

    if config.enabled_kinds().is_empty() {
        return Err(SweepError::ConfigValidationError {
            field: "kinds".to_string(),
            message: "At least one resource kind must be enabled".to_string(),
        });
    }

    for region in config.regions() {
        validate_aws_region("regions", region)?;
    }

    if let Some(arn) = config.topic_arn() {
        validate_sns_topic_arn("topic_arn", arn)?;
    }

    if let Some(url) = config.endpoint_url() {
        validate_url("endpoint_url", url)?;
    }

    tracing::debug!("✅ Configuration validation passed");
    Ok(())
}

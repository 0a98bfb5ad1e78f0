use crate::core::policy::{
    DEFAULT_CONCURRENT_REGIONS, DEFAULT_CPU_THRESHOLD, DEFAULT_EXCLUDE_TAG_KEY,
    DEFAULT_EXCLUDE_TAG_VALUE, DEFAULT_LOOKBACK_DAYS,
};
use crate::core::{ConfigProvider, ResourceKind};
use crate::utils::error::{Result, SweepError};
use crate::utils::validation::Validate;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct LambdaConfig {
    pub topic_arn: String,
    pub exclude_tag_key: String,
    pub exclude_tag_value: String,
    pub cpu_threshold: f64,
    pub lookback_days: u32,
    pub kinds: Vec<ResourceKind>,
    pub regions: Vec<String>,
    pub require_metric_check: bool,
    pub concurrent_regions: usize,
    pub endpoint_url: Option<String>,
    pub dry_run: bool,
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            topic_arn: var("SNS_TOPIC_ARN").ok_or_else(|| SweepError::MissingConfigError {
                field: "SNS_TOPIC_ARN".to_string(),
            })?,
            exclude_tag_key: var("EXCLUDE_TAG_KEY")
                .unwrap_or_else(|| DEFAULT_EXCLUDE_TAG_KEY.to_string()),
            exclude_tag_value: var("EXCLUDE_TAG_VALUE")
                .unwrap_or_else(|| DEFAULT_EXCLUDE_TAG_VALUE.to_string()),
            cpu_threshold: parse_or("CPU_THRESHOLD", var("CPU_THRESHOLD"), DEFAULT_CPU_THRESHOLD)?,
            lookback_days: parse_or("DAYS_LOOKBACK", var("DAYS_LOOKBACK"), DEFAULT_LOOKBACK_DAYS)?,
            kinds: match var("ENABLED_KINDS") {
                Some(raw) => split_list(&raw)
                    .map(ResourceKind::from_str)
                    .collect::<Result<Vec<_>>>()?,
                None => ResourceKind::ALL.to_vec(),
            },
            regions: var("REGIONS")
                .map(|raw| split_list(&raw).map(str::to_string).collect())
                .unwrap_or_default(),
            require_metric_check: parse_or(
                "REQUIRE_METRIC_CHECK",
                var("REQUIRE_METRIC_CHECK"),
                true,
            )?,
            concurrent_regions: parse_or(
                "CONCURRENT_REGIONS",
                var("CONCURRENT_REGIONS"),
                DEFAULT_CONCURRENT_REGIONS,
            )?,
            endpoint_url: var("AWS_ENDPOINT_URL"),
            dry_run: parse_or("DRY_RUN", var("DRY_RUN"), false)?,
        })
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_or<T>(field: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| SweepError::InvalidConfigValueError {
                field: field.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}

impl ConfigProvider for LambdaConfig {
    fn exclude_tag_key(&self) -> &str {
        &self.exclude_tag_key
    }

    fn exclude_tag_value(&self) -> &str {
        &self.exclude_tag_value
    }

    fn cpu_threshold(&self) -> f64 {
        self.cpu_threshold
    }

    fn lookback_days(&self) -> u32 {
        self.lookback_days
    }

    fn enabled_kinds(&self) -> &[ResourceKind] {
        &self.kinds
    }

    fn require_metric_check(&self) -> bool {
        self.require_metric_check
    }

    fn regions(&self) -> &[String] {
        &self.regions
    }

    fn concurrent_regions(&self) -> usize {
        self.concurrent_regions
    }

    fn topic_arn(&self) -> Option<&str> {
        Some(&self.topic_arn)
    }

    fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        super::validate_provider(self)?;
        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const TOPIC: &str = "arn:aws:sns:us-east-1:123456789012:NewResourceNotification";

    fn load(pairs: &[(&str, &str)]) -> Result<LambdaConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LambdaConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_only_need_topic() {
        let config = load(&[("SNS_TOPIC_ARN", TOPIC)]).unwrap();
        assert_eq!(config.exclude_tag_key, "stop");
        assert_eq!(config.exclude_tag_value, "exclude");
        assert_eq!(config.cpu_threshold, 5.0);
        assert_eq!(config.lookback_days, 10);
        assert_eq!(config.kinds, ResourceKind::ALL.to_vec());
        assert!(config.require_metric_check);
        assert!(!config.dry_run);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_topic_is_an_error() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, SweepError::MissingConfigError { ref field } if field == "SNS_TOPIC_ARN"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SNS_TOPIC_ARN", TOPIC),
            ("CPU_THRESHOLD", "2.5"),
            ("DAYS_LOOKBACK", "14"),
            ("ENABLED_KINDS", "ec2, rds-instance"),
            ("REGIONS", "us-east-1,eu-west-1"),
            ("REQUIRE_METRIC_CHECK", "false"),
            ("DRY_RUN", "true"),
        ])
        .unwrap();
        assert_eq!(config.cpu_threshold, 2.5);
        assert_eq!(config.lookback_days, 14);
        assert_eq!(
            config.kinds,
            vec![ResourceKind::Ec2Instance, ResourceKind::RdsInstance]
        );
        assert_eq!(config.regions, vec!["us-east-1", "eu-west-1"]);
        assert!(!config.require_metric_check);
        assert!(config.dry_run);
    }

    #[test]
    fn test_malformed_numbers_are_rejected() {
        let err = load(&[("SNS_TOPIC_ARN", TOPIC), ("DAYS_LOOKBACK", "ten")]).unwrap_err();
        assert!(matches!(
            err,
            SweepError::InvalidConfigValueError { ref field, .. } if field == "DAYS_LOOKBACK"
        ));
        assert!(load(&[("SNS_TOPIC_ARN", TOPIC), ("ENABLED_KINDS", "ec2,s3")]).is_err());
    }

    #[test]
    fn test_validation_bounds() {
        let mut config = load(&[("SNS_TOPIC_ARN", TOPIC)]).unwrap();
        config.lookback_days = 0;
        assert!(config.validate().is_err());

        let mut config = load(&[("SNS_TOPIC_ARN", TOPIC)]).unwrap();
        config.kinds.clear();
        assert!(config.validate().is_err());
    }
}

use crate::core::policy::{
    DEFAULT_CONCURRENT_REGIONS, DEFAULT_CPU_THRESHOLD, DEFAULT_EXCLUDE_TAG_KEY,
    DEFAULT_EXCLUDE_TAG_VALUE, DEFAULT_LOOKBACK_DAYS,
};
use crate::core::{ConfigProvider, ResourceKind};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "idle-sweeper")]
#[command(about = "Stop idle ECS, EC2 and RDS resources across all regions")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_EXCLUDE_TAG_KEY)]
    pub exclude_tag_key: String,

    #[arg(long, default_value = DEFAULT_EXCLUDE_TAG_VALUE)]
    pub exclude_tag_value: String,

    #[arg(long, default_value_t = DEFAULT_CPU_THRESHOLD, help = "EC2 peak CPU (%) below which an instance is idle")]
    pub cpu_threshold: f64,

    #[arg(long, default_value_t = DEFAULT_LOOKBACK_DAYS)]
    pub lookback_days: u32,

    #[arg(long, value_delimiter = ',', default_values_t = ResourceKind::ALL.to_vec())]
    pub kinds: Vec<ResourceKind>,

    #[arg(long, value_delimiter = ',', help = "Only sweep these regions (default: all enabled)")]
    pub regions: Vec<String>,

    #[arg(long, help = "Decide RDS idleness by status alone, without connection metrics")]
    pub rds_status_only: bool,

    #[arg(long, default_value_t = DEFAULT_CONCURRENT_REGIONS)]
    pub concurrent_regions: usize,

    #[arg(long, help = "SNS topic for the report (default: print to stdout)")]
    pub topic_arn: Option<String>,

    #[arg(long)]
    pub endpoint_url: Option<String>,

    #[arg(long, help = "Log intended actions without stopping anything")]
    pub dry_run: bool,

    #[arg(short, long, help = "TOML config file; replaces the policy flags above")]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
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
        !self.rds_status_only
    }

    fn regions(&self) -> &[String] {
        &self.regions
    }

    fn concurrent_regions(&self) -> usize {
        self.concurrent_regions
    }

    fn topic_arn(&self) -> Option<&str> {
        self.topic_arn.as_deref()
    }

    fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        super::validate_provider(self)
    }
}

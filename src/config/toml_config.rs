use crate::core::policy::{
    DEFAULT_CONCURRENT_REGIONS, DEFAULT_CPU_THRESHOLD, DEFAULT_EXCLUDE_TAG_KEY,
    DEFAULT_EXCLUDE_TAG_VALUE, DEFAULT_LOOKBACK_DAYS,
};
use crate::core::{ConfigProvider, ResourceKind};
use crate::utils::error::{Result, SweepError};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub exclusion: ExclusionConfig,
    pub thresholds: ThresholdConfig,
    pub scope: ScopeConfig,
    pub rds: RdsConfig,
    pub notification: Option<NotificationConfig>,
    pub aws: Option<AwsConfig>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionConfig {
    pub tag_key: String,
    pub tag_value: String,
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        Self {
            tag_key: DEFAULT_EXCLUDE_TAG_KEY.to_string(),
            tag_value: DEFAULT_EXCLUDE_TAG_VALUE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub cpu_percent: f64,
    pub lookback_days: u32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            cpu_percent: DEFAULT_CPU_THRESHOLD,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    pub kinds: Vec<ResourceKind>,
    pub regions: Vec<String>,
    pub concurrent_regions: usize,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            kinds: ResourceKind::ALL.to_vec(),
            regions: Vec::new(),
            concurrent_regions: DEFAULT_CONCURRENT_REGIONS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RdsConfig {
    pub require_metric_check: bool,
}

impl Default for RdsConfig {
    fn default() -> Self {
        Self {
            require_metric_check: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub topic_arn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    pub endpoint_url: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SweepError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SweepError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SNS_TOPIC_ARN})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SweepError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl ConfigProvider for TomlConfig {
    fn exclude_tag_key(&self) -> &str {
        &self.exclusion.tag_key
    }

    fn exclude_tag_value(&self) -> &str {
        &self.exclusion.tag_value
    }

    fn cpu_threshold(&self) -> f64 {
        self.thresholds.cpu_percent
    }

    fn lookback_days(&self) -> u32 {
        self.thresholds.lookback_days
    }

    fn enabled_kinds(&self) -> &[ResourceKind] {
        &self.scope.kinds
    }

    fn require_metric_check(&self) -> bool {
        self.rds.require_metric_check
    }

    fn regions(&self) -> &[String] {
        &self.scope.regions
    }

    fn concurrent_regions(&self) -> usize {
        self.scope.concurrent_regions
    }

    fn topic_arn(&self) -> Option<&str> {
        self.notification.as_ref().map(|n| n.topic_arn.as_str())
    }

    fn endpoint_url(&self) -> Option<&str> {
        self.aws.as_ref().and_then(|a| a.endpoint_url.as_deref())
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(arn) = self.topic_arn() {
            // 未替換的 ${VAR} 代表環境變數缺失
            if arn.contains("${") {
                return Err(SweepError::MissingConfigError {
                    field: format!("notification.topic_arn ({})", arn),
                });
            }
        }
        super::validate_provider(self)
    }
}

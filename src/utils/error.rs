use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("{collaborator} unavailable: {message}")]
    CollaboratorUnavailable {
        collaborator: String,
        message: String,
    },

    #[error("{action} failed for {resource}: {message}")]
    ActuationFailed {
        action: String,
        resource: String,
        message: String,
    },

    #[error("Notification delivery failed: {message}")]
    NotificationFailed { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Collaborator,
    Actuation,
    Notification,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SweepError {
    pub fn collaborator(collaborator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CollaboratorUnavailable {
            collaborator: collaborator.into(),
            message: message.into(),
        }
    }

    pub fn actuation(
        action: impl Into<String>,
        resource: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ActuationFailed {
            action: action.into(),
            resource: resource.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::CollaboratorUnavailable { .. } => ErrorCategory::Collaborator,
            Self::ActuationFailed { .. } => ErrorCategory::Actuation,
            Self::NotificationFailed { .. } => ErrorCategory::Notification,
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Actuation => ErrorSeverity::Low,
            ErrorCategory::Collaborator | ErrorCategory::Notification => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Collaborator => {
                "Check AWS credentials, network access and that the region is enabled for the account"
            }
            ErrorCategory::Actuation => {
                "The next scheduled run will retry; check IAM permissions for stop/update calls"
            }
            ErrorCategory::Notification => {
                "Verify the SNS topic ARN and that the role may publish to it"
            }
            ErrorCategory::Configuration => {
                "Review command-line flags, environment variables or the TOML config file"
            }
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::CollaboratorUnavailable { collaborator, .. } => {
                format!("Could not reach the {} service", collaborator)
            }
            Self::ActuationFailed {
                action, resource, ..
            } => format!("Could not {} {}", action, resource),
            Self::NotificationFailed { .. } => "The report could not be delivered".to_string(),
            Self::MissingConfigError { field } => format!("Missing setting: {}", field),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting {}: {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;

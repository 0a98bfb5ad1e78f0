use super::{sdk_message, AwsClients};
use crate::domain::ports::NotificationSink;
use crate::utils::error::{Result, SweepError};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct SnsNotifier {
    client: aws_sdk_sns::Client,
    topic_arn: String,
}

impl SnsNotifier {
    /// The client is built in the topic's own region, which may differ from
    /// the regions being swept.
    pub fn new(clients: &AwsClients, topic_arn: impl Into<String>) -> Self {
        let topic_arn = topic_arn.into();
        let region = topic_region(&topic_arn)
            .map(str::to_string)
            .unwrap_or_else(|| clients.home_region());
        Self {
            client: clients.sns(&region),
            topic_arn,
        }
    }
}

/// `arn:aws:sns:<region>:<account>:<topic>` -> `<region>`
fn topic_region(arn: &str) -> Option<&str> {
    arn.split(':').nth(3).filter(|r| !r.is_empty())
}

#[async_trait]
impl NotificationSink for SnsNotifier {
    async fn publish(&self, subject: &str, body: &str) -> Result<()> {
        self.client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(subject)
            .message(body)
            .send()
            .await
            .map_err(|e| SweepError::NotificationFailed {
                message: sdk_message(&e),
            })?;
        Ok(())
    }
}

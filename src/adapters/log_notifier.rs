use crate::domain::ports::NotificationSink;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Writes the report to stdout; used by the CLI when no topic is configured.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn publish(&self, subject: &str, body: &str) -> Result<()> {
        tracing::info!("📄 {}", subject);
        println!("{}\n\n{}", subject, body);
        Ok(())
    }
}

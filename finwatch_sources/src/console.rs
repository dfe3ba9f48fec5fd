use async_trait::async_trait;
use finwatch_traits::{BoxError, Message, Notifier};

/// Writes messages to the log instead of delivering them (dry runs).
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &Message) -> Result<(), BoxError> {
        tracing::info!(title = %message.title, "[dry-run]\n{}", message.to_plain_text());
        Ok(())
    }
}

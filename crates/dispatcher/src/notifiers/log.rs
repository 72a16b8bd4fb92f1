//! LogTransport - logs mail summaries via tracing

use tracing::{info, instrument};

use contracts::NotifyError;

use super::{MailMessage, MailTransport};

/// Transport that only logs what it would have sent
pub struct LogTransport {
    name: String,
}

impl LogTransport {
    /// Create a new LogTransport with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl MailTransport for LogTransport {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_transport_deliver",
        skip(self, message),
        fields(transport = %self.name)
    )]
    async fn deliver(&self, message: &MailMessage) -> Result<(), NotifyError> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            bytes = message.body.len(),
            "Mail logged"
        );
        Ok(())
    }
}

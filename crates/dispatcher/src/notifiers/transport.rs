//! MailTransport - delivery seam for composed mail

use chrono::{DateTime, Utc};

use contracts::NotifyError;

/// A composed mail message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub date: DateTime<Utc>,
}

impl MailMessage {
    /// Render as RFC 5322 text with CRLF line endings
    pub fn to_rfc5322(&self) -> String {
        format!(
            "From: {}\r\nTo: {}\r\nSubject: {}\r\nDate: {}\r\n\r\n{}\r\n",
            self.from,
            self.to,
            self.subject,
            self.date.to_rfc2822(),
            self.body
        )
    }

    /// No CR, LF or other control characters in the header values or body
    pub fn is_single_line(&self) -> bool {
        [&self.from, &self.to, &self.subject, &self.body]
            .iter()
            .all(|value| !value.chars().any(char::is_control))
    }
}

/// Mail delivery trait
///
/// One message per call; implementations must be shareable across workers.
#[trait_variant::make(MailTransport: Send)]
pub trait LocalMailTransport {
    /// Transport name (used for logging)
    fn name(&self) -> &str;

    /// Deliver one composed message
    async fn deliver(&self, message: &MailMessage) -> Result<(), NotifyError>;
}

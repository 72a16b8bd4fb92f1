//! MailNotifier - turns a `ResultNotice` into a mail message

use chrono::Utc;
use tracing::{info, instrument};
use validator::ValidateEmail;

use contracts::{MailerSettings, Notifier, NotifyError, ResultNotice, TransportKind};

use super::{LogTransport, MailMessage, MailTransport, SpoolTransport};
use crate::error::DispatchError;

/// Notifier that mails each student their result
pub struct MailNotifier<T> {
    sender: String,
    transport: T,
}

impl<T: MailTransport> MailNotifier<T> {
    pub fn new(sender: impl Into<String>, transport: T) -> Self {
        Self {
            sender: sender.into(),
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Compose the result mail for one notice
    pub fn compose(&self, notice: &ResultNotice) -> MailMessage {
        MailMessage {
            from: self.sender.clone(),
            to: notice.student.email.clone(),
            subject: notice.subject(),
            body: notice.to_string(),
            date: Utc::now(),
        }
    }
}

impl<T: MailTransport + Sync> Notifier<ResultNotice> for MailNotifier<T> {
    fn name(&self) -> &str {
        self.transport.name()
    }

    #[instrument(
        name = "mail_notifier_send",
        skip(self, notice),
        fields(transport = self.transport.name(), student = notice.student.id)
    )]
    async fn send_one(&self, notice: &ResultNotice) -> Result<(), NotifyError> {
        if !notice.student.email.validate_email() {
            return Err(NotifyError::rejected(format!(
                "invalid address '{}'",
                notice.student.email
            )));
        }

        let message = self.compose(notice);
        if !message.is_single_line() {
            return Err(NotifyError::rejected("control characters in subject or body"));
        }
        self.transport.deliver(&message).await?;

        info!(to = %message.to, "Mail sent: {}", message.body);
        Ok(())
    }
}

/// Transport selected from configuration
pub enum ConfiguredTransport {
    Log(LogTransport),
    Spool(SpoolTransport),
}

impl MailTransport for ConfiguredTransport {
    fn name(&self) -> &str {
        match self {
            Self::Log(t) => t.name(),
            Self::Spool(t) => t.name(),
        }
    }

    async fn deliver(&self, message: &MailMessage) -> Result<(), NotifyError> {
        match self {
            Self::Log(t) => t.deliver(message).await,
            Self::Spool(t) => t.deliver(message).await,
        }
    }
}

/// Create a MailNotifier from configuration
#[instrument(
    name = "create_mail_notifier",
    skip(settings),
    fields(transport = ?settings.transport)
)]
pub fn create_mail_notifier(
    settings: &MailerSettings,
) -> Result<MailNotifier<ConfiguredTransport>, DispatchError> {
    let transport = match settings.transport {
        TransportKind::Log => ConfiguredTransport::Log(LogTransport::new("log")),
        TransportKind::Spool => {
            let dir = settings.spool_dir.as_ref().ok_or_else(|| {
                DispatchError::invalid_configuration("spool transport requires spool_dir")
            })?;
            ConfiguredTransport::Spool(SpoolTransport::new("spool", dir)?)
        }
    };
    Ok(MailNotifier::new(&settings.sender, transport))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Course, FailureReason, Student};
    use std::sync::{Arc, Mutex};

    /// Transport that remembers what it was given
    #[derive(Default)]
    struct RecordingTransport {
        delivered: Mutex<Vec<MailMessage>>,
        refuse: bool,
    }

    impl MailTransport for RecordingTransport {
        fn name(&self) -> &str {
            "recording"
        }

        async fn deliver(&self, message: &MailMessage) -> Result<(), NotifyError> {
            if self.refuse {
                return Err(NotifyError::transport("550 mailbox unavailable"));
            }
            self.delivered.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn notice(email: &str) -> ResultNotice {
        let mut course = Course::new("Databases", "Dr. Moradi");
        course.id = 1;
        ResultNotice::new(
            Student {
                id: 9,
                first_name: "Ali".to_string(),
                last_name: "Rezaei".to_string(),
                email: email.to_string(),
                score: 17,
                course_id: 1,
            },
            course,
        )
    }

    #[test]
    fn test_rfc5322_layout() {
        let notifier = MailNotifier::new("grades@uni.example", RecordingTransport::default());
        let text = notifier.compose(&notice("ali@uni.example")).to_rfc5322();

        assert!(text.starts_with(
            "From: grades@uni.example\r\nTo: ali@uni.example\r\n\
             Subject: Results from: Databases Course by Dr. Moradi\r\nDate: "
        ));
        assert!(text.ends_with("\r\n\r\nAli Rezaei scored 17 in Databases course by Dr. Moradi\r\n"));
    }

    #[tokio::test]
    async fn test_send_one_delivers() {
        let notifier = MailNotifier::new("grades@uni.example", RecordingTransport::default());
        notifier.send_one(&notice("ali@uni.example")).await.unwrap();

        let delivered = notifier.transport().delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].to, "ali@uni.example");
    }

    #[tokio::test]
    async fn test_invalid_address_rejected() {
        let notifier = MailNotifier::new("grades@uni.example", RecordingTransport::default());
        let err = notifier.send_one(&notice("")).await.unwrap_err();
        assert!(matches!(err, NotifyError::Rejected { .. }));
        assert!(notifier.transport().delivered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_becomes_outcome() {
        let notifier = Arc::new(MailNotifier::new(
            "grades@uni.example",
            RecordingTransport {
                refuse: true,
                ..Default::default()
            },
        ));

        let outcomes = crate::dispatch(vec![notice("ali@uni.example")], notifier, 1)
            .await
            .unwrap();
        assert_eq!(
            outcomes[0].reason(),
            Some(&FailureReason::Transport("550 mailbox unavailable".to_string()))
        );
    }

    #[tokio::test]
    async fn test_line_breaks_in_course_rejected() {
        let notifier = MailNotifier::new("grades@uni.example", RecordingTransport::default());
        let mut notice = notice("ali@uni.example");
        notice.course.name = "DB\r\nBcc: intruder@x.example".to_string();

        let err = notifier.send_one(&notice).await.unwrap_err();
        assert!(matches!(err, NotifyError::Rejected { .. }));
        assert!(notifier.transport().delivered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_configured_transport_delegates() {
        let transport = ConfiguredTransport::Log(LogTransport::new("log"));
        assert_eq!(transport.name(), "log");

        let notifier = MailNotifier::new("grades@uni.example", transport);
        notifier.send_one(&notice("ali@uni.example")).await.unwrap();
    }

    #[test]
    fn test_create_from_settings() {
        let notifier = create_mail_notifier(&MailerSettings::default()).unwrap();
        assert_eq!(notifier.name(), "log");

        let settings = MailerSettings {
            transport: TransportKind::Spool,
            ..Default::default()
        };
        assert!(create_mail_notifier(&settings).is_err());
    }
}

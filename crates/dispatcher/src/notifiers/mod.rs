//! Notifier implementations
//!
//! `MailNotifier` composes result mails and hands them to a `MailTransport`:
//! `LogTransport` or `SpoolTransport`.

mod log;
mod mail;
mod spool;
mod transport;

pub use self::log::LogTransport;
pub use self::mail::{create_mail_notifier, ConfiguredTransport, MailNotifier};
pub use self::spool::SpoolTransport;
pub use self::transport::{LocalMailTransport, MailMessage, MailTransport};

//! SpoolTransport - writes each mail as an .eml file

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, instrument};

use contracts::NotifyError;

use super::{MailMessage, MailTransport};

/// Transport that drops messages into a spool directory
///
/// File names are `<unix-millis>-<seq>-<recipient>.eml`, unique per transport.
pub struct SpoolTransport {
    name: String,
    dir: PathBuf,
    seq: AtomicU64,
}

impl SpoolTransport {
    /// Create a new SpoolTransport, creating `dir` if needed
    pub fn new(name: impl Into<String>, dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;

        Ok(Self {
            name: name.into(),
            dir,
            seq: AtomicU64::new(0),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_name(&self, message: &MailMessage) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let recipient: String = message
            .to
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '_' })
            .collect();
        format!(
            "{}-{:06}-{}.eml",
            message.date.timestamp_millis(),
            seq,
            recipient
        )
    }
}

impl MailTransport for SpoolTransport {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "spool_transport_deliver",
        skip(self, message),
        fields(transport = %self.name)
    )]
    async fn deliver(&self, message: &MailMessage) -> Result<(), NotifyError> {
        let path = self.dir.join(self.file_name(message));
        tokio::fs::write(&path, message.to_rfc5322())
            .await
            .map_err(|e| NotifyError::transport(format!("spool write {}: {e}", path.display())))?;

        debug!(path = %path.display(), "Mail spooled");
        Ok(())
    }
}

//! Batch manifests: a TOML list of messages to send in one go
//!
//! ```toml
//! [[messages]]
//! from = "newsletter@example.com"
//! to = ["alice@example.com"]
//! bcc = ["archive@example.com"]
//! subject = "Monthly report"
//! body = "Report attached."
//! attachments = [{ path = "report.pdf", content_type = "application/pdf" }]
//! ```
//!
//! Relative attachment paths are resolved against the manifest's directory.

use crate::error::{MailError, Result};
use crate::mime::Message;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub messages: Vec<MessageEntry>,
    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MessageEntry {
    pub from: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<AttachmentEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentEntry {
    pub path: PathBuf,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

fn default_content_type() -> String {
    "application/octet-stream".to_string()
}

impl Manifest {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| MailError::Config(format!("{}: {}", path.display(), e)))?;

        let mut manifest = Self::from_toml(&content)?;
        manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(manifest)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| MailError::Config(e.to_string()))
    }

    /// Build the messages, reading attachments from disk
    ///
    /// An unreadable attachment is logged and left out; the rest of its
    /// message is kept.
    pub fn into_messages(self) -> Vec<Message> {
        let base_dir = self.base_dir;

        self.messages
            .into_iter()
            .map(|entry| {
                let mut msg = Message::new()
                    .from(entry.from)
                    .to(entry.to)
                    .cc(entry.cc)
                    .bcc(entry.bcc)
                    .subject(entry.subject)
                    .body(entry.body);

                for attachment in entry.attachments {
                    let path = base_dir.join(&attachment.path);
                    if let Err(e) = msg.attach_file(&path, attachment.content_type) {
                        warn!("Skipping attachment: {}", e);
                    }
                }

                msg
            })
            .collect()
    }
}

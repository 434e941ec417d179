use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SMTP protocol error: {0}")]
    SmtpProtocol(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid envelope address {0:?}: a line must not contain CR or LF")]
    InvalidAddress(String),

    #[error("Recipient {recipient} rejected: {response}")]
    RecipientRejected { recipient: String, response: String },

    #[error("Cannot read attachment {}: {source}", .path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Send timed out after {0:?}")]
    Timeout(Duration),

    #[error("Send task failed: {0}")]
    TaskFailed(String),
}

pub type Result<T> = std::result::Result<T, MailError>;

/// A failed message from a batch send, tagged with its position in the batch
#[derive(Error, Debug)]
#[error("message #{index}: {error}")]
pub struct SendFailure {
    /// Index of the message in the slice handed to the batch
    pub index: usize,
    /// Error surfaced by the transport (or the task runner)
    #[source]
    pub error: MailError,
}

use crate::error::{MailError, Result};
use bytes::Bytes;
use std::path::Path;

/// A file attached to a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Name advertised in the part headers
    pub filename: String,
    /// MIME type token, e.g. `application/pdf`
    pub content_type: String,
    /// Raw (unencoded) file contents
    pub data: Bytes,
}

impl Attachment {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Attachment {
            filename: filename.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Read an attachment from disk
    ///
    /// The filename is the last segment of `path`.
    ///
    /// # Errors
    /// Returns [`MailError::Attachment`] if the file cannot be read.
    pub fn from_path<P: AsRef<Path>>(path: P, content_type: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| MailError::Attachment {
            path: path.to_path_buf(),
            source,
        })?;

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        Ok(Attachment::new(filename, content_type, data))
    }
}

/// Delivery addresses handed to the transport
///
/// Distinct from the header-visible `To`/`Cc` lines: Bcc addresses only ever
/// appear here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub from: String,
    pub recipients: Vec<String>,
}

/// An outgoing email
///
/// Nothing is validated here; an empty sender or recipient list is passed
/// through and left for the mail server to reject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub from: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    /// Plain-text body
    pub body: String,
    pub attachments: Vec<Attachment>,
}

impl Message {
    pub fn new() -> Self {
        Message::default()
    }

    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    pub fn to<I, S>(mut self, to: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.to = to.into_iter().map(Into::into).collect();
        self
    }

    pub fn cc<I, S>(mut self, cc: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cc = cc.into_iter().map(Into::into).collect();
        self
    }

    pub fn bcc<I, S>(mut self, bcc: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bcc = bcc.into_iter().map(Into::into).collect();
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn push_attachment(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    /// Read `path` and append it as an attachment
    ///
    /// On error the message is left untouched.
    pub fn attach_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        content_type: impl Into<String>,
    ) -> Result<()> {
        let attachment = Attachment::from_path(path, content_type)?;
        self.attachments.push(attachment);
        Ok(())
    }

    /// Envelope recipients in To, Cc, Bcc order
    pub fn envelope(&self) -> Envelope {
        let recipients = self
            .to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .cloned()
            .collect();

        Envelope {
            from: self.from.clone(),
            recipients,
        }
    }

    pub fn has_recipients(&self) -> bool {
        !(self.to.is_empty() && self.cc.is_empty() && self.bcc.is_empty())
    }
}

//! Rendering of [`Message`] values into `multipart/mixed` payloads
//!
//! The output is ready to be streamed after an SMTP `DATA` command: every
//! line is CRLF-terminated and attachments are base64-encoded at 76 columns.

use super::encoding::{
    encode_header_value, normalize_line_endings, quote_param, sanitize_header, wrap_base64,
};
use super::types::{Attachment, Message};
use std::fmt::Write;
use std::sync::Arc;

/// Source of multipart boundary tokens
pub trait BoundaryGenerator: Send + Sync {
    /// Produce a fresh boundary token, without the leading `--`
    fn boundary(&self) -> String;
}

/// Random boundary, regenerated on every render
///
/// The `----=_Part_` prefix contains characters that never appear in base64
/// output, and the UUID suffix makes a collision with body text negligible.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomBoundary;

impl BoundaryGenerator for RandomBoundary {
    fn boundary(&self) -> String {
        format!("----=_Part_{}", uuid::Uuid::new_v4().simple())
    }
}

/// Fixed boundary, for reproducible output in tests and fixtures
#[derive(Debug, Clone)]
pub struct FixedBoundary(pub String);

impl BoundaryGenerator for FixedBoundary {
    fn boundary(&self) -> String {
        self.0.clone()
    }
}

/// Serializes messages into MIME
///
/// # Examples
/// ```
/// use mail_dispatch::mime::{Message, MessageBuilder};
///
/// let msg = Message::new()
///     .from("a@x.com")
///     .to(["b@x.com"])
///     .subject("Hi")
///     .body("hello");
///
/// let payload = MessageBuilder::new().render(&msg);
/// assert!(payload.starts_with("From: a@x.com\r\nTo: b@x.com\r\n"));
/// ```
#[derive(Clone)]
pub struct MessageBuilder {
    boundary: Arc<dyn BoundaryGenerator>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self::with_boundary(RandomBoundary)
    }

    pub fn with_boundary<G: BoundaryGenerator + 'static>(generator: G) -> Self {
        Self {
            boundary: Arc::new(generator),
        }
    }

    /// Render `msg` into a complete payload
    ///
    /// Bcc addresses are never written to the headers.
    pub fn render(&self, msg: &Message) -> String {
        let boundary = self.boundary.boundary();
        let mut out = String::new();

        // Writing into a String cannot fail
        let _ = Self::write_payload(&mut out, msg, &boundary);
        out
    }

    fn write_payload(out: &mut String, msg: &Message, boundary: &str) -> std::fmt::Result {
        Self::write_headers(out, msg, boundary)?;

        out.push_str("\r\n");
        write!(out, "--{}\r\n", boundary)?;
        out.push_str("Content-Type: text/plain; charset=utf-8\r\n");
        out.push_str("\r\n");
        out.push_str(&normalize_line_endings(&msg.body));
        out.push_str("\r\n");

        for attachment in &msg.attachments {
            write!(out, "--{}\r\n", boundary)?;
            Self::write_attachment(out, attachment)?;
        }

        write!(out, "--{}--", boundary)
    }

    fn write_headers(out: &mut String, msg: &Message, boundary: &str) -> std::fmt::Result {
        write!(out, "From: {}\r\n", sanitize_header(&msg.from))?;
        write!(out, "To: {}\r\n", sanitize_header(&msg.to.join(",")))?;
        if !msg.cc.is_empty() {
            write!(out, "Cc: {}\r\n", sanitize_header(&msg.cc.join(",")))?;
        }
        write!(out, "Subject: {}\r\n", encode_header_value(&msg.subject))?;
        out.push_str("MIME-Version: 1.0\r\n");
        write!(out, "Content-Type: multipart/mixed; boundary=\"{}\"\r\n", boundary)
    }

    fn write_attachment(out: &mut String, attachment: &Attachment) -> std::fmt::Result {
        let filename = quote_param(&attachment.filename);
        write!(
            out,
            "Content-Type: {}; name=\"{}\"\r\n",
            sanitize_header(&attachment.content_type),
            filename
        )?;
        out.push_str("Content-Transfer-Encoding: base64\r\n");
        write!(out, "Content-Disposition: attachment; filename=\"{}\"\r\n", filename)?;
        out.push_str("\r\n");
        out.push_str(&wrap_base64(&attachment.data));
        Ok(())
    }
}

impl Default for MessageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MessageBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBuilder").finish_non_exhaustive()
    }
}

//! SMTP client for submitting outgoing emails
//!
//! This module speaks the client side of RFC 5321 to a single submission
//! server.
//!
//! # Features
//! - EHLO capability discovery
//! - AUTH PLAIN (RFC 4616) when credentials are configured
//! - Multiple envelope recipients per transaction
//! - Dot-stuffing of the DATA payload
//!
//! # Security
//! - Envelope addresses containing CR or LF are refused before connecting
//! - STARTTLS is not negotiated, so credentials are only sent to a loopback
//!   server; any other host fails with [`MailError::AuthenticationFailed`]

use crate::config::TransportConfig;
use crate::error::{MailError, Result};
use crate::mime::Envelope;
use crate::smtp::Transport;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, error, info};

/// SMTP client for sending emails through a submission server
///
/// # Examples
/// ```no_run
/// use mail_dispatch::config::TransportConfig;
/// use mail_dispatch::mime::Message;
/// use mail_dispatch::smtp::{SmtpClient, Transport};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = TransportConfig::new("localhost", 587, "user", "secret");
/// let msg = Message::new().from("sender@example.com").to(["recipient@other.com"]);
///
/// SmtpClient::new()
///     .send_mail(&config, &msg.envelope(), b"Subject: Test\r\n\r\nHello!")
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SmtpClient {
    hostname: String,
}

impl SmtpClient {
    /// Create a client announcing the local hostname in EHLO
    pub fn new() -> Self {
        Self::with_hostname(get_hostname())
    }

    /// Create a client announcing `hostname` in EHLO
    pub fn with_hostname(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
        }
    }

    async fn transact(
        &self,
        config: &TransportConfig,
        envelope: &Envelope,
        payload: &[u8],
    ) -> Result<()> {
        let addr = config.address();

        validate_line(&envelope.from)?;
        for recipient in &envelope.recipients {
            validate_line(recipient)?;
        }

        // The connection is never encrypted
        if config.has_credentials() && !is_loopback_host(&config.host) {
            return Err(MailError::AuthenticationFailed(format!(
                "refusing to send credentials over an unencrypted connection to {}",
                addr
            )));
        }

        let stream = TcpStream::connect(&addr).await?;
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        // Read greeting
        let greeting = self.read_response(&mut reader).await?;
        if !greeting.starts_with("220") {
            error!("Invalid greeting: {}", greeting.trim());
            return Err(MailError::SmtpProtocol(format!(
                "Invalid greeting: {}",
                greeting.trim()
            )));
        }

        // Send EHLO
        self.write_line(&mut writer, &format!("EHLO {}", self.hostname))
            .await?;
        let capabilities = self.expect(&mut reader, &["250"]).await?;

        // AUTH PLAIN
        if config.has_credentials() {
            if !supports_auth(&capabilities) {
                return Err(MailError::AuthenticationFailed(format!(
                    "{} does not advertise AUTH",
                    addr
                )));
            }

            let token = plain_auth_token(&config.username, &config.password);
            // Credentials must not reach the debug log
            debug!("> AUTH PLAIN <credentials>");
            writer
                .write_all(format!("AUTH PLAIN {}\r\n", token).as_bytes())
                .await?;

            let response = self.read_response(&mut reader).await?;
            if !response.starts_with("235") {
                return Err(MailError::AuthenticationFailed(response.trim().to_string()));
            }
        }

        // MAIL FROM
        self.write_line(&mut writer, &format!("MAIL FROM:<{}>", envelope.from))
            .await?;
        self.expect(&mut reader, &["250"]).await?;

        // RCPT TO, once per recipient
        for recipient in &envelope.recipients {
            self.write_line(&mut writer, &format!("RCPT TO:<{}>", recipient))
                .await?;
            let response = self.read_response(&mut reader).await?;
            if !(response.starts_with("250") || response.starts_with("251")) {
                return Err(MailError::RecipientRejected {
                    recipient: recipient.clone(),
                    response: response.trim().to_string(),
                });
            }
        }

        // DATA
        self.write_line(&mut writer, "DATA").await?;
        self.expect(&mut reader, &["354"]).await?;

        writer.write_all(&dot_stuff(payload)).await?;
        if !payload.is_empty() && !payload.ends_with(b"\r\n") {
            writer.write_all(b"\r\n").await?;
        }
        writer.write_all(b".\r\n").await?;
        self.expect(&mut reader, &["250"]).await?;

        // QUIT; the message is already accepted, so the reply does not matter
        self.write_line(&mut writer, "QUIT").await?;
        let _ = self.read_response(&mut reader).await;

        Ok(())
    }

    /// Read a full (possibly multi-line) response
    ///
    /// Every line but the last has a `-` after the status code.
    async fn read_response<R>(&self, reader: &mut BufReader<R>) -> Result<String>
    where
        R: tokio::io::AsyncRead + Unpin,
    {
        let mut full_response = String::new();

        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).await? == 0 {
                return Err(MailError::SmtpProtocol(format!(
                    "Connection closed by server: {}",
                    full_response.trim()
                )));
            }
            debug!("< {}", line.trim());

            full_response.push_str(&line);

            if line.as_bytes().get(3) != Some(&b'-') {
                break;
            }
        }

        Ok(full_response)
    }

    /// Read a response and verify it starts with one of the expected codes
    async fn expect<R>(&self, reader: &mut BufReader<R>, expected: &[&str]) -> Result<String>
    where
        R: tokio::io::AsyncRead + Unpin,
    {
        let response = self.read_response(reader).await?;

        if !expected.iter().any(|code| response.starts_with(code)) {
            error!("Unexpected response: {}", response.trim());
            return Err(MailError::SmtpProtocol(format!(
                "Expected {}, got: {}",
                expected.join(" or "),
                response.trim()
            )));
        }

        Ok(response)
    }

    /// Write a line to the stream
    async fn write_line<W>(&self, writer: &mut W, line: &str) -> Result<()>
    where
        W: tokio::io::AsyncWrite + Unpin,
    {
        debug!("> {}", line);
        writer.write_all(format!("{}\r\n", line).as_bytes()).await?;
        Ok(())
    }
}

impl Default for SmtpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for SmtpClient {
    async fn send_mail(
        &self,
        config: &TransportConfig,
        envelope: &Envelope,
        payload: &[u8],
    ) -> Result<()> {
        info!(
            "Sending mail from {} to {} recipient(s) via {}",
            envelope.from,
            envelope.recipients.len(),
            config.address()
        );

        self.transact(config, envelope, payload).await?;

        info!("Mail from {} accepted by {}", envelope.from, config.address());
        Ok(())
    }
}

/// Get local hostname
fn get_hostname() -> String {
    gethostname::gethostname().to_string_lossy().to_string()
}

/// Whether an EHLO reply lists the AUTH extension
fn supports_auth(ehlo_response: &str) -> bool {
    ehlo_response.lines().any(|line| {
        line.get(4..)
            .map(|ext| {
                let ext = ext.trim().to_ascii_uppercase();
                ext == "AUTH" || ext.starts_with("AUTH ") || ext.starts_with("AUTH=")
            })
            .unwrap_or(false)
    })
}

/// Reject values that would end an SMTP command line early
fn validate_line(address: &str) -> Result<()> {
    if address.contains(|c| c == '\r' || c == '\n') {
        error!("Rejecting envelope address with CR/LF: {:?}", address);
        return Err(MailError::InvalidAddress(address.to_string()));
    }
    Ok(())
}

/// Whether `host` names this machine (`localhost` or a loopback IP)
fn is_loopback_host(host: &str) -> bool {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    host.eq_ignore_ascii_case("localhost")
        || host
            .parse::<std::net::IpAddr>()
            .map(|ip| ip.is_loopback())
            .unwrap_or(false)
}

/// Initial response for AUTH PLAIN: base64 of `\0user\0password`
fn plain_auth_token(username: &str, password: &str) -> String {
    BASE64.encode(format!("\0{}\0{}", username, password))
}

/// Double any `.` that starts a line so it cannot end the DATA section early
fn dot_stuff(payload: &[u8]) -> Vec<u8> {
    let mut stuffed = Vec::with_capacity(payload.len() + 16);
    let mut at_line_start = true;

    for &byte in payload {
        if at_line_start && byte == b'.' {
            stuffed.push(b'.');
        }
        stuffed.push(byte);
        at_line_start = byte == b'\n';
    }

    stuffed
}

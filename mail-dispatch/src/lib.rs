//! mail-dispatch: MIME composition and concurrent SMTP delivery
//!
//! Builds flat `multipart/mixed` messages with base64 attachments and submits
//! them to a mail server, one task per message.
//!
//! # Features
//!
//! - **MIME**: CRLF framing, 76-column base64, random per-message boundaries
//! - **Privacy**: Bcc recipients only reach the SMTP envelope, never a header
//! - **Batches**: every message is attempted; failures come back tagged with
//!   their message index
//!
//! # Example
//!
//! ```no_run
//! use mail_dispatch::config::TransportConfig;
//! use mail_dispatch::mime::Message;
//! use mail_dispatch::smtp::Dispatcher;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TransportConfig::new("localhost", 587, "user", "secret");
//!     let dispatcher = Dispatcher::new(config);
//!
//!     let mut msg = Message::new()
//!         .from("me@example.com")
//!         .to(["you@example.com"])
//!         .subject("Report")
//!         .body("See attached.");
//!     msg.attach_file("report.pdf", "application/pdf")?;
//!
//!     dispatcher.send_one(&msg).await?;
//!
//!     for failure in dispatcher.send_batch(vec![msg.clone(), msg]).await {
//!         eprintln!("{}", failure);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling
//! - [`mime`]: Message model and MIME rendering
//! - [`smtp`]: SMTP transport and dispatcher
//! - [`manifest`]: Batch manifest files
//! - [`logging`]: Tracing setup

pub mod config;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod mime;
pub mod smtp;

// Re-export commonly used types
pub use config::{Config, TransportConfig};
pub use error::{MailError, Result, SendFailure};
pub use mime::{Attachment, Message, MessageBuilder};
pub use smtp::{Dispatcher, SmtpClient, Transport};

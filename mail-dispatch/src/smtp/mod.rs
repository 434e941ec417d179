//! SMTP submission and batch dispatch
//!
//! - [`transport`]: the [`Transport`] seam used by the dispatcher
//! - [`client`]: SMTP client implementing [`Transport`] (RFC 5321)
//! - [`dispatcher`]: single and concurrent batch sends

pub mod client;
pub mod dispatcher;
pub mod transport;

pub use client::SmtpClient;
pub use dispatcher::Dispatcher;
pub use transport::Transport;

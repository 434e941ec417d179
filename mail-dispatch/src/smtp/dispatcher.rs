//! Fan-out delivery of rendered messages
//!
//! # Architecture
//! ```text
//!              ┌─ task 0 ─ render ─ Transport ─┐
//! [messages] ──┼─ task 1 ─ render ─ Transport ─┼──▶ join ──▶ Vec<SendFailure>
//!              └─ task n ─ render ─ Transport ─┘
//! ```
//!
//! Every task owns its message. The transport config, the transport and the
//! renderer are shared read-only.

use crate::config::{DispatchConfig, TransportConfig};
use crate::error::{MailError, Result, SendFailure};
use crate::mime::{Message, MessageBuilder};
use crate::smtp::{SmtpClient, Transport};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Sends messages through a [`Transport`], one task per message
#[derive(Clone)]
pub struct Dispatcher {
    config: Arc<TransportConfig>,
    transport: Arc<dyn Transport>,
    builder: MessageBuilder,
    options: DispatchConfig,
}

impl Dispatcher {
    /// Dispatcher delivering over SMTP to the server in `config`
    pub fn new(config: TransportConfig) -> Self {
        Self::with_transport(config, Arc::new(SmtpClient::new()))
    }

    pub fn with_transport(config: TransportConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            builder: MessageBuilder::new(),
            options: DispatchConfig::default(),
        }
    }

    pub fn with_builder(mut self, builder: MessageBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Apply a per-send deadline and an optional concurrency cap
    pub fn with_options(mut self, options: DispatchConfig) -> Self {
        self.options = options;
        self
    }

    /// Send a single message
    ///
    /// The envelope lists To, then Cc, then Bcc recipients.
    ///
    /// # Errors
    /// Returns the transport's error unchanged, or [`MailError::Timeout`] when
    /// a deadline is configured and expires.
    pub async fn send_one(&self, msg: &Message) -> Result<()> {
        let envelope = msg.envelope();
        let payload = self.builder.render(msg);

        debug!(
            "Dispatching message from {} to {} recipient(s), {} bytes",
            envelope.from,
            envelope.recipients.len(),
            payload.len()
        );

        let send = self
            .transport
            .send_mail(&self.config, &envelope, payload.as_bytes());

        match self.options.timeout() {
            Some(deadline) => tokio::time::timeout(deadline, send)
                .await
                .map_err(|_| MailError::Timeout(deadline))?,
            None => send.await,
        }
    }

    /// Send every message concurrently and wait for all of them
    ///
    /// One failure never stops the others. The returned failures are in
    /// completion order and carry the index of the message they belong to;
    /// an empty vector means everything was accepted.
    pub async fn send_batch(&self, messages: Vec<Message>) -> Vec<SendFailure> {
        let total = messages.len();
        if total == 0 {
            return Vec::new();
        }

        let limiter = self
            .options
            .max_concurrency
            .map(|permits| Arc::new(Semaphore::new(permits.max(1))));

        let mut tasks = JoinSet::new();

        for (index, msg) in messages.into_iter().enumerate() {
            let dispatcher = self.clone();
            let limiter = limiter.clone();

            // The send runs in its own task so a panic is still tied to its index
            let send = tokio::spawn(async move {
                let _permit = match limiter {
                    Some(semaphore) => Some(
                        semaphore
                            .acquire_owned()
                            .await
                            .map_err(|e| MailError::TaskFailed(e.to_string()))?,
                    ),
                    None => None,
                };
                dispatcher.send_one(&msg).await
            });

            tasks.spawn(async move {
                let result = send
                    .await
                    .unwrap_or_else(|e| Err(MailError::TaskFailed(e.to_string())));
                (index, result)
            });
        }

        let mut failures = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Err(error))) => {
                    warn!("Message #{} failed: {}", index, error);
                    failures.push(SendFailure { index, error });
                }
                Ok((index, Ok(()))) => debug!("Message #{} accepted", index),
                Err(e) => error!("Batch waiter failed: {}", e),
            }
        }

        info!(
            "Batch complete: {} sent, {} failed",
            total - failures.len(),
            failures.len()
        );

        failures
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

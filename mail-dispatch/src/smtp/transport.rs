use crate::config::TransportConfig;
use crate::error::Result;
use crate::mime::Envelope;
use async_trait::async_trait;

/// Something that can hand a rendered message to a mail server
///
/// Implementations own the wire protocol: connection, authentication with the
/// credentials in `config`, envelope and payload transfer. Errors are returned
/// as-is to the caller of the dispatcher.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver `payload` from `envelope.from` to every `envelope.recipients`
    async fn send_mail(
        &self,
        config: &TransportConfig,
        envelope: &Envelope,
        payload: &[u8],
    ) -> Result<()>;
}

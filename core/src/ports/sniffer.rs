//! Sniffer port (interface).

use tokio::io::AsyncWrite;

use crate::error::Result;

/// Port for a remote capture session.
///
/// Callers invoke `setup`, `start` and `cleanup` once each, in that order.
pub trait Sniffer: Send + Sync {
    /// Prepare the pod for capturing.
    fn setup(&self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Run the capture, streaming raw pcap bytes into `stdout`.
    ///
    /// Requires a successful `setup`. Bytes already written stay written when
    /// an error is returned, so the output must be treated as truncated.
    fn start<W>(&self, stdout: &mut W) -> impl std::future::Future<Output = Result<()>> + Send
    where
        W: AsyncWrite + Unpin + Send;

    /// Release session resources. Never fails.
    fn cleanup(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}

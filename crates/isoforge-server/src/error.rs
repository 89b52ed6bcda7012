//! Server error types.

use thiserror::Error;

/// Errors that can occur in the send and connection paths.
///
/// Bind failures surface as a [`crate::ListenState::Error`] transition
/// instead; per-connection I/O failures tear down only that connection and
/// never terminate the listener. Nothing here is fatal to the hosting
/// process.
#[derive(Error, Debug)]
pub enum ServerError {
    /// I/O failure on an individual client channel.
    #[error("connection I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// Outbound text could not be encoded (bad hex digits).
    #[error("failed to encode outbound data: {0}")]
    Encode(#[from] isoforge_codec::CodecError),

    /// A send was requested for a remote address with no known client.
    #[error("no client for remote address {addr}")]
    UnknownClient {
        /// The unknown remote address
        addr: std::net::SocketAddr,
    },
}

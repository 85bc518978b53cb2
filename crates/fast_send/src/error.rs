//! Error types for the fast-path send.
//!
//! The original tri-state `(written, error, handled)` contract is resolved
//! into `Result<SendOutcome, SendError>` plus [`SendError::allows_fallback`]:
//! a seek-query or kernel-primitive failure still permits the caller to retry
//! through the generic copy loop, while a repositioning failure after bytes
//! reached the socket is terminal.

use std::io;

use thiserror::Error;

/// Failure modes of the fast-path send.
#[derive(Debug, Error)]
pub enum SendError {
    /// Querying the plain file's position or length failed before any
    /// transfer was attempted.
    #[error("seek: {0}")]
    Seek(#[source] io::Error),

    /// The kernel transfer primitive failed; no source bookkeeping was
    /// touched.
    #[error("transmitfile: {0}")]
    Transmit(#[source] io::Error),

    /// Bytes reached the socket but repositioning the source afterwards
    /// failed, so its bookkeeping may be stale.
    #[error("failed to reposition source after sending {sent} bytes: {source}")]
    Reposition {
        /// Bytes that were genuinely transferred before the failure.
        sent: u64,
        /// The repositioning error.
        #[source]
        source: io::Error,
    },
}

impl SendError {
    /// Whether the caller may retry through the generic copy loop.
    ///
    /// Retrying is safe only when no bytes moved: once data reached the
    /// socket a replay through the slow path would duplicate it.
    pub fn allows_fallback(&self) -> bool {
        matches!(self, Self::Seek(_) | Self::Transmit(_))
    }

    /// Bytes that reached the socket before the failure.
    pub fn bytes_sent(&self) -> u64 {
        match self {
            Self::Seek(_) | Self::Transmit(_) => 0,
            Self::Reposition { sent, .. } => *sent,
        }
    }

    /// Converts into an [`io::Error`] preserving the underlying kind.
    pub fn into_io(self) -> io::Error {
        let kind = match &self {
            Self::Seek(e) | Self::Transmit(e) => e.kind(),
            Self::Reposition { source, .. } => source.kind(),
        };
        io::Error::new(kind, self)
    }
}

//! Destination descriptor handed to the send path by the networking layer.

use std::io;
use std::net::TcpStream;

use crate::lock::{WriteGuard, WriteLock};

/// Discriminates regular duplex sockets from pipe-like endpoints.
///
/// The kernel transfer primitive only works against real sockets; pipe-like
/// transports surfaced through the same connection abstraction are rejected
/// before any syscall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestKind {
    /// A regular stream socket.
    Socket,
    /// A unidirectional pipe-like endpoint.
    Pipe,
}

/// A destination connection: the stream, its kind, and its write lock.
#[derive(Debug)]
pub struct NetDest {
    stream: TcpStream,
    kind: DestKind,
    write_lock: WriteLock,
}

impl NetDest {
    /// Wraps a connected socket.
    pub fn new(stream: TcpStream) -> Self {
        Self::with_kind(stream, DestKind::Socket)
    }

    /// Wraps a stream of an explicit kind, for transports that surface
    /// pipe-like endpoints through the socket abstraction.
    pub fn with_kind(stream: TcpStream, kind: DestKind) -> Self {
        Self {
            stream,
            kind,
            write_lock: WriteLock::new(),
        }
    }

    /// The descriptor kind.
    pub fn kind(&self) -> DestKind {
        self.kind
    }

    /// The underlying stream.
    pub fn stream(&self) -> &TcpStream {
        &self.stream
    }

    /// Unwraps the destination back into its stream.
    pub fn into_stream(self) -> TcpStream {
        self.stream
    }

    /// The destination's write-side lock.
    pub fn write_lock(&self) -> &WriteLock {
        &self.write_lock
    }

    /// Acquires the write side for one transfer.
    pub(crate) fn lock_write(&self) -> io::Result<WriteGuard<'_>> {
        self.write_lock.lock()
    }
}

//! Fast-path-or-fallback entry point.

use std::io;

use tracing::{debug, trace};

use crate::config::SendConfig;
use crate::dest::NetDest;
use crate::fallback::copy_via_readwrite;
use crate::sendfile::{SendOutcome, send_file};
use crate::source::SendSource;

/// Sends bytes from `source` to `dest`, preferring the kernel fast path and
/// falling back to the buffered copy loop whenever the fast path declines or
/// fails without having moved any bytes.
///
/// A single call makes at most one fast-path transfer; because the source's
/// bookkeeping reflects exactly the bytes consumed, callers may invoke this
/// again to continue after a partial transfer. When the fallback loop runs it
/// copies until source EOF. Net behavior is indistinguishable from the
/// generic copy loop alone, except faster.
///
/// # Errors
///
/// A fast-path failure that permits fallback is only surfaced if the generic
/// loop then fails as well, in which case the fast-path error is the
/// diagnostic returned. Terminal fast-path errors and fallback I/O errors
/// propagate directly.
pub fn send(dest: &NetDest, source: &mut SendSource, config: &SendConfig) -> io::Result<u64> {
    match send_file(dest, source) {
        Ok(SendOutcome::Sent(n)) => {
            trace!(bytes = n, "fast path transfer complete");
            Ok(n)
        }
        Ok(SendOutcome::NotApplicable) => {
            trace!("source is not file backed, using generic copy");
            copy_via_readwrite(dest, source, config.fallback_buffer_size())
        }
        Err(err) if err.allows_fallback() => {
            debug!(error = %err, "fast path failed before moving bytes, retrying via generic copy");
            match copy_via_readwrite(dest, source, config.fallback_buffer_size()) {
                Ok(n) => Ok(n),
                // The generic path failed too; the fast-path error is the
                // more useful diagnostic.
                Err(_) => Err(err.into_io()),
            }
        }
        Err(err) => Err(err.into_io()),
    }
}

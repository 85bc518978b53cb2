//! Eligibility check and adaptation onto the kernel transfer primitive.
//!
//! Given a destination and an arbitrary [`SendSource`], this layer decides
//! whether the source resolves to an open file, computes the absolute start
//! offset and byte count, delegates to [`transmit`], and updates the source's
//! bookkeeping so a caller can resume after a partial transfer.

use std::fs::File;
use std::io::{Seek, SeekFrom};

use crate::dest::NetDest;
use crate::error::SendError;
use crate::source::{Region, SendSource};
use crate::transmit::{MAX_TRANSMIT_BYTES, transmit};

/// What the fast path did with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Bytes went to the socket through the kernel primitive. A zero count
    /// means the request was trivially satisfied without a syscall.
    Sent(u64),
    /// The source does not resolve to a file; the caller must use the
    /// generic copy loop. No I/O was performed.
    NotApplicable,
}

/// Attempts to send the remainder of `source` to `dest` through the kernel
/// fast path.
///
/// A capped source is unwrapped one layer: its budget becomes the transfer
/// count and is decremented by the bytes actually sent. A region contributes
/// its window as both the start offset and the count clamp, and its relative
/// cursor advances by the bytes sent. A plain file transfers from its current
/// seek position, which is moved past the sent bytes afterwards.
///
/// Ranges larger than [`MAX_TRANSMIT_BYTES`] report
/// [`SendOutcome::NotApplicable`] so the caller copies them generically.
///
/// # Errors
///
/// See [`SendError`]; [`SendError::allows_fallback`] tells the caller whether
/// retrying through the generic loop is safe.
pub fn send_file(dest: &NetDest, source: &mut SendSource) -> Result<SendOutcome, SendError> {
    // Zero means "until end of file".
    let mut n: u64 = 0;

    let (budget, inner) = match source {
        SendSource::Capped(capped) => {
            if capped.remaining() == 0 {
                // An exhausted budget is trivially satisfied without a syscall.
                return Ok(SendOutcome::Sent(0));
            }
            n = capped.remaining();
            let (remaining, inner) = capped.parts_mut();
            (Some(remaining), inner)
        }
        other => (None, other),
    };

    match inner {
        SendSource::Region(region) => send_region(dest, region, n, budget),
        SendSource::File(file) => send_plain(dest, file, n, budget),
        // Generic readers and nested caps cannot resolve to a file handle.
        SendSource::Capped(_) | SendSource::Reader(_) => Ok(SendOutcome::NotApplicable),
    }
}

fn send_region(
    dest: &NetDest,
    region: &mut Region,
    mut n: u64,
    budget: Option<&mut u64>,
) -> Result<SendOutcome, SendError> {
    let Some(file) = region.backing_file() else {
        return Ok(SendOutcome::NotApplicable);
    };

    let window = region.remaining();
    if window == 0 {
        // Must not reach the primitive: a zero count there means "the rest
        // of the file", which would leak bytes from outside the window.
        return Ok(SendOutcome::Sent(0));
    }
    if n == 0 || n > window {
        n = window;
    }
    if n > MAX_TRANSMIT_BYTES {
        return Ok(SendOutcome::NotApplicable);
    }

    let pos = region.base() + region.cursor();
    let done = transmit(dest, file, pos, n).map_err(SendError::Transmit)?;

    region.advance(done);
    if let Some(budget) = budget {
        *budget = budget.saturating_sub(done);
    }
    Ok(SendOutcome::Sent(done))
}

fn send_plain(
    dest: &NetDest,
    file: &mut File,
    n: u64,
    budget: Option<&mut u64>,
) -> Result<SendOutcome, SendError> {
    let pos = file.stream_position().map_err(SendError::Seek)?;

    let effective = if n == 0 {
        let len = file.metadata().map_err(SendError::Seek)?.len();
        len.saturating_sub(pos)
    } else {
        n
    };
    if effective > MAX_TRANSMIT_BYTES {
        return Ok(SendOutcome::NotApplicable);
    }

    let done = transmit(dest, file, pos, n).map_err(SendError::Transmit)?;

    if let Some(budget) = budget {
        *budget = budget.saturating_sub(done);
    }
    file.seek(SeekFrom::Start(pos + done))
        .map_err(|source| SendError::Reposition { sent: done, source })?;
    Ok(SendOutcome::Sent(done))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dest::DestKind;
    use std::io::{self, Write};
    use std::net::{TcpListener, TcpStream};
    use tempfile::NamedTempFile;

    fn loopback_dest(kind: DestKind) -> (NetDest, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let sender = TcpStream::connect(addr).unwrap();
        let (receiver, _) = listener.accept().unwrap();
        (NetDest::with_kind(sender, kind), receiver)
    }

    fn file_with(content: &[u8]) -> File {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(content).unwrap();
        tmp.flush().unwrap();
        tmp.reopen().unwrap()
    }

    #[test]
    fn exhausted_cap_is_satisfied_without_a_syscall() {
        let (dest, _receiver) = loopback_dest(DestKind::Socket);
        let mut source = SendSource::capped(file_with(b"unused").into(), 0);

        let outcome = send_file(&dest, &mut source).unwrap();

        assert_eq!(outcome, SendOutcome::Sent(0));
    }

    #[test]
    fn generic_reader_is_not_applicable() {
        let (dest, _receiver) = loopback_dest(DestKind::Socket);
        let mut source = SendSource::reader(io::Cursor::new(b"in memory".to_vec()));

        let outcome = send_file(&dest, &mut source).unwrap();

        assert_eq!(outcome, SendOutcome::NotApplicable);
    }

    #[test]
    fn buffer_backed_region_is_not_applicable() {
        let (dest, _receiver) = loopback_dest(DestKind::Socket);
        let mut source = SendSource::Region(Region::new(b"in memory".to_vec(), 2, 5));

        let outcome = send_file(&dest, &mut source).unwrap();

        assert_eq!(outcome, SendOutcome::NotApplicable);
        let SendSource::Region(region) = &source else {
            panic!("shape changed");
        };
        assert_eq!(region.cursor(), 0);
    }

    #[test]
    fn nested_cap_is_not_applicable() {
        let (dest, _receiver) = loopback_dest(DestKind::Socket);
        let inner = SendSource::capped(file_with(b"data").into(), 2);
        let mut source = SendSource::capped(inner, 4);

        let outcome = send_file(&dest, &mut source).unwrap();

        assert_eq!(outcome, SendOutcome::NotApplicable);
    }

    #[test]
    fn oversized_region_falls_back_to_the_generic_path() {
        let (dest, _receiver) = loopback_dest(DestKind::Socket);
        // The window size is declarative, so an over-2GiB range can be
        // expressed without materializing that much data.
        let region = Region::new(file_with(b"tiny"), 0, MAX_TRANSMIT_BYTES + 1);
        let mut source = SendSource::Region(region);

        let outcome = send_file(&dest, &mut source).unwrap();

        assert_eq!(outcome, SendOutcome::NotApplicable);
    }

    #[test]
    fn pipe_destination_surfaces_a_fallback_compatible_error() {
        let (dest, _receiver) = loopback_dest(DestKind::Pipe);
        let mut source = SendSource::File(file_with(b"data"));

        let err = send_file(&dest, &mut source).unwrap_err();

        assert!(matches!(err, SendError::Transmit(_)));
        assert!(err.allows_fallback());
        assert!(dest.write_lock().try_lock().is_some());
    }

    #[cfg(not(windows))]
    #[test]
    fn plain_file_reports_transmit_error_off_windows() {
        let (dest, _receiver) = loopback_dest(DestKind::Socket);
        let mut source = SendSource::File(file_with(b"data"));

        let err = send_file(&dest, &mut source).unwrap_err();

        assert!(matches!(err, SendError::Transmit(_)));
        assert!(err.allows_fallback());
        assert_eq!(err.bytes_sent(), 0);
    }

    #[cfg(windows)]
    mod windows {
        use super::*;
        use std::io::Read;

        #[test]
        fn plain_file_sends_everything_and_leaves_cursor_at_end() {
            let (dest, mut receiver) = loopback_dest(DestKind::Socket);
            let content = b"plain file fast path".to_vec();
            let mut source = SendSource::File(file_with(&content));

            let outcome = send_file(&dest, &mut source).unwrap();
            drop(dest);

            assert_eq!(outcome, SendOutcome::Sent(content.len() as u64));
            let SendSource::File(file) = &mut source else {
                panic!("shape changed");
            };
            assert_eq!(file.stream_position().unwrap(), content.len() as u64);

            let mut received = Vec::new();
            receiver.read_to_end(&mut received).unwrap();
            assert_eq!(received, content);
        }

        #[test]
        fn region_sends_its_window_from_the_absolute_offset() {
            // 5000-byte file, window [1000, 4000): expect one transfer of
            // 3000 bytes starting at absolute offset 1000.
            let content: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
            let (dest, mut receiver) = loopback_dest(DestKind::Socket);
            let mut source = SendSource::Region(Region::new(file_with(&content), 1000, 3000));

            let outcome = send_file(&dest, &mut source).unwrap();
            drop(dest);

            assert_eq!(outcome, SendOutcome::Sent(3000));
            let SendSource::Region(region) = &source else {
                panic!("shape changed");
            };
            assert_eq!(region.cursor(), 3000);

            let mut received = Vec::new();
            receiver.read_to_end(&mut received).unwrap();
            assert_eq!(received, &content[1000..4000]);
        }

        #[test]
        fn cap_clamps_the_transfer_and_shrinks_by_the_bytes_sent() {
            let (dest, mut receiver) = loopback_dest(DestKind::Socket);
            let mut source = SendSource::capped(file_with(b"0123456789").into(), 6);

            let outcome = send_file(&dest, &mut source).unwrap();
            drop(dest);

            assert_eq!(outcome, SendOutcome::Sent(6));
            let SendSource::Capped(capped) = &source else {
                panic!("shape changed");
            };
            assert_eq!(capped.remaining(), 0);

            let mut received = Vec::new();
            receiver.read_to_end(&mut received).unwrap();
            assert_eq!(received, b"012345");
        }
    }
}

//! Buffered read/write copy loop, the slow path behind the kernel fast path.
//!
//! The loop consumes the source through its [`Read`] impl, so window and
//! budget bookkeeping stay exactly as they would under the fast path, and it
//! holds the destination's write lock so fast-path and fallback writes never
//! interleave on one descriptor.

use std::io::{self, Read, Write};

use crate::dest::NetDest;
use crate::source::SendSource;

/// Copies the remainder of `source` to the destination stream through a
/// userspace buffer of `buffer_size` bytes.
///
/// Returns the number of bytes copied; stops at source EOF, an exhausted
/// window, or an exhausted budget.
///
/// # Errors
///
/// Returns an error if reading the source or writing the stream fails, or if
/// the destination's write lock is poisoned.
pub fn copy_via_readwrite(
    dest: &NetDest,
    source: &mut SendSource,
    buffer_size: usize,
) -> io::Result<u64> {
    let _guard = dest.write_lock().lock()?;

    let mut stream = dest.stream();
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut total = 0u64;
    loop {
        let n = source.read(&mut buf)?;
        if n == 0 {
            break;
        }
        stream.write_all(&buf[..n])?;
        total += n as u64;
    }
    stream.flush()?;

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Region;
    use std::io::{Seek, SeekFrom, Write as IoWrite};
    use std::net::{TcpListener, TcpStream};
    use std::thread;
    use tempfile::NamedTempFile;

    fn loopback_dest() -> (NetDest, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let sender = TcpStream::connect(addr).unwrap();
        let (receiver, _) = listener.accept().unwrap();
        (NetDest::new(sender), receiver)
    }

    fn file_with(content: &[u8]) -> std::fs::File {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(content).unwrap();
        tmp.flush().unwrap();
        tmp.reopen().unwrap()
    }

    #[test]
    fn copies_a_plain_file_from_its_current_position() {
        let (dest, mut receiver) = loopback_dest();
        let mut file = file_with(b"0123456789");
        file.seek(SeekFrom::Start(4)).unwrap();
        let mut source = SendSource::File(file);

        let reader = thread::spawn(move || {
            let mut received = Vec::new();
            std::io::Read::read_to_end(&mut receiver, &mut received).unwrap();
            received
        });

        let copied = copy_via_readwrite(&dest, &mut source, 3).unwrap();
        drop(dest);

        assert_eq!(copied, 6);
        assert_eq!(reader.join().unwrap(), b"456789");
    }

    #[test]
    fn respects_window_and_budget() {
        let (dest, mut receiver) = loopback_dest();
        let content: Vec<u8> = (0..1000u32).map(|i| (i % 256) as u8).collect();
        let region = Region::new(file_with(&content), 100, 500);
        let mut source = SendSource::capped(region.into(), 200);

        let reader = thread::spawn(move || {
            let mut received = Vec::new();
            std::io::Read::read_to_end(&mut receiver, &mut received).unwrap();
            received
        });

        let copied = copy_via_readwrite(&dest, &mut source, 64).unwrap();
        drop(dest);

        assert_eq!(copied, 200);
        assert_eq!(reader.join().unwrap(), &content[100..300]);
        let SendSource::Capped(capped) = &source else {
            panic!("shape changed");
        };
        assert_eq!(capped.remaining(), 0);
    }
}

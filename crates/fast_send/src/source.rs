//! Byte-source shapes the send path understands.
//!
//! A [`SendSource`] is one of a closed set of shapes: a plain open file, a
//! bounded [`Region`] over a file or an in-memory buffer, a budget-limited
//! [`Capped`] wrapper around another source, or an arbitrary reader. The
//! shapes compose: a capped stream may wrap a region which is itself backed
//! by a file.
//!
//! Every shape implements [`Read`], so the buffered fallback loop and the
//! kernel fast path share the same position and budget bookkeeping: a region
//! read clamps to the window and advances the relative cursor, a capped read
//! clamps to the remaining budget and decrements it. After either path has
//! consumed `done` bytes, the source can resume exactly where it left off.

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};

/// A readable byte source destined for a socket.
pub enum SendSource {
    /// A plain open file; its OS seek cursor is the current position.
    File(File),
    /// A bounded view over a backing store; see [`Region`].
    Region(Region),
    /// A budget-limited wrapper around another source; see [`Capped`].
    Capped(Capped),
    /// An arbitrary reader with no file underneath. Never fast-pathed.
    Reader(Box<dyn Read + Send>),
}

impl SendSource {
    /// Wraps `inner` in a cap of `limit` bytes.
    pub fn capped(inner: SendSource, limit: u64) -> Self {
        Self::Capped(Capped::new(inner, limit))
    }

    /// Wraps an arbitrary reader. Such a source always takes the generic path.
    pub fn reader<R: Read + Send + 'static>(reader: R) -> Self {
        Self::Reader(Box::new(reader))
    }
}

impl From<File> for SendSource {
    fn from(file: File) -> Self {
        Self::File(file)
    }
}

impl From<Region> for SendSource {
    fn from(region: Region) -> Self {
        Self::Region(region)
    }
}

impl Read for SendSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::File(file) => file.read(buf),
            Self::Region(region) => region.read(buf),
            Self::Capped(capped) => capped.read(buf),
            Self::Reader(reader) => reader.read(buf),
        }
    }
}

impl fmt::Debug for SendSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(file) => f.debug_tuple("File").field(file).finish(),
            Self::Region(region) => f.debug_tuple("Region").field(region).finish(),
            Self::Capped(capped) => f.debug_tuple("Capped").field(capped).finish(),
            Self::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

/// What a [`Region`] reads from.
#[derive(Debug)]
pub enum RegionBacking {
    /// An open file; region reads seek the file to `base + cursor` first.
    File(File),
    /// An in-memory buffer. Regions over buffers are never fast-pathed.
    Buffer(Cursor<Vec<u8>>),
}

impl Read for RegionBacking {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::File(file) => file.read(buf),
            Self::Buffer(cursor) => cursor.read(buf),
        }
    }
}

impl Seek for RegionBacking {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Self::File(file) => file.seek(pos),
            Self::Buffer(cursor) => cursor.seek(pos),
        }
    }
}

impl From<File> for RegionBacking {
    fn from(file: File) -> Self {
        Self::File(file)
    }
}

impl From<Vec<u8>> for RegionBacking {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Buffer(Cursor::new(bytes))
    }
}

/// A bounded view over a backing store.
///
/// Visible bytes are `[base, base + size)` of the backing; `cursor` is the
/// view's own relative position and starts at zero. The backing's seek
/// position is repositioned on every read, so the view never depends on it
/// between calls.
#[derive(Debug)]
pub struct Region {
    backing: RegionBacking,
    base: u64,
    size: u64,
    cursor: u64,
}

impl Region {
    /// Creates a view of `size` bytes starting at absolute offset `base`.
    pub fn new(backing: impl Into<RegionBacking>, base: u64, size: u64) -> Self {
        Self {
            backing: backing.into(),
            base,
            size,
            cursor: 0,
        }
    }

    /// Absolute offset of the first visible byte.
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Total size of the window.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Current relative position within the window.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Bytes left in the window from the current cursor.
    pub fn remaining(&self) -> u64 {
        self.size.saturating_sub(self.cursor)
    }

    /// The backing file, if the view is file backed.
    pub fn backing_file(&self) -> Option<&File> {
        match &self.backing {
            RegionBacking::File(file) => Some(file),
            RegionBacking::Buffer(_) => None,
        }
    }

    /// Moves the cursor forward by `n` consumed bytes, clamped to the window.
    pub(crate) fn advance(&mut self, n: u64) {
        self.cursor = self.cursor.saturating_add(n).min(self.size);
    }
}

impl Read for Region {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.remaining();
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let want = buf.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
        self.backing.seek(SeekFrom::Start(self.base + self.cursor))?;
        let n = self.backing.read(&mut buf[..want])?;
        self.cursor += n as u64;
        Ok(n)
    }
}

impl Seek for Region {
    /// Seeks the view's relative cursor; `SeekFrom::End` is relative to the
    /// end of the window, not the backing store.
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(delta) => i128::from(self.cursor) + i128::from(delta),
            SeekFrom::End(delta) => i128::from(self.size) + i128::from(delta),
        };
        let target = u64::try_from(target).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek before start of region")
        })?;
        self.cursor = target;
        Ok(self.cursor)
    }
}

/// A wrapper limiting total bytes consumable from an inner source.
///
/// The budget shrinks as bytes are consumed, whether through the kernel fast
/// path or the buffered fallback, and is independent of the inner source's
/// own position.
#[derive(Debug)]
pub struct Capped {
    remaining: u64,
    inner: Box<SendSource>,
}

impl Capped {
    /// Caps `inner` at `limit` bytes.
    pub fn new(inner: SendSource, limit: u64) -> Self {
        Self {
            remaining: limit,
            inner: Box::new(inner),
        }
    }

    /// Bytes left in the budget.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// The wrapped source.
    pub fn inner(&self) -> &SendSource {
        &self.inner
    }

    /// Splits the wrapper into its budget and inner source for independent
    /// mutation.
    pub(crate) fn parts_mut(&mut self) -> (&mut u64, &mut SendSource) {
        (&mut self.remaining, &mut self.inner)
    }
}

impl Read for Capped {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let want = buf.len().min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
        let n = self.inner.read(&mut buf[..want])?;
        self.remaining -= n as u64;
        Ok(n)
    }
}

//! Tunables for the send path.

/// Default buffer size for the fallback copy loop (256 KiB).
const DEFAULT_FALLBACK_BUFFER_SIZE: usize = 256 * 1024;

/// Configuration for [`send`](crate::send).
#[derive(Debug, Clone)]
pub struct SendConfig {
    /// Userspace buffer size used when the generic copy loop runs.
    fallback_buffer_size: usize,
}

impl Default for SendConfig {
    fn default() -> Self {
        Self {
            fallback_buffer_size: DEFAULT_FALLBACK_BUFFER_SIZE,
        }
    }
}

impl SendConfig {
    /// Sets the fallback copy buffer size (clamped to at least one byte).
    #[must_use]
    pub fn with_fallback_buffer_size(mut self, size: usize) -> Self {
        self.fallback_buffer_size = size.max(1);
        self
    }

    /// Buffer size the fallback copy loop allocates.
    pub fn fallback_buffer_size(&self) -> usize {
        self.fallback_buffer_size
    }
}

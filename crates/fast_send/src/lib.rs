//! Zero-copy file-to-socket send fast path with a buffered fallback.
//!
//! This crate accelerates "send this file over that socket" on Windows by
//! handing the transfer to the kernel via `TransmitFile`, skipping the
//! userspace buffer round trip. Sources that do not resolve to an open file,
//! ranges the primitive cannot express, and non-Windows targets transparently
//! take a buffered read/write copy loop instead.
//!
//! # Platform Support
//!
//! - **Windows**: `TransmitFile` submitted as an overlapped operation with
//!   the write-behind hint
//! - **Other platforms**: automatic fallback to buffered read/write
//!
//! # Source shapes
//!
//! The send path understands a plain [`std::fs::File`], a bounded [`Region`]
//! over a file, and a [`Capped`] byte budget wrapping either, in any
//! file-backed composition. Arbitrary readers are accepted and always copied
//! generically.
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//! use std::net::TcpStream;
//! use fast_send::{NetDest, SendConfig, SendSource, send};
//!
//! # fn main() -> std::io::Result<()> {
//! let dest = NetDest::new(TcpStream::connect("127.0.0.1:8080")?);
//! let mut source = SendSource::from(File::open("large_file.bin")?);
//! let sent = send(&dest, &mut source, &SendConfig::default())?;
//! println!("Sent {sent} bytes");
//! # Ok(())
//! # }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_docs)]

pub mod config;
pub mod dest;
pub mod error;
pub mod fallback;
pub mod lock;
pub mod send;
pub mod sendfile;
pub mod source;
pub mod transmit;

pub use config::SendConfig;
pub use dest::{DestKind, NetDest};
pub use error::SendError;
pub use lock::{WriteGuard, WriteLock};
pub use send::send;
pub use sendfile::{SendOutcome, send_file};
pub use source::{Capped, Region, RegionBacking, SendSource};
pub use transmit::{MAX_TRANSMIT_BYTES, transmit};

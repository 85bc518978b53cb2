//! Kernel transfer primitive wrapping `TransmitFile`.
//!
//! On Windows the transfer is submitted as an overlapped operation with the
//! `TF_WRITE_BEHIND` hint and awaited through `WSAGetOverlappedResult`, so the
//! calling thread blocks until the kernel reports completion. On other
//! targets the primitive is a stub that reports [`io::ErrorKind::Unsupported`]
//! and the caller's generic copy loop takes over.

use std::fs::File;
use std::io;

use crate::dest::{DestKind, NetDest};

/// Largest byte count a single kernel transfer may request.
///
/// `TransmitFile` takes its count as a `u32`; ranges beyond `i32::MAX` must
/// use the generic copy path.
pub const MAX_TRANSMIT_BYTES: u64 = i32::MAX as u64;

/// Transfers `count` bytes of `file` starting at `pos` into the destination
/// socket at the kernel level.
///
/// A `count` of zero means "the rest of the file from `pos`". The
/// destination's write lock is held for the duration of the call and released
/// on every exit path.
///
/// # Errors
///
/// - [`io::ErrorKind::Unsupported`] for pipe-kind destinations, before the
///   lock is taken, and on non-Windows targets.
/// - [`io::ErrorKind::InvalidInput`] when `count` exceeds
///   [`MAX_TRANSMIT_BYTES`].
/// - Any submission or completion error from the platform, verbatim.
pub fn transmit(dest: &NetDest, file: &File, pos: u64, count: u64) -> io::Result<u64> {
    if dest.kind() == DestKind::Pipe {
        // TransmitFile does not work with pipe endpoints.
        return Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "kernel transfer is not supported on pipe destinations",
        ));
    }
    if count > MAX_TRANSMIT_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "transfer count exceeds the TransmitFile 2 GiB limit",
        ));
    }

    let _guard = dest.lock_write()?;
    transmit_file(dest, file, pos, count)
}

#[cfg(windows)]
fn transmit_file(dest: &NetDest, file: &File, pos: u64, count: u64) -> io::Result<u64> {
    use std::os::windows::io::{AsRawHandle, AsRawSocket};

    use windows_sys::Win32::Foundation::{CloseHandle, HANDLE};
    use windows_sys::Win32::Networking::WinSock::{
        SOCKET, TF_WRITE_BEHIND, TransmitFile, WSA_IO_PENDING, WSAGetLastError,
        WSAGetOverlappedResult,
    };
    use windows_sys::Win32::System::IO::OVERLAPPED;
    use windows_sys::Win32::System::Threading::CreateEventW;

    let socket = dest.stream().as_raw_socket() as SOCKET;
    let handle = file.as_raw_handle() as HANDLE;

    // SAFETY: both handles stay live for the duration of the call, and the
    // OVERLAPPED record outlives the pending operation because completion is
    // awaited before returning.
    unsafe {
        let mut overlapped: OVERLAPPED = std::mem::zeroed();
        overlapped.Anonymous.Anonymous.Offset = pos as u32;
        overlapped.Anonymous.Anonymous.OffsetHigh = (pos >> 32) as u32;

        let event = CreateEventW(std::ptr::null(), 1, 0, std::ptr::null());
        if event.is_null() {
            return Err(io::Error::last_os_error());
        }
        overlapped.hEvent = event;
        let overlapped_ptr = &mut overlapped as *mut OVERLAPPED;

        let submitted = TransmitFile(
            socket,
            handle,
            count as u32,
            0,
            overlapped_ptr as _,
            std::ptr::null(),
            TF_WRITE_BEHIND,
        );
        if submitted == 0 {
            let err = WSAGetLastError();
            if err != WSA_IO_PENDING {
                CloseHandle(event);
                return Err(io::Error::from_raw_os_error(err));
            }
        }

        let mut transferred = 0u32;
        let mut flags = 0u32;
        let completed =
            WSAGetOverlappedResult(socket, overlapped_ptr as _, &mut transferred, 1, &mut flags);
        let completion_err = if completed == 0 {
            Some(io::Error::from_raw_os_error(WSAGetLastError()))
        } else {
            None
        };
        CloseHandle(event);

        match completion_err {
            Some(err) => Err(err),
            None => Ok(u64::from(transferred)),
        }
    }
}

#[cfg(not(windows))]
fn transmit_file(_dest: &NetDest, _file: &File, _pos: u64, _count: u64) -> io::Result<u64> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "TransmitFile is only available on Windows",
    ))
}

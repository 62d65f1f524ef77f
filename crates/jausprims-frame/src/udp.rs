//! UDP wrapper inserted between the header and the payload.
//!
//! The transport multiplexes several messages per datagram and uses the
//! wrapper to mark each one. Native (serial, point-to-point) framing does not
//! carry it.

use crate::error::{FrameError, HeaderMismatch, Result};

/// Wrapper bytes: "JAUS01.0".
pub const UDP_HEADER: [u8; 8] = *b"JAUS01.0";

/// Wrapper size in bytes.
pub const UDP_HEADER_SIZE: usize = UDP_HEADER.len();

/// Write the wrapper at `offset`. The buffer is left untouched on failure.
pub fn write_udp_header(buffer: &mut [u8], offset: usize) -> Result<()> {
    let available = buffer.len().saturating_sub(offset);
    let dst = offset
        .checked_add(UDP_HEADER_SIZE)
        .and_then(|end| buffer.get_mut(offset..end))
        .ok_or(FrameError::BufferTooSmall {
            needed: UDP_HEADER_SIZE,
            available,
        })?;
    dst.copy_from_slice(&UDP_HEADER);
    Ok(())
}

/// Verify the wrapper at `offset`.
pub fn check_udp_header(buffer: &[u8], offset: usize) -> Result<()> {
    let src = offset
        .checked_add(UDP_HEADER_SIZE)
        .and_then(|end| buffer.get(offset..end))
        .ok_or(FrameError::TooShort {
            needed: UDP_HEADER_SIZE,
            available: buffer.len().saturating_sub(offset),
        })?;
    if src != UDP_HEADER.as_slice() {
        return Err(HeaderMismatch::UdpWrapper.into());
    }
    Ok(())
}

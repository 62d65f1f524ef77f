use bytes::{BufMut, Bytes, BytesMut};

use crate::config::FrameConfig;
use crate::error::{FrameError, HeaderMismatch, Result};
use crate::header::{Header, DATA_SIZE_MASK, HEADER_SIZE};
use crate::udp::{check_udp_header, write_udp_header, UDP_HEADER, UDP_HEADER_SIZE};

/// A message parsed only as far as its header.
///
/// This is what a transport hands over before the command code is dispatched
/// to a [`MessageLayout`](crate::MessageLayout). The payload is kept as opaque
/// bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub header: Header,
    pub data: Bytes,
}

impl RawMessage {
    /// Create a raw message, setting the header's data size from `data`.
    pub fn new(mut header: Header, data: impl Into<Bytes>) -> Result<Self> {
        let data = data.into();
        let max = usize::from(DATA_SIZE_MASK);
        if data.len() > max {
            return Err(FrameError::PayloadTooLarge {
                size: data.len(),
                max,
            });
        }
        header.data_size = data.len() as u16;
        Ok(Self { header, data })
    }

    pub fn command_code(&self) -> u16 {
        self.header.command_code
    }

    /// Native wire size (header + payload).
    pub fn size(&self) -> usize {
        HEADER_SIZE + self.data.len()
    }

    /// UDP wire size (header + wrapper + payload).
    pub fn udp_size(&self) -> usize {
        self.size() + UDP_HEADER_SIZE
    }

    /// Decode a native frame at `offset`.
    pub fn decode_native(buffer: &[u8], offset: usize) -> Result<Self> {
        Self::decode_native_with_config(buffer, offset, &FrameConfig::default())
    }

    pub fn decode_native_with_config(
        buffer: &[u8],
        offset: usize,
        config: &FrameConfig,
    ) -> Result<Self> {
        let header = Header::decode(buffer, offset)?;
        let data = payload_slice(&header, buffer, offset + HEADER_SIZE, config)?;
        Ok(Self {
            header,
            data: Bytes::copy_from_slice(data),
        })
    }

    /// Decode a UDP-wrapped frame at `offset`.
    pub fn decode_udp(buffer: &[u8], offset: usize) -> Result<Self> {
        Self::decode_udp_with_config(buffer, offset, &FrameConfig::default())
    }

    pub fn decode_udp_with_config(
        buffer: &[u8],
        offset: usize,
        config: &FrameConfig,
    ) -> Result<Self> {
        let header = Header::decode(buffer, offset)?;
        check_udp_header(buffer, offset + HEADER_SIZE)?;
        let data = payload_slice(
            &header,
            buffer,
            offset + HEADER_SIZE + UDP_HEADER_SIZE,
            config,
        )?;
        Ok(Self {
            header,
            data: Bytes::copy_from_slice(data),
        })
    }

    /// Encode as a native frame at `offset`, returning the bytes written.
    pub fn encode_native(&self, buffer: &mut [u8], offset: usize) -> Result<usize> {
        ensure_capacity(buffer, offset, self.size())?;
        self.header.encode(buffer, offset)?;
        let start = offset + HEADER_SIZE;
        buffer[start..start + self.data.len()].copy_from_slice(&self.data);
        Ok(self.size())
    }

    /// Encode as a UDP-wrapped frame at `offset`, returning the bytes written.
    pub fn encode_udp(&self, buffer: &mut [u8], offset: usize) -> Result<usize> {
        ensure_capacity(buffer, offset, self.udp_size())?;
        self.header.encode(buffer, offset)?;
        write_udp_header(buffer, offset + HEADER_SIZE)?;
        let start = offset + HEADER_SIZE + UDP_HEADER_SIZE;
        buffer[start..start + self.data.len()].copy_from_slice(&self.data);
        Ok(self.udp_size())
    }

    /// Append the native frame to `dst`.
    pub fn write_native(&self, dst: &mut BytesMut) {
        dst.reserve(self.size());
        dst.put_slice(&self.header.to_bytes());
        dst.put_slice(&self.data);
    }

    /// Append the UDP-wrapped frame to `dst`.
    pub fn write_udp(&self, dst: &mut BytesMut) {
        dst.reserve(self.udp_size());
        dst.put_slice(&self.header.to_bytes());
        dst.put_slice(&UDP_HEADER);
        dst.put_slice(&self.data);
    }
}

/// Validate the declared data size and borrow the payload starting at `start`.
pub(crate) fn payload_slice<'a>(
    header: &Header,
    buffer: &'a [u8],
    start: usize,
    config: &FrameConfig,
) -> Result<&'a [u8]> {
    let declared = usize::from(header.data_size);
    if declared > config.max_data_size {
        tracing::debug!(
            declared,
            max = config.max_data_size,
            "rejecting frame with oversized data size"
        );
        return Err(HeaderMismatch::DataSizeTooLarge {
            declared,
            max: config.max_data_size,
        }
        .into());
    }

    let available = buffer.len().saturating_sub(start);
    if available < declared {
        return Err(FrameError::TooShort {
            needed: declared,
            available,
        });
    }
    Ok(&buffer[start..start + declared])
}

pub(crate) fn ensure_capacity(buffer: &[u8], offset: usize, needed: usize) -> Result<()> {
    let available = buffer.len().saturating_sub(offset);
    if available < needed {
        tracing::debug!(needed, available, "destination buffer too small");
        return Err(FrameError::BufferTooSmall { needed, available });
    }
    Ok(())
}

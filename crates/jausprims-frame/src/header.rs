use std::fmt;

use bytes::{Buf, BufMut};

use crate::error::{FrameError, Result};

/// Header size in bytes.
pub const HEADER_SIZE: usize = 16;

/// Largest payload a single-packet message may carry.
pub const MAX_DATA_SIZE: usize = 4080;

/// Mask of the 12-bit data size inside the data control word.
pub const DATA_SIZE_MASK: u16 = 0x0FFF;

/// Default message priority.
pub const DEFAULT_PRIORITY: u8 = 6;

/// Protocol version code for JAUS 3.2 / 3.3.
pub const VERSION_3_2: u8 = 2;

/// Address of a component instance: subsystem.node.component.instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Address {
    pub subsystem: u8,
    pub node: u8,
    pub component: u8,
    pub instance: u8,
}

impl Address {
    pub const fn new(subsystem: u8, node: u8, component: u8, instance: u8) -> Self {
        Self {
            subsystem,
            node,
            component,
            instance,
        }
    }

    /// Packed form as it appears on the wire (instance first).
    pub fn to_bytes(self) -> [u8; 4] {
        [self.instance, self.component, self.node, self.subsystem]
    }

    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self {
            instance: bytes[0],
            component: bytes[1],
            node: bytes[2],
            subsystem: bytes[3],
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.subsystem, self.node, self.component, self.instance
        )
    }
}

/// Acknowledgement request/response carried in the properties word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AckNak {
    #[default]
    NotRequired,
    Required,
    Nak,
    Ack,
}

impl AckNak {
    fn bits(self) -> u16 {
        match self {
            AckNak::NotRequired => 0,
            AckNak::Required => 1,
            AckNak::Nak => 2,
            AckNak::Ack => 3,
        }
    }

    fn from_bits(bits: u16) -> Self {
        match bits & 0x3 {
            0 => AckNak::NotRequired,
            1 => AckNak::Required,
            2 => AckNak::Nak,
            _ => AckNak::Ack,
        }
    }
}

/// Message properties word.
///
/// ```text
/// bit  0-3   priority
/// bit  4-5   ack/nak
/// bit  6     service connection
/// bit  7     experimental
/// bit  8-13  version
/// bit 14-15  reserved
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Properties {
    pub priority: u8,
    pub ack_nak: AckNak,
    pub service_connection: bool,
    pub experimental: bool,
    pub version: u8,
    pub reserved: u8,
}

impl Default for Properties {
    fn default() -> Self {
        Self {
            priority: DEFAULT_PRIORITY,
            ack_nak: AckNak::NotRequired,
            service_connection: false,
            experimental: false,
            version: VERSION_3_2,
            reserved: 0,
        }
    }
}

impl Properties {
    pub fn to_bits(self) -> u16 {
        u16::from(self.priority & 0x0F)
            | (self.ack_nak.bits() << 4)
            | (u16::from(self.service_connection) << 6)
            | (u16::from(self.experimental) << 7)
            | (u16::from(self.version & 0x3F) << 8)
            | (u16::from(self.reserved & 0x03) << 14)
    }

    pub fn from_bits(bits: u16) -> Self {
        Self {
            priority: (bits & 0x0F) as u8,
            ack_nak: AckNak::from_bits(bits >> 4),
            service_connection: bits & (1 << 6) != 0,
            experimental: bits & (1 << 7) != 0,
            version: ((bits >> 8) & 0x3F) as u8,
            reserved: ((bits >> 14) & 0x03) as u8,
        }
    }
}

/// Multi-packet sequencing flag (upper nibble of the data control word).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DataFlag(u8);

impl DataFlag {
    pub const SINGLE_PACKET: Self = Self(0);
    pub const FIRST_PACKET: Self = Self(1);
    pub const NORMAL_PACKET: Self = Self(2);
    pub const RETRANSMITTED_PACKET: Self = Self(4);
    pub const LAST_PACKET: Self = Self(8);

    /// Build from the low four bits of `bits`.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x0F)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

/// The 16-byte header shared by every message.
///
/// ```text
/// ┌────────────┬─────────┬─────────────┬─────────┬──────────────┬──────────┐
/// │ Properties │ Command │ Destination │ Source  │ Data control │ Sequence │
/// │ (2B LE)    │ (2B LE) │ (4B)        │ (4B)    │ (2B LE)      │ (2B LE)  │
/// └────────────┴─────────┴─────────────┴─────────┴──────────────┴──────────┘
/// ```
///
/// The data control word packs the payload size (low 12 bits) and the data
/// flag (high 4 bits).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Header {
    pub properties: Properties,
    pub command_code: u16,
    pub destination: Address,
    pub source: Address,
    pub data_flag: DataFlag,
    pub data_size: u16,
    pub sequence_number: u16,
}

impl Header {
    /// A default header for the given command code.
    pub fn new(command_code: u16) -> Self {
        Self {
            command_code,
            ..Self::default()
        }
    }

    fn data_control(&self) -> u16 {
        (self.data_size & DATA_SIZE_MASK) | (u16::from(self.data_flag.bits()) << 12)
    }

    /// Decode the header at `offset`.
    pub fn decode(buffer: &[u8], offset: usize) -> Result<Self> {
        let mut src = offset
            .checked_add(HEADER_SIZE)
            .and_then(|end| buffer.get(offset..end))
            .ok_or(FrameError::TooShort {
                needed: HEADER_SIZE,
                available: buffer.len().saturating_sub(offset),
            })?;

        let properties = Properties::from_bits(src.get_u16_le());
        let command_code = src.get_u16_le();
        let destination = Address::from_bytes(read_address(&mut src));
        let source = Address::from_bytes(read_address(&mut src));
        let data_control = src.get_u16_le();
        let sequence_number = src.get_u16_le();

        Ok(Self {
            properties,
            command_code,
            destination,
            source,
            data_flag: DataFlag::from_bits((data_control >> 12) as u8),
            data_size: data_control & DATA_SIZE_MASK,
            sequence_number,
        })
    }

    /// Wire form of the header.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        let mut dst = &mut bytes[..];
        dst.put_u16_le(self.properties.to_bits());
        dst.put_u16_le(self.command_code);
        dst.put_slice(&self.destination.to_bytes());
        dst.put_slice(&self.source.to_bytes());
        dst.put_u16_le(self.data_control());
        dst.put_u16_le(self.sequence_number);
        bytes
    }

    /// Encode the header at `offset`. The buffer is left untouched on failure.
    pub fn encode(&self, buffer: &mut [u8], offset: usize) -> Result<()> {
        let available = buffer.len().saturating_sub(offset);
        let dst = offset
            .checked_add(HEADER_SIZE)
            .and_then(|end| buffer.get_mut(offset..end))
            .ok_or(FrameError::BufferTooSmall {
                needed: HEADER_SIZE,
                available,
            })?;
        dst.copy_from_slice(&self.to_bytes());
        Ok(())
    }
}

fn read_address(src: &mut &[u8]) -> [u8; 4] {
    let mut bytes = [0u8; 4];
    src.copy_to_slice(&mut bytes);
    bytes
}

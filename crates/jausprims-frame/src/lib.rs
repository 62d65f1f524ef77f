//! JAUS message framing.
//!
//! Every message on the wire is a 16-byte header followed by the payload:
//! - A properties word (priority, ack/nak, version)
//! - The 16-bit command code naming the message
//! - Destination and source component addresses
//! - A data control word carrying the 12-bit payload size
//! - A sequence number
//!
//! Over UDP the 8-byte `JAUS01.0` wrapper sits between header and payload.
//!
//! Payloads are described by [`MessageLayout`] values and handled by a single
//! generic [`Message`]; [`catalog`] ships layouts for common messages.

pub mod catalog;
pub mod config;
pub mod error;
pub mod field;
pub mod header;
pub mod layout;
pub mod message;
pub mod raw;
pub mod udp;

pub use config::FrameConfig;
pub use error::{FrameError, HeaderMismatch, Result};
pub use field::FieldValue;
pub use header::{
    AckNak, Address, DataFlag, Header, Properties, DATA_SIZE_MASK, HEADER_SIZE, MAX_DATA_SIZE,
};
pub use layout::{FieldDescriptor, FieldKind, MessageLayout};
pub use message::Message;
pub use raw::RawMessage;
pub use udp::{UDP_HEADER, UDP_HEADER_SIZE};

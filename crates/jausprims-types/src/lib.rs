//! Primitive field codecs for the JAUS wire protocol.
//!
//! Every numeric field of every message is a fixed-width little-endian
//! integer, optionally carrying a real value quantized over a `[min, max]`
//! range. Variable-content messages mark their populated optional fields with
//! an 8- or 16-bit presence vector.

pub mod error;
pub mod presence;
pub mod scaled;

pub use error::{Result, TypeError};
pub use presence::{BytePresenceVector, PresenceStorage, PresenceVector, ShortPresenceVector};
pub use scaled::{
    Byte, Integer, Quantized, ScaleRange, ScaledInteger, Short, UnsignedInteger, UnsignedShort,
};

use jausprims_types::TypeError;

use crate::layout::FieldKind;

/// Reasons a header is rejected for a given layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HeaderMismatch {
    /// The command code names a different message.
    #[error("command code {actual:#06x} does not match expected {expected:#06x}")]
    CommandCode { expected: u16, actual: u16 },

    /// The declared data size is larger than the message can ever carry.
    #[error("declared data size {declared} exceeds maximum {max}")]
    DataSizeTooLarge { declared: usize, max: usize },

    /// The payload fields did not consume exactly the declared data size.
    #[error("declared data size {declared} but payload fields use {consumed}")]
    DataSizeMismatch { declared: usize, consumed: usize },

    /// The UDP wrapper bytes are missing or wrong.
    #[error("missing UDP wrapper header")]
    UdpWrapper,
}

/// Errors that can occur during message encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The source buffer ends before the header or a field does.
    #[error("buffer too short ({available} bytes available, {needed} needed)")]
    TooShort { needed: usize, available: usize },

    /// The destination buffer cannot hold the encoded message.
    #[error("destination buffer too small ({available} bytes available, {needed} needed)")]
    BufferTooSmall { needed: usize, available: usize },

    /// The header is inconsistent with the expected message.
    #[error("header mismatch: {0}")]
    HeaderMismatch(HeaderMismatch),

    /// A presence vector bit index is outside the vector's width.
    #[error("bit index {index} out of range for {width}-bit presence vector")]
    InvalidBitIndex { index: usize, width: usize },

    /// The message layout has no presence vector.
    #[error("message {0} has no presence vector")]
    NoPresenceVector(&'static str),

    /// No field exists at the given position.
    #[error("field index {index} out of range ({len} fields)")]
    FieldIndexOutOfRange { index: usize, len: usize },

    /// A field value of the wrong kind was supplied.
    #[error("field {index} expects {expected:?}, got {actual:?}")]
    FieldKindMismatch {
        index: usize,
        expected: FieldKind,
        actual: FieldKind,
    },

    /// The field carries no real-value scaling.
    #[error("field {0} is not a scaled field")]
    NotScaled(usize),

    /// The payload exceeds what the header's 12-bit data size can describe.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A message layout is internally inconsistent.
    #[error("invalid layout {layout}: {reason}")]
    InvalidLayout {
        layout: &'static str,
        reason: &'static str,
    },
}

impl From<HeaderMismatch> for FrameError {
    fn from(mismatch: HeaderMismatch) -> Self {
        FrameError::HeaderMismatch(mismatch)
    }
}

impl From<TypeError> for FrameError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::TooShort { needed, available } => FrameError::TooShort { needed, available },
            TypeError::BufferTooSmall { needed, available } => {
                FrameError::BufferTooSmall { needed, available }
            }
            TypeError::InvalidBitIndex { index, width } => {
                FrameError::InvalidBitIndex { index, width }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;

/// Errors that can occur while encoding or decoding a primitive field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    /// The source buffer ends before the field does.
    #[error("buffer too short ({available} bytes available, {needed} needed)")]
    TooShort { needed: usize, available: usize },

    /// The destination buffer cannot hold the encoded field.
    #[error("destination buffer too small ({available} bytes available, {needed} needed)")]
    BufferTooSmall { needed: usize, available: usize },

    /// A presence vector bit index is outside the vector's width.
    #[error("bit index {index} out of range for {width}-bit presence vector")]
    InvalidBitIndex { index: usize, width: usize },
}

pub type Result<T> = std::result::Result<T, TypeError>;

use std::fmt;

use jausprims_frame::{FrameError, HeaderMismatch};

// Exit codes shared with the other prims CLIs.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Malformed input is `DATA_INVALID`; anything else is a bug in the caller.
pub fn frame_error(context: &str, err: FrameError) -> CliError {
    let code = match err {
        FrameError::TooShort { .. }
        | FrameError::InvalidBitIndex { .. }
        | FrameError::HeaderMismatch(
            HeaderMismatch::DataSizeTooLarge { .. }
            | HeaderMismatch::DataSizeMismatch { .. }
            | HeaderMismatch::UdpWrapper,
        ) => DATA_INVALID,
        FrameError::HeaderMismatch(HeaderMismatch::CommandCode { .. }) => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

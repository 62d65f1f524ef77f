use crate::header::MAX_DATA_SIZE;

/// Controls how strictly received buffers are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// Largest declared data size accepted on decode. Default: 4080 bytes.
    pub max_data_size: usize,
    /// When true, the payload fields must consume exactly the declared data size.
    pub strict_length: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_data_size: MAX_DATA_SIZE,
            strict_length: true,
        }
    }
}

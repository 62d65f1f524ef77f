/// Errors that can occur when updating registry entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Identifiers must lie in `[0, 254]`; 255 is the broadcast id.
    #[error("invalid id {0} (expected 0..=254)")]
    InvalidId(i64),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

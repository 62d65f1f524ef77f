//! Wire codec and entity registry for JAUS.
//!
//! # Crate Structure
//!
//! - [`types`]: Scaled integers and presence vectors
//! - [`frame`]: Header, UDP wrapper and layout-driven message codec
//! - [`registry`]: Subsystem/node/component liveness tracking (behind `registry` feature)

/// Re-export field types.
pub mod types {
    pub use jausprims_types::*;
}

/// Re-export frame types.
pub mod frame {
    pub use jausprims_frame::*;
}

/// Re-export registry types (requires `registry` feature).
#[cfg(feature = "registry")]
pub mod registry {
    pub use jausprims_registry::*;
}

//! Registry of discovered subsystems, nodes and components.
//!
//! Entities carry an id in `[0, 254]` (0 meaning unknown), an optional label
//! and the time they were last heard from. Liveness is a query against a
//! caller-supplied instant; nothing is removed automatically.
//!
//! Entities are plain data with no internal locking. When a receiver and a
//! timeout sweep share a tree, wrap it in one lock (for example
//! `Arc<Mutex<Subsystem>>`) and hold it across find-then-touch sequences.

pub mod clock;
pub mod component;
pub mod entity;
pub mod error;
pub mod node;
pub mod subsystem;

pub use clock::{Clock, ManualClock, SystemClock};
pub use component::Component;
pub use entity::{Entity, Identity, Parent, MAX_ID, TIMEOUT};
pub use error::{RegistryError, Result};
pub use node::Node;
pub use subsystem::Subsystem;

use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::error::{RegistryError, Result};

/// Time without activity after which an entity is considered stale.
pub const TIMEOUT: Duration = Duration::from_millis(5000);

/// Largest assignable id. 255 addresses every entity (broadcast).
pub const MAX_ID: u8 = 254;

/// Id, optional label and last-activity time shared by every entity.
#[derive(Debug, Clone)]
pub struct Identity {
    id: u8,
    label: Option<String>,
    last_update: Instant,
}

impl Identity {
    /// Ids outside `(0, 254]` become 0 (unknown).
    pub(crate) fn with_id(kind: &'static str, id: i64, now: Instant) -> Self {
        let id = match u8::try_from(id) {
            Ok(id) if id > 0 && id <= MAX_ID => id,
            _ => {
                if id != 0 {
                    tracing::debug!(kind, id, "id out of range, using 0");
                }
                0
            }
        };
        Self {
            id,
            label: None,
            last_update: now,
        }
    }

    pub(crate) fn with_label(label: String, now: Instant) -> Self {
        Self {
            id: 0,
            label: Some(label),
            last_update: now,
        }
    }
}

/// Identification and liveness of a registry entity.
///
/// Implementors only expose their [`Identity`]; everything else is provided.
pub trait Entity {
    /// Type name used in `Display` when no label is set.
    const KIND: &'static str;

    fn identity(&self) -> &Identity;

    fn identity_mut(&mut self) -> &mut Identity;

    fn id(&self) -> u8 {
        self.identity().id
    }

    /// Assign a new id. Values outside `[0, 254]` are rejected and the current
    /// id is kept.
    fn set_id(&mut self, id: i64) -> Result<()> {
        match u8::try_from(id) {
            Ok(valid) if valid <= MAX_ID => {
                self.identity_mut().id = valid;
                Ok(())
            }
            _ => {
                tracing::debug!(kind = Self::KIND, id, "rejected id");
                Err(RegistryError::InvalidId(id))
            }
        }
    }

    fn label(&self) -> Option<&str> {
        self.identity().label.as_deref()
    }

    fn set_label(&mut self, label: Option<String>) {
        self.identity_mut().label = label;
    }

    fn last_update(&self) -> Instant {
        self.identity().last_update
    }

    /// Record activity now.
    fn touch(&mut self, clock: &impl Clock) {
        self.identity_mut().last_update = clock.now();
    }

    /// True once more than [`TIMEOUT`] has passed since the last touch.
    fn is_stale(&self, now: Instant) -> bool {
        self.is_stale_after(now, TIMEOUT)
    }

    fn is_stale_after(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_update()) > timeout
    }
}

/// An entity owning an ordered list of child entities.
///
/// Children are not unique by id; lookups return the first match. Nothing
/// here removes children on its own.
pub trait Parent: Entity {
    type Child: Entity;

    fn children(&self) -> &[Self::Child];

    fn children_mut(&mut self) -> &mut Vec<Self::Child>;

    fn find_child(&self, id: u8) -> Option<&Self::Child> {
        self.children().iter().find(|child| child.id() == id)
    }

    fn find_child_mut(&mut self, id: u8) -> Option<&mut Self::Child> {
        self.children_mut().iter_mut().find(|child| child.id() == id)
    }

    /// Append `child` after the existing children.
    fn add_child(&mut self, child: Self::Child) {
        self.children_mut().push(child);
    }

    /// Remove and return the first child with `id`.
    fn remove_child(&mut self, id: u8) -> Option<Self::Child> {
        let children = self.children_mut();
        let index = children.iter().position(|child| child.id() == id)?;
        Some(children.remove(index))
    }

    /// Children that have not been touched within [`TIMEOUT`] of `now`.
    fn stale_children(&self, now: Instant) -> impl Iterator<Item = &Self::Child> {
        self.children()
            .iter()
            .filter(move |child| child.is_stale(now))
    }
}

/// Equality, hashing and `Display` keyed on the entity id only.
macro_rules! entity_impls {
    ($ty:ty) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.id() == other.id()
            }
        }

        impl Eq for $ty {}

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.id().hash(state);
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let name = self.label().unwrap_or(<$ty as Entity>::KIND);
                write!(f, "{}-{}", name, self.id())
            }
        }
    };
}

pub(crate) use entity_impls;

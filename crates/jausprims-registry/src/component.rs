use crate::clock::Clock;
use crate::entity::{entity_impls, Entity, Identity, MAX_ID};
use crate::error::{RegistryError, Result};

/// A component instance. Components are leaves of the registry.
///
/// Equality and hashing use the component id only, so two instances of the
/// same component compare equal.
#[derive(Debug, Clone)]
pub struct Component {
    identity: Identity,
    instance: u8,
}

impl Component {
    /// Ids outside `(0, 254]` are replaced by 0. The instance starts at 0.
    pub fn with_id(id: i64, clock: &impl Clock) -> Self {
        Self {
            identity: Identity::with_id(Self::KIND, id, clock.now()),
            instance: 0,
        }
    }

    /// A labelled component with id 0.
    pub fn with_label(label: impl Into<String>, clock: &impl Clock) -> Self {
        Self {
            identity: Identity::with_label(label.into(), clock.now()),
            instance: 0,
        }
    }

    /// Like [`with_id`](Self::with_id), with an instance id normalized the same way.
    pub fn with_instance(id: i64, instance: i64, clock: &impl Clock) -> Self {
        let mut component = Self::with_id(id, clock);
        component.instance = match u8::try_from(instance) {
            Ok(instance) if instance <= MAX_ID => instance,
            _ => 0,
        };
        component
    }

    pub fn instance(&self) -> u8 {
        self.instance
    }

    /// Values outside `[0, 254]` are rejected and the current instance is kept.
    pub fn set_instance(&mut self, instance: i64) -> Result<()> {
        match u8::try_from(instance) {
            Ok(valid) if valid <= MAX_ID => {
                self.instance = valid;
                Ok(())
            }
            _ => Err(RegistryError::InvalidId(instance)),
        }
    }
}

impl Entity for Component {
    const KIND: &'static str = "Component";

    fn identity(&self) -> &Identity {
        &self.identity
    }

    fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }
}

entity_impls!(Component);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn instance_range() {
        let clock = ManualClock::new();
        let mut component = Component::with_instance(33, 300, &clock);
        assert_eq!(component.instance(), 0);

        component.set_instance(4).unwrap();
        assert_eq!(
            component.set_instance(255),
            Err(RegistryError::InvalidId(255))
        );
        assert_eq!(component.instance(), 4);
    }

    #[test]
    fn labelled_component() {
        let clock = ManualClock::new();
        let component = Component::with_label("camera", &clock);
        assert_eq!(component.id(), 0);
        assert_eq!(component.to_string(), "camera-0");
        assert_eq!(Component::with_id(9, &clock).to_string(), "Component-9");
    }
}

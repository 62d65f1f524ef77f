use crate::clock::Clock;
use crate::component::Component;
use crate::entity::{entity_impls, Entity, Identity, Parent};

/// A node (computing host) and the components running on it.
#[derive(Debug, Clone)]
pub struct Node {
    identity: Identity,
    components: Vec<Component>,
}

impl Node {
    /// Ids outside `(0, 254]` are replaced by 0.
    pub fn with_id(id: i64, clock: &impl Clock) -> Self {
        Self {
            identity: Identity::with_id(Self::KIND, id, clock.now()),
            components: Vec::new(),
        }
    }

    /// A labelled node with id 0.
    pub fn with_label(label: impl Into<String>, clock: &impl Clock) -> Self {
        Self {
            identity: Identity::with_label(label.into(), clock.now()),
            components: Vec::new(),
        }
    }

    /// First component matching both component id and instance.
    pub fn find_instance(&self, id: u8, instance: u8) -> Option<&Component> {
        self.components
            .iter()
            .find(|component| component.id() == id && component.instance() == instance)
    }
}

impl Entity for Node {
    const KIND: &'static str = "Node";

    fn identity(&self) -> &Identity {
        &self.identity
    }

    fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }
}

impl Parent for Node {
    type Child = Component;

    fn children(&self) -> &[Component] {
        &self.components
    }

    fn children_mut(&mut self) -> &mut Vec<Component> {
        &mut self.components
    }
}

entity_impls!(Node);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn instances_share_component_id() {
        let clock = ManualClock::new();
        let mut node = Node::with_id(2, &clock);
        node.add_child(Component::with_instance(33, 1, &clock));
        node.add_child(Component::with_instance(33, 2, &clock));

        assert_eq!(node.find_child(33).map(Component::instance), Some(1));
        assert_eq!(node.find_instance(33, 2).map(Component::instance), Some(2));
        assert!(node.find_instance(33, 3).is_none());
        assert_eq!(node.to_string(), "Node-2");
    }
}

use crate::clock::Clock;
use crate::entity::{entity_impls, Entity, Identity, Parent};
use crate::node::Node;

/// A subsystem and the nodes discovered on it.
#[derive(Debug, Clone)]
pub struct Subsystem {
    identity: Identity,
    nodes: Vec<Node>,
}

impl Subsystem {
    /// Ids outside `(0, 254]` are replaced by 0.
    pub fn with_id(id: i64, clock: &impl Clock) -> Self {
        Self {
            identity: Identity::with_id(Self::KIND, id, clock.now()),
            nodes: Vec::new(),
        }
    }

    /// A labelled subsystem with id 0.
    pub fn with_label(label: impl Into<String>, clock: &impl Clock) -> Self {
        Self {
            identity: Identity::with_label(label.into(), clock.now()),
            nodes: Vec::new(),
        }
    }
}

impl Entity for Subsystem {
    const KIND: &'static str = "Subsystem";

    fn identity(&self) -> &Identity {
        &self.identity
    }

    fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }
}

impl Parent for Subsystem {
    type Child = Node;

    fn children(&self) -> &[Node] {
        &self.nodes
    }

    fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.nodes
    }
}

entity_impls!(Subsystem);

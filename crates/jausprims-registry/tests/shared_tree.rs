use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use jausprims_registry::{Clock, Component, Entity, ManualClock, Node, Parent, Subsystem};

fn tree(clock: &ManualClock) -> Subsystem {
    let mut subsystem = Subsystem::with_id(1, clock);
    for id in 1..=4 {
        let mut node = Node::with_id(id, clock);
        node.add_child(Component::with_instance(33, 1, clock));
        subsystem.add_child(node);
    }
    subsystem
}

#[test]
fn receiver_and_sweeper_share_one_lock() {
    let clock = Arc::new(ManualClock::new());
    let registry = Arc::new(Mutex::new(tree(&clock)));

    clock.advance(Duration::from_millis(4000));

    let receiver = {
        let registry = Arc::clone(&registry);
        let clock = Arc::clone(&clock);
        thread::spawn(move || {
            for id in [2u8, 4] {
                let mut guard = registry.lock().unwrap();
                if let Some(node) = guard.find_child_mut(id) {
                    node.touch(&*clock);
                    if let Some(component) = node.find_child_mut(33) {
                        component.touch(&*clock);
                    }
                }
            }
        })
    };
    receiver.join().unwrap();

    clock.advance(Duration::from_millis(2000));

    let sweeper = {
        let registry = Arc::clone(&registry);
        let clock = Arc::clone(&clock);
        thread::spawn(move || {
            let mut guard = registry.lock().unwrap();
            let stale: Vec<u8> = guard
                .stale_children(clock.now())
                .map(Entity::id)
                .collect();
            for id in &stale {
                guard.remove_child(*id);
            }
            stale
        })
    };
    let removed = sweeper.join().unwrap();

    assert_eq!(removed, vec![1, 3]);
    let guard = registry.lock().unwrap();
    let remaining: Vec<u8> = guard.children().iter().map(Entity::id).collect();
    assert_eq!(remaining, vec![2, 4]);
    assert!(!guard.children()[0].children()[0].is_stale(clock.now()));
}

#[test]
fn entities_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Subsystem>();
    assert_send_sync::<Node>();
    assert_send_sync::<Component>();
    assert_send_sync::<ManualClock>();
}

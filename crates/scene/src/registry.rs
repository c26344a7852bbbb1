use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::transform::Transform;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject<N> {
    pub id: String,
    pub node: N,
    pub z_index: i32,
    pub local: Transform,
    order: u64,
}

impl<N> SceneObject<N> {
    fn sort_key(&self) -> (i32, u64) {
        (self.z_index, self.order)
    }
}

/// Mutable registry of renderable nodes mounted into the shared scene.
///
/// Components register their node on mount and unregister on unmount. Ids
/// are unique: registering an id that is already present is a no-op, not an
/// overwrite. Objects iterate in `(z_index, registration order)`.
///
/// Every change bumps [`version`](SceneRegistry::version) and notifies
/// subscribers, so a host can treat the registry as an external store.
pub struct SceneRegistry<N> {
    objects: RefCell<Vec<SceneObject<N>>>,
    next_order: Cell<u64>,
    version: Cell<u64>,
    next_subscription: Cell<u64>,
    listeners: RefCell<Vec<(SubscriptionId, Rc<dyn Fn()>)>>,
}

impl<N> std::fmt::Debug for SceneRegistry<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<String> = self.objects.borrow().iter().map(|o| o.id.clone()).collect();
        f.debug_struct("SceneRegistry")
            .field("objects", &ids)
            .field("version", &self.version.get())
            .finish()
    }
}

impl<N> Default for SceneRegistry<N> {
    fn default() -> Self {
        Self {
            objects: RefCell::new(Vec::new()),
            next_order: Cell::new(0),
            version: Cell::new(0),
            next_subscription: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
        }
    }
}

impl<N> SceneRegistry<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.borrow().is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version.get()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.objects.borrow().iter().any(|o| o.id == id)
    }

    /// Returns `false` (and changes nothing) if `id` is already registered.
    pub fn register(
        &self,
        id: impl Into<String>,
        node: N,
        z_index: i32,
        local: Transform,
    ) -> bool {
        let id = id.into();
        {
            let mut objects = self.objects.borrow_mut();
            if objects.iter().any(|o| o.id == id) {
                tracing::debug!(id = %id, "scene object already registered");
                return false;
            }
            let order = self.next_order.get();
            self.next_order.set(order + 1);
            let object = SceneObject {
                id,
                node,
                z_index,
                local,
                order,
            };
            let at = objects.partition_point(|o| o.sort_key() <= object.sort_key());
            objects.insert(at, object);
        }
        self.changed();
        true
    }

    pub fn unregister(&self, id: &str) -> bool {
        let removed = {
            let mut objects = self.objects.borrow_mut();
            let before = objects.len();
            objects.retain(|o| o.id != id);
            objects.len() != before
        };
        if removed {
            self.changed();
        }
        removed
    }

    pub fn set_z_index(&self, id: &str, z_index: i32) -> bool {
        let updated = {
            let mut objects = self.objects.borrow_mut();
            let position = objects.iter().position(|o| o.id == id);
            match position {
                Some(i) if objects[i].z_index != z_index => {
                    objects[i].z_index = z_index;
                    objects.sort_by_key(|o| o.sort_key());
                    true
                }
                _ => false,
            }
        };
        if updated {
            self.changed();
        }
        updated
    }

    /// Visits objects in draw order without cloning nodes.
    pub fn for_each(&self, mut f: impl FnMut(&SceneObject<N>)) {
        for object in self.objects.borrow().iter() {
            f(object);
        }
    }

    pub fn ids(&self) -> Vec<String> {
        self.objects.borrow().iter().map(|o| o.id.clone()).collect()
    }

    pub fn subscribe(&self, listener: impl Fn() + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    fn changed(&self) {
        self.version.set(self.version.get() + 1);
        let current: Vec<Rc<dyn Fn()>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in current {
            listener();
        }
    }
}

impl<N: Clone> SceneRegistry<N> {
    pub fn get(&self, id: &str) -> Option<SceneObject<N>> {
        self.objects.borrow().iter().find(|o| o.id == id).cloned()
    }

    pub fn snapshot(&self) -> Vec<SceneObject<N>> {
        self.objects.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::SceneRegistry;
    use crate::transform::Transform;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn duplicate_registration_is_a_noop() {
        let registry = SceneRegistry::new();
        assert!(registry.register("ocean", "first", 0, Transform::identity()));
        assert!(!registry.register("ocean", "second", 5, Transform::identity()));

        let ocean = registry.get("ocean").expect("registered");
        assert_eq!(ocean.node, "first");
        assert_eq!(ocean.z_index, 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn iterates_by_z_index_then_registration() {
        let registry = SceneRegistry::new();
        registry.register("clouds", (), 2, Transform::identity());
        registry.register("island-a", (), 0, Transform::identity());
        registry.register("island-b", (), 0, Transform::identity());
        registry.register("ocean", (), -1, Transform::identity());

        assert_eq!(registry.ids(), vec!["ocean", "island-a", "island-b", "clouds"]);

        registry.set_z_index("ocean", 3);
        assert_eq!(registry.ids(), vec!["island-a", "island-b", "clouds", "ocean"]);
    }

    #[test]
    fn subscribers_see_every_change() {
        let registry = SceneRegistry::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let sub = registry.subscribe(move || h.set(h.get() + 1));

        registry.register("a", 1, 0, Transform::identity());
        registry.register("a", 2, 0, Transform::identity());
        registry.unregister("a");
        registry.unregister("missing");
        assert_eq!(hits.get(), 2);
        assert_eq!(registry.version(), 2);

        assert!(registry.unsubscribe(sub));
        registry.register("b", 3, 0, Transform::identity());
        assert_eq!(hits.get(), 2);
    }
}

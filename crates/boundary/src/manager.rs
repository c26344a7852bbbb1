use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use camera::state::CameraState;
use camera::store::{CameraStore, ListenerId as CameraListenerId};
use foundation::math::{Vec2, Vec3};

use crate::config::BoundaryConfig;
use crate::entity::{ActiveEntity, BoundaryChange, Entity, EntityKind};
use crate::policy::TieBreak;
use crate::state::BoundaryState;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type RouteListener = Rc<dyn Fn(Option<&ActiveEntity>)>;
type ChangeListener = Rc<dyn Fn(&BoundaryChange)>;

#[derive(Debug, Clone)]
struct Record {
    entity: Entity,
    boundaries: BoundaryConfig,
    /// Registration sequence, shared by islands and sections.
    order: u64,
    state: BoundaryState,
}

struct Preload {
    callback: Rc<dyn Fn()>,
    fired: bool,
}

struct Registry {
    islands: BTreeMap<String, Record>,
    sections: BTreeMap<String, Record>,
    preloads: BTreeMap<String, Preload>,
    camera: Vec2,
    next_order: u64,
    closest: Option<(EntityKind, String)>,
}

/// Side effects gathered while the registry is borrowed, run after release.
#[derive(Default)]
struct Outbox {
    changes: Vec<BoundaryChange>,
    preloads: Vec<(String, Rc<dyn Fn()>)>,
    route: Option<Option<ActiveEntity>>,
}

impl Registry {
    fn records(&self, kind: EntityKind) -> &BTreeMap<String, Record> {
        match kind {
            EntityKind::Island => &self.islands,
            EntityKind::Section => &self.sections,
        }
    }

    fn register(
        &mut self,
        kind: EntityKind,
        entity: Entity,
        boundaries: BoundaryConfig,
        out: &mut Outbox,
    ) {
        let Registry {
            islands,
            sections,
            preloads,
            camera,
            next_order,
            ..
        } = self;
        let records = match kind {
            EntityKind::Island => islands,
            EntityKind::Section => sections,
        };

        let fresh = !records.contains_key(&entity.id);
        let record = records.entry(entity.id.clone()).or_insert_with(|| {
            let order = *next_order;
            *next_order += 1;
            Record {
                entity: entity.clone(),
                boundaries,
                order,
                state: BoundaryState::unloaded(),
            }
        });
        // Last write wins, registration order is kept.
        record.entity = entity;
        record.boundaries = boundaries;
        recompute(kind, record, *camera, fresh, preloads, out);
    }

    fn recompute_all(&mut self, out: &mut Outbox) {
        let Registry {
            islands,
            sections,
            preloads,
            camera,
            ..
        } = self;
        for record in islands.values_mut() {
            recompute(EntityKind::Island, record, *camera, false, preloads, out);
        }
        for record in sections.values_mut() {
            recompute(EntityKind::Section, record, *camera, false, preloads, out);
        }
    }

    fn select_closest(&self, tie_break: TieBreak) -> Option<(EntityKind, &Record)> {
        let mut best: Option<(EntityKind, &Record)> = None;
        for kind in [EntityKind::Island, EntityKind::Section] {
            for record in self.records(kind).values() {
                if !record.state.is_active {
                    continue;
                }
                let candidate = (record.state.distance_to_camera, record.order);
                let wins = match best {
                    None => true,
                    Some((_, b)) => {
                        tie_break.prefers(candidate, (b.state.distance_to_camera, b.order))
                    }
                };
                if wins {
                    best = Some((kind, record));
                }
            }
        }
        best
    }

    fn reselect(&mut self, tie_break: TieBreak, out: &mut Outbox) {
        let selected = self.select_closest(tie_break).map(|(kind, r)| ActiveEntity {
            kind,
            entity: r.entity.clone(),
            distance: r.state.distance_to_camera,
        });
        let identity = selected.as_ref().map(|a| (a.kind, a.entity.id.clone()));
        if identity != self.closest {
            self.closest = identity;
            out.route = Some(selected);
        }
    }
}

fn recompute(
    kind: EntityKind,
    record: &mut Record,
    camera: Vec2,
    fresh: bool,
    preloads: &mut BTreeMap<String, Preload>,
    out: &mut Outbox,
) {
    let distance = record.entity.position.xy().distance(camera);
    let current = BoundaryState {
        is_loaded: distance <= record.boundaries.load_radius,
        is_active: distance <= record.boundaries.active_radius,
        distance_to_camera: distance,
    };

    let previous = if fresh { None } else { Some(record.state) };
    if current.flags_differ(&previous.unwrap_or_else(BoundaryState::unloaded)) {
        out.changes.push(BoundaryChange {
            kind,
            id: record.entity.id.clone(),
            previous,
            current,
        });
    }
    record.state = current;
    fire_preload_if_due(&record.entity.id, distance, &record.boundaries, preloads, out);
}

fn fire_preload_if_due(
    id: &str,
    distance: f64,
    boundaries: &BoundaryConfig,
    preloads: &mut BTreeMap<String, Preload>,
    out: &mut Outbox,
) {
    if let Some(preload) = preloads.get_mut(id) {
        if !preload.fired && distance <= boundaries.prewarm_radius() {
            preload.fired = true;
            out.preloads.push((id.to_string(), Rc::clone(&preload.callback)));
        }
    }
}

/// Proximity state machine for islands and sections.
///
/// On every camera update each registered entity gets a fresh
/// [`BoundaryState`] computed from one camera snapshot:
/// - `is_loaded` iff the planar distance is within `load_radius`,
/// - `is_active` iff it is within `active_radius`,
/// - a registered preload fires once, the first time the distance drops to
///   `2 * load_radius` or less.
///
/// Among active entities the nearest one is the focus; ties go to the
/// configured [`TieBreak`]. Route listeners hear about the focus only when
/// its identity changes, including to and from "nothing active".
///
/// Lookups of unknown ids return `None`. Nothing here panics or errors; bad
/// input degrades to stale or absent state.
pub struct BoundaryManager {
    registry: RefCell<Registry>,
    tie_break: TieBreak,
    next_listener: Cell<u64>,
    route_listeners: RefCell<Vec<(ListenerId, RouteListener)>>,
    change_listeners: RefCell<Vec<(ListenerId, ChangeListener)>>,
    attachment: RefCell<Option<(Weak<CameraStore>, CameraListenerId)>>,
}

impl std::fmt::Debug for BoundaryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("BoundaryManager")
            .field("islands", &registry.islands.len())
            .field("sections", &registry.sections.len())
            .field("preloads", &registry.preloads.len())
            .field("closest", &registry.closest)
            .field("tie_break", &self.tie_break)
            .finish()
    }
}

impl Default for BoundaryManager {
    fn default() -> Self {
        Self::new(TieBreak::default())
    }
}

impl BoundaryManager {
    pub fn new(tie_break: TieBreak) -> Self {
        Self {
            registry: RefCell::new(Registry {
                islands: BTreeMap::new(),
                sections: BTreeMap::new(),
                preloads: BTreeMap::new(),
                camera: CameraState::default().position.xy(),
                next_order: 0,
                closest: None,
            }),
            tie_break,
            next_listener: Cell::new(0),
            route_listeners: RefCell::new(Vec::new()),
            change_listeners: RefCell::new(Vec::new()),
            attachment: RefCell::new(None),
        }
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Follows the store's throttled notifications, reading its true position.
    ///
    /// Replaces any previous attachment and recomputes immediately.
    pub fn attach(self: &Rc<Self>, store: &Rc<CameraStore>) {
        self.detach();

        let manager = Rc::downgrade(self);
        let source = Rc::downgrade(store);
        let id = store.subscribe(move || {
            if let (Some(manager), Some(store)) = (manager.upgrade(), source.upgrade()) {
                manager.update(store.get_state().position.xy());
            }
        });
        *self.attachment.borrow_mut() = Some((Rc::downgrade(store), id));
        self.update(store.get_state().position.xy());
    }

    pub fn detach(&self) {
        let previous = self.attachment.borrow_mut().take();
        if let Some((store, id)) = previous {
            if let Some(store) = store.upgrade() {
                store.unsubscribe(id);
            }
        }
    }

    /// Recomputes every entity against `camera`.
    pub fn update(&self, camera: Vec2) {
        let mut out = Outbox::default();
        {
            let mut registry = self.registry.borrow_mut();
            registry.camera = camera;
            registry.recompute_all(&mut out);
            registry.reselect(self.tie_break, &mut out);
            tracing::trace!(
                x = camera.x,
                y = camera.y,
                islands = registry.islands.len(),
                sections = registry.sections.len(),
                "boundaries recomputed"
            );
        }
        self.dispatch(out);
    }

    pub fn camera_position(&self) -> Vec2 {
        self.registry.borrow().camera
    }

    pub fn register_island(&self, entity: Entity, boundaries: BoundaryConfig) {
        self.register(EntityKind::Island, entity, boundaries);
    }

    pub fn register_section(&self, entity: Entity, boundaries: BoundaryConfig) {
        self.register(EntityKind::Section, entity, boundaries);
    }

    pub fn unregister_island(&self, id: &str) {
        self.unregister(EntityKind::Island, id);
    }

    pub fn unregister_section(&self, id: &str) {
        self.unregister(EntityKind::Section, id);
    }

    /// Registers a one-shot preload for `id`, resetting any earlier one.
    ///
    /// If the entity is already inside its prewarm radius the callback runs
    /// right away.
    pub fn register_preload(&self, id: &str, callback: impl Fn() + 'static) {
        let mut out = Outbox::default();
        {
            let mut registry = self.registry.borrow_mut();
            registry.preloads.insert(
                id.to_string(),
                Preload {
                    callback: Rc::new(callback),
                    fired: false,
                },
            );
            let Registry {
                islands,
                sections,
                preloads,
                ..
            } = &mut *registry;
            let record = match islands.get(id) {
                Some(record) => Some(record),
                None => sections.get(id),
            };
            if let Some(record) = record {
                fire_preload_if_due(
                    id,
                    record.state.distance_to_camera,
                    &record.boundaries,
                    preloads,
                    &mut out,
                );
            }
        }
        self.dispatch(out);
    }

    pub fn unregister_preload(&self, id: &str) -> bool {
        self.registry.borrow_mut().preloads.remove(id).is_some()
    }

    pub fn get_island_state(&self, id: &str) -> Option<BoundaryState> {
        self.state_of(EntityKind::Island, id)
    }

    pub fn get_section_state(&self, id: &str) -> Option<BoundaryState> {
        self.state_of(EntityKind::Section, id)
    }

    pub fn get_island_position(&self, id: &str) -> Option<Vec3> {
        self.registry
            .borrow()
            .islands
            .get(id)
            .map(|r| r.entity.position)
    }

    pub fn get_section_position(&self, id: &str) -> Option<Vec3> {
        self.registry
            .borrow()
            .sections
            .get(id)
            .map(|r| r.entity.position)
    }

    pub fn get_boundaries(&self, kind: EntityKind, id: &str) -> Option<BoundaryConfig> {
        self.registry
            .borrow()
            .records(kind)
            .get(id)
            .map(|r| r.boundaries)
    }

    /// Section id to owning island id, for sections that name one.
    pub fn get_section_island_map(&self) -> BTreeMap<String, String> {
        self.registry
            .borrow()
            .sections
            .iter()
            .filter_map(|(id, r)| {
                r.entity
                    .island_id
                    .clone()
                    .map(|island| (id.clone(), island))
            })
            .collect()
    }

    /// Entities of `kind` in registration order.
    pub fn entities(&self, kind: EntityKind) -> Vec<Entity> {
        let registry = self.registry.borrow();
        let mut records: Vec<&Record> = registry.records(kind).values().collect();
        records.sort_by_key(|r| r.order);
        records.into_iter().map(|r| r.entity.clone()).collect()
    }

    pub fn closest_active(&self) -> Option<ActiveEntity> {
        self.registry
            .borrow()
            .select_closest(self.tie_break)
            .map(|(kind, r)| ActiveEntity {
                kind,
                entity: r.entity.clone(),
                distance: r.state.distance_to_camera,
            })
    }

    /// Called when the focused entity changes identity.
    pub fn on_route_change(
        &self,
        listener: impl Fn(Option<&ActiveEntity>) + 'static,
    ) -> ListenerId {
        let id = self.next_id();
        self.route_listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        id
    }

    /// Called when any entity's `is_loaded` or `is_active` flips.
    pub fn on_boundary_change(
        &self,
        listener: impl Fn(&BoundaryChange) + 'static,
    ) -> ListenerId {
        let id = self.next_id();
        self.change_listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        id
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut removed = false;
        self.route_listeners.borrow_mut().retain(|(lid, _)| {
            let keep = *lid != id;
            removed |= !keep;
            keep
        });
        self.change_listeners.borrow_mut().retain(|(lid, _)| {
            let keep = *lid != id;
            removed |= !keep;
            keep
        });
        removed
    }

    fn next_id(&self) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        id
    }

    fn state_of(&self, kind: EntityKind, id: &str) -> Option<BoundaryState> {
        self.registry
            .borrow()
            .records(kind)
            .get(id)
            .map(|r| r.state)
    }

    fn register(&self, kind: EntityKind, entity: Entity, boundaries: BoundaryConfig) {
        if !boundaries.is_nested() {
            tracing::debug!(
                id = %entity.id,
                load_radius = boundaries.load_radius,
                active_radius = boundaries.active_radius,
                "active radius exceeds load radius; keeping as given"
            );
        }
        let mut out = Outbox::default();
        {
            let mut registry = self.registry.borrow_mut();
            registry.register(kind, entity, boundaries, &mut out);
            registry.reselect(self.tie_break, &mut out);
        }
        self.dispatch(out);
    }

    fn unregister(&self, kind: EntityKind, id: &str) {
        let mut out = Outbox::default();
        {
            let mut registry = self.registry.borrow_mut();
            let removed = match kind {
                EntityKind::Island => registry.islands.remove(id),
                EntityKind::Section => registry.sections.remove(id),
            };
            if removed.is_none() {
                return;
            }
            registry.preloads.remove(id);
            registry.reselect(self.tie_break, &mut out);
        }
        tracing::debug!(kind = kind.as_str(), id, "entity unregistered");
        self.dispatch(out);
    }

    fn dispatch(&self, out: Outbox) {
        if !out.changes.is_empty() {
            let listeners: Vec<ChangeListener> = self
                .change_listeners
                .borrow()
                .iter()
                .map(|(_, l)| Rc::clone(l))
                .collect();
            for change in &out.changes {
                tracing::debug!(
                    kind = change.kind.as_str(),
                    id = %change.id,
                    loaded = change.current.is_loaded,
                    active = change.current.is_active,
                    distance = change.current.distance_to_camera,
                    "boundary changed"
                );
                for listener in &listeners {
                    listener(change);
                }
            }
        }

        for (id, preload) in out.preloads {
            tracing::debug!(id = %id, "preload fired");
            preload();
        }

        if let Some(selected) = out.route {
            tracing::debug!(
                focus = selected.as_ref().map(|a| a.id()).unwrap_or("<none>"),
                "closest active entity changed"
            );
            let listeners: Vec<RouteListener> = self
                .route_listeners
                .borrow()
                .iter()
                .map(|(_, l)| Rc::clone(l))
                .collect();
            for listener in listeners {
                listener(selected.as_ref());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BoundaryManager;
    use crate::config::BoundaryConfig;
    use crate::entity::{Entity, EntityKind};
    use crate::policy::TieBreak;
    use camera::store::CameraStore;
    use foundation::math::{Vec2, Vec3};
    use foundation::time::Time;
    use pretty_assertions::assert_eq;
    use runtime::timers::Timers;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn island(id: &str, x: f64, y: f64) -> Entity {
        Entity::island(id, id.to_uppercase(), Vec3::new(x, y, 0.0))
    }

    fn route_log(manager: &BoundaryManager) -> Rc<RefCell<Vec<Option<String>>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&log);
        manager.on_route_change(move |a| l.borrow_mut().push(a.map(|a| a.id().to_string())));
        log
    }

    #[test]
    fn distance_is_planar() {
        let manager = BoundaryManager::default();
        manager.update(Vec2::new(100.0, 100.0));
        manager.register_island(
            Entity::island("about", "About", Vec3::new(400.0, 300.0, -900.0)),
            BoundaryConfig::new(1000.0, 500.0),
        );

        let state = manager.get_island_state("about").expect("registered");
        assert!((state.distance_to_camera - 360.555_127_546_398_9).abs() < 1e-9);
        assert!(state.is_loaded);
        assert!(state.is_active);
    }

    #[test]
    fn active_implies_loaded_for_nested_configs() {
        let manager = BoundaryManager::default();
        manager.register_island(island("a", 0.0, 0.0), BoundaryConfig::new(800.0, 200.0));
        manager.register_island(island("b", 1500.0, 0.0), BoundaryConfig::new(600.0, 600.0));

        for step in 0..40 {
            manager.update(Vec2::new(step as f64 * 50.0, 30.0));
            for id in ["a", "b"] {
                let s = manager.get_island_state(id).expect("registered");
                assert!(!s.is_active || s.is_loaded, "{id} at step {step}");
            }
        }
    }

    #[test]
    fn preload_fires_once_per_registration() {
        let manager = BoundaryManager::default();
        manager.update(Vec2::new(10_000.0, 0.0));
        manager.register_island(island("home", 0.0, 0.0), BoundaryConfig::new(1000.0, 400.0));

        let fired = Rc::new(Cell::new(0));
        let f = Rc::clone(&fired);
        manager.register_preload("home", move || f.set(f.get() + 1));

        for x in [1900.0, 2500.0, 1500.0, 5000.0, 100.0] {
            manager.update(Vec2::new(x, 0.0));
        }
        assert_eq!(fired.get(), 1);

        // A fresh registration lifetime gets a fresh one-shot.
        manager.unregister_island("home");
        manager.update(Vec2::new(10_000.0, 0.0));
        manager.register_island(island("home", 0.0, 0.0), BoundaryConfig::new(1000.0, 400.0));
        let f = Rc::clone(&fired);
        manager.register_preload("home", move || f.set(f.get() + 1));
        manager.update(Vec2::new(1999.0, 0.0));
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn preload_registered_inside_prewarm_fires_immediately() {
        let manager = BoundaryManager::default();
        manager.register_island(island("home", 0.0, 0.0), BoundaryConfig::new(1000.0, 400.0));
        let fired = Rc::new(Cell::new(false));
        let f = Rc::clone(&fired);
        manager.register_preload("home", move || f.set(true));
        assert!(fired.get());
    }

    #[test]
    fn panning_prewarms_before_loading() {
        let manager = BoundaryManager::default();
        manager.update(Vec2::new(5000.0, 5000.0));
        manager.register_island(island("home", 0.0, 0.0), BoundaryConfig::new(3000.0, 800.0));
        let preloaded = Rc::new(Cell::new(false));
        let p = Rc::clone(&preloaded);
        manager.register_preload("home", move || p.set(true));

        assert!(!manager.get_island_state("home").expect("home").is_loaded);
        assert!(!preloaded.get());

        manager.update(Vec2::new(4000.0, 4000.0));
        assert!(preloaded.get());
        assert!(!manager.get_island_state("home").expect("home").is_loaded);

        manager.update(Vec2::new(2000.0, 2000.0));
        let state = manager.get_island_state("home").expect("home");
        assert!(state.is_loaded);
        assert!(!state.is_active);
        assert!((state.distance_to_camera - 2828.427_124_746_19).abs() < 1e-6);
    }

    #[test]
    fn equidistant_tie_goes_to_first_registered() {
        let manager = BoundaryManager::default();
        manager.update(Vec2::new(0.0, 0.0));
        manager.register_island(island("west", -100.0, 0.0), BoundaryConfig::new(500.0, 300.0));
        manager.register_island(island("east", 100.0, 0.0), BoundaryConfig::new(500.0, 300.0));
        assert_eq!(manager.closest_active().expect("focus").id(), "west");

        let latest = BoundaryManager::new(TieBreak::LatestRegistration);
        latest.register_island(island("west", -100.0, 0.0), BoundaryConfig::new(500.0, 300.0));
        latest.register_island(island("east", 100.0, 0.0), BoundaryConfig::new(500.0, 300.0));
        assert_eq!(latest.closest_active().expect("focus").id(), "east");
    }

    #[test]
    fn tie_break_ignores_id_ordering() {
        let manager = BoundaryManager::default();
        manager.register_island(island("zeta", 0.0, 100.0), BoundaryConfig::new(500.0, 300.0));
        manager.register_island(island("alpha", 0.0, -100.0), BoundaryConfig::new(500.0, 300.0));
        assert_eq!(manager.closest_active().expect("focus").id(), "zeta");
    }

    #[test]
    fn route_change_fires_only_on_identity_change() {
        let manager = BoundaryManager::default();
        manager.update(Vec2::new(-5000.0, 0.0));
        let log = route_log(&manager);
        manager.register_island(island("home", 0.0, 0.0), BoundaryConfig::new(1000.0, 400.0));
        manager.register_island(island("work", 2000.0, 0.0), BoundaryConfig::new(1000.0, 400.0));

        for x in [-300.0, -100.0, 0.0, 150.0, 1000.0, 1800.0, 1900.0, 2000.0, 5000.0] {
            manager.update(Vec2::new(x, 0.0));
        }

        assert_eq!(
            *log.borrow(),
            vec![
                Some("home".to_string()),
                None,
                Some("work".to_string()),
                None
            ]
        );
    }

    #[test]
    fn reregistration_replaces_config_in_place() {
        let manager = BoundaryManager::default();
        manager.update(Vec2::new(0.0, 0.0));
        manager.register_island(island("a", 100.0, 0.0), BoundaryConfig::new(500.0, 300.0));
        manager.register_island(island("b", -100.0, 0.0), BoundaryConfig::new(500.0, 300.0));
        manager.register_island(island("a", 100.0, 0.0), BoundaryConfig::new(50.0, 10.0));

        assert_eq!(manager.entities(EntityKind::Island).len(), 2);
        assert_eq!(
            manager.get_boundaries(EntityKind::Island, "a"),
            Some(BoundaryConfig::new(50.0, 10.0))
        );
        assert!(!manager.get_island_state("a").expect("a").is_loaded);
        assert_eq!(manager.closest_active().expect("focus").id(), "b");

        // Same config again keeps "a" ahead of "b" in registration order.
        manager.register_island(island("a", 100.0, 0.0), BoundaryConfig::new(500.0, 300.0));
        assert_eq!(manager.closest_active().expect("focus").id(), "a");
    }

    #[test]
    fn unregister_clears_state_and_stops_updates() {
        let manager = BoundaryManager::default();
        manager.register_island(island("home", 0.0, 0.0), BoundaryConfig::new(1000.0, 400.0));
        let changes = Rc::new(RefCell::new(Vec::new()));
        let c = Rc::clone(&changes);
        manager.on_boundary_change(move |ch| c.borrow_mut().push(ch.id.clone()));
        let log = route_log(&manager);

        manager.unregister_island("home");
        manager.unregister_island("home");
        assert_eq!(manager.get_island_state("home"), None);
        assert_eq!(*log.borrow(), vec![None]);

        manager.update(Vec2::new(5000.0, 0.0));
        manager.update(Vec2::new(0.0, 0.0));
        assert!(changes.borrow().is_empty());
        assert_eq!(manager.get_island_state("home"), None);
    }

    #[test]
    fn unknown_ids_are_absent() {
        let manager = BoundaryManager::default();
        assert_eq!(manager.get_island_state("nope"), None);
        assert_eq!(manager.get_section_state("nope"), None);
        assert_eq!(manager.get_island_position("nope"), None);
        manager.unregister_section("nope");
        assert!(!manager.unregister_preload("nope"));
    }

    #[test]
    fn sections_map_to_islands_and_can_take_focus() {
        let manager = BoundaryManager::default();
        manager.update(Vec2::new(5000.0, 0.0));
        manager.register_island(island("projects", 5000.0, 600.0), BoundaryConfig::new(2000.0, 300.0));
        manager.register_section(
            Entity::section("projects-rust", "Rust", Vec3::new(5000.0, 0.0, 0.0), "projects"),
            BoundaryConfig::new(800.0, 200.0),
        );

        let map = manager.get_section_island_map();
        assert_eq!(map.get("projects-rust").map(String::as_str), Some("projects"));
        let focus = manager.closest_active().expect("focus");
        assert_eq!(focus.kind, EntityKind::Section);
        assert_eq!(focus.id(), "projects-rust");
    }

    #[test]
    fn inverted_radii_are_accepted_as_given() {
        let manager = BoundaryManager::default();
        manager.update(Vec2::new(300.0, 0.0));
        manager.register_island(island("odd", 0.0, 0.0), BoundaryConfig::new(100.0, 500.0));
        let state = manager.get_island_state("odd").expect("odd");
        assert!(state.is_active);
        assert!(!state.is_loaded);
    }

    #[test]
    fn boundary_changes_report_flips_only() {
        let manager = BoundaryManager::default();
        manager.update(Vec2::new(5000.0, 0.0));
        let changes = Rc::new(RefCell::new(Vec::new()));
        let c = Rc::clone(&changes);
        manager.on_boundary_change(move |ch| {
            c.borrow_mut()
                .push((ch.id.clone(), ch.current.is_loaded, ch.current.is_active))
        });
        manager.register_island(island("home", 0.0, 0.0), BoundaryConfig::new(1000.0, 400.0));

        for x in [4000.0, 900.0, 800.0, 300.0, 200.0, 3000.0] {
            manager.update(Vec2::new(x, 0.0));
        }
        assert_eq!(
            *changes.borrow(),
            vec![
                ("home".to_string(), true, false),
                ("home".to_string(), true, true),
                ("home".to_string(), false, false),
            ]
        );
    }

    #[test]
    fn attached_manager_follows_throttled_camera() {
        let timers = Rc::new(Timers::new());
        let store = Rc::new(CameraStore::new(Rc::clone(&timers)));
        let manager = Rc::new(BoundaryManager::default());
        manager.register_island(island("far", 10_000.0, 0.0), BoundaryConfig::new(1000.0, 400.0));
        manager.attach(&store);

        store.set_position(Vec3::new(9_500.0, 0.0, 5.0));
        assert!(manager.get_island_state("far").expect("far").is_loaded);

        timers.advance_to(Time(10.0));
        store.set_position(Vec3::new(10_000.0, 0.0, 5.0));
        assert!(!manager.get_island_state("far").expect("far").is_active);
        timers.advance_to(Time(100.0));
        assert!(manager.get_island_state("far").expect("far").is_active);

        manager.detach();
        assert_eq!(store.listener_count(), 0);
    }
}

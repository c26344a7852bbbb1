use std::cell::{Cell, RefCell};
use std::rc::Rc;

use foundation::math::Vec3;
use runtime::throttle::Throttle;
use runtime::timers::Timers;

use crate::state::CameraState;

pub const DEFAULT_NOTIFY_THROTTLE_MS: f64 = 100.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listeners = Rc<RefCell<Vec<(ListenerId, Rc<dyn Fn()>)>>>;

/// Owner of the shared camera state.
///
/// Writes land immediately and are visible to the next [`get_state`] call.
/// Subscribers are only told *that* something changed, at most once per
/// throttle window with a guaranteed trailing notification, and must re-read
/// [`get_state`] themselves. Individual writes may be coalesced.
///
/// [`get_state`]: CameraStore::get_state
pub struct CameraStore {
    state: Cell<CameraState>,
    listeners: Listeners,
    next_listener: Cell<u64>,
    throttle: Throttle,
    notify: Rc<dyn Fn()>,
}

impl std::fmt::Debug for CameraStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraStore")
            .field("state", &self.state.get())
            .field("listeners", &self.listeners.borrow().len())
            .field("throttle_ms", &self.throttle.delay_ms())
            .finish()
    }
}

impl CameraStore {
    pub fn new(timers: Rc<Timers>) -> Self {
        Self::with_throttle(timers, DEFAULT_NOTIFY_THROTTLE_MS)
    }

    pub fn with_throttle(timers: Rc<Timers>, throttle_ms: f64) -> Self {
        let listeners: Listeners = Rc::new(RefCell::new(Vec::new()));
        let fan_out = Rc::clone(&listeners);
        let notify: Rc<dyn Fn()> = Rc::new(move || {
            // Snapshot so listeners can (un)subscribe while being notified.
            let current: Vec<Rc<dyn Fn()>> =
                fan_out.borrow().iter().map(|(_, l)| Rc::clone(l)).collect();
            for listener in current {
                listener();
            }
        });

        Self {
            state: Cell::new(CameraState::default()),
            listeners,
            next_listener: Cell::new(0),
            throttle: Throttle::new(timers, throttle_ms),
            notify,
        }
    }

    pub fn get_state(&self) -> CameraState {
        self.state.get()
    }

    pub fn set_position(&self, position: Vec3) {
        self.write(|s| s.position = position);
    }

    pub fn set_rotation(&self, rotation: Vec3) {
        self.write(|s| s.rotation = rotation);
    }

    /// Ignores non-positive or non-finite values.
    pub fn set_fov(&self, fov: f64) {
        if !(fov.is_finite() && fov > 0.0) {
            tracing::warn!(fov, "ignoring invalid camera fov");
            return;
        }
        self.write(|s| s.fov = fov);
    }

    /// Ignores non-positive or non-finite values.
    pub fn set_zoom(&self, zoom: f64) {
        if !(zoom.is_finite() && zoom > 0.0) {
            tracing::warn!(zoom, "ignoring invalid camera zoom");
            return;
        }
        self.write(|s| s.zoom = zoom);
    }

    pub fn subscribe(&self, listener: impl Fn() + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(self.next_listener.get().wrapping_add(1));
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn write(&self, f: impl FnOnce(&mut CameraState)) {
        let mut state = self.state.get();
        f(&mut state);
        self.state.set(state);
        self.throttle.call(Rc::clone(&self.notify));
    }
}

#[cfg(test)]
mod tests {
    use super::CameraStore;
    use foundation::math::Vec3;
    use foundation::time::Time;
    use runtime::timers::Timers;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store() -> (Rc<Timers>, Rc<CameraStore>) {
        let timers = Rc::new(Timers::new());
        let store = Rc::new(CameraStore::new(Rc::clone(&timers)));
        (timers, store)
    }

    #[test]
    fn defaults_hold_invariants() {
        let (_timers, store) = store();
        let s = store.get_state();
        assert_eq!(s.position, Vec3::new(0.0, 0.0, 5.0));
        assert!(s.zoom > 0.0);
        assert!(s.fov > 0.0);
    }

    #[test]
    fn writes_are_visible_before_notification() {
        let (_timers, store) = store();
        store.set_position(Vec3::new(1.0, 2.0, 3.0));
        store.set_zoom(2.5);
        let s = store.get_state();
        assert_eq!(s.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(s.zoom, 2.5);
    }

    #[test]
    fn burst_within_window_notifies_once_with_last_position() {
        let (timers, store) = store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = Rc::clone(&seen);
            let reader = Rc::clone(&store);
            store.subscribe(move || seen.borrow_mut().push(reader.get_state().position.x));
        }

        // Opening write fires on the leading edge and starts a window.
        store.set_position(Vec3::new(-1.0, 0.0, 5.0));
        assert_eq!(*seen.borrow(), vec![-1.0]);

        timers.advance_to(Time(5.0));
        for i in 0..10 {
            timers.advance_to(Time(5.0 + i as f64 * 9.0));
            store.set_position(Vec3::new(i as f64, 0.0, 5.0));
        }
        assert_eq!(seen.borrow().len(), 1);

        timers.advance_to(Time(100.0));
        assert_eq!(*seen.borrow(), vec![-1.0, 9.0]);

        timers.advance_to(Time(1000.0));
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn invalid_zoom_and_fov_are_ignored() {
        let (_timers, store) = store();
        let before = store.get_state();
        store.set_zoom(0.0);
        store.set_zoom(f64::NAN);
        store.set_fov(-1.0);
        assert_eq!(store.get_state(), before);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let (timers, store) = store();
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        let id = store.subscribe(move || *c.borrow_mut() += 1);

        store.set_zoom(2.0);
        assert!(store.unsubscribe(id));
        timers.advance_to(Time(500.0));
        store.set_zoom(3.0);
        assert_eq!(*count.borrow(), 1);
        assert_eq!(store.listener_count(), 0);
    }
}

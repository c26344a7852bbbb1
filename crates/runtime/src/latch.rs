use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::timers::{TimerId, Timers};

type ReleaseHook = Rc<RefCell<Option<Rc<dyn Fn()>>>>;

/// Boolean lock that releases itself after a bounded hold.
///
/// Holding again while held restarts the hold window. The release hook runs
/// when the window runs out, not on an explicit [`release`](Latch::release).
pub struct Latch {
    name: &'static str,
    timers: Rc<Timers>,
    hold_ms: f64,
    held: Rc<Cell<bool>>,
    release: Rc<Cell<Option<TimerId>>>,
    on_release: ReleaseHook,
}

impl std::fmt::Debug for Latch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Latch")
            .field("name", &self.name)
            .field("hold_ms", &self.hold_ms)
            .field("held", &self.held.get())
            .field("has_release_hook", &self.on_release.borrow().is_some())
            .finish()
    }
}

impl Latch {
    pub fn new(name: &'static str, timers: Rc<Timers>, hold_ms: f64) -> Self {
        Self {
            name,
            timers,
            hold_ms: hold_ms.max(0.0),
            held: Rc::new(Cell::new(false)),
            release: Rc::new(Cell::new(None)),
            on_release: Rc::new(RefCell::new(None)),
        }
    }

    /// Replaces the hook run after each timed release.
    pub fn on_release(&self, hook: impl Fn() + 'static) {
        *self.on_release.borrow_mut() = Some(Rc::new(hook));
    }

    pub fn is_held(&self) -> bool {
        self.held.get()
    }

    pub fn hold(&self) {
        if let Some(id) = self.release.take() {
            self.timers.cancel(id);
        }
        self.held.set(true);
        tracing::debug!(latch = self.name, hold_ms = self.hold_ms, "latch held");

        let held = Rc::clone(&self.held);
        let release = Rc::clone(&self.release);
        let on_release = Rc::clone(&self.on_release);
        let name = self.name;
        let id = self.timers.schedule_in(self.hold_ms, move || {
            held.set(false);
            release.set(None);
            tracing::debug!(latch = name, "latch released");
            let hook = on_release.borrow().clone();
            if let Some(hook) = hook {
                hook();
            }
        });
        self.release.set(Some(id));
    }

    pub fn release(&self) {
        if let Some(id) = self.release.take() {
            self.timers.cancel(id);
        }
        self.held.set(false);
    }
}

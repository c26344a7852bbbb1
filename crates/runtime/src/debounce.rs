use std::cell::Cell;
use std::rc::Rc;

use crate::timers::{TimerId, Timers};

/// Runs only the last call of a burst, `delay_ms` after that call.
#[derive(Debug)]
pub struct Debounce {
    timers: Rc<Timers>,
    delay_ms: f64,
    pending: Rc<Cell<Option<TimerId>>>,
}

impl Debounce {
    pub fn new(timers: Rc<Timers>, delay_ms: f64) -> Self {
        Self {
            timers,
            delay_ms: delay_ms.max(0.0),
            pending: Rc::new(Cell::new(None)),
        }
    }

    pub fn call(&self, f: impl FnOnce() + 'static) {
        self.cancel();
        let pending = Rc::clone(&self.pending);
        let id = self.timers.schedule_in(self.delay_ms, move || {
            pending.set(None);
            f();
        });
        self.pending.set(Some(id));
    }

    pub fn cancel(&self) {
        if let Some(id) = self.pending.take() {
            self.timers.cancel(id);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }
}

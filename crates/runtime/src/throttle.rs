use std::cell::RefCell;
use std::rc::Rc;

use foundation::time::Time;

use crate::timers::{TimerId, Timers};

#[derive(Debug, Default)]
struct ThrottleState {
    last_fire: Option<Time>,
    pending: Option<TimerId>,
}

/// Rate limiter with a guaranteed trailing call.
///
/// - A call passes immediately if `delay_ms` has elapsed since the last fire.
/// - Otherwise a single trailing call is scheduled for `last_fire + delay_ms`.
///   A newer call replaces the scheduled one, so at most one timer is ever
///   outstanding and the trailing call always runs the most recent callback.
#[derive(Debug)]
pub struct Throttle {
    timers: Rc<Timers>,
    delay_ms: f64,
    state: Rc<RefCell<ThrottleState>>,
}

impl Throttle {
    pub fn new(timers: Rc<Timers>, delay_ms: f64) -> Self {
        Self {
            timers,
            delay_ms: delay_ms.max(0.0),
            state: Rc::new(RefCell::new(ThrottleState::default())),
        }
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    pub fn has_pending(&self) -> bool {
        self.state.borrow().pending.is_some()
    }

    pub fn call(&self, f: Rc<dyn Fn()>) {
        let now = self.timers.now();
        let elapsed = {
            let state = self.state.borrow();
            state.last_fire.map(|last| now.since(last))
        };

        match elapsed {
            Some(elapsed) if elapsed < self.delay_ms => {
                let previous = self.state.borrow_mut().pending.take();
                if let Some(id) = previous {
                    self.timers.cancel(id);
                }

                let state = Rc::clone(&self.state);
                let timers = Rc::clone(&self.timers);
                let id = self.timers.schedule_in(self.delay_ms - elapsed, move || {
                    {
                        let mut s = state.borrow_mut();
                        s.pending = None;
                        s.last_fire = Some(timers.now());
                    }
                    f();
                });
                self.state.borrow_mut().pending = Some(id);
            }
            _ => {
                self.state.borrow_mut().last_fire = Some(now);
                f();
            }
        }
    }

    /// Drops any scheduled trailing call.
    pub fn cancel(&self) {
        if let Some(id) = self.state.borrow_mut().pending.take() {
            self.timers.cancel(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Throttle;
    use crate::timers::Timers;
    use foundation::time::Time;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn counter() -> (Rc<Cell<u32>>, Rc<dyn Fn()>) {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        (count, Rc::new(move || c.set(c.get() + 1)))
    }

    #[test]
    fn first_call_passes_immediately() {
        let timers = Rc::new(Timers::new());
        let throttle = Throttle::new(Rc::clone(&timers), 100.0);
        let (count, f) = counter();

        throttle.call(f);
        assert_eq!(count.get(), 1);
        assert!(!throttle.has_pending());
    }

    #[test]
    fn burst_inside_window_collapses_to_one_trailing_call() {
        let timers = Rc::new(Timers::new());
        let throttle = Throttle::new(Rc::clone(&timers), 100.0);
        let (count, f) = counter();

        throttle.call(Rc::clone(&f));
        for i in 1..=9 {
            timers.advance_to(Time(i as f64 * 10.0));
            throttle.call(Rc::clone(&f));
        }
        assert_eq!(count.get(), 1);
        assert_eq!(timers.pending_len(), 1);

        timers.advance_to(Time(100.0));
        assert_eq!(count.get(), 2);
        assert!(!throttle.has_pending());
    }

    #[test]
    fn trailing_call_runs_latest_callback() {
        let timers = Rc::new(Timers::new());
        let throttle = Throttle::new(Rc::clone(&timers), 100.0);
        let seen = Rc::new(RefCell::new(Vec::new()));

        for tag in ["leading", "dropped", "latest"] {
            let s = Rc::clone(&seen);
            throttle.call(Rc::new(move || s.borrow_mut().push(tag)));
            timers.advance_by(10.0);
        }
        timers.advance_by(200.0);
        assert_eq!(*seen.borrow(), vec!["leading", "latest"]);
    }

    #[test]
    fn call_after_window_passes_again() {
        let timers = Rc::new(Timers::new());
        let throttle = Throttle::new(Rc::clone(&timers), 100.0);
        let (count, f) = counter();

        throttle.call(Rc::clone(&f));
        timers.advance_to(Time(150.0));
        throttle.call(f);
        assert_eq!(count.get(), 2);
    }
}

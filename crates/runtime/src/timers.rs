use std::cell::{Cell, RefCell};

use foundation::time::Time;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

struct Entry {
    due: Time,
    id: TimerId,
    callback: Box<dyn FnOnce()>,
}

/// Single-threaded timer queue driven by an explicit clock.
///
/// This plays the role of `setTimeout` for the engine. The host advances the
/// clock (from the animation frame timestamp, or a replay script) and due
/// callbacks run in `(due, id)` order, so equal deadlines fire in the order
/// they were scheduled.
///
/// Callbacks run with no internal borrow held: they may schedule or cancel
/// timers, and anything they schedule that falls due inside the current
/// advance also fires before `advance_to` returns.
pub struct Timers {
    now: Cell<Time>,
    next_id: Cell<u64>,
    pending: RefCell<Vec<Entry>>,
}

impl std::fmt::Debug for Timers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timers")
            .field("now", &self.now.get())
            .field("pending", &self.pending.borrow().len())
            .finish()
    }
}

impl Default for Timers {
    fn default() -> Self {
        Self::new()
    }
}

impl Timers {
    pub fn new() -> Self {
        Self::starting_at(Time::ZERO)
    }

    pub fn starting_at(now: Time) -> Self {
        Self {
            now: Cell::new(now),
            next_id: Cell::new(0),
            pending: RefCell::new(Vec::new()),
        }
    }

    /// Current clock value. Inside a callback this is the callback's deadline.
    pub fn now(&self) -> Time {
        self.now.get()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn schedule_at(&self, due: Time, callback: impl FnOnce() + 'static) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(self.next_id.get().wrapping_add(1));
        self.pending.borrow_mut().push(Entry {
            due,
            id,
            callback: Box::new(callback),
        });
        id
    }

    pub fn schedule_in(&self, delay_ms: f64, callback: impl FnOnce() + 'static) -> TimerId {
        self.schedule_at(self.now().after(delay_ms.max(0.0)), callback)
    }

    /// Returns `true` if the timer was still pending.
    pub fn cancel(&self, id: TimerId) -> bool {
        let mut pending = self.pending.borrow_mut();
        let before = pending.len();
        pending.retain(|e| e.id != id);
        pending.len() != before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.borrow().iter().any(|e| e.id == id)
    }

    /// Moves the clock forward to `to`, firing every timer due on the way.
    ///
    /// The clock never runs backwards; an earlier `to` only fires timers that
    /// are already overdue.
    pub fn advance_to(&self, to: Time) -> usize {
        let target = if to < self.now() { self.now() } else { to };
        let mut fired = 0usize;

        while let Some(entry) = self.take_next_due(target) {
            if entry.due > self.now() {
                self.now.set(entry.due);
            }
            tracing::trace!(timer = entry.id.0, due_ms = entry.due.0, "timer fired");
            (entry.callback)();
            fired += 1;
        }

        self.now.set(target);
        fired
    }

    pub fn advance_by(&self, ms: f64) -> usize {
        self.advance_to(self.now().after(ms))
    }

    fn take_next_due(&self, target: Time) -> Option<Entry> {
        let mut pending = self.pending.borrow_mut();
        let idx = pending
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= target)
            .min_by(|(_, a), (_, b)| {
                a.due
                    .0
                    .total_cmp(&b.due.0)
                    .then_with(|| a.id.cmp(&b.id))
            })
            .map(|(idx, _)| idx)?;
        Some(pending.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::Timers;
    use foundation::time::Time;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn fires_in_deadline_then_schedule_order() {
        let timers = Timers::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (delay, name) in [(30.0, "c"), (10.0, "a"), (10.0, "b")] {
            let log = Rc::clone(&log);
            timers.schedule_in(delay, move || log.borrow_mut().push(name));
        }

        assert_eq!(timers.advance_to(Time(20.0)), 2);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
        timers.advance_to(Time(30.0));
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(timers.pending_len(), 0);
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let timers = Timers::new();
        let hit = Rc::new(RefCell::new(false));
        let h = Rc::clone(&hit);
        let id = timers.schedule_in(5.0, move || *h.borrow_mut() = true);

        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        timers.advance_by(100.0);
        assert!(!*hit.borrow());
    }

    #[test]
    fn callbacks_observe_their_deadline_and_may_reschedule() {
        let timers = Rc::new(Timers::new());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let t = Rc::clone(&timers);
        let s = Rc::clone(&seen);
        timers.schedule_in(10.0, move || {
            s.borrow_mut().push(t.now().0);
            let s2 = Rc::clone(&s);
            let t2 = Rc::clone(&t);
            t.schedule_in(15.0, move || s2.borrow_mut().push(t2.now().0));
        });

        timers.advance_to(Time(100.0));
        assert_eq!(*seen.borrow(), vec![10.0, 25.0]);
        assert_eq!(timers.now(), Time(100.0));
    }

    #[test]
    fn clock_is_monotonic() {
        let timers = Timers::starting_at(Time(50.0));
        timers.advance_to(Time(10.0));
        assert_eq!(timers.now(), Time(50.0));
    }
}

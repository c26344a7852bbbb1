use std::cell::{Cell, RefCell};

use foundation::time::Time;

use crate::frame::Frame;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

struct Task {
    id: TaskId,
    name: &'static str,
    /// Smaller values run earlier.
    priority: i32,
    run: Box<dyn FnMut(Frame)>,
}

/// Shared animation ticker: the render clock.
///
/// Every registered task runs once per [`tick`](Ticker::tick), ordered by
/// `(priority, insertion order)`. Tasks may add or remove tasks while
/// running; additions take effect from the next frame.
#[derive(Default)]
pub struct Ticker {
    next_id: Cell<u64>,
    last: Cell<Option<Frame>>,
    tasks: RefCell<Vec<Task>>,
    removed: RefCell<Vec<TaskId>>,
}

impl std::fmt::Debug for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&'static str> = self.tasks.borrow().iter().map(|t| t.name).collect();
        f.debug_struct("Ticker")
            .field("last", &self.last.get())
            .field("tasks", &names)
            .finish()
    }
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &self,
        name: &'static str,
        priority: i32,
        run: impl FnMut(Frame) + 'static,
    ) -> TaskId {
        let id = TaskId(self.next_id.get());
        self.next_id.set(self.next_id.get().wrapping_add(1));
        self.tasks.borrow_mut().push(Task {
            id,
            name,
            priority,
            run: Box::new(run),
        });
        id
    }

    pub fn remove(&self, id: TaskId) {
        let mut tasks = self.tasks.borrow_mut();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            // Removed from inside a running task; drop it once the frame ends.
            self.removed.borrow_mut().push(id);
        }
    }

    pub fn task_count(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.last.get()
    }

    /// Runs one frame at host time `now` and returns its metadata.
    pub fn tick(&self, now: Time) -> Frame {
        let frame = match self.last.get() {
            Some(prev) => prev.next(now),
            None => Frame::first(now),
        };
        self.last.set(Some(frame));

        let mut running = std::mem::take(&mut *self.tasks.borrow_mut());
        // Stable sort keeps insertion order within a priority.
        running.sort_by_key(|t| t.priority);
        for task in running.iter_mut() {
            if self.removed.borrow().contains(&task.id) {
                continue;
            }
            (task.run)(frame);
        }

        let removed = std::mem::take(&mut *self.removed.borrow_mut());
        running.retain(|t| !removed.contains(&t.id));
        let mut tasks = self.tasks.borrow_mut();
        let added = std::mem::take(&mut *tasks);
        *tasks = running;
        tasks.extend(added);
        frame
    }
}

use std::cell::RefCell;

/// The browser history as seen by route sync.
pub trait History {
    fn current_path(&self) -> String;
    /// Replaces the current entry without adding to the back stack.
    fn replace(&self, path: &str);
    fn push(&self, path: &str);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Navigation {
    Push,
    Replace,
}

/// In-memory history that records every navigation, for tests and replays.
#[derive(Debug)]
pub struct MemoryHistory {
    entries: RefCell<Vec<String>>,
    log: RefCell<Vec<(Navigation, String)>>,
}

impl MemoryHistory {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: RefCell::new(vec![initial.into()]),
            log: RefCell::new(Vec::new()),
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    pub fn navigations(&self) -> Vec<(Navigation, String)> {
        self.log.borrow().clone()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl History for MemoryHistory {
    fn current_path(&self) -> String {
        self.entries.borrow().last().cloned().unwrap_or_default()
    }

    fn replace(&self, path: &str) {
        let mut entries = self.entries.borrow_mut();
        match entries.last_mut() {
            Some(last) => *last = path.to_string(),
            None => entries.push(path.to_string()),
        }
        self.log
            .borrow_mut()
            .push((Navigation::Replace, path.to_string()));
    }

    fn push(&self, path: &str) {
        self.entries.borrow_mut().push(path.to_string());
        self.log.borrow_mut().push((Navigation::Push, path.to_string()));
    }
}

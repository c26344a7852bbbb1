use std::cell::Cell;
use std::rc::{Rc, Weak};

use boundary::entity::ActiveEntity;
use boundary::manager::{BoundaryManager, ListenerId};
use camera::animator::{CameraAnimator, MoveOptions};
use runtime::debounce::Debounce;
use runtime::latch::Latch;
use runtime::timers::Timers;
use serde::{Deserialize, Serialize};

use crate::history::History;
use crate::path::{HOME_PATH, generate_route_path, parse_route_path};

/// What camera-driven routing does when no entity is in focus.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VacancyPolicy {
    /// Stay on the current route while the camera is between islands.
    #[default]
    KeepCurrent,
    /// Fall back to `/`.
    NavigateHome,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RouteSyncConfig {
    /// Quiet period before a focus change becomes a navigation.
    pub debounce_ms: f64,
    /// How long a URL-driven jump blocks camera-driven navigation.
    pub url_lock_ms: f64,
    /// How long our own navigation blocks URL-driven jumps.
    pub nav_lock_ms: f64,
    pub vacancy: VacancyPolicy,
}

impl Default for RouteSyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300.0,
            url_lock_ms: 1000.0,
            nav_lock_ms: 100.0,
            vacancy: VacancyPolicy::KeepCurrent,
        }
    }
}

/// Keeps the URL and the camera consistent without feedback loops.
///
/// URL to camera: a route change parses to an island id and the camera
/// jumps there instantly. The URL lock is then held for `url_lock_ms`, so the
/// focus changes caused by the jump do not navigate.
///
/// Camera to URL: focus changes from the [`BoundaryManager`] are debounced
/// and then replace the current history entry, unless the URL lock is held.
/// A navigation dropped under the URL lock is reconciled once the lock runs
/// out, against whatever is in focus by then. The navigation lock is held for `nav_lock_ms` so the route change we just
/// caused is not treated as a request to move the camera.
///
/// Both directions only run while the experience is active. The first URL
/// reconciliation after re-activation is skipped so the camera keeps the
/// position it had when the experience was left.
pub struct RouteSync {
    manager: Rc<BoundaryManager>,
    animator: Rc<CameraAnimator>,
    history: Rc<dyn History>,
    config: RouteSyncConfig,
    debounce: Debounce,
    url_lock: Latch,
    nav_lock: Latch,
    active: Cell<bool>,
    skip_next_location: Cell<bool>,
    suppressed: Cell<bool>,
    listener: Cell<Option<ListenerId>>,
}

impl std::fmt::Debug for RouteSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteSync")
            .field("config", &self.config)
            .field("active", &self.active.get())
            .field("url_locked", &self.url_lock.is_held())
            .field("nav_locked", &self.nav_lock.is_held())
            .field("pending", &self.debounce.is_pending())
            .finish()
    }
}

impl RouteSync {
    pub fn new(
        manager: Rc<BoundaryManager>,
        animator: Rc<CameraAnimator>,
        history: Rc<dyn History>,
        timers: Rc<Timers>,
        config: RouteSyncConfig,
    ) -> Rc<Self> {
        let sync = Rc::new(Self {
            manager: Rc::clone(&manager),
            animator,
            history,
            config,
            debounce: Debounce::new(Rc::clone(&timers), config.debounce_ms),
            url_lock: Latch::new("url-driven", Rc::clone(&timers), config.url_lock_ms),
            nav_lock: Latch::new("viewport-driven", timers, config.nav_lock_ms),
            active: Cell::new(true),
            skip_next_location: Cell::new(false),
            suppressed: Cell::new(false),
            listener: Cell::new(None),
        });

        let weak: Weak<Self> = Rc::downgrade(&sync);
        let id = manager.on_route_change(move |focus| {
            if let Some(sync) = weak.upgrade() {
                sync.focus_changed(focus);
            }
        });
        sync.listener.set(Some(id));

        let weak: Weak<Self> = Rc::downgrade(&sync);
        sync.url_lock.on_release(move || {
            if let Some(sync) = weak.upgrade() {
                sync.reconcile_after_url_lock();
            }
        });
        sync
    }

    pub fn config(&self) -> RouteSyncConfig {
        self.config
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn is_url_locked(&self) -> bool {
        self.url_lock.is_held()
    }

    pub fn is_navigating(&self) -> bool {
        self.nav_lock.is_held()
    }

    pub fn has_pending_navigation(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Toggles the 3D experience. Re-activation skips the next URL pass.
    pub fn set_active(&self, active: bool) {
        let was_active = self.active.replace(active);
        if active && !was_active {
            self.skip_next_location.set(true);
        }
        if !active {
            self.debounce.cancel();
        }
        tracing::debug!(active, "route sync activity changed");
    }

    /// URL to camera. Returns `true` if the camera was moved.
    pub fn location_changed(&self, path: &str) -> bool {
        if !self.active.get() {
            return false;
        }
        if self.skip_next_location.replace(false) {
            tracing::debug!(path, "skipping first location pass after activation");
            return false;
        }
        if self.nav_lock.is_held() {
            // This route change is the echo of our own navigation.
            return false;
        }

        let Some(id) = parse_route_path(path) else {
            return false;
        };
        let target = self
            .manager
            .get_island_position(&id)
            .or_else(|| self.manager.get_section_position(&id));
        let Some(target) = target else {
            tracing::warn!(path, id = %id, "route names no registered island");
            return false;
        };

        tracing::debug!(path, id = %id, "jumping camera to route");
        self.url_lock.hold();
        self.animator.move_to(target, MoveOptions::instant());
        true
    }

    /// Cancels pending work and stops listening to the boundary manager.
    pub fn teardown(&self) {
        self.debounce.cancel();
        self.suppressed.set(false);
        self.url_lock.release();
        self.nav_lock.release();
        if let Some(id) = self.listener.take() {
            self.manager.remove_listener(id);
        }
    }

    fn focus_changed(self: &Rc<Self>, focus: Option<&ActiveEntity>) {
        if !self.active.get() {
            return;
        }
        let Some(path) = self.route_for(focus) else {
            return;
        };

        let weak = Rc::downgrade(self);
        self.debounce.call(move || {
            if let Some(sync) = weak.upgrade() {
                sync.navigate(&path);
            }
        });
    }

    /// Path for a focus, or `None` when the vacancy policy keeps the route.
    fn route_for(&self, focus: Option<&ActiveEntity>) -> Option<String> {
        match (focus, self.config.vacancy) {
            (Some(focus), _) => Some(generate_route_path(
                focus,
                &self.manager.get_section_island_map(),
            )),
            (None, VacancyPolicy::KeepCurrent) => None,
            (None, VacancyPolicy::NavigateHome) => Some(HOME_PATH.to_string()),
        }
    }

    fn reconcile_after_url_lock(&self) {
        if !self.suppressed.replace(false) || !self.active.get() {
            return;
        }
        let focus = self.manager.closest_active();
        if let Some(path) = self.route_for(focus.as_ref()) {
            tracing::debug!(path = %path, "reconciling route after url lock");
            self.navigate(&path);
        }
    }

    fn navigate(&self, path: &str) {
        if !self.active.get() {
            return;
        }
        if self.url_lock.is_held() {
            tracing::debug!(path, "viewport navigation suppressed by url lock");
            self.suppressed.set(true);
            return;
        }
        if self.history.current_path() == path {
            return;
        }

        tracing::debug!(path, "replacing route from viewport");
        self.nav_lock.hold();
        self.history.replace(path);
    }
}

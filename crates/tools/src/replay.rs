use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use boundary::entity::{BoundaryChange, EntityKind};
use camera::state::Viewport;
use foundation::math::{Vec2, Vec3};
use foundation::time::Time;
use routing::history::{History, MemoryHistory};
use runtime::timers::Timers;
use serde::Serialize;
use world::engine::Engine;
use world::manifest::WorldManifest;

/// Upper bound on drain frames after the last waypoint.
const MAX_DRAIN_STEPS: usize = 10_000;

/// Parses `x,y` into a camera waypoint.
pub fn parse_waypoint(s: &str) -> Result<Vec2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("waypoint {s:?} must be `x,y`"))?;
    let x: f64 = x
        .trim()
        .parse()
        .map_err(|e| format!("waypoint {s:?}: bad x: {e}"))?;
    let y: f64 = y
        .trim()
        .parse()
        .map_err(|e| format!("waypoint {s:?}: bad y: {e}"))?;
    if !(x.is_finite() && y.is_finite()) {
        return Err(format!("waypoint {s:?} is not finite"));
    }
    Ok(Vec2::new(x, y))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReplayEvent {
    Boundary {
        at_ms: f64,
        kind: &'static str,
        id: String,
        loaded: bool,
        active: bool,
    },
    Preload {
        at_ms: f64,
        id: String,
    },
    Navigate {
        at_ms: f64,
        path: String,
    },
}

impl fmt::Display for ReplayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayEvent::Boundary {
                at_ms,
                kind,
                id,
                loaded,
                active,
            } => {
                let phase = match (loaded, active) {
                    (_, true) => "active",
                    (true, false) => "loaded",
                    (false, false) => "unloaded",
                };
                write!(f, "{at_ms:>8.0}ms  {kind:<7} {id} -> {phase}")
            }
            ReplayEvent::Preload { at_ms, id } => write!(f, "{at_ms:>8.0}ms  preload {id}"),
            ReplayEvent::Navigate { at_ms, path } => write!(f, "{at_ms:>8.0}ms  route   {path}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub events: Vec<ReplayEvent>,
    pub final_path: String,
    pub final_position: [f64; 2],
    pub focus: Option<String>,
    pub elapsed_ms: f64,
}

impl ReplayReport {
    pub fn routes(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ReplayEvent::Navigate { path, .. } => Some(path.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn preloads(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ReplayEvent::Preload { id, .. } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// History that stamps every replacement onto the replay log.
struct RecordingHistory {
    inner: MemoryHistory,
    timers: Rc<Timers>,
    log: Rc<RefCell<Vec<ReplayEvent>>>,
}

impl History for RecordingHistory {
    fn current_path(&self) -> String {
        self.inner.current_path()
    }

    fn replace(&self, path: &str) {
        self.inner.replace(path);
        self.record(path);
    }

    fn push(&self, path: &str) {
        self.inner.push(path);
        self.record(path);
    }
}

impl RecordingHistory {
    fn record(&self, path: &str) {
        self.log.borrow_mut().push(ReplayEvent::Navigate {
            at_ms: self.timers.now().as_ms(),
            path: path.to_string(),
        });
    }
}

/// Runs the whole engine on a virtual clock along `waypoints`.
///
/// The camera jumps to one waypoint every `step_ms`, one frame per step.
/// After the last waypoint the clock keeps stepping until no timer is left,
/// so debounced navigations and lock releases settle into the report.
pub fn run_replay(
    manifest: &WorldManifest,
    initial_path: &str,
    waypoints: &[Vec2],
    step_ms: f64,
) -> ReplayReport {
    let step_ms = if step_ms > 0.0 { step_ms } else { 16.0 };
    let timers = Rc::new(Timers::new());
    let log = Rc::new(RefCell::new(Vec::new()));
    let history = Rc::new(RecordingHistory {
        inner: MemoryHistory::new(initial_path),
        timers: Rc::clone(&timers),
        log: Rc::clone(&log),
    });

    let engine = Engine::with_timers(
        manifest,
        Rc::clone(&history) as Rc<dyn History>,
        Viewport::default(),
        Rc::clone(&timers),
    );

    {
        let log = Rc::clone(&log);
        let timers = Rc::clone(&timers);
        engine.manager().on_boundary_change(move |change: &BoundaryChange| {
            log.borrow_mut().push(ReplayEvent::Boundary {
                at_ms: timers.now().as_ms(),
                kind: change.kind.as_str(),
                id: change.id.clone(),
                loaded: change.current.is_loaded,
                active: change.current.is_active,
            });
        });
    }
    for kind in [EntityKind::Island, EntityKind::Section] {
        for entity in engine.manager().entities(kind) {
            let log = Rc::clone(&log);
            let timers = Rc::clone(&timers);
            let id = entity.id.clone();
            engine.manager().register_preload(&entity.id, move || {
                log.borrow_mut().push(ReplayEvent::Preload {
                    at_ms: timers.now().as_ms(),
                    id: id.clone(),
                });
            });
        }
    }

    // A URL given up front is honoured like a page load.
    engine.routes().location_changed(initial_path);

    let mut now = engine.now();
    for waypoint in waypoints {
        now = now.after(step_ms);
        engine.tick(now);
        let z = engine.store().get_state().position.z;
        engine
            .store()
            .set_position(Vec3::new(waypoint.x, waypoint.y, z));
        tracing::debug!(x = waypoint.x, y = waypoint.y, at_ms = now.as_ms(), "waypoint");
    }

    let mut drained = 0;
    loop {
        now = now.after(step_ms);
        engine.tick(now);
        if timers.pending_len() == 0 && !engine.animator().is_animating() {
            break;
        }
        drained += 1;
        if drained >= MAX_DRAIN_STEPS {
            tracing::warn!(pending = timers.pending_len(), "replay did not settle");
            break;
        }
    }

    let state = engine.store().get_state();
    let focus = engine.manager().closest_active().map(|a| a.id().to_string());
    let final_path = history.current_path();
    drop(engine);

    let events = log.borrow().clone();
    ReplayReport {
        events,
        final_path,
        final_position: [state.position.x, state.position.y],
        focus,
        elapsed_ms: now.as_ms(),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_waypoint;
    use foundation::math::Vec2;

    #[test]
    fn waypoints_parse_with_spaces_and_signs() {
        assert_eq!(parse_waypoint("10,20").unwrap(), Vec2::new(10.0, 20.0));
        assert_eq!(parse_waypoint(" -3.5 , 4e2 ").unwrap(), Vec2::new(-3.5, 400.0));
    }

    #[test]
    fn malformed_waypoints_are_rejected() {
        assert!(parse_waypoint("10").is_err());
        assert!(parse_waypoint("a,1").is_err());
        assert!(parse_waypoint("1,NaN").is_err());
    }
}

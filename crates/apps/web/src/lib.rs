use std::cell::RefCell;
use std::rc::Rc;

use boundary::entity::BoundaryChange;
use boundary::state::BoundaryState;
use camera::state::Viewport;
use foundation::math::Vec3;
use foundation::time::Time;
use routing::history::History;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use world::engine::Engine;
use world::manifest::WorldManifest;

mod flags;
mod history;

pub use flags::{DebugFlags, Skeleton};
pub use history::BrowserHistory;

struct WebState {
    engine: Engine,
    changes: Rc<RefCell<Vec<BoundaryChange>>>,
    flags: DebugFlags,
}

thread_local! {
    static STATE: RefCell<Option<WebState>> = RefCell::new(None);
}

fn with_world<R>(f: impl FnOnce(&WebState) -> R) -> Result<R, JsValue> {
    STATE.with(|state| match state.borrow().as_ref() {
        Some(s) => Ok(f(s)),
        None => Err(JsValue::from_str("world not initialized; call init_world first")),
    })
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&format!("json: {e}")))
}

/// A flip in an island's or section's flags, as island loaders consume it.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct ChangeView {
    kind: &'static str,
    id: String,
    is_loaded: bool,
    is_active: bool,
    distance: f64,
}

impl From<&BoundaryChange> for ChangeView {
    fn from(change: &BoundaryChange) -> Self {
        Self {
            kind: change.kind.as_str(),
            id: change.id.clone(),
            is_loaded: change.current.is_loaded,
            is_active: change.current.is_active,
            distance: change.current.distance_to_camera,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct PoseView {
    position: [f64; 3],
    scale: f64,
}

fn state_json(state: Option<BoundaryState>) -> Result<Option<String>, JsValue> {
    state.map(|s| to_json(&s)).transpose()
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    Ok(())
}

/// Builds the engine from a world manifest, replacing any running one.
///
/// The current location is reconciled right away, so deep links land on
/// their island before the first frame.
#[wasm_bindgen]
pub fn init_world(manifest_json: &str) -> Result<(), JsValue> {
    let manifest =
        WorldManifest::from_json_str(manifest_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    for warning in manifest.warnings() {
        web_sys::console::warn_1(&JsValue::from_str(&format!("world manifest: {warning}")));
    }

    let history = Rc::new(BrowserHistory);
    let engine = Engine::new(
        &manifest,
        Rc::clone(&history) as Rc<dyn History>,
        Viewport::default(),
    );

    let changes = Rc::new(RefCell::new(Vec::new()));
    {
        let changes = Rc::clone(&changes);
        engine
            .manager()
            .on_boundary_change(move |change| changes.borrow_mut().push(change.clone()));
    }

    let search = web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default();
    let flags = DebugFlags::from_query(&search);

    engine.routes().location_changed(&history.current_path());

    // Drop the old engine outside the borrow; its teardown touches the page.
    let previous = STATE.with(|state| {
        state.borrow_mut().replace(WebState {
            engine,
            changes,
            flags,
        })
    });
    drop(previous);
    Ok(())
}

/// Advances timers and runs one frame; call from `requestAnimationFrame`.
#[wasm_bindgen]
pub fn tick(now_ms: f64) -> Result<(), JsValue> {
    if !now_ms.is_finite() {
        return Err(JsValue::from_str("tick time must be finite"));
    }
    with_world(|s| {
        s.engine.tick(Time::from_ms(now_ms));
    })
}

#[wasm_bindgen]
pub fn set_viewport(width: f64, height: f64) -> Result<(), JsValue> {
    if !(width.is_finite() && height.is_finite()) {
        return Err(JsValue::from_str("viewport size must be finite"));
    }
    with_world(|s| s.engine.set_viewport(Viewport::new(width.max(0.0), height.max(0.0))))
}

/// Direct camera placement from user drag; cancels any running move.
#[wasm_bindgen]
pub fn set_position(x: f64, y: f64) -> Result<(), JsValue> {
    if !(x.is_finite() && y.is_finite()) {
        return Err(JsValue::from_str("camera position must be finite"));
    }
    with_world(|s| {
        s.engine.animator().cancel();
        let z = s.engine.store().get_state().position.z;
        s.engine.store().set_position(Vec3::new(x, y, z));
    })
}

#[wasm_bindgen]
pub fn set_zoom(zoom: f64) -> Result<(), JsValue> {
    with_world(|s| s.engine.store().set_zoom(zoom))
}

#[wasm_bindgen]
pub fn move_to_island(id: &str, animated: bool, easing: Option<String>) -> Result<(), JsValue> {
    with_world(|s| s.engine.move_to_island(id, animated, easing.as_deref()))?
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Host notification that the URL changed (navigation or popstate).
#[wasm_bindgen]
pub fn location_changed(path: &str) -> Result<bool, JsValue> {
    with_world(|s| s.engine.routes().location_changed(path))
}

/// Whether the 3D experience is the visible route.
#[wasm_bindgen]
pub fn set_active(active: bool) -> Result<(), JsValue> {
    with_world(|s| s.engine.routes().set_active(active))
}

#[wasm_bindgen]
pub fn island_state(id: &str) -> Result<Option<String>, JsValue> {
    with_world(|s| s.engine.manager().get_island_state(id)).and_then(state_json)
}

#[wasm_bindgen]
pub fn section_state(id: &str) -> Result<Option<String>, JsValue> {
    with_world(|s| s.engine.manager().get_section_state(id)).and_then(state_json)
}

/// Flag flips since the previous call, oldest first.
#[wasm_bindgen]
pub fn take_boundary_changes() -> Result<String, JsValue> {
    let changes = with_world(|s| std::mem::take(&mut *s.changes.borrow_mut()))?;
    let views: Vec<ChangeView> = changes.iter().map(ChangeView::from).collect();
    to_json(&views)
}

#[wasm_bindgen]
pub fn css_transform() -> Result<String, JsValue> {
    with_world(|s| s.engine.css_transform())
}

#[wasm_bindgen]
pub fn scene_pose() -> Result<String, JsValue> {
    let pose = with_world(|s| s.engine.scene_pose())?;
    to_json(&PoseView {
        position: pose.position.to_array(),
        scale: pose.scale,
    })
}

#[wasm_bindgen]
pub fn debug_flags() -> Result<String, JsValue> {
    let flags = with_world(|s| s.flags.clone())?;
    to_json(&flags)
}

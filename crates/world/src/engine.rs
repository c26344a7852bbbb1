use std::cell::RefCell;
use std::rc::Rc;

use boundary::entity::EntityKind;
use boundary::manager::BoundaryManager;
use camera::animator::CameraAnimator;
use camera::state::{DEFAULT_FOV_DEGREES, Viewport};
use camera::store::CameraStore;
use camera::transform::CameraTransform;
use foundation::math::Mat4;
use foundation::time::Time;
use routing::history::History;
use routing::sync::RouteSync;
use runtime::frame::Frame;
use runtime::ticker::Ticker;
use runtime::timers::Timers;
use scene::registry::SceneRegistry;
use scene::sync::{CameraViewportSync, ScenePose};
use scene::transform::Transform;

use crate::config::EngineConfig;
use crate::error::WorldError;
use crate::manifest::WorldManifest;

/// One running world: the camera, its boundaries, the route and the scene,
/// all driven from a single clock.
///
/// The host calls [`tick`](Engine::tick) once per display frame with its
/// monotonic time. Timers fire first, then the ticker runs the camera
/// animation and the scene sync for that frame.
pub struct Engine {
    config: EngineConfig,
    timers: Rc<Timers>,
    ticker: Ticker,
    store: Rc<CameraStore>,
    animator: Rc<CameraAnimator>,
    manager: Rc<BoundaryManager>,
    viewport_sync: Rc<RefCell<CameraViewportSync>>,
    scene: SceneRegistry<EntityKind>,
    routes: Rc<RouteSync>,
    transform: CameraTransform,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("now", &self.timers.now())
            .field("camera", &self.store.get_state())
            .field("manager", &self.manager)
            .field("routes", &self.routes)
            .finish()
    }
}

impl Engine {
    pub fn new(manifest: &WorldManifest, history: Rc<dyn History>, viewport: Viewport) -> Self {
        Self::with_timers(manifest, history, viewport, Rc::new(Timers::new()))
    }

    pub fn with_timers(
        manifest: &WorldManifest,
        history: Rc<dyn History>,
        viewport: Viewport,
        timers: Rc<Timers>,
    ) -> Self {
        let config = manifest.config();

        let store = Rc::new(CameraStore::with_throttle(
            Rc::clone(&timers),
            config.throttle_ms,
        ));
        if config.fov_degrees != DEFAULT_FOV_DEGREES {
            store.set_fov(config.fov_radians());
        }
        let animator = Rc::new(CameraAnimator::with_defaults(
            Rc::clone(&store),
            config.move_duration_ms,
            config.easing(),
        ));
        let manager = Rc::new(BoundaryManager::new(config.tie_break));
        let routes = RouteSync::new(
            Rc::clone(&manager),
            Rc::clone(&animator),
            history,
            Rc::clone(&timers),
            config.route_sync(),
        );

        manifest.register_all(&manager);
        manager.attach(&store);

        let scene = SceneRegistry::new();
        for island in &manifest.islands {
            let position = island.position.into();
            scene.register(&island.id, EntityKind::Island, 0, Transform::translate(position));
            for section in &island.sections {
                let position = section.position.into();
                scene.register(&section.id, EntityKind::Section, 1, Transform::translate(position));
            }
        }

        let ticker = Ticker::new();
        animator.attach(&ticker);
        let viewport_sync = Rc::new(RefCell::new(CameraViewportSync::new(
            config.base_camera_z,
            viewport,
        )));
        CameraViewportSync::attach(&viewport_sync, Rc::clone(&store), &ticker);

        tracing::info!(
            name = manifest.name.as_deref().unwrap_or("unnamed"),
            islands = manifest.islands.len(),
            sections = manifest.section_count(),
            "engine started"
        );

        Self {
            transform: config.camera_transform(),
            config,
            timers,
            ticker,
            store,
            animator,
            manager,
            viewport_sync,
            scene,
            routes,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn timers(&self) -> &Rc<Timers> {
        &self.timers
    }

    pub fn store(&self) -> &Rc<CameraStore> {
        &self.store
    }

    pub fn animator(&self) -> &Rc<CameraAnimator> {
        &self.animator
    }

    pub fn manager(&self) -> &Rc<BoundaryManager> {
        &self.manager
    }

    pub fn routes(&self) -> &Rc<RouteSync> {
        &self.routes
    }

    pub fn scene(&self) -> &SceneRegistry<EntityKind> {
        &self.scene
    }

    pub fn now(&self) -> Time {
        self.timers.now()
    }

    /// Fires due timers, then runs one render frame at `now`.
    pub fn tick(&self, now: Time) -> Frame {
        self.timers.advance_to(now);
        self.ticker.tick(now)
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.viewport_sync.borrow_mut().set_viewport(viewport);
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport_sync.borrow().viewport()
    }

    /// Moves to an island, or to a section when no island has that id.
    pub fn move_to_island(
        &self,
        id: &str,
        animated: bool,
        easing: Option<&str>,
    ) -> Result<(), WorldError> {
        let target = self
            .manager
            .get_island_position(id)
            .or_else(|| self.manager.get_section_position(id))
            .ok_or_else(|| WorldError::UnknownIsland(id.to_string()))?;
        self.animator.move_to_island(target, animated, easing);
        Ok(())
    }

    /// CSS transform for the HTML world layer at the current camera state.
    pub fn css_transform(&self) -> String {
        let state = self.store.get_state();
        CameraTransform::css_transform(
            state.position.xy(),
            state.zoom,
            state.rotation.z.to_degrees(),
        )
    }

    /// Projection at the store's live fov, so it agrees with the scene sync.
    pub fn projection_matrix(&self) -> Mat4 {
        let state = self.store.get_state();
        let transform = CameraTransform {
            fov: state.fov,
            ..self.transform
        };
        transform.projection_matrix(self.viewport(), state.zoom)
    }

    /// Scene root pose as of the last frame.
    pub fn scene_pose(&self) -> ScenePose {
        self.viewport_sync.borrow().pose()
    }

    pub fn world_matrices(&self) -> Vec<(String, Mat4)> {
        self.viewport_sync
            .borrow()
            .update_world_matrices(&self.scene)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.routes.teardown();
        self.manager.detach();
        self.animator.cancel();
    }
}

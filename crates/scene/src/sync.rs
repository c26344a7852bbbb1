use std::cell::RefCell;
use std::rc::Rc;

use camera::state::{CameraState, Viewport};
use camera::store::CameraStore;
use foundation::math::{Mat4, Vec3, mat4_mul, mat4_translation, mat4_uniform_scale};
use runtime::ticker::{TaskId, Ticker};

use crate::registry::SceneRegistry;

pub const DEFAULT_BASE_CAMERA_Z: f64 = 1000.0;

/// The 3D camera as the renderer sees it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    /// Vertical field of view in radians.
    pub fov: f64,
    pub aspect: f64,
}

/// Transform applied to the scene root.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScenePose {
    pub position: Vec3,
    pub scale: f64,
}

impl ScenePose {
    pub fn matrix(&self) -> Mat4 {
        mat4_mul(
            mat4_translation(self.position),
            mat4_uniform_scale(self.scale),
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct PixelScale {
    viewport_height: f64,
    fov: f64,
    pixel_to_unit: f64,
}

/// Per-frame reconciliation of the 2D camera into the 3D scene.
///
/// The 3D camera stays parked at `base_camera_z` on the depth axis; panning
/// and zooming move and scale the scene instead. A world point at pixel
/// coordinate `(px, py)` then renders under the HTML element placed at the
/// same pixel coordinate, and perspective stays constant across the map.
///
/// Scene objects keep their local translation in world pixels. They are
/// mapped into scene units when world matrices are built, so a viewport or
/// fov change never leaves them stale.
#[derive(Debug)]
pub struct CameraViewportSync {
    base_camera_z: f64,
    viewport: Viewport,
    scale_cache: Option<PixelScale>,
    camera: PerspectiveCamera,
    pose: ScenePose,
    scale_recomputes: u64,
}

impl Default for CameraViewportSync {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_CAMERA_Z, Viewport::default())
    }
}

impl CameraViewportSync {
    pub fn new(base_camera_z: f64, viewport: Viewport) -> Self {
        let initial = CameraState::default();
        Self {
            base_camera_z,
            viewport,
            scale_cache: None,
            camera: PerspectiveCamera {
                position: Vec3::new(0.0, 0.0, base_camera_z),
                fov: initial.fov,
                aspect: viewport.aspect(),
            },
            pose: ScenePose {
                position: Vec3::ZERO,
                scale: 1.0,
            },
            scale_recomputes: 0,
        }
    }

    /// Steps the sync from the store once per ticker frame.
    pub fn attach(
        sync: &Rc<RefCell<Self>>,
        store: Rc<CameraStore>,
        ticker: &Ticker,
    ) -> TaskId {
        let sync = Rc::clone(sync);
        ticker.add("camera-viewport-sync", 0, move |_frame| {
            sync.borrow_mut().sync(&store.get_state());
        })
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.aspect = viewport.aspect();
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn camera(&self) -> PerspectiveCamera {
        self.camera
    }

    pub fn pose(&self) -> ScenePose {
        self.pose
    }

    /// How many times the trigonometric pixel scale had to be rebuilt.
    pub fn scale_recomputes(&self) -> u64 {
        self.scale_recomputes
    }

    /// Size of one CSS pixel at depth 0, in scene units.
    ///
    /// Cached per `(viewport height, fov)`.
    pub fn pixel_to_unit(&mut self, fov: f64) -> f64 {
        let height = self.viewport.height;
        if let Some(cache) = self.scale_cache {
            if cache.viewport_height == height && cache.fov == fov {
                return cache.pixel_to_unit;
            }
        }

        let pixel_to_unit = frustum_pixel_to_unit(fov, self.base_camera_z, height);
        self.scale_cache = Some(PixelScale {
            viewport_height: height,
            fov,
            pixel_to_unit,
        });
        self.scale_recomputes += 1;
        pixel_to_unit
    }

    /// Maps a world pixel coordinate into scene units.
    ///
    /// Screen y grows downward, scene y grows upward. Depth passes through.
    pub fn pixel_to_scene(&self, pixel: Vec3) -> Vec3 {
        let p2u = self.current_pixel_to_unit();
        Vec3::new(pixel.x * p2u, -pixel.y * p2u, pixel.z)
    }

    pub fn sync(&mut self, state: &CameraState) -> ScenePose {
        self.pixel_to_unit(state.fov);

        // The scene root is offset by the negated camera position, the same
        // sign the HTML layer's CSS translate uses.
        let offset = self.pixel_to_scene(-state.position);
        self.pose = ScenePose {
            position: Vec3::new(offset.x, offset.y, 0.0),
            scale: state.zoom,
        };
        self.camera = PerspectiveCamera {
            position: Vec3::new(0.0, 0.0, self.base_camera_z),
            fov: state.fov,
            aspect: self.viewport.aspect(),
        };
        tracing::trace!(
            x = self.pose.position.x,
            y = self.pose.position.y,
            scale = self.pose.scale,
            "scene synced"
        );
        self.pose
    }

    /// World matrices for the scene root's direct children only.
    pub fn update_world_matrices<N>(&self, registry: &SceneRegistry<N>) -> Vec<(String, Mat4)> {
        let root = self.pose.matrix();
        let mut out = Vec::with_capacity(registry.len());
        registry.for_each(|object| {
            let local = mat4_translation(self.pixel_to_scene(object.local.position));
            out.push((object.id.clone(), mat4_mul(root, local)));
        });
        out
    }

    fn current_pixel_to_unit(&self) -> f64 {
        match self.scale_cache {
            Some(cache) => cache.pixel_to_unit,
            None => {
                frustum_pixel_to_unit(self.camera.fov, self.base_camera_z, self.viewport.height)
            }
        }
    }
}

fn frustum_pixel_to_unit(fov: f64, base_camera_z: f64, viewport_height: f64) -> f64 {
    if viewport_height > 0.0 {
        2.0 * (fov / 2.0).tan() * base_camera_z / viewport_height
    } else {
        0.0
    }
}

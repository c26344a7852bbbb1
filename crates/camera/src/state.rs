use foundation::math::Vec3;

pub const DEFAULT_FOV_DEGREES: f64 = 75.0;

/// Snapshot of the shared camera.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    pub rotation: Vec3,
    /// Vertical field of view in radians. Always > 0.
    pub fov: f64,
    /// Uniform zoom multiplier. Always > 0.
    pub zoom: f64,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            rotation: Vec3::ZERO,
            fov: DEFAULT_FOV_DEGREES.to_radians(),
            zoom: 1.0,
        }
    }
}

/// Size of the host viewport in CSS pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f64 {
        if self.height <= 0.0 {
            1.0
        } else {
            (self.width / self.height).max(1e-6)
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

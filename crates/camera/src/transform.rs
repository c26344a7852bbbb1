use foundation::math::{Mat4, Vec2, Vec3, mat4_perspective_rh_gl, mat4_translation};

use crate::state::{DEFAULT_FOV_DEGREES, Viewport};

/// Pure camera math shared by the HTML and WebGL layers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraTransform {
    /// Vertical field of view in radians.
    pub fov: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for CameraTransform {
    fn default() -> Self {
        Self {
            fov: DEFAULT_FOV_DEGREES.to_radians(),
            near: 0.1,
            far: 10_000.0,
        }
    }
}

impl CameraTransform {
    pub fn new(fov: f64, near: f64, far: f64) -> Self {
        Self { fov, near, far }
    }

    /// CSS transform that moves world content opposite to the camera.
    ///
    /// Identity terms are left out (`scale(1)`, `rotate(0deg)`) so the string
    /// only changes when something visible does.
    pub fn css_transform(position: Vec2, scale: f64, rotation_deg: f64) -> String {
        let mut out = format!(
            "translate({}px, {}px)",
            css_number(-position.x),
            css_number(-position.y)
        );
        if scale != 1.0 {
            out.push_str(&format!(" scale({})", css_number(scale)));
        }
        if rotation_deg != 0.0 {
            out.push_str(&format!(" rotate({}deg)", css_number(rotation_deg)));
        }
        out
    }

    /// Perspective projection where `scale` zooms by narrowing the field of view.
    ///
    /// Both focal terms are multiplied by `scale`: `scale = 2` sees half the
    /// world height that `scale = 1` does.
    pub fn projection_matrix(&self, viewport: Viewport, scale: f64) -> Mat4 {
        let scale = if scale > 0.0 { scale } else { 1.0 };
        let focal = scale / (0.5 * self.fov).tan();
        mat4_perspective_rh_gl(focal, viewport.aspect(), self.near, self.far)
    }

    /// Pure translation by `-position`; rotation is only expressed in CSS.
    pub fn view_matrix(position: Vec3) -> Mat4 {
        mat4_translation(Vec3::new(-position.x, -position.y, -position.z))
    }
}

fn css_number(v: f64) -> String {
    // Avoid "-0" churn when the camera sits on an axis.
    if v == 0.0 {
        return "0".to_string();
    }
    format!("{v}")
}

use super::Vec3;

/// Column-major 4x4 matrix: `m[col][row]`, matching WebGL uniform layout.
pub type Mat4 = [[f64; 4]; 4];

pub const MAT4_IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

pub fn mat4_mul(a: Mat4, b: Mat4) -> Mat4 {
    // Column-major matrix multiply: c = a * b
    let mut c = [[0.0f64; 4]; 4];
    for col in 0..4 {
        for row in 0..4 {
            c[col][row] = a[0][row] * b[col][0]
                + a[1][row] * b[col][1]
                + a[2][row] * b[col][2]
                + a[3][row] * b[col][3];
        }
    }
    c
}

pub fn mat4_translation(t: Vec3) -> Mat4 {
    let mut m = MAT4_IDENTITY;
    m[3][0] = t.x;
    m[3][1] = t.y;
    m[3][2] = t.z;
    m
}

pub fn mat4_uniform_scale(s: f64) -> Mat4 {
    let mut m = MAT4_IDENTITY;
    m[0][0] = s;
    m[1][1] = s;
    m[2][2] = s;
    m
}

/// Right-handed perspective projection with a GL-style `[-1, 1]` depth range.
///
/// `focal_y` is `1 / tan(fov_y / 2)`; callers fold any zoom into it.
pub fn mat4_perspective_rh_gl(focal_y: f64, aspect: f64, near: f64, far: f64) -> Mat4 {
    let m00 = focal_y / aspect;
    let m11 = focal_y;
    let m22 = (far + near) / (near - far);
    let m23 = (2.0 * far * near) / (near - far);

    // [ m00,  0,   0,   0 ]
    // [  0,  m11,  0,   0 ]
    // [  0,   0,  m22, m23 ]
    // [  0,   0,  -1,   0 ]
    [
        [m00, 0.0, 0.0, 0.0],
        [0.0, m11, 0.0, 0.0],
        [0.0, 0.0, m22, -1.0],
        [0.0, 0.0, m23, 0.0],
    ]
}

pub fn mat4_transform_point(m: Mat4, p: Vec3) -> Vec3 {
    let x = m[0][0] * p.x + m[1][0] * p.y + m[2][0] * p.z + m[3][0];
    let y = m[0][1] * p.x + m[1][1] * p.y + m[2][1] * p.z + m[3][1];
    let z = m[0][2] * p.x + m[1][2] * p.y + m[2][2] * p.z + m[3][2];
    let w = m[0][3] * p.x + m[1][3] * p.y + m[2][3] * p.z + m[3][3];
    if w == 0.0 || w == 1.0 {
        Vec3::new(x, y, z)
    } else {
        Vec3::new(x / w, y / w, z / w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_neutral() {
        let t = mat4_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(mat4_mul(MAT4_IDENTITY, t), t);
        assert_eq!(mat4_mul(t, MAT4_IDENTITY), t);
    }

    #[test]
    fn translate_then_scale_composes() {
        let m = mat4_mul(
            mat4_translation(Vec3::new(10.0, 0.0, 0.0)),
            mat4_uniform_scale(2.0),
        );
        let p = mat4_transform_point(m, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(p, Vec3::new(12.0, 2.0, 0.0));
    }

    #[test]
    fn perspective_maps_near_and_far_planes() {
        let m = mat4_perspective_rh_gl(1.0, 1.0, 1.0, 100.0);
        let near = mat4_transform_point(m, Vec3::new(0.0, 0.0, -1.0));
        let far = mat4_transform_point(m, Vec3::new(0.0, 0.0, -100.0));
        assert!((near.z + 1.0).abs() < 1e-9);
        assert!((far.z - 1.0).abs() < 1e-9);
    }
}

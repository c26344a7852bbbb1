use foundation::math::{Mat4, Vec3, mat4_translation};

/// Local placement of a scene object under the scene root.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
        }
    }

    pub fn translate(position: Vec3) -> Self {
        Self { position }
    }

    pub fn matrix(&self) -> Mat4 {
        mat4_translation(self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::Transform;
    use foundation::math::{MAT4_IDENTITY, Vec3};

    #[test]
    fn identity_is_origin() {
        let transform = Transform::identity();
        assert_eq!(transform.position, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(transform.matrix(), MAT4_IDENTITY);
    }
}

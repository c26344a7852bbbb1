use serde::Serialize;

/// Last computed proximity of an entity to the camera.
///
/// Derived on every camera update from the camera's true position and the
/// entity's registered boundaries; never persisted.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct BoundaryState {
    pub is_loaded: bool,
    pub is_active: bool,
    pub distance_to_camera: f64,
}

impl BoundaryState {
    pub fn unloaded() -> Self {
        Self {
            is_loaded: false,
            is_active: false,
            distance_to_camera: f64::INFINITY,
        }
    }

    /// True when the loaded/active flags differ, ignoring distance.
    pub fn flags_differ(&self, other: &BoundaryState) -> bool {
        self.is_loaded != other.is_loaded || self.is_active != other.is_active
    }
}

/// Coarse lifecycle band of an entity, outermost last.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoadPhase {
    Active,
    Loaded,
    Prewarm,
    Dormant,
}

impl LoadPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            LoadPhase::Active => "active",
            LoadPhase::Loaded => "loaded",
            LoadPhase::Prewarm => "prewarm",
            LoadPhase::Dormant => "dormant",
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::state::LoadPhase;

/// Distance thresholds for one island or section.
///
/// Expected (but not enforced) `active_radius <= load_radius`. A config that
/// breaks this is kept as given; see [`is_nested`](BoundaryConfig::is_nested).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryConfig {
    pub load_radius: f64,
    pub active_radius: f64,
}

impl BoundaryConfig {
    pub fn new(load_radius: f64, active_radius: f64) -> Self {
        Self {
            load_radius,
            active_radius,
        }
    }

    /// Distance at which a registered preload fires, ahead of `load_radius`.
    pub fn prewarm_radius(&self) -> f64 {
        2.0 * self.load_radius
    }

    pub fn is_nested(&self) -> bool {
        self.active_radius <= self.load_radius
    }

    pub fn phase_at(&self, distance: f64) -> LoadPhase {
        if distance <= self.active_radius && distance <= self.load_radius {
            LoadPhase::Active
        } else if distance <= self.load_radius {
            LoadPhase::Loaded
        } else if distance <= self.prewarm_radius() {
            LoadPhase::Prewarm
        } else {
            LoadPhase::Dormant
        }
    }
}

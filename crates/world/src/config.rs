use boundary::policy::TieBreak;
use camera::easing::Easing;
use camera::transform::CameraTransform;
use routing::sync::{RouteSyncConfig, VacancyPolicy};
use serde::{Deserialize, Serialize};

/// Tunables for one running world. Every field has a default, so `{}` is a
/// complete config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Camera store notification throttle.
    pub throttle_ms: f64,
    pub route_debounce_ms: f64,
    pub url_lock_ms: f64,
    pub nav_lock_ms: f64,
    pub base_camera_z: f64,
    pub fov_degrees: f64,
    pub near: f64,
    pub far: f64,
    pub tie_break: TieBreak,
    pub vacancy: VacancyPolicy,
    /// Easing identifier for island moves; unknown names mean linear.
    pub default_easing: String,
    pub move_duration_ms: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 100.0,
            route_debounce_ms: 300.0,
            url_lock_ms: 1000.0,
            nav_lock_ms: 100.0,
            base_camera_z: 1000.0,
            fov_degrees: 75.0,
            near: 0.1,
            far: 10_000.0,
            tie_break: TieBreak::RegistrationOrder,
            vacancy: VacancyPolicy::KeepCurrent,
            default_easing: Easing::EaseOutQuart.name().to_string(),
            move_duration_ms: 1000.0,
        }
    }
}

impl EngineConfig {
    pub fn easing(&self) -> Easing {
        Easing::from_name(&self.default_easing)
    }

    pub fn fov_radians(&self) -> f64 {
        self.fov_degrees.to_radians()
    }

    pub fn camera_transform(&self) -> CameraTransform {
        CameraTransform::new(self.fov_radians(), self.near, self.far)
    }

    pub fn route_sync(&self) -> RouteSyncConfig {
        RouteSyncConfig {
            debounce_ms: self.route_debounce_ms,
            url_lock_ms: self.url_lock_ms,
            nav_lock_ms: self.nav_lock_ms,
            vacancy: self.vacancy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EngineConfig;
    use boundary::policy::TieBreak;
    use camera::easing::Easing;
    use pretty_assertions::assert_eq;
    use routing::sync::{RouteSyncConfig, VacancyPolicy};

    #[test]
    fn empty_object_is_the_default_config() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.easing(), Easing::EaseOutQuart);
        assert_eq!(config.route_sync(), RouteSyncConfig::default());
    }

    #[test]
    fn partial_config_overrides_named_fields() {
        let config: EngineConfig = serde_json::from_str(
            r#"{ "route_debounce_ms": 50, "tie_break": "latest_registration",
                 "vacancy": "navigate_home", "default_easing": "easeInOutCubic" }"#,
        )
        .unwrap();
        assert_eq!(config.route_debounce_ms, 50.0);
        assert_eq!(config.throttle_ms, 100.0);
        assert_eq!(config.tie_break, TieBreak::LatestRegistration);
        assert_eq!(config.route_sync().vacancy, VacancyPolicy::NavigateHome);
        assert_eq!(config.easing(), Easing::EaseInOutCubic);
    }

    #[test]
    fn unknown_easing_name_is_linear() {
        let config = EngineConfig {
            default_easing: "bouncy".into(),
            ..EngineConfig::default()
        };
        assert_eq!(config.easing(), Easing::Linear);
    }

    #[test]
    fn camera_transform_uses_radians() {
        let t = EngineConfig::default().camera_transform();
        assert!((t.fov - 75f64.to_radians()).abs() < 1e-12);
        assert_eq!(t.near, 0.1);
        assert_eq!(t.far, 10_000.0);
    }
}

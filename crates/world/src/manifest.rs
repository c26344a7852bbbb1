use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

use boundary::config::BoundaryConfig;
use boundary::entity::Entity;
use boundary::manager::BoundaryManager;
use foundation::math::Vec3;
use routing::path::is_route_segment;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::WorldError;

pub const MANIFEST_VERSION: &str = "1.0";

/// The islands of one world and the config to run them with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldManifest {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<EngineConfig>,
    #[serde(default)]
    pub islands: Vec<IslandSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IslandSpec {
    pub id: String,
    pub name: String,
    pub position: [f64; 3],
    pub load_radius: f64,
    pub active_radius: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<SectionSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionSpec {
    pub id: String,
    pub name: String,
    pub position: [f64; 3],
    pub load_radius: f64,
    pub active_radius: f64,
}

/// Suspicious but accepted manifest content.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestWarning {
    /// `active_radius > load_radius`: the entity is active wherever it is
    /// loaded and never sits in the plain loaded phase.
    InvertedRadii {
        id: String,
        load_radius: f64,
        active_radius: f64,
    },
    NonFiniteRadius {
        id: String,
    },
    UnknownVersion(String),
}

impl fmt::Display for ManifestWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestWarning::InvertedRadii {
                id,
                load_radius,
                active_radius,
            } => write!(
                f,
                "{id}: active_radius {active_radius} exceeds load_radius {load_radius}"
            ),
            ManifestWarning::NonFiniteRadius { id } => {
                write!(f, "{id}: radius is not a finite number")
            }
            ManifestWarning::UnknownVersion(v) => {
                write!(f, "manifest version {v:?} (expected {MANIFEST_VERSION:?})")
            }
        }
    }
}

impl SectionSpec {
    pub fn boundaries(&self) -> BoundaryConfig {
        BoundaryConfig::new(self.load_radius, self.active_radius)
    }
}

impl IslandSpec {
    pub fn boundaries(&self) -> BoundaryConfig {
        BoundaryConfig::new(self.load_radius, self.active_radius)
    }
}

impl WorldManifest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            name: Some(name.into()),
            config: None,
            islands: Vec::new(),
        }
    }

    /// Parses and validates. Radii are reported by [`warnings`], not rejected.
    ///
    /// [`warnings`]: WorldManifest::warnings
    pub fn from_json_str(json: &str) -> Result<Self, WorldError> {
        let manifest: WorldManifest = serde_json::from_str(json)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Ids must be unique across islands and sections, since both share the
    /// route namespace, and each must be a single route segment.
    pub fn validate(&self) -> Result<(), WorldError> {
        let mut seen = BTreeSet::new();
        let ids = self.islands.iter().flat_map(|island| {
            std::iter::once(island.id.as_str()).chain(island.sections.iter().map(|s| s.id.as_str()))
        });
        for id in ids {
            if !is_route_segment(id) {
                return Err(WorldError::InvalidId(id.to_string()));
            }
            if !seen.insert(id) {
                return Err(WorldError::DuplicateId(id.to_string()));
            }
        }
        Ok(())
    }

    pub fn warnings(&self) -> Vec<ManifestWarning> {
        let mut out = Vec::new();
        if self.version != MANIFEST_VERSION {
            out.push(ManifestWarning::UnknownVersion(self.version.clone()));
        }

        let radii = self.islands.iter().flat_map(|island| {
            std::iter::once((&island.id, island.load_radius, island.active_radius)).chain(
                island
                    .sections
                    .iter()
                    .map(|s| (&s.id, s.load_radius, s.active_radius)),
            )
        });
        for (id, load_radius, active_radius) in radii {
            if !(load_radius.is_finite() && active_radius.is_finite()) {
                out.push(ManifestWarning::NonFiniteRadius { id: id.clone() });
            } else if active_radius > load_radius {
                out.push(ManifestWarning::InvertedRadii {
                    id: id.clone(),
                    load_radius,
                    active_radius,
                });
            }
        }
        out
    }

    pub fn config(&self) -> EngineConfig {
        self.config.clone().unwrap_or_default()
    }

    pub fn section_count(&self) -> usize {
        self.islands.iter().map(|i| i.sections.len()).sum()
    }

    /// Registers every island, then its sections, in manifest order.
    pub fn register_all(&self, manager: &BoundaryManager) {
        for island in &self.islands {
            manager.register_island(
                Entity::island(&island.id, &island.name, Vec3::from(island.position)),
                island.boundaries(),
            );
            for section in &island.sections {
                manager.register_section(
                    Entity::section(
                        &section.id,
                        &section.name,
                        Vec3::from(section.position),
                        &island.id,
                    ),
                    section.boundaries(),
                );
            }
        }
        tracing::debug!(
            islands = self.islands.len(),
            sections = self.section_count(),
            "world registered"
        );
    }
}

pub fn load_manifest(path: impl AsRef<Path>) -> Result<WorldManifest, WorldError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| WorldError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    WorldManifest::from_json_str(&json)
}

#[cfg(test)]
mod tests {
    use super::{ManifestWarning, WorldManifest, load_manifest};
    use crate::error::WorldError;
    use boundary::manager::BoundaryManager;
    use foundation::math::{Vec2, Vec3};
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "version": "1.0",
        "name": "portfolio",
        "islands": [
            { "id": "home", "name": "Home", "position": [0, 0, 0],
              "load_radius": 1000, "active_radius": 400,
              "sections": [
                { "id": "home-intro", "name": "Intro", "position": [0, 300, 0],
                  "load_radius": 200, "active_radius": 100 }
              ] },
            { "id": "about", "name": "About", "position": [3000, 0, 0],
              "load_radius": 1000, "active_radius": 400 }
        ]
    }"#;

    #[test]
    fn parses_nested_sections() {
        let manifest = WorldManifest::from_json_str(SAMPLE).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("portfolio"));
        assert_eq!(manifest.islands.len(), 2);
        assert_eq!(manifest.section_count(), 1);
        assert!(manifest.config.is_none());
        assert!(manifest.warnings().is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected_across_kinds() {
        let json = SAMPLE.replace("home-intro", "about");
        match WorldManifest::from_json_str(&json) {
            Err(WorldError::DuplicateId(id)) => assert_eq!(id, "about"),
            other => panic!("expected duplicate id, got {other:?}"),
        }
    }

    #[test]
    fn ids_must_be_single_route_segments() {
        for bad in ["work/rust", "faq?", "a#b", ""] {
            let json = SAMPLE.replace("\"home-intro\"", &format!("{bad:?}"));
            match WorldManifest::from_json_str(&json) {
                Err(WorldError::InvalidId(id)) => assert_eq!(id, bad),
                other => panic!("expected invalid id for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = WorldManifest::from_json_str("{ \"version\": ").unwrap_err();
        assert!(matches!(err, WorldError::Parse(_)));
        assert!(err.to_string().starts_with("invalid world manifest"));
    }

    #[test]
    fn inverted_radii_warn_without_failing() {
        let json = SAMPLE.replace("\"active_radius\": 100", "\"active_radius\": 900");
        let manifest = WorldManifest::from_json_str(&json).unwrap();
        assert_eq!(
            manifest.warnings(),
            vec![ManifestWarning::InvertedRadii {
                id: "home-intro".into(),
                load_radius: 200.0,
                active_radius: 900.0,
            }]
        );
    }

    #[test]
    fn unknown_version_is_reported() {
        let json = SAMPLE.replace("\"1.0\"", "\"2.0\"");
        let manifest = WorldManifest::from_json_str(&json).unwrap();
        assert_eq!(
            manifest.warnings(),
            vec![ManifestWarning::UnknownVersion("2.0".into())]
        );
    }

    #[test]
    fn register_all_links_sections_to_islands() {
        let manifest = WorldManifest::from_json_str(SAMPLE).unwrap();
        let manager = BoundaryManager::default();
        manager.update(Vec2::new(3000.0, 0.0));
        manifest.register_all(&manager);

        assert_eq!(
            manager.get_island_position("about"),
            Some(Vec3::new(3000.0, 0.0, 0.0))
        );
        assert_eq!(
            manager.get_section_island_map().get("home-intro").map(String::as_str),
            Some("home")
        );
        assert!(manager.get_island_state("about").unwrap().is_active);
        assert!(!manager.get_island_state("home").unwrap().is_loaded);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_manifest("/definitely/not/here/world.json").unwrap_err();
        assert!(matches!(err, WorldError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here/world.json"));
    }
}

use foundation::math::Vec3;

use crate::state::BoundaryState;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    Island,
    Section,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Island => "island",
            EntityKind::Section => "section",
        }
    }
}

/// An island or section as registered by the UI layer on mount.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub position: Vec3,
    /// Owning island, for sections only. Lookup only, never lifecycle-coupled.
    pub island_id: Option<String>,
}

impl Entity {
    pub fn island(id: impl Into<String>, name: impl Into<String>, position: Vec3) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
            island_id: None,
        }
    }

    pub fn section(
        id: impl Into<String>,
        name: impl Into<String>,
        position: Vec3,
        island_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
            island_id: Some(island_id.into()),
        }
    }
}

/// The entity currently selected as the camera's focus.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEntity {
    pub kind: EntityKind,
    pub entity: Entity,
    pub distance: f64,
}

impl ActiveEntity {
    pub fn id(&self) -> &str {
        &self.entity.id
    }
}

/// An `is_loaded`/`is_active` flip observed during recomputation.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryChange {
    pub kind: EntityKind,
    pub id: String,
    pub previous: Option<BoundaryState>,
    pub current: BoundaryState,
}

use std::collections::BTreeMap;

use boundary::entity::{ActiveEntity, EntityKind};

pub const HOME_PATH: &str = "/";

/// Route for the focused entity: `/{islandId}`.
///
/// Sections resolve to their owning island's path through
/// `section_island_map`, falling back to the island named on the section
/// itself and finally to the section id.
pub fn generate_route_path(
    focus: &ActiveEntity,
    section_island_map: &BTreeMap<String, String>,
) -> String {
    let segment = match focus.kind {
        EntityKind::Island => focus.entity.id.as_str(),
        EntityKind::Section => section_island_map
            .get(&focus.entity.id)
            .map(String::as_str)
            .or(focus.entity.island_id.as_deref())
            .unwrap_or(focus.entity.id.as_str()),
    };
    format!("/{segment}")
}

/// Whether `id` survives [`generate_route_path`] then [`parse_route_path`]
/// unchanged and needs no percent-encoding in a browser path.
pub fn is_route_segment(id: &str) -> bool {
    !id.is_empty()
        && !id
            .chars()
            .any(|c| matches!(c, '/' | '?' | '#' | '%') || c.is_whitespace() || c.is_control())
}

/// Island id named by `path`, if any.
///
/// Query strings and fragments are ignored, as are leading and trailing
/// slashes; only the first segment counts. `/` names no island.
pub fn parse_route_path(path: &str) -> Option<String> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segment = path.trim_matches('/').split('/').next().unwrap_or_default();
    if segment.is_empty() {
        None
    } else {
        Some(segment.to_string())
    }
}

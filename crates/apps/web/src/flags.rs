use serde::Serialize;

/// Which islands render their placeholder instead of real content.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "mode", content = "ids", rename_all = "snake_case")]
pub enum Skeleton {
    #[default]
    Off,
    All,
    Only(Vec<String>),
}

/// Development flags read from the page's query string by island loaders.
///
/// `?skeleton=true` forces every placeholder, `?skeleton=home,about` only
/// the listed ids. `?delay=750` holds every load back by that many ms.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DebugFlags {
    pub skeleton: Skeleton,
    pub delay_ms: Option<f64>,
}

impl DebugFlags {
    pub fn from_query(query: &str) -> Self {
        let mut flags = DebugFlags::default();
        let query = query.strip_prefix('?').unwrap_or(query);

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "skeleton" => flags.skeleton = parse_skeleton(value),
                "delay" => {
                    flags.delay_ms = value
                        .parse::<f64>()
                        .ok()
                        .filter(|ms| ms.is_finite() && *ms >= 0.0);
                }
                _ => {}
            }
        }
        flags
    }

    pub fn shows_skeleton(&self, id: &str) -> bool {
        match &self.skeleton {
            Skeleton::Off => false,
            Skeleton::All => true,
            Skeleton::Only(ids) => ids.iter().any(|s| s == id),
        }
    }
}

fn parse_skeleton(value: &str) -> Skeleton {
    match value {
        "" | "false" | "0" => Skeleton::Off,
        "true" | "1" => Skeleton::All,
        list => {
            let ids: Vec<String> = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if ids.is_empty() {
                Skeleton::Off
            } else {
                Skeleton::Only(ids)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DebugFlags, Skeleton};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_query_has_no_flags() {
        assert_eq!(DebugFlags::from_query(""), DebugFlags::default());
        assert_eq!(DebugFlags::from_query("?"), DebugFlags::default());
    }

    #[test]
    fn skeleton_true_covers_everything() {
        let flags = DebugFlags::from_query("?skeleton=true");
        assert_eq!(flags.skeleton, Skeleton::All);
        assert!(flags.shows_skeleton("anything"));
    }

    #[test]
    fn skeleton_list_names_islands() {
        let flags = DebugFlags::from_query("?utm=x&skeleton=home,about,&delay=750");
        assert_eq!(
            flags.skeleton,
            Skeleton::Only(vec!["home".to_string(), "about".to_string()])
        );
        assert!(flags.shows_skeleton("about"));
        assert!(!flags.shows_skeleton("links"));
        assert_eq!(flags.delay_ms, Some(750.0));
    }

    #[test]
    fn bad_delay_is_ignored() {
        assert_eq!(DebugFlags::from_query("delay=soon").delay_ms, None);
        assert_eq!(DebugFlags::from_query("delay=-5").delay_ms, None);
    }
}

use serde::{Deserialize, Serialize};

/// How equidistant active entities are ranked when picking the focus.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// The entity registered first wins.
    #[default]
    RegistrationOrder,
    /// The entity registered most recently wins.
    LatestRegistration,
}

impl TieBreak {
    /// Returns `true` if candidate `a` beats `b`.
    ///
    /// Candidates are `(distance, registration order)`.
    pub fn prefers(self, a: (f64, u64), b: (f64, u64)) -> bool {
        match a.0.total_cmp(&b.0) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => match self {
                TieBreak::RegistrationOrder => a.1 < b.1,
                TieBreak::LatestRegistration => a.1 > b.1,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TieBreak;

    #[test]
    fn nearer_always_wins() {
        for policy in [TieBreak::RegistrationOrder, TieBreak::LatestRegistration] {
            assert!(policy.prefers((1.0, 9), (2.0, 0)));
            assert!(!policy.prefers((2.0, 0), (1.0, 9)));
        }
    }

    #[test]
    fn ties_follow_policy() {
        assert!(TieBreak::RegistrationOrder.prefers((5.0, 0), (5.0, 1)));
        assert!(TieBreak::LatestRegistration.prefers((5.0, 1), (5.0, 0)));
    }
}

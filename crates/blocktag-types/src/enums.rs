//! Enumeration types shared across the workspace.

use serde::{Deserialize, Serialize};

/// Policy mode determining which block materials are exempt from tag
/// tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestrictionMode {
    /// A material is restricted iff it appears in the configured set.
    Blacklist,
    /// A material is restricted iff it does *not* appear in the set.
    Whitelist,
    /// No material is ever restricted, regardless of set contents. Exists
    /// so operators can keep a material list around while temporarily
    /// disabling enforcement.
    #[default]
    Disabled,
}

/// The game action the adapter is classifying against a tagged location.
///
/// Exploit classification is a pure function of the stored tag state and
/// does not branch on the action kind; it is carried for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// A block was placed.
    Place,
    /// A block was broken.
    Break,
    /// A block was displaced by physics (piston push/pull).
    Move,
    /// A block was interacted with (e.g. right-click harvest).
    Interact,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn restriction_mode_serde_names_are_lowercase() {
        let json = serde_json::to_string(&RestrictionMode::Blacklist).unwrap();
        assert_eq!(json, r#""blacklist""#);
        let mode: RestrictionMode = serde_json::from_str(r#""disabled""#).unwrap();
        assert_eq!(mode, RestrictionMode::Disabled);
    }

    #[test]
    fn default_mode_is_disabled() {
        assert_eq!(RestrictionMode::default(), RestrictionMode::Disabled);
    }
}

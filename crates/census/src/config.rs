use serde::{Deserialize, Serialize};

use crate::error::CensusError;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Reconciliation policy, loaded from a small TOML file:
///
/// ```toml
/// unregistered_scope = "organization"
/// tag_case = "upper"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CensusPolicy {
    pub unregistered_scope: UnregisteredScope,
    pub tag_case: TagCase,
}

/// Which registered tags stop a scanned tag from being reported NO_REGISTRADO.
///
/// Missing equipment is always judged against the location alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnregisteredScope {
    /// Only equipment registered at the censused location.
    Location,
    /// Any equipment in the organization. Tags registered elsewhere are
    /// reported as misplaced instead.
    #[default]
    Organization,
}

impl std::fmt::Display for UnregisteredScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Location => write!(f, "location"),
            Self::Organization => write!(f, "organization"),
        }
    }
}

/// Case handling for tag ids. Applied to scanned and registered tags alike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagCase {
    #[default]
    Preserve,
    /// Upper-case everything; EPC readers disagree on hex case.
    Upper,
}

impl TagCase {
    pub fn apply(&self, tag: &str) -> String {
        match self {
            Self::Preserve => tag.to_string(),
            Self::Upper => tag.to_uppercase(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse
// ---------------------------------------------------------------------------

impl CensusPolicy {
    pub fn from_toml(input: &str) -> Result<Self, CensusError> {
        toml::from_str(input).map_err(|e| CensusError::PolicyParse(e.to_string()))
    }

    /// Whether reconciliation needs the organization-wide tag index.
    pub fn needs_organization_index(&self) -> bool {
        self.unregistered_scope == UnregisteredScope::Organization
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let policy = CensusPolicy::default();
        assert_eq!(policy.unregistered_scope, UnregisteredScope::Organization);
        assert_eq!(policy.tag_case, TagCase::Preserve);
        assert!(policy.needs_organization_index());
    }

    #[test]
    fn parse_full() {
        let policy = CensusPolicy::from_toml(
            r#"
unregistered_scope = "location"
tag_case = "upper"
"#,
        )
        .unwrap();
        assert_eq!(policy.unregistered_scope, UnregisteredScope::Location);
        assert_eq!(policy.tag_case, TagCase::Upper);
        assert!(!policy.needs_organization_index());
    }

    #[test]
    fn parse_empty_uses_defaults() {
        assert_eq!(CensusPolicy::from_toml("").unwrap(), CensusPolicy::default());
    }

    #[test]
    fn unknown_scope_rejected() {
        let err = CensusPolicy::from_toml(r#"unregistered_scope = "planet""#).unwrap_err();
        assert!(matches!(err, CensusError::PolicyParse(_)));
    }

    #[test]
    fn unknown_key_rejected() {
        let err = CensusPolicy::from_toml(r#"scope = "location""#).unwrap_err();
        assert!(matches!(err, CensusError::PolicyParse(_)));
    }
}

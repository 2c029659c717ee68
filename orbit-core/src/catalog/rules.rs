//! Library inclusion rules.
//!
//! The policy is an unconditional AND over rule actions: a library with no
//! rules is always applicable, and a library with rules is applicable only
//! when every rule's action is `allow`. A conditional `disallow` excludes
//! the library even when its platform condition names another OS; richer
//! condition semantics are deliberately out of scope. Unrecognized
//! condition keys are treated as always-allow and logged.

use tracing::debug;

use super::manifest::{LibraryRule, RuleAction};

/// Decide whether a library's rules admit it on this platform.
pub fn library_applicable(rules: &[LibraryRule]) -> bool {
    if rules.is_empty() {
        return true;
    }

    rules.iter().all(|rule| {
        if !rule.extra.is_empty() {
            let keys: Vec<&String> = rule.extra.keys().collect();
            debug!(?keys, "skipping unrecognized rule conditions");
        }
        rule.action == RuleAction::Allow
    })
}

#[cfg(test)]
mod rules_tests {
    use super::*;
    use crate::catalog::manifest::OsCondition;

    fn rule(action: RuleAction) -> LibraryRule {
        LibraryRule {
            action,
            os: None,
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_no_rules_is_applicable() {
        assert!(library_applicable(&[]));
    }

    #[test]
    fn test_all_allow_is_applicable() {
        assert!(library_applicable(&[rule(RuleAction::Allow)]));
        assert!(library_applicable(&[
            rule(RuleAction::Allow),
            rule(RuleAction::Allow)
        ]));
    }

    #[test]
    fn test_any_disallow_excludes() {
        assert!(!library_applicable(&[
            rule(RuleAction::Allow),
            rule(RuleAction::Disallow)
        ]));
        assert!(!library_applicable(&[rule(RuleAction::Disallow)]));
    }

    #[test]
    fn test_conditional_disallow_excludes_regardless_of_os() {
        let conditional = LibraryRule {
            action: RuleAction::Disallow,
            os: Some(OsCondition {
                name: Some("osx".to_string()),
                extra: serde_json::Map::new(),
            }),
            extra: serde_json::Map::new(),
        };
        assert!(!library_applicable(&[rule(RuleAction::Allow), conditional]));
    }

    #[test]
    fn test_unrecognized_condition_keys_do_not_exclude() {
        let mut extra = serde_json::Map::new();
        extra.insert("features".to_string(), serde_json::json!({"demo": true}));
        let exotic = LibraryRule {
            action: RuleAction::Allow,
            os: None,
            extra,
        };
        assert!(library_applicable(&[exotic]));
    }
}

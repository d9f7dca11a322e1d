//! Degraded scanning: per-method regular expressions run over raw text.

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::rules::{lookup, Technology};

type PatternTable = Vec<(&'static str, Regex)>;

/// Compiled `method_patterns` of every rule set.
static PATTERNS: Lazy<HashMap<Technology, PatternTable>> = Lazy::new(|| {
    Technology::ALL
        .into_iter()
        .map(|tech| {
            let table = lookup(tech)
                .method_patterns
                .iter()
                .filter_map(|p| match Regex::new(p.pattern) {
                    Ok(re) => Some((p.method, re)),
                    Err(e) => {
                        warn!(technology = %tech, method = p.method, error = %e, "invalid method pattern");
                        None
                    }
                })
                .collect();
            (tech, table)
        })
        .collect()
});

/// Names of the methods whose pattern matches anywhere in `source`.
pub fn found_methods(technology: Technology, source: &str) -> BTreeSet<String> {
    PATTERNS
        .get(&technology)
        .map(|table| {
            table
                .iter()
                .filter(|(_, re)| re.is_match(source))
                .map(|(method, _)| method.to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flutter_patterns() {
        let source = "await MappSdk.engage(a, b, c, d, e);\nMappSdk.isReady ();";
        let found = found_methods(Technology::Flutter, source);
        assert_eq!(
            found.into_iter().collect::<Vec<_>>(),
            vec!["engage".to_string(), "isReady".to_string()]
        );
    }

    #[test]
    fn test_bare_engage_matches_for_flutter() {
        let found = found_methods(Technology::Flutter, "engage(\"k\")");
        assert!(found.contains("engage"));
        assert!(!found_methods(Technology::Flutter, "disengage()").contains("engage"));
    }

    #[test]
    fn test_objc_message_syntax() {
        let source = "[MappSdk engageWithConfig:config];\nBOOL on = [MappSdk isPushEnabled];";
        let found = found_methods(Technology::IosObjc, source);
        assert!(found.contains("engage"));
        assert!(found.contains("isPushEnabled"));
        assert!(!found.contains("setPushEnabled"));
    }

    #[test]
    fn test_every_pattern_compiles() {
        for tech in Technology::ALL {
            assert_eq!(
                PATTERNS[&tech].len(),
                lookup(tech).method_patterns.len(),
                "{}",
                tech
            );
        }
    }
}

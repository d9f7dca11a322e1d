//! Per-technology Mapp SDK documentation used as rule data.
//!
//! Each supported technology has one immutable [`TechnologyRuleSet`]
//! describing the SDK facade, the initializer and its parameters, the
//! documented methods with their arities, best practices, and the
//! error-handling recommendation. Changing the SDK's documented contract
//! means editing the data modules here, not the analysis code.

mod android;
mod flutter;
mod ios;
mod react_native;
mod technology;

use std::collections::HashSet;

use serde::Serialize;

pub use technology::{classify, classify_or, for_extension, Technology, DEFAULT_TECHNOLOGY};

/// A documented parameter of the initializer or an SDK method.
#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub type_tag: &'static str,
    pub required: bool,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_values: Option<&'static [&'static str]>,
}

impl ParamSpec {
    pub const fn new(name: &'static str, type_tag: &'static str, description: &'static str) -> Self {
        ParamSpec {
            name,
            type_tag,
            required: true,
            description,
            valid_values: None,
        }
    }

    pub const fn with_values(mut self, values: &'static [&'static str]) -> Self {
        self.valid_values = Some(values);
        self
    }
}

/// How the SDK session must be established.
#[derive(Debug, Clone, Serialize)]
pub struct InitializationSpec {
    pub required: bool,
    pub method: &'static str,
    pub parameters: &'static [ParamSpec],
    pub example: &'static str,
}

impl InitializationSpec {
    /// Names of the required parameters, in declaration order.
    pub fn required_parameters(&self) -> Vec<&'static str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect()
    }
}

/// A documented SDK method invoked through the facade.
#[derive(Debug, Clone, Serialize)]
pub struct MethodSpec {
    pub name: &'static str,
    pub required: bool,
    pub parameters: &'static [ParamSpec],
    pub example: &'static str,
    pub requires_initialization: bool,
    pub description: &'static str,
}

impl MethodSpec {
    /// Number of arguments a call must supply.
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

/// Error-handling recommendation for SDK calls.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorHandlingSpec {
    pub recommendations: &'static [&'static str],
    pub example: &'static str,
}

/// Regex used to detect a method when the source cannot be parsed.
#[derive(Debug, Clone, Serialize)]
pub struct MethodPattern {
    pub method: &'static str,
    pub pattern: &'static str,
}

/// Complete documentation for one technology.
#[derive(Debug, Clone, Serialize)]
pub struct TechnologyRuleSet {
    pub technology: Technology,
    pub name: &'static str,
    pub file_extensions: &'static [&'static str],
    /// Receiver through which SDK methods are invoked (e.g. `MappSdk`).
    pub facade: &'static str,
    pub initialization: InitializationSpec,
    pub methods: &'static [MethodSpec],
    pub best_practices: &'static [&'static str],
    pub error_handling: ErrorHandlingSpec,
    pub required_methods: &'static [&'static str],
    #[serde(skip)]
    pub method_patterns: &'static [MethodPattern],
}

impl TechnologyRuleSet {
    /// Find a documented method by name.
    pub fn method(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// The initializer as invoked through the facade, e.g. `MappSdk.engage`.
    pub fn qualified_initializer(&self) -> String {
        format!("{}.{}", self.facade, self.initialization.method)
    }

    /// First identifier of the facade (`MappSdk` for `MappSdk.shared`).
    pub fn facade_root(&self) -> &'static str {
        self.facade.split('.').next().unwrap_or(self.facade)
    }
}

/// Return the rule set for a technology.
///
/// Total over [`Technology`]; there is no lookup failure at runtime.
pub fn lookup(technology: Technology) -> &'static TechnologyRuleSet {
    match technology {
        Technology::Flutter => &flutter::RULES,
        Technology::ReactNative => &react_native::RULES,
        Technology::AndroidKotlin => &android::KOTLIN_RULES,
        Technology::AndroidJava => &android::JAVA_RULES,
        Technology::IosObjc => &ios::OBJC_RULES,
        Technology::IosSwift => &ios::SWIFT_RULES,
    }
}

/// Validate a single rule set's internal consistency.
pub fn validate(rules: &TechnologyRuleSet) -> anyhow::Result<()> {
    let mut names = HashSet::new();
    for method in rules.methods {
        if !names.insert(method.name) {
            anyhow::bail!("{}: duplicate method {:?}", rules.name, method.name);
        }
    }

    for required in rules.required_methods {
        if !names.contains(required) {
            anyhow::bail!(
                "{}: required method {:?} is not documented in methods",
                rules.name,
                required
            );
        }
    }

    for p in rules.method_patterns {
        if !names.contains(p.method) {
            anyhow::bail!(
                "{}: pattern for undocumented method {:?}",
                rules.name,
                p.method
            );
        }
        regex::Regex::new(p.pattern).map_err(|e| {
            anyhow::anyhow!("{}: invalid pattern {:?}: {}", rules.name, p.pattern, e)
        })?;
    }

    if rules.initialization.required && rules.initialization.required_parameters().is_empty() {
        anyhow::bail!("{}: initializer declares no required parameters", rules.name);
    }

    Ok(())
}

/// Validate every registered rule set. Call once at startup.
pub fn validate_all() -> anyhow::Result<()> {
    for tech in Technology::ALL {
        let rules = lookup(tech);
        if rules.technology != tech {
            anyhow::bail!("{}: registered under {}", rules.name, tech);
        }
        validate(rules)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rule_sets_are_valid() {
        validate_all().unwrap();
    }

    #[test]
    fn test_lookup_is_total() {
        for tech in Technology::ALL {
            assert_eq!(lookup(tech).technology, tech);
            assert!(!lookup(tech).file_extensions.is_empty());
        }
    }

    #[test]
    fn test_flutter_initializer_contract() {
        let rules = lookup(Technology::Flutter);
        assert_eq!(rules.initialization.method, "engage");
        assert_eq!(
            rules.initialization.required_parameters(),
            vec!["sdkKey", "googleProjectId", "server", "appId", "tenantId"]
        );
        assert_eq!(rules.qualified_initializer(), "MappSdk.engage");
    }

    #[test]
    fn test_flutter_method_arities() {
        let rules = lookup(Technology::Flutter);
        assert_eq!(rules.method("setAlias").unwrap().arity(), 1);
        assert_eq!(rules.method("setPushEnabled").unwrap().arity(), 1);
        assert_eq!(rules.method("isReady").unwrap().arity(), 0);
        assert!(!rules.method("isReady").unwrap().required);
        assert!(rules.method("unknownMethod").is_none());
    }

    #[test]
    fn test_swift_facade_root() {
        let rules = lookup(Technology::IosSwift);
        assert_eq!(rules.facade, "MappSdk.shared");
        assert_eq!(rules.facade_root(), "MappSdk");
    }

    #[test]
    fn test_validate_rejects_undocumented_required_method() {
        let mut broken = lookup(Technology::Flutter).clone();
        broken.required_methods = &["engage", "missingMethod"];
        let err = validate(&broken).unwrap_err();
        assert!(err.to_string().contains("missingMethod"));
    }

    #[test]
    fn test_rule_set_serializes_for_prompt_context() {
        let json = serde_json::to_string(lookup(Technology::Flutter)).unwrap();
        assert!(json.contains("\"sdkKey\""));
        assert!(json.contains("\"handledPushOpen\""));
        assert!(!json.contains("method_patterns"));
    }
}

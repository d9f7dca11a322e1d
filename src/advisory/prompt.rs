//! Prompt construction for the advisory exchange.

use std::fmt::Write;

use crate::rules::TechnologyRuleSet;

/// One advisory exchange: documentation context plus the code under review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryRequest {
    pub system_prompt: String,
    pub user_prompt: String,
}

impl AdvisoryRequest {
    pub fn build(rules: &TechnologyRuleSet, project_code: &str) -> Self {
        Self {
            system_prompt: system_prompt(rules),
            user_prompt: user_prompt(rules, project_code),
        }
    }
}

fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Documentation context for a rule set.
pub fn documentation_context(rules: &TechnologyRuleSet) -> String {
    format!(
        "Technology: {name}\n\
         Documentation for {name}:\n\n\
         1. Initialization Requirements:\n{init}\n\n\
         2. Available Methods:\n{methods}\n\n\
         3. Best Practices:\n{practices}\n\n\
         4. Error Handling:\n{errors}\n",
        name = rules.name,
        init = pretty(&rules.initialization),
        methods = pretty(&rules.methods),
        practices = rules.best_practices.join("\n"),
        errors = pretty(&rules.error_handling),
    )
}

fn system_prompt(rules: &TechnologyRuleSet) -> String {
    format!(
        "You are a Mapp SDK expert analyzing {name} projects.\n\
         IMPORTANT: Only flag issues that explicitly violate the provided documentation.\n\
         Do not suggest changes unless they directly contradict the documentation.\n\
         For each potential issue:\n\
         1. Check the exact method signature in the documentation\n\
         2. Verify parameter types and requirements\n\
         3. Only report issues if implementation differs from documentation\n\n\
         Documentation reference:\n{context}",
        name = rules.name,
        context = documentation_context(rules),
    )
}

fn user_prompt(rules: &TechnologyRuleSet, project_code: &str) -> String {
    let init = rules.initialization.method;
    let params: Vec<_> = rules
        .initialization
        .parameters
        .iter()
        .map(|p| p.name)
        .collect();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Analyze this {} code for Mapp SDK implementation compliance.",
        rules.name
    );
    out.push_str("Base your analysis ONLY on the provided documentation.\n\n");
    out.push_str("CODE TO ANALYZE:\n");
    out.push_str(project_code);
    out.push_str("\n\nREQUIRED CHECKS:\n\n");

    out.push_str("1. SDK Initialization (CRITICAL):\n");
    let _ = writeln!(
        out,
        "- Search for '{}(' or '.{}(' calls",
        rules.qualified_initializer(),
        init
    );
    let _ = writeln!(
        out,
        "- Verify exact parameter count and order: ({})",
        params.join(", ")
    );
    let _ = writeln!(out, "- Flag if {}() is not found or parameters are incorrect\n", init);

    out.push_str("2. Method Implementation Status:\nFor each method, indicate:\n");
    for method in rules.required_methods {
        let _ = writeln!(out, "- [FOUND/MISSING] {}.{}()", rules.facade, method);
    }

    out.push_str("\n3. Method Order & Dependencies:\n");
    let _ = writeln!(out, "- Verify {}() is called before other SDK methods", init);
    out.push_str("- Look for proper async/await usage\n\n");

    out.push_str(
        "4. Error Handling:\n\
         - Check for try-catch blocks around SDK calls\n\
         - Verify proper error handling patterns\n\n\
         FORMAT YOUR RESPONSE AS FOLLOWS:\n\
         Critical Issues:\n\
         - <list each critical issue>\n\n\
         Missing Implementations:\n\
         - <list missing required methods>\n\n\
         Improvements Needed:\n\
         - <list suggested improvements>\n\n\
         Security Concerns:\n\
         - <list security issues>\n\n\
         Use exact method names and parameters from the documentation.\n\
         Flag ANY deviation from the documentation as an issue.\n",
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{lookup, Technology};

    #[test]
    fn test_flutter_prompt_lists_required_methods() {
        let request = AdvisoryRequest::build(lookup(Technology::Flutter), "MappSdk.isReady();");
        assert!(request.user_prompt.contains("CODE TO ANALYZE:\nMappSdk.isReady();"));
        assert!(request.user_prompt.contains("- [FOUND/MISSING] MappSdk.engage()"));
        assert!(request.user_prompt.contains("- [FOUND/MISSING] MappSdk.handledPushOpen()"));
        assert!(request
            .user_prompt
            .contains("(sdkKey, googleProjectId, server, appId, tenantId)"));
        assert!(request.user_prompt.contains("Security Concerns:"));
    }

    #[test]
    fn test_system_prompt_embeds_rule_json() {
        let request = AdvisoryRequest::build(lookup(Technology::IosSwift), "");
        assert!(request.system_prompt.contains("Technology: "));
        assert!(request.system_prompt.contains("\"method\": \"engage\""));
        assert!(request.user_prompt.contains("[FOUND/MISSING] MappSdk.shared."));
    }
}

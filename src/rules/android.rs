//! Android SDK documentation, shared between the Kotlin and Java dialects.

use super::{
    ErrorHandlingSpec, InitializationSpec, MethodPattern, MethodSpec, ParamSpec, Technology,
    TechnologyRuleSet,
};

const ENGAGE_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("context", "Context", "Android application context"),
    ParamSpec::new("config", "MappConfig", "SDK configuration"),
];

const BEST_PRACTICES: &[&str] = &[
    "Initialize SDK in Application class",
    "Handle initialization errors properly",
];

const RECOMMENDATIONS: &[&str] = &[
    "Use try-catch blocks around SDK calls",
    "Log initialization failures",
];

const PATTERNS: &[MethodPattern] = &[
    MethodPattern {
        method: "engage",
        pattern: r"MappSdk\.engage\s*\(",
    },
    MethodPattern {
        method: "isPushEnabled",
        pattern: r"MappSdk\.isPushEnabled\s*\(",
    },
    MethodPattern {
        method: "setPushEnabled",
        pattern: r"MappSdk\.setPushEnabled\s*\(",
    },
];

const REQUIRED: &[&str] = &["engage", "isPushEnabled", "setPushEnabled"];

pub static KOTLIN_RULES: TechnologyRuleSet = TechnologyRuleSet {
    technology: Technology::AndroidKotlin,
    name: "Android (Kotlin)",
    file_extensions: &[".kt"],
    facade: "MappSdk",
    initialization: InitializationSpec {
        required: true,
        method: "engage",
        parameters: ENGAGE_PARAMS,
        example: "MappSdk.engage(context, config)",
    },
    methods: &[
        MethodSpec {
            name: "engage",
            required: true,
            parameters: ENGAGE_PARAMS,
            example: "MappSdk.engage(context, config)",
            requires_initialization: false,
            description: "Initialize the Mapp SDK",
        },
        MethodSpec {
            name: "isPushEnabled",
            required: true,
            parameters: &[],
            example: "val enabled = MappSdk.isPushEnabled()",
            requires_initialization: true,
            description: "Check if push notifications are enabled",
        },
        MethodSpec {
            name: "setPushEnabled",
            required: true,
            parameters: &[ParamSpec::new(
                "enabled",
                "Boolean",
                "Whether push notifications should be enabled",
            )],
            example: "MappSdk.setPushEnabled(true)",
            requires_initialization: true,
            description: "Enable or disable push notifications",
        },
    ],
    best_practices: BEST_PRACTICES,
    error_handling: ErrorHandlingSpec {
        recommendations: RECOMMENDATIONS,
        example: r#"try {
    MappSdk.engage(context, config)
} catch (exception: Exception) {
    Log.e("MappSDK", "Failed to initialize: ${exception.message}")
}"#,
    },
    required_methods: REQUIRED,
    method_patterns: PATTERNS,
};

pub static JAVA_RULES: TechnologyRuleSet = TechnologyRuleSet {
    technology: Technology::AndroidJava,
    name: "Android (Java)",
    file_extensions: &[".java"],
    facade: "MappSdk",
    initialization: InitializationSpec {
        required: true,
        method: "engage",
        parameters: ENGAGE_PARAMS,
        example: "MappSdk.engage(getApplicationContext(), config);",
    },
    methods: &[
        MethodSpec {
            name: "engage",
            required: true,
            parameters: ENGAGE_PARAMS,
            example: "MappSdk.engage(context, config);",
            requires_initialization: false,
            description: "Initialize the Mapp SDK",
        },
        MethodSpec {
            name: "isPushEnabled",
            required: true,
            parameters: &[],
            example: "boolean enabled = MappSdk.isPushEnabled();",
            requires_initialization: true,
            description: "Check if push notifications are enabled",
        },
        MethodSpec {
            name: "setPushEnabled",
            required: true,
            parameters: &[ParamSpec::new(
                "enabled",
                "boolean",
                "Whether push notifications should be enabled",
            )],
            example: "MappSdk.setPushEnabled(true);",
            requires_initialization: true,
            description: "Enable or disable push notifications",
        },
    ],
    best_practices: BEST_PRACTICES,
    error_handling: ErrorHandlingSpec {
        recommendations: RECOMMENDATIONS,
        example: r#"try {
    MappSdk.engage(context, config);
} catch (Exception e) {
    Log.e("MappSDK", "Failed to initialize: " + e.getMessage());
}"#,
    },
    required_methods: REQUIRED,
    method_patterns: PATTERNS,
};

//! iOS SDK documentation for Swift and Objective-C.

use super::{
    ErrorHandlingSpec, InitializationSpec, MethodPattern, MethodSpec, ParamSpec, Technology,
    TechnologyRuleSet,
};

const BEST_PRACTICES: &[&str] = &[
    "Initialize SDK in AppDelegate",
    "Handle initialization errors properly",
];

const REQUIRED: &[&str] = &["engage", "isPushEnabled", "setPushEnabled"];

const SWIFT_ENGAGE_PARAMS: &[ParamSpec] = &[ParamSpec::new(
    "configuration",
    "MappConfiguration",
    "SDK configuration object",
)];

pub static SWIFT_RULES: TechnologyRuleSet = TechnologyRuleSet {
    technology: Technology::IosSwift,
    name: "iOS (Swift)",
    file_extensions: &[".swift"],
    facade: "MappSdk.shared",
    initialization: InitializationSpec {
        required: true,
        method: "engage",
        parameters: SWIFT_ENGAGE_PARAMS,
        example: "MappSdk.shared.engage(with: config)",
    },
    methods: &[
        MethodSpec {
            name: "engage",
            required: true,
            parameters: SWIFT_ENGAGE_PARAMS,
            example: "try MappSdk.shared.engage(with: config)",
            requires_initialization: false,
            description: "Initialize the Mapp SDK",
        },
        MethodSpec {
            name: "isPushEnabled",
            required: true,
            parameters: &[],
            example: "let enabled = MappSdk.shared.isPushEnabled()",
            requires_initialization: true,
            description: "Check if push notifications are enabled",
        },
        MethodSpec {
            name: "setPushEnabled",
            required: true,
            parameters: &[ParamSpec::new(
                "enabled",
                "Bool",
                "Whether push notifications should be enabled",
            )],
            example: "MappSdk.shared.setPushEnabled(true)",
            requires_initialization: true,
            description: "Enable or disable push notifications",
        },
    ],
    best_practices: BEST_PRACTICES,
    error_handling: ErrorHandlingSpec {
        recommendations: &[
            "Use do-catch blocks around SDK calls",
            "Log initialization failures",
        ],
        example: r#"do {
    try MappSdk.shared.engage(with: config)
} catch {
    print("Mapp SDK initialization failed: \(error)")
}"#,
    },
    required_methods: REQUIRED,
    method_patterns: &[
        MethodPattern {
            method: "engage",
            pattern: r"MappSdk\.shared\.engage\s*\(",
        },
        MethodPattern {
            method: "isPushEnabled",
            pattern: r"MappSdk\.shared\.isPushEnabled",
        },
        MethodPattern {
            method: "setPushEnabled",
            pattern: r"MappSdk\.shared\.setPushEnabled",
        },
    ],
};

// Objective-C has no structural frontend; analysis always runs on the
// pattern table below.
pub static OBJC_RULES: TechnologyRuleSet = TechnologyRuleSet {
    technology: Technology::IosObjc,
    name: "iOS (Objective-C)",
    file_extensions: &[".m", ".h"],
    facade: "MappSdk",
    initialization: InitializationSpec {
        required: true,
        method: "engage",
        parameters: &[ParamSpec::new("config", "MappConfig", "SDK configuration")],
        example: "[MappSdk engageWithConfig:config];",
    },
    methods: &[
        MethodSpec {
            name: "engage",
            required: true,
            parameters: &[ParamSpec::new("config", "MappConfig", "SDK configuration")],
            example: "[MappSdk engageWithConfig:config];",
            requires_initialization: false,
            description: "Initialize the Mapp SDK",
        },
        MethodSpec {
            name: "isPushEnabled",
            required: true,
            parameters: &[],
            example: "BOOL enabled = [MappSdk isPushEnabled];",
            requires_initialization: true,
            description: "Check if push notifications are enabled",
        },
        MethodSpec {
            name: "setPushEnabled",
            required: true,
            parameters: &[ParamSpec::new(
                "enabled",
                "BOOL",
                "Whether push notifications should be enabled",
            )],
            example: "[MappSdk setPushEnabled:YES];",
            requires_initialization: true,
            description: "Enable or disable push notifications",
        },
    ],
    best_practices: &["Initialize SDK in AppDelegate", "Handle initialization errors"],
    error_handling: ErrorHandlingSpec {
        recommendations: &["Use @try/@catch blocks", "Log errors appropriately"],
        example: r#"@try {
    [MappSdk engageWithConfig:config];
} @catch (NSException *exception) {
    NSLog(@"Mapp SDK initialization failed: %@", exception);
}"#,
    },
    required_methods: REQUIRED,
    method_patterns: &[
        MethodPattern {
            method: "engage",
            pattern: r"\[MappSdk engageWithConfig:",
        },
        MethodPattern {
            method: "isPushEnabled",
            pattern: r"\[MappSdk isPushEnabled\]",
        },
        MethodPattern {
            method: "setPushEnabled",
            pattern: r"\[MappSdk setPushEnabled:",
        },
    ],
};

//! Flutter (Dart) plugin documentation.

use super::{
    ErrorHandlingSpec, InitializationSpec, MethodPattern, MethodSpec, ParamSpec, Technology,
    TechnologyRuleSet,
};

const SERVERS: &[&str] = &["L3", "L3_US", "EMC", "EMC_US", "CROC"];

const ENGAGE_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("sdkKey", "string", "The SDK ID for your account"),
    ParamSpec::new(
        "googleProjectId",
        "string",
        "Can be an empty string; kept for backward compatibility",
    ),
    ParamSpec::new(
        "server",
        "SERVER",
        "Server for engagement (L3, L3_US, EMC, EMC_US, CROC)",
    )
    .with_values(SERVERS),
    ParamSpec::new("appId", "string", "Application ID"),
    ParamSpec::new(
        "tenantId",
        "string",
        "ID which recognizes you at the Mapp Engage system",
    ),
];

const ENGAGE_EXAMPLE: &str = r#"await MappSdk.engage(
    "sdkKey",
    "googleProjectId",
    SERVER.L3,
    "appId",
    "tenantId"
)"#;

pub static RULES: TechnologyRuleSet = TechnologyRuleSet {
    technology: Technology::Flutter,
    name: "Flutter",
    file_extensions: &[".dart"],
    facade: "MappSdk",
    initialization: InitializationSpec {
        required: true,
        method: "engage",
        parameters: ENGAGE_PARAMS,
        example: ENGAGE_EXAMPLE,
    },
    methods: &[
        MethodSpec {
            name: "engage",
            required: true,
            parameters: ENGAGE_PARAMS,
            example: ENGAGE_EXAMPLE,
            requires_initialization: false,
            description: "Initialize the Mapp SDK",
        },
        MethodSpec {
            name: "logOut",
            required: false,
            parameters: &[ParamSpec::new(
                "pushEnabled",
                "boolean",
                "Sets the state of receiving push messages while logging out",
            )],
            example: "await MappSdk.logOut(true)",
            requires_initialization: true,
            description: "Logs out the current user, with option to control push message state",
        },
        MethodSpec {
            name: "isReady",
            required: false,
            parameters: &[],
            example: "await MappSdk.isReady()",
            requires_initialization: true,
            description: "Check if SDK is ready to use",
        },
        MethodSpec {
            name: "getAlias",
            required: false,
            parameters: &[],
            example: "String alias = await MappSdk.getAlias()",
            requires_initialization: true,
            description: "Get device alias",
        },
        MethodSpec {
            name: "setAlias",
            required: false,
            parameters: &[ParamSpec::new("alias", "string", "Device alias")],
            example: "MappSdk.setAlias(\"your_alias\");",
            requires_initialization: true,
            description: "Set device alias",
        },
        MethodSpec {
            name: "isPushEnabled",
            required: true,
            parameters: &[],
            example: "bool enabled = await MappSdk.isPushEnabled()",
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
            example: "await MappSdk.setPushEnabled(true)",
            requires_initialization: true,
            description: "Enable or disable push notifications",
        },
        MethodSpec {
            name: "handledPushOpen",
            required: true,
            parameters: &[],
            example: "await MappSdk.handledPushOpen()",
            requires_initialization: true,
            description: "Must be called when a push notification is opened",
        },
        MethodSpec {
            name: "startGeoFencing",
            required: false,
            parameters: &[],
            example: "await MappSdk.startGeoFencing()",
            requires_initialization: true,
            description: "Start geofencing services if location permissions are granted",
        },
        MethodSpec {
            name: "stopGeoFencing",
            required: false,
            parameters: &[],
            example: "await MappSdk.stopGeoFencing()",
            requires_initialization: true,
            description: "Stop geofencing services",
        },
    ],
    best_practices: &[
        "Initialize SDK at application startup using engage method",
        "Handle iOS specific configuration in AppoxeeConfig.plist",
        "Always check if plugin is initialized with isReady()",
        "Implement proper error handling with try-catch blocks",
        "Use appropriate server constant from the SERVER enum",
        "Handle push notification permissions appropriately",
        "Implement all required event handlers for push notifications",
    ],
    error_handling: ErrorHandlingSpec {
        recommendations: &[
            "Wrap SDK calls in try-catch blocks",
            "Handle initialization failures gracefully",
            "Check isReady() before making other SDK calls",
            "Handle platform-specific differences (iOS vs Android)",
        ],
        example: r#"try {
    await MappSdk.engage(...);
} catch (error) {
    print('Mapp SDK error: $error');
}"#,
    },
    required_methods: &["engage", "isPushEnabled", "setPushEnabled", "handledPushOpen"],
    method_patterns: &[
        MethodPattern {
            method: "engage",
            pattern: r"\bengage\s*\(",
        },
        MethodPattern {
            method: "isPushEnabled",
            pattern: r"MappSdk\.isPushEnabled\s*\(",
        },
        MethodPattern {
            method: "setPushEnabled",
            pattern: r"MappSdk\.setPushEnabled\s*\(",
        },
        MethodPattern {
            method: "handledPushOpen",
            pattern: r"MappSdk\.handledPushOpen\s*\(",
        },
        MethodPattern {
            method: "isReady",
            pattern: r"MappSdk\.isReady\s*\(",
        },
    ],
};

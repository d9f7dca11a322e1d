//! React Native (JavaScript / TypeScript) module documentation.

use super::{
    ErrorHandlingSpec, InitializationSpec, MethodPattern, MethodSpec, ParamSpec, Technology,
    TechnologyRuleSet,
};

const INITIALIZE_EXAMPLE: &str = r#"import MappSdk from '@mapp/react-native-sdk';

await MappSdk.initialize({
  sdkKey: "your-sdk-key",
  server: "L3",
  appId: "your-app-id",
  tenantId: "your-tenant-id"
});"#;

pub static RULES: TechnologyRuleSet = TechnologyRuleSet {
    technology: Technology::ReactNative,
    name: "React Native",
    file_extensions: &[".jsx", ".tsx", ".js", ".ts"],
    facade: "MappSdk",
    initialization: InitializationSpec {
        required: true,
        method: "initialize",
        parameters: &[
            ParamSpec::new("sdkKey", "string", "The SDK ID for your account"),
            ParamSpec::new("server", "string", "Server for engagement")
                .with_values(&["L3", "L3_US", "EMC", "EMC_US", "CROC"]),
            ParamSpec::new("appId", "string", "Application ID"),
            ParamSpec::new(
                "tenantId",
                "string",
                "ID which recognizes you at the Mapp Engage system",
            ),
        ],
        example: INITIALIZE_EXAMPLE,
    },
    methods: &[
        MethodSpec {
            name: "initialize",
            required: true,
            parameters: &[ParamSpec::new("config", "object", "SDK configuration object")],
            example: "await MappSdk.initialize(config)",
            requires_initialization: false,
            description: "Initialize the Mapp SDK",
        },
        MethodSpec {
            name: "isPushEnabled",
            required: true,
            parameters: &[],
            example: "const enabled = await MappSdk.isPushEnabled();",
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
            example: "await MappSdk.setPushEnabled(true);",
            requires_initialization: true,
            description: "Enable or disable push notifications",
        },
    ],
    best_practices: &[
        "Initialize SDK in app root component",
        "Handle initialization errors properly",
        "Check initialization status before using other methods",
    ],
    error_handling: ErrorHandlingSpec {
        recommendations: &[
            "Wrap SDK calls in try-catch blocks",
            "Handle initialization failures gracefully",
        ],
        example: r#"try {
  await MappSdk.initialize(config);
} catch (error) {
  console.error('Mapp SDK initialization failed:', error);
}"#,
    },
    required_methods: &["initialize", "isPushEnabled", "setPushEnabled"],
    method_patterns: &[
        MethodPattern {
            method: "initialize",
            pattern: r"MappSdk\.initialize\s*\(",
        },
        MethodPattern {
            method: "isPushEnabled",
            pattern: r"MappSdk\.isPushEnabled\s*\(",
        },
        MethodPattern {
            method: "setPushEnabled",
            pattern: r"MappSdk\.setPushEnabled\s*\(",
        },
    ],
};

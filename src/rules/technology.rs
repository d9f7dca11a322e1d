//! Supported technologies and file-extension classification.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// A source dialect/platform with its own rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Technology {
    Flutter,
    ReactNative,
    AndroidKotlin,
    AndroidJava,
    IosObjc,
    IosSwift,
}

impl Technology {
    /// Every supported technology, in registry order.
    pub const ALL: [Technology; 6] = [
        Technology::Flutter,
        Technology::ReactNative,
        Technology::AndroidKotlin,
        Technology::AndroidJava,
        Technology::IosObjc,
        Technology::IosSwift,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Technology::Flutter => "flutter",
            Technology::ReactNative => "react-native",
            Technology::AndroidKotlin => "android-kotlin",
            Technology::AndroidJava => "android-java",
            Technology::IosObjc => "ios-objc",
            Technology::IosSwift => "ios-swift",
        }
    }
}

impl std::fmt::Display for Technology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Technology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flutter" => Ok(Technology::Flutter),
            "react-native" => Ok(Technology::ReactNative),
            "android-kotlin" => Ok(Technology::AndroidKotlin),
            "android-java" => Ok(Technology::AndroidJava),
            "ios-objc" => Ok(Technology::IosObjc),
            "ios-swift" => Ok(Technology::IosSwift),
            _ => Err(format!("unknown technology: {}", s)),
        }
    }
}

/// Technology used when a file's extension is not in the table.
pub const DEFAULT_TECHNOLOGY: Technology = Technology::Flutter;

/// Look up the technology for a bare extension (without dot, any case).
pub fn for_extension(ext: &str) -> Option<Technology> {
    match ext.to_lowercase().as_str() {
        "dart" => Some(Technology::Flutter),
        "js" | "jsx" | "ts" | "tsx" => Some(Technology::ReactNative),
        "kt" => Some(Technology::AndroidKotlin),
        "java" => Some(Technology::AndroidJava),
        "m" | "h" => Some(Technology::IosObjc),
        "swift" => Some(Technology::IosSwift),
        _ => None,
    }
}

/// Classify a file name, falling back to [`DEFAULT_TECHNOLOGY`].
pub fn classify(file_name: &str) -> Technology {
    classify_or(file_name, DEFAULT_TECHNOLOGY)
}

/// Classify a file name, falling back to `default` for unknown extensions.
pub fn classify_or(file_name: &str, default: Technology) -> Technology {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .and_then(for_extension)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_extensions() {
        assert_eq!(classify("lib/main.dart"), Technology::Flutter);
        assert_eq!(classify("App.tsx"), Technology::ReactNative);
        assert_eq!(classify("index.js"), Technology::ReactNative);
        assert_eq!(classify("MainApplication.kt"), Technology::AndroidKotlin);
        assert_eq!(classify("MainApplication.java"), Technology::AndroidJava);
        assert_eq!(classify("AppDelegate.m"), Technology::IosObjc);
        assert_eq!(classify("AppDelegate.h"), Technology::IosObjc);
        assert_eq!(classify("AppDelegate.swift"), Technology::IosSwift);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify("APP.TSX"), Technology::ReactNative);
        assert_eq!(classify("Main.Dart"), Technology::Flutter);
    }

    #[test]
    fn test_classify_unknown_uses_default() {
        assert_eq!(classify("README.md"), Technology::Flutter);
        assert_eq!(classify("Makefile"), Technology::Flutter);
        assert_eq!(
            classify_or("build.gradle", Technology::AndroidJava),
            Technology::AndroidJava
        );
    }

    #[test]
    fn test_technology_round_trips_through_str() {
        for tech in Technology::ALL {
            let parsed: Technology = tech.as_str().parse().unwrap();
            assert_eq!(parsed, tech);
        }
        assert!("cobol".parse::<Technology>().is_err());
    }
}

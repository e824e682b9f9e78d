use serde::{Deserialize, Serialize};

use crate::deprecations::DeprecationTable;
use crate::error::CodemodError;

pub const DEFAULT_PACKAGE_PATTERN: &str = r"braid-design-system(?:/css)?$";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CodemodConfig {
    /// Import sources whose specifiers are tracked.
    pub package_pattern: String,
    /// Named export holding the theme variables object.
    pub vars_export: String,
    pub deprecations: DeprecationTable,
    /// Re-emit rewritten modules through the swc printer instead of splicing.
    pub reformat: bool,
    /// Filename suffixes that are never re-emitted.
    pub reformat_exclude: Vec<String>,
}

impl Default for CodemodConfig {
    fn default() -> Self {
        Self {
            package_pattern: DEFAULT_PACKAGE_PATTERN.to_string(),
            vars_export: "vars".to_string(),
            deprecations: DeprecationTable::default(),
            reformat: false,
            reformat_exclude: vec![".less.d.ts".to_string(), ".vocab/index.ts".to_string()],
        }
    }
}

impl CodemodConfig {
    /// Missing keys fall back to the defaults.
    pub fn from_json(json: &str) -> Result<Self, CodemodError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = CodemodConfig::from_json(r#"{ "reformat": true, "varsExport": "tokens" }"#).unwrap();
        assert!(config.reformat);
        assert_eq!(config.vars_export, "tokens");
        assert_eq!(config.package_pattern, DEFAULT_PACKAGE_PATTERN);
        assert!(config.deprecations.is_deprecated("Box", "background"));
    }

    #[test]
    fn custom_deprecation_table_replaces_default() {
        let config = CodemodConfig::from_json(
            r#"{ "deprecations": { "Text": { "tone": { "secondary": "neutral" } } } }"#,
        )
        .unwrap();
        assert!(config.deprecations.is_deprecated("Text", "tone"));
        assert!(!config.deprecations.is_deprecated("Box", "background"));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            CodemodConfig::from_json("{ reformat: yes }"),
            Err(CodemodError::Config(_))
        ));
    }
}

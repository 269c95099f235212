use globset::Glob;
use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "excludePatterns[0]")
    pub field_path: String,
    /// Human-readable diagnostic.
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error for one field.
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

/// Defines errors that may occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error when one or more settings fail validation
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    /// Error when reading the configuration file
    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error when parsing the configuration file
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Renders collected validation errors as a numbered list.
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// バンドラー全体の設定
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BundlerSettings {
    /// 翻訳ディレクトリのサフィックス（例: `.i18n`）
    pub dir_suffix: String,

    /// フラグメントファイルの拡張子（ドットなし、例: `js`）
    pub fragment_extension: String,

    /// 生成バンドルが登録するランタイムレジストリのグローバル名
    pub registry_global: String,

    /// 探索から除外する glob パターン
    pub exclude_patterns: Vec<String>,
}

impl Default for BundlerSettings {
    fn default() -> Self {
        Self {
            dir_suffix: ".i18n".to_string(),
            fragment_extension: "js".to_string(),
            registry_global: "I18N".to_string(),
            exclude_patterns: vec!["**/node_modules/**".to_string()],
        }
    }
}

impl BundlerSettings {
    /// 指定言語のフラグメントファイル名（例: `en.js`）
    #[must_use]
    pub fn fragment_file_name(&self, lang: &str) -> String {
        format!("{lang}.{}", self.fragment_extension)
    }

    /// # Errors
    /// - Required field is empty
    /// - Invalid glob pattern
    /// - Invalid registry identifier
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if !self.dir_suffix.starts_with('.') || self.dir_suffix.len() < 2 {
            errors.push(ValidationError::new(
                "dirSuffix",
                "The suffix must start with a dot and name the directory kind, for example: \".i18n\"",
            ));
        }

        if self.fragment_extension.is_empty() || self.fragment_extension.starts_with('.') {
            errors.push(ValidationError::new(
                "fragmentExtension",
                "The extension must be non-empty and written without a leading dot, for example: \"js\"",
            ));
        }

        if !is_js_identifier(&self.registry_global) {
            errors.push(ValidationError::new(
                "registryGlobal",
                "The registry global must be a valid JavaScript identifier, for example: \"I18N\"",
            ));
        }

        for (index, pattern) in self.exclude_patterns.iter().enumerate() {
            if let Err(e) = Glob::new(pattern) {
                errors.push(ValidationError::new(
                    format!("excludePatterns[{index}]"),
                    format!("Invalid glob pattern '{pattern}': {e}"),
                ));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// 生成コードに埋め込める識別子かどうか
fn is_js_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

//! Typed application configuration loaded from a YAML file.
//!
//! The config is read once at startup and passed by reference into each
//! pipeline stage — no process-wide singletons. Folder paths support `~`
//! expansion and are resolved against the config file's directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Per-label override of a category's folder/naming templates.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LabelOverride {
    pub folder: Option<String>,
    pub naming: Option<String>,
}

/// Folder and filename templates for one category.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CategoryConfig {
    pub folder: Option<String>,
    pub naming: Option<String>,
    #[serde(default)]
    pub label_overrides: HashMap<String, LabelOverride>,
}

/// Application configuration.
///
/// `input_folder`, `output_folder` and `report_folder` are required;
/// everything else carries a default.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub input_folder: PathBuf,
    pub output_folder: PathBuf,
    pub report_folder: PathBuf,

    #[serde(default = "default_naming")]
    pub default_naming: String,
    /// strftime pattern used for the `{date}` template variable.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    #[serde(default)]
    pub llm_temperature: f32,
    #[serde(default = "default_label_threshold")]
    pub label_threshold: f32,

    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,
    #[serde(default = "default_ollama_timeout")]
    pub ollama_timeout_secs: u64,
    /// Vision-capable model used for OCR fallbacks.
    #[serde(default = "default_vision_model")]
    pub vision_model: String,

    /// Category key used when the model's classification matches nothing.
    #[serde(default = "default_category")]
    pub default_category: String,
    /// Category names offered to the model for classification.
    #[serde(default)]
    pub category_list: Vec<String>,
    /// Category key → folder/naming templates.
    #[serde(default)]
    pub category_paths: HashMap<String, CategoryConfig>,
}

fn default_naming() -> String {
    "{date}_{category}_{company}_{content_summary}.pdf".to_string()
}

fn default_date_format() -> String {
    "%y%m%d".to_string()
}

fn default_language() -> String {
    "de".to_string()
}

fn default_llm_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_label_threshold() -> f32 {
    0.8
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_timeout() -> u64 {
    300
}

fn default_vision_model() -> String {
    "llama3.2-vision:11b".to_string()
}

fn default_category() -> String {
    "sonstiges".to_string()
}

impl AppConfig {
    /// Load and validate the configuration from a YAML file.
    ///
    /// Missing required keys are a startup-fatal error. Relative folder
    /// paths are resolved against the directory containing the config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: AppConfig =
            serde_yaml::from_str(&raw).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.input_folder = resolve_path(&config.input_folder, base);
        config.output_folder = resolve_path(&config.output_folder, base);
        config.report_folder = resolve_path(&config.report_folder, base);

        config.validate()?;
        Ok(config)
    }

    /// Structural validation beyond what serde enforces.
    fn validate(&self) -> Result<(), ConfigError> {
        for key in self.category_paths.keys() {
            if key != &key.to_lowercase() {
                return Err(ConfigError::Invalid(format!(
                    "category key '{key}' must be lowercase"
                )));
            }
        }
        if self.default_category != self.default_category.to_lowercase() {
            return Err(ConfigError::Invalid(format!(
                "default_category '{}' must be lowercase",
                self.default_category
            )));
        }
        Ok(())
    }

    /// Map the model's free-text classification onto a configured category
    /// key, case-insensitively. Unknown or empty values fall back to the
    /// default category.
    pub fn normalize_category(&self, raw: &str) -> String {
        let key = raw.trim().to_lowercase();
        if !key.is_empty() && self.category_paths.contains_key(&key) {
            key
        } else {
            self.default_category.clone()
        }
    }

    /// Raw category configuration for a normalized key.
    pub fn category_config(&self, key: &str) -> Option<&CategoryConfig> {
        self.category_paths.get(key)
    }

    /// Filename template for a category: label override → category naming →
    /// global default.
    pub fn naming_for_category(&self, category: &str, label: Option<&str>) -> String {
        let cfg = self.category_config(category);
        if let (Some(cfg), Some(label)) = (cfg, label) {
            if let Some(naming) = cfg
                .label_overrides
                .get(label)
                .and_then(|o| o.naming.as_deref())
            {
                return naming.to_string();
            }
        }
        cfg.and_then(|c| c.naming.clone())
            .unwrap_or_else(|| self.default_naming.clone())
    }

    /// Folder template for a category: label override → category folder.
    /// `None` means "file directly under the output folder".
    pub fn folder_for_category(&self, category: &str, label: Option<&str>) -> Option<String> {
        let cfg = self.category_config(category)?;
        if let Some(label) = label {
            if let Some(folder) = cfg
                .label_overrides
                .get(label)
                .and_then(|o| o.folder.as_deref())
            {
                return Some(folder.to_string());
            }
        }
        cfg.folder.clone()
    }
}

/// Expand `~` and resolve relative paths against `base`.
fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    let expanded = expand_user(path);
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

fn expand_user(path: &Path) -> PathBuf {
    let Some(s) = path.to_str() else {
        return path.to_path_buf();
    };
    if s == "~" {
        return dirs::home_dir().unwrap_or_else(|| path.to_path_buf());
    }
    if let Some(rest) = s.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

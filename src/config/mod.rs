//! User settings
//!
//! Endpoint credentials, model choice, target language and the two global
//! shortcuts, stored in TOML format. Every field carries its own default so a
//! partial file merges field-by-field at the storage boundary.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Translation target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLang {
    /// English
    En,
    /// Simplified Chinese
    #[default]
    Zh,
}

/// Persisted user settings.
///
/// Read by the translation client and the hotkey dispatcher, written only by
/// the settings surface. Last write wins; there is no conflict resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bearer token for the chat-completion endpoint. Empty means unset.
    pub api_key: String,
    /// Chat-completion endpoint URL.
    pub api_endpoint: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Preferred translation target.
    pub target_lang: TargetLang,
    /// Shortcut that translates the current selection.
    pub translate_shortcut: String,
    /// Shortcut that enters screenshot-selection mode.
    pub screenshot_shortcut: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            target_lang: TargetLang::Zh,
            translate_shortcut: "Alt+T".to_string(),
            screenshot_shortcut: "Alt+Shift+S".to_string(),
        }
    }
}

impl Settings {
    /// Whether an API key has been configured.
    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Get the configuration directory, creating it if necessary.
pub fn config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "snaptranslate", "SnapTranslate")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Default settings file path inside the user config directory.
pub fn settings_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("settings.toml"))
}

/// Load settings from file.
pub fn load_settings(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    let settings: Settings = toml::from_str(&content)?;
    Ok(settings)
}

/// Save settings to file.
pub fn save_settings(settings: &Settings, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(settings)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load settings from the default location, falling back to defaults when the
/// file is absent or unreadable.
pub fn load_or_default() -> Settings {
    match settings_path() {
        Ok(path) if path.exists() => match load_settings(&path) {
            Ok(settings) => {
                tracing::info!("Loaded settings from {:?}", path);
                settings
            }
            Err(e) => {
                tracing::warn!("Failed to read settings ({}), using defaults", e);
                Settings::default()
            }
        },
        _ => Settings::default(),
    }
}

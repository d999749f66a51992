//! TOML settings beside the user's config dir, load-or-default-and-save.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use sb_core::decision::CaptureMode;

const SETTINGS_DIR_NAME: &str = "snapbook";
const SETTINGS_FILE_NAME: &str = "settings.toml";
const DEFAULT_WIDTH_HINT: u32 = 960;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub capture: CaptureSettings,
    pub document: DocumentSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log directive applied when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CaptureSettings {
    pub mode: CaptureMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    /// Where documents given as bare file names are placed.
    pub directory: Option<PathBuf>,
    /// Rendered image width recorded in the package.
    pub image_width_hint: u32,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            directory: None,
            image_width_hint: DEFAULT_WIDTH_HINT,
        }
    }
}

impl DocumentSettings {
    pub fn directory_or_default(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| {
            dirs::document_dir().unwrap_or_else(|| PathBuf::from("."))
        })
    }
}

/// Reads and writes the settings file, creating it with defaults on first
/// run.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/snapbook/settings.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(env::temp_dir)
            .join(SETTINGS_DIR_NAME)
            .join(SETTINGS_FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("create settings dir failed: {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn load_or_init(&self) -> Result<Settings> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => toml::from_str(&raw)
                .with_context(|| format!("parse settings failed: {}", self.path.display())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let defaults = Settings::default();
                self.save(&defaults)?;
                log::info!("settings file created with defaults: {}", self.path.display());
                Ok(defaults)
            }
            Err(e) => Err(e)
                .with_context(|| format!("read settings failed: {}", self.path.display())),
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        self.ensure_parent_dir()?;
        let content =
            toml::to_string_pretty(settings).context("serialize settings failed")?;

        let tmp_path = self.path.with_extension("toml.tmp");
        fs::write(&tmp_path, &content)
            .with_context(|| format!("write temp settings failed: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!(
                "rename temp settings to target failed: {} -> {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;
        Ok(())
    }
}

//! Renderer settings
//!
//! Settings are kept in a JSON file. A missing file means defaults; a file
//! that cannot be parsed is reported and replaced by defaults in memory.

use crate::error::Result;
use crate::pdf::PageSetup;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use word_template::TemplateOptions;

/// All renderer settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    pub template: TemplateOptions,
    pub output: OutputSettings,
    pub pdf: PdfSettings,
}

/// Where rendered documents go
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Used by `save` when no path is passed
    pub save_path: Option<PathBuf>,
}

/// Page setup and metadata of PDF output
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfSettings {
    pub page: PageSetup,
    /// Overrides the title found in an HTML template
    pub title: Option<String>,
}

/// Loads and stores [`RendererSettings`]
pub struct SettingsManager {
    settings_path: PathBuf,
    current: RendererSettings,
}

impl SettingsManager {
    pub fn new(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
            current: RendererSettings::default(),
        }
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Load settings from disk
    pub fn load_sync(&mut self) -> Result<&RendererSettings> {
        if self.settings_path.exists() {
            let content = std::fs::read_to_string(&self.settings_path)?;
            match serde_json::from_str::<RendererSettings>(&content) {
                Ok(settings) => {
                    self.current = settings;
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse settings file {}, using defaults: {}",
                        self.settings_path.display(),
                        e
                    );
                    self.current = RendererSettings::default();
                }
            }
        } else {
            self.current = RendererSettings::default();
        }
        Ok(&self.current)
    }

    /// Write current settings to disk, creating the parent directory
    pub fn save_sync(&self) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(&self.current)?;
        std::fs::write(&self.settings_path, content)?;
        Ok(())
    }

    pub fn get(&self) -> &RendererSettings {
        &self.current
    }

    pub fn update_sync(&mut self, settings: RendererSettings) -> Result<()> {
        self.current = settings;
        self.save_sync()
    }

    /// Consume the manager, keeping the loaded settings
    pub fn into_settings(self) -> RendererSettings {
        self.current
    }
}

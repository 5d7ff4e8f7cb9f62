use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::state::Settings;

const CONFIG_DIR: &str = "fluent-english";
const SETTINGS_FILE: &str = "settings.json";

/// Default location of the settings file
pub fn settings_path() -> Result<PathBuf> {
    let config_dir =
        dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Cannot find the user config directory"))?;
    Ok(config_dir.join(CONFIG_DIR).join(SETTINGS_FILE))
}

/// Missing or unreadable settings fall back to defaults.
pub fn load_settings(path: &Path) -> Settings {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No stored settings at {}. Using defaults.", path.display());
            return Settings::default();
        }
        Err(e) => {
            tracing::warn!("Failed to read settings {}: {}. Using defaults.", path.display(), e);
            return Settings::default();
        }
    };

    match serde_json::from_str::<Settings>(&data) {
        Ok(settings) => {
            tracing::info!("Settings loaded from {}", path.display());
            settings
        }
        Err(e) => {
            tracing::warn!("Failed to deserialize stored settings: {}. Using defaults.", e);
            Settings::default()
        }
    }
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create settings directory")?;
    }
    let data = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;
    std::fs::write(path, data)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;
    tracing::info!("Settings saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_settings(&dir.path().join("settings.json")), Settings::default());
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings(&path), Settings::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut settings = Settings::default();
        settings.speech.voice = "Puck".into();
        settings.general.start_lesson = Some(48);

        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path), settings);
    }
}

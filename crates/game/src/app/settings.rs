use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tour_engine::{read_json_file, ContentError};
use tracing::{info, warn};

pub(crate) const SETTINGS_ENV_VAR: &str = "TOUR_SETTINGS_PATH";
pub(crate) const SETTINGS_FILE_NAME: &str = "tour_settings.json";

/// Gameplay tuning. Every field is optional in the file.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct TourSettings {
    pub(crate) progress_step: f32,
    pub(crate) progress_max: f32,
    pub(crate) move_speed: f32,
    pub(crate) jump_velocity: f32,
    pub(crate) gravity: f32,
}

impl Default for TourSettings {
    fn default() -> Self {
        Self {
            progress_step: 0.05,
            progress_max: 1.0,
            move_speed: 260.0,
            jump_velocity: 700.0,
            gravity: -1800.0,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum SettingsError {
    #[error(transparent)]
    Read(#[from] ContentError),
    #[error("settings field `{field}` {message}")]
    Invalid {
        field: &'static str,
        message: &'static str,
    },
}

impl TourSettings {
    pub(crate) fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |field, message| Err(SettingsError::Invalid { field, message });
        if !self.progress_step.is_finite() || self.progress_step < 0.0001 {
            return invalid("progress_step", "must be at least 0.0001");
        }
        if !self.progress_max.is_finite() || self.progress_max < self.progress_step {
            return invalid("progress_max", "must be at least progress_step");
        }
        if !self.move_speed.is_finite() || self.move_speed <= 0.0 {
            return invalid("move_speed", "must be positive");
        }
        if !self.jump_velocity.is_finite() || self.jump_velocity <= 0.0 {
            return invalid("jump_velocity", "must be positive");
        }
        if !self.gravity.is_finite() || self.gravity >= 0.0 {
            return invalid("gravity", "must be negative");
        }
        Ok(())
    }
}

pub(crate) fn load_settings_file(path: &Path) -> Result<TourSettings, SettingsError> {
    let settings: TourSettings = read_json_file(path)?;
    settings.validate()?;
    Ok(settings)
}

/// Settings from `TOUR_SETTINGS_PATH`, else `<asset_dir>/tour_settings.json`,
/// else defaults. A broken file is logged and ignored.
pub(crate) fn resolve_settings(asset_dir: Option<&Path>) -> TourSettings {
    let path = match env::var(SETTINGS_ENV_VAR) {
        Ok(value) if !value.trim().is_empty() => Some(PathBuf::from(value)),
        _ => asset_dir.map(|dir| dir.join(SETTINGS_FILE_NAME)),
    };
    settings_from_optional_path(path.as_deref())
}

fn settings_from_optional_path(path: Option<&Path>) -> TourSettings {
    let Some(path) = path.filter(|path| path.is_file()) else {
        info!("settings_file_absent_using_defaults");
        return TourSettings::default();
    };
    match load_settings_file(path) {
        Ok(settings) => {
            info!(path = %path.display(), ?settings, "settings_loaded");
            settings
        }
        Err(error) => {
            warn!(path = %path.display(), error = %error, "settings_load_failed_using_defaults");
            TourSettings::default()
        }
    }
}

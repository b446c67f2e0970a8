//! Viewer options with TOML preset support.
//!
//! Rotation limits, camera projection and frame timing are consolidated
//! here. Options serialize to/from TOML, and every section uses
//! `#[serde(default)]` so a file overriding only `[camera]` still loads.

mod camera;
mod frame;
mod rotation;

use std::path::Path;

pub use camera::CameraOptions;
pub use frame::FrameOptions;
pub use rotation::{AngleRange, RotationOptions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::engine::CoordinatorSettings;
use crate::error::PanoError;
use crate::gesture::PanSettings;
use crate::node::NodeSettings;

/// Top-level options container.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Pan limits and gesture feel.
    pub rotation: RotationOptions,
    /// Projection and stereo rig.
    pub camera: CameraOptions,
    /// Per-frame update behavior.
    pub frame: FrameOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, PanoError> {
        let content = std::fs::read_to_string(path).map_err(PanoError::Io)?;
        let options: Self = toml::from_str(&content)
            .map_err(|e| PanoError::OptionsParse(e.to_string()))?;
        options.validate()?;
        log::info!("Loaded options from {}", path.display());
        Ok(options)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), PanoError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| PanoError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(PanoError::Io)?;
        }
        std::fs::write(path, content).map_err(PanoError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }

    /// Check every section, returning the first invalid value.
    pub fn validate(&self) -> Result<(), PanoError> {
        let _ = self.pan_settings()?;
        let _ = self.node_settings()?;
        let frame = &self.frame;
        if !frame.default_animation_duration.is_finite()
            || frame.default_animation_duration < 0.0
        {
            return Err(PanoError::invalid(format!(
                "default animation duration must be non-negative, got {}",
                frame.default_animation_duration
            )));
        }
        Ok(())
    }

    /// Pan controller settings.
    pub fn pan_settings(&self) -> Result<PanSettings, PanoError> {
        self.rotation.pan_settings()
    }

    /// Orientation node settings.
    pub fn node_settings(&self) -> Result<NodeSettings, PanoError> {
        let settings = NodeSettings {
            field_of_view: self.camera.fov,
            eye_separation: self.camera.eye_separation,
            recenter_heading_on_reset: self.camera.recenter_heading_on_reset,
            reset_duration: self.rotation.reset_duration,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Frame coordinator settings.
    #[must_use]
    pub fn coordinator_settings(&self) -> CoordinatorSettings {
        self.frame.coordinator_settings()
    }
}

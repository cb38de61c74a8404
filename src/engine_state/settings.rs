//! # Engine Settings
//!
//! Runtime configuration loaded from a JSON file. Every field has a default,
//! so a partial file only overrides what it names and a missing file means
//! "use the defaults".

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use super::{
    rendering::DebugRendererSettings,
    voxels::{block::block_type::BlockType, picking::PICK_WINDOW_RADIUS},
};

/// Errors raised while loading settings.
#[derive(Debug)]
pub enum SettingsError {
    /// The file could not be read.
    Io(io::Error),
    /// The file is not valid settings JSON.
    Parse(serde_json::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(err) => write!(f, "failed to read settings: {}", err),
            SettingsError::Parse(err) => write!(f, "invalid settings: {}", err),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(err) => Some(err),
            SettingsError::Parse(err) => Some(err),
        }
    }
}

impl From<io::Error> for SettingsError {
    fn from(err: io::Error) -> Self {
        SettingsError::Io(err)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        SettingsError::Parse(err)
    }
}

/// Camera configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Initial pitch in degrees, negative looks down
    pub pitch_degrees: f32,
    /// Near clip distance
    pub z_near: f32,
    /// Far clip distance
    pub z_far: f32,
    /// Movement speed in world units per second
    pub speed: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 70.0,
            pitch_degrees: -20.0,
            z_near: 0.1,
            z_far: 1000.0,
            speed: 48.0,
        }
    }
}

/// All runtime settings of the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Visibility radius of the chunk area in world units
    pub area_radius: f32,
    /// Seed of the terrain noise
    pub noise_seed: u32,
    /// Octaves of the terrain noise
    pub noise_octaves: usize,
    /// Half-size, in chunks, of the window searched when picking
    pub pick_window_radius: usize,
    /// Farthest distance at which blocks can be picked
    pub max_pick_distance: f32,
    /// Block placed by edits
    pub place_block_type: BlockType,
    /// Renderer debug switches
    pub debug: DebugRendererSettings,
    /// Camera configuration
    pub camera: CameraSettings,
    /// Render target width in pixels
    pub viewport_width: u32,
    /// Render target height in pixels
    pub viewport_height: u32,
    /// Optional PNG texture atlas; a generated atlas is used when absent
    pub atlas_path: Option<PathBuf>,
    /// Frames simulated by the headless run
    pub demo_frames: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            area_radius: 128.0,
            noise_seed: 0,
            noise_octaves: 4,
            pick_window_radius: PICK_WINDOW_RADIUS,
            max_pick_distance: 8.0,
            place_block_type: BlockType::GLASS,
            debug: DebugRendererSettings::default(),
            camera: CameraSettings::default(),
            viewport_width: 1280,
            viewport_height: 720,
            atlas_path: None,
            demo_frames: 240,
        }
    }
}

impl EngineSettings {
    /// Parses settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads settings from a JSON file.
    ///
    /// # Errors
    /// [`SettingsError::Io`] if the file cannot be read and
    /// [`SettingsError::Parse`] if its contents are not valid settings.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Serializes the settings as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let settings = EngineSettings::from_json("{}").unwrap();
        assert_eq!(settings, EngineSettings::default());
    }

    #[test]
    fn partial_files_override_only_named_fields() {
        let settings = EngineSettings::from_json(
            r#"{ "area_radius": 64.0, "debug": { "show_wireframe": true }, "place_block_type": "STONE" }"#,
        )
        .unwrap();
        assert_eq!(settings.area_radius, 64.0);
        assert!(settings.debug.show_wireframe);
        assert!(!settings.debug.show_batches);
        assert_eq!(settings.place_block_type, BlockType::STONE);
        assert_eq!(settings.noise_octaves, 4);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            EngineSettings::from_json("{ area_radius: }"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            EngineSettings::load("/definitely/not/here.json"),
            Err(SettingsError::Io(_))
        ));
    }

    #[test]
    fn settings_survive_serialization() {
        let settings = EngineSettings {
            noise_seed: 42,
            ..EngineSettings::default()
        };
        let json = settings.to_json().unwrap();
        assert_eq!(EngineSettings::from_json(&json).unwrap(), settings);
    }
}

//! Engine configuration.
//!
//! Settings loaded from an INI file. Defaults are safe for a headless start;
//! missing keys keep their current value.
//!
//! # Configuration File Format
//!
//! ```ini
//! [engine]
//! target_fps = 60
//! id_seed = 42
//!
//! [room]
//! width = 320
//! height = 180
//! ```

use std::path::PathBuf;

use configparser::ini::Ini;
use log::info;

use crate::components::geometry::Size;
use crate::error::{EngineError, EngineResult};

const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_ROOM_WIDTH: u32 = 320;
const DEFAULT_ROOM_HEIGHT: u32 = 180;
const DEFAULT_CONFIG_PATH: &str = "./hex.ini";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Frame rate the fixed-rate scheduler aims for.
    pub target_fps: u32,
    /// Seed for deterministic identifiers; `None` uses process entropy.
    pub id_seed: Option<u64>,
    pub room_width: u32,
    pub room_height: u32,
    pub config_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            id_seed: None,
            room_width: DEFAULT_ROOM_WIDTH,
            room_height: DEFAULT_ROOM_HEIGHT,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    pub fn room_size(&self) -> Size {
        Size::new(self.room_width as f32, self.room_height as f32)
    }

    /// Load values from `config_path`.
    pub fn load_from_file(&mut self) -> EngineResult<()> {
        let mut config = Ini::new();
        config.load(&self.config_path).map_err(|e| {
            EngineError::Config(format!(
                "failed to load {}: {e}",
                self.config_path.display()
            ))
        })?;

        if let Some(fps) = read_uint(&config, "engine", "target_fps")? {
            if fps == 0 {
                return Err(EngineError::Config("target_fps must be positive".to_string()));
            }
            self.target_fps = clamp_u32(fps);
        }
        if let Some(seed) = read_uint(&config, "engine", "id_seed")? {
            self.id_seed = Some(seed);
        }
        if let Some(width) = read_uint(&config, "room", "width")? {
            self.room_width = clamp_u32(width);
        }
        if let Some(height) = read_uint(&config, "room", "height")? {
            self.room_height = clamp_u32(height);
        }

        info!(
            "Loaded config: fps={}, room {}x{}, id_seed={:?}",
            self.target_fps, self.room_width, self.room_height, self.id_seed
        );
        Ok(())
    }

    /// Write the current values to `config_path`, creating the file if needed.
    pub fn save_to_file(&self) -> EngineResult<()> {
        let mut config = Ini::new();
        config.set("engine", "target_fps", Some(self.target_fps.to_string()));
        if let Some(seed) = self.id_seed {
            config.set("engine", "id_seed", Some(seed.to_string()));
        }
        config.set("room", "width", Some(self.room_width.to_string()));
        config.set("room", "height", Some(self.room_height.to_string()));

        config.write(&self.config_path).map_err(|e| {
            EngineError::Config(format!(
                "failed to save {}: {e}",
                self.config_path.display()
            ))
        })?;
        info!("Saved config to {:?}", self.config_path);
        Ok(())
    }
}

fn read_uint(config: &Ini, section: &str, key: &str) -> EngineResult<Option<u64>> {
    config
        .getuint(section, key)
        .map_err(|e| EngineError::Config(format!("[{section}] {key}: {e}")))
}

fn clamp_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

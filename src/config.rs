// =============================================================================
// CONFIGURATION - Load settings from config.toml
// =============================================================================
//
// Every key is optional. A missing file or a file that fails to parse falls
// back to the built-in defaults, which reproduce the fixed 640x640 sandbox.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use winit::keyboard::KeyCode;

use crate::timestep::{is_usable_interval, DEFAULT_INTERVAL};

/// Root configuration structure
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub graphics: GraphicsConfig,
    pub resources: ResourcesConfig,
    pub debug: DebugConfig,
    pub controls: ControlsConfig,
}

/// Window settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Logical width; the physical size follows the monitor's scale factor.
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "OpenGL Sandbox".to_string(),
            width: 640,
            height: 640,
        }
    }
}

/// Graphics and simulation settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    pub vsync: bool,
    pub clear_color: [f32; 4],
    pub updates_per_second: f64,
    /// Catch-up bound for the fixed-timestep loop. 0 disables the bound.
    pub max_updates_per_frame: u32,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            vsync: true,
            clear_color: [0.15, 0.15, 0.15, 1.0],
            updates_per_second: 60.0,
            max_updates_per_frame: 8,
        }
    }
}

impl GraphicsConfig {
    /// Fixed simulation step in seconds.
    ///
    /// Rates that are not positive and finite, or so high that the step
    /// vanishes, fall back to 60 updates per second.
    pub fn update_interval(&self) -> f64 {
        let interval = 1.0 / self.updates_per_second;
        if self.updates_per_second > 0.0 && is_usable_interval(interval) {
            interval
        } else {
            log::warn!(
                "Invalid updates_per_second {}, using 60",
                self.updates_per_second
            );
            DEFAULT_INTERVAL
        }
    }
}

/// Asset locations
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ResourcesConfig {
    /// Overrides the executable's directory as the asset base path.
    pub directory: Option<PathBuf>,
    pub vertex_shader: String,
    pub fragment_shader: String,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            directory: None,
            vertex_shader: "shader.vert".to_string(),
            fragment_shader: "shader.frag".to_string(),
        }
    }
}

/// Debug settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub log_to_file: bool,
    pub log_file: String,
    pub show_fps: bool,
    pub hot_reload_shaders: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_to_file: false,
            log_file: "gl_sandbox.log".to_string(),
            show_fps: false,
            hot_reload_shaders: false,
        }
    }
}

/// Control key bindings, named after winit's `KeyCode` variants ("KeyQ", "Escape").
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub quit_key: KeyCode,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            quit_key: KeyCode::KeyQ,
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults if not found
    pub fn load() -> Self {
        Self::load_from_path("config.toml").unwrap_or_else(|e| {
            log::warn!("Failed to load config.toml: {:#}. Using defaults.", e);
            Config::default()
        })
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        log::info!("Loaded configuration from {:?}", path);
        log::debug!("Config: {:?}", config);

        Ok(config)
    }
}

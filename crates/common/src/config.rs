//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DecalError, DecalResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Interactive stage geometry.
    #[serde(default)]
    pub stage: StageConfig,

    /// Overlay gallery limits.
    #[serde(default)]
    pub gallery: GalleryConfig,

    /// Export defaults.
    #[serde(default)]
    pub export: ExportConfig,

    /// Native share helper.
    #[serde(default)]
    pub share: ShareConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Geometry of the interactive stage the base image is fitted into.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Container width used when no measurement is supplied.
    pub container_width: f64,

    /// Container height used when no measurement is supplied.
    pub container_height: f64,

    /// Maximum display height of the active overlay.
    pub overlay_max_height: f64,
}

/// Overlay gallery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Maximum number of gallery entries, built-ins included.
    /// `None` means unbounded.
    pub max_items: Option<usize>,
}

/// Export defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// File name of the exported artifact.
    pub file_name: String,

    /// Directory downloads are written to.
    pub output_dir: PathBuf,

    /// Which resolution the export canvas uses.
    pub resolution: ExportResolution,

    /// Resampling filter used when scaling images onto the canvas.
    pub filter: ResizeFilter,
}

/// Export canvas resolution policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportResolution {
    /// Canvas equals the base image's interactive display size.
    #[default]
    Display,
    /// Canvas equals the base image's intrinsic size; overlay placement
    /// is scaled proportionally.
    Native,
}

/// Resampling filter for scaled draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl std::str::FromStr for ResizeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nearest" => Ok(Self::Nearest),
            "triangle" => Ok(Self::Triangle),
            "catmull_rom" | "catmull-rom" => Ok(Self::CatmullRom),
            "lanczos3" => Ok(Self::Lanczos3),
            other => Err(format!(
                "Unknown filter: {other}. Use: nearest, triangle, catmull_rom, lanczos3"
            )),
        }
    }
}

/// Native share helper configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Command that receives the PNG bytes on stdin, e.g.
    /// `["wl-copy", "--type", "image/png"]`. Sharing is unavailable
    /// when unset.
    pub command: Option<Vec<String>>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "decal=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            container_width: 476.0,
            container_height: 300.0,
            overlay_max_height: 100.0,
        }
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self { max_items: Some(6) }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "receipt.png".to_string(),
            output_dir: PathBuf::from("."),
            resolution: ExportResolution::Display,
            filter: ResizeFilter::Triangle,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load_from(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                Self::default()
            }
        }
    }

    /// Read and validate a config file.
    pub fn load_from(path: &Path) -> DecalResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate config JSON. Missing sections and fields take
    /// their defaults.
    pub fn from_json(json: &str) -> DecalResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the stage and export cannot work with.
    pub fn validate(&self) -> DecalResult<()> {
        let stage = &self.stage;
        for (name, value) in [
            ("stage.container_width", stage.container_width),
            ("stage.container_height", stage.container_height),
            ("stage.overlay_max_height", stage.overlay_max_height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(DecalError::config(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        let file_name = &self.export.file_name;
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name == ".." {
            return Err(DecalError::config(format!(
                "export.file_name must be a plain file name, got '{file_name}'"
            )));
        }
        Ok(())
    }

    /// Save config to the standard location.
    pub fn save(&self) -> DecalResult<PathBuf> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config as pretty-printed JSON, creating parent directories.
    pub fn save_to(&self, path: &Path) -> DecalResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Where [`AppConfig::load`] looks for the config file.
    pub fn path() -> PathBuf {
        config_file_path()
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("decal").join("config.json")
}

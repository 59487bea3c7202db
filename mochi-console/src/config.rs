//! Configuration for Mochi Console
//!
//! This module layers the console settings from several sources:
//! - XDG-compliant config file location
//! - Environment variable overrides
//! - CLI argument overrides
//! - Config precedence: CLI > env > file > defaults
//! - Validation with the field name in every error

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use console_core::{ColorDepth, ConfigError, ConsoleSettings, EncodingMode, RenderQuality};

/// CLI arguments for Mochi Console
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "mochi-console")]
#[command(author = "Mochi Team")]
#[command(version)]
#[command(about = "A virtual text-mode console drawn with a scalable font", long_about = None)]
pub struct CliArgs {
    /// Path to custom config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Font file (TTF/OTF)
    #[arg(long, value_name = "FILE")]
    pub font: Option<PathBuf>,

    /// Font size in points
    #[arg(long, value_name = "SIZE")]
    pub font_size: Option<f32>,

    /// Glyph quality (solid, shaded, subpixel, blended)
    #[arg(short, long, value_name = "QUALITY")]
    pub quality: Option<String>,

    /// Character encoding (ascii, utf8, unicode)
    #[arg(short, long, value_name = "ENCODING")]
    pub encoding: Option<String>,

    /// Target frames per second
    #[arg(long, value_name = "FPS")]
    pub fps: Option<u32>,

    /// Bits per color channel used for glyph caching (1-8)
    #[arg(long, value_name = "BITS")]
    pub depth: Option<u8>,

    /// Rendering backend (window, headless)
    #[arg(short, long, value_name = "BACKEND")]
    pub backend: Option<String>,

    /// Demo program (hello, keys, streams)
    #[arg(short, long, value_name = "DEMO")]
    pub demo: Option<String>,

    /// Keep rendered glyphs between frames
    #[arg(long)]
    pub no_auto_clear_cache: bool,

    /// Keep queued commands between frames
    #[arg(long)]
    pub no_auto_clear_buffer: bool,
}

/// Rendering backend selected at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Native window with CPU presentation
    #[default]
    Window,
    /// In-memory framebuffer, no window
    Headless,
}

impl BackendKind {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "window" => Some(BackendKind::Window),
            "headless" => Some(BackendKind::Headless),
            _ => None,
        }
    }
}

/// Demo programs shipped with the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DemoKind {
    /// Styled text and colors
    #[default]
    Hello,
    /// Currently held keys
    Keys,
    /// Overlapping streams fed by a producer thread
    Streams,
}

impl DemoKind {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hello" => Some(DemoKind::Hello),
            "keys" => Some(DemoKind::Keys),
            "streams" => Some(DemoKind::Streams),
            _ => None,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default)]
    pub demo: DemoKind,
    /// Frames rendered before the headless backend exits
    #[serde(default = "default_headless_frames")]
    pub headless_frames: u64,
    #[serde(flatten)]
    pub console: ConsoleSettings,
}

fn default_headless_frames() -> u64 {
    3
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            demo: DemoKind::default(),
            headless_frames: default_headless_frames(),
            console: ConsoleSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration with full precedence handling
    /// Precedence: CLI > env > file > defaults
    pub fn load_with_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        let config_path = args.config.clone().or_else(Self::default_config_path);
        if let Some(path) = &config_path {
            if path.exists() {
                match Self::load_from_file(path) {
                    Ok(file_config) => config = file_config,
                    Err(e) => {
                        log::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        config.apply_env_vars();
        config.apply_cli_args(args)?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config file: {}", e)))
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mochi-console").join("config.toml"))
    }

    fn apply_env_vars(&mut self) {
        self.apply_env(|key| env::var(key).ok());
    }

    /// Apply overrides from an environment lookup; unparsable values are ignored
    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("MOCHI_CONSOLE_FONT") {
            self.console.font.path = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup("MOCHI_CONSOLE_FPS") {
            if let Ok(fps) = val.parse() {
                self.console.fps = fps;
            }
        }
        if let Some(val) = lookup("MOCHI_CONSOLE_QUALITY") {
            if let Some(quality) = RenderQuality::from_name(&val) {
                self.console.font.quality = quality;
            }
        }
        if let Some(val) = lookup("MOCHI_CONSOLE_DEPTH") {
            if let Some(depth) = val.parse().ok().and_then(|bits| ColorDepth::new(bits).ok()) {
                self.console.color_depth = depth;
            }
        }
    }

    /// Apply CLI arguments to config
    fn apply_cli_args(&mut self, args: &CliArgs) -> Result<(), ConfigError> {
        if let Some(font) = &args.font {
            self.console.font.path = Some(font.clone());
        }
        if let Some(size) = args.font_size {
            self.console.font.point_size = size;
        }
        if let Some(name) = &args.quality {
            self.console.font.quality = RenderQuality::from_name(name).ok_or_else(|| {
                ConfigError::for_field("quality", format!("Unknown quality '{}'", name))
            })?;
        }
        if let Some(name) = &args.encoding {
            self.console.font.encoding = EncodingMode::from_name(name).ok_or_else(|| {
                ConfigError::for_field("encoding", format!("Unknown encoding '{}'", name))
            })?;
        }
        if let Some(fps) = args.fps {
            self.console.fps = fps;
        }
        if let Some(bits) = args.depth {
            self.console.color_depth = ColorDepth::new(bits)?;
        }
        if let Some(name) = &args.backend {
            self.backend = BackendKind::from_name(name).ok_or_else(|| {
                ConfigError::for_field("backend", format!("Unknown backend '{}'", name))
            })?;
        }
        if let Some(name) = &args.demo {
            self.demo = DemoKind::from_name(name).ok_or_else(|| {
                ConfigError::for_field("demo", format!("Unknown demo '{}'", name))
            })?;
        }
        if args.no_auto_clear_cache {
            self.console.auto_clear_cache = false;
        }
        if args.no_auto_clear_buffer {
            self.console.auto_clear_buffer = false;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.headless_frames == 0 {
            return Err(ConfigError::for_field(
                "headless_frames",
                "Headless frame count must be at least 1",
            ));
        }
        self.console.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args_with_config(path: &Path) -> CliArgs {
        CliArgs {
            config: Some(path.to_path_buf()),
            ..CliArgs::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend, BackendKind::Window);
        assert_eq!(config.demo, DemoKind::Hello);
        assert_eq!(config.console.fps, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r##"
backend = "headless"
demo = "streams"
fps = 60
color_depth = 4

[font]
point_size = 20.0
quality = "solid"

[cursor]
style = "underscore"
color = "#00ff00"
"##
        )
        .unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.backend, BackendKind::Headless);
        assert_eq!(config.demo, DemoKind::Streams);
        assert_eq!(config.console.fps, 60);
        assert_eq!(config.console.color_depth.bits(), 4);
        assert_eq!(config.console.font.point_size, 20.0);
        assert_eq!(config.console.font.quality, RenderQuality::Solid);
        assert_eq!(config.console.cursor.color, console_core::Rgb::GREEN);
        assert!(config.console.auto_clear_buffer);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "fps = \"fast\"").unwrap();

        let config = Config::load_with_args(&args_with_config(file.path())).unwrap();
        assert_eq!(config.console.fps, 30);
    }

    #[test]
    fn test_invalid_value_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "fps = 0").unwrap();

        let err = Config::load_with_args(&args_with_config(file.path())).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("fps"));
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "fps = 60\nbackend = \"window\"").unwrap();

        let args = CliArgs {
            fps: Some(24),
            backend: Some("headless".to_string()),
            quality: Some("lcd".to_string()),
            no_auto_clear_cache: true,
            ..args_with_config(file.path())
        };
        let config = Config::load_with_args(&args).unwrap();
        assert_eq!(config.console.fps, 24);
        assert_eq!(config.backend, BackendKind::Headless);
        assert_eq!(config.console.font.quality, RenderQuality::Subpixel);
        assert!(!config.console.auto_clear_cache);
    }

    #[test]
    fn test_unknown_cli_name() {
        let args = CliArgs {
            config: Some(PathBuf::from("/nonexistent/config.toml")),
            encoding: Some("ebcdic".to_string()),
            ..CliArgs::default()
        };
        let err = Config::load_with_args(&args).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("encoding"));
    }

    #[test]
    fn test_cli_depth_out_of_range() {
        let args = CliArgs {
            config: Some(PathBuf::from("/nonexistent/config.toml")),
            depth: Some(12),
            ..CliArgs::default()
        };
        let err = Config::load_with_args(&args).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("color_depth"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("MOCHI_CONSOLE_FONT", "/tmp/font.ttf"),
            ("MOCHI_CONSOLE_FPS", "15"),
            ("MOCHI_CONSOLE_QUALITY", "shaded"),
            ("MOCHI_CONSOLE_DEPTH", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(
            config.console.font.path.as_deref(),
            Some(Path::new("/tmp/font.ttf"))
        );
        assert_eq!(config.console.fps, 15);
        assert_eq!(config.console.font.quality, RenderQuality::Shaded);
        assert_eq!(config.console.color_depth.bits(), 8);
    }

    #[test]
    fn test_cli_beats_env() {
        let mut config = Config::default();
        config.apply_env(|key| (key == "MOCHI_CONSOLE_FPS").then(|| "15".to_string()));
        config
            .apply_cli_args(&CliArgs {
                fps: Some(50),
                ..CliArgs::default()
            })
            .unwrap();
        assert_eq!(config.console.fps, 50);
    }
}

// Configuration file handling

use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CONFIG_FILE_NAME: &str = ".nestreportrc.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Print every context and test instead of only failures
    #[serde(default)]
    pub show_all: bool,

    /// Capture log output per test and replay it for failures
    #[serde(default = "default_log_capture")]
    pub log_capture: bool,

    /// Colored output: auto, always or never
    #[serde(default = "default_color")]
    pub color: String,

    /// Command used to rerun a single test
    #[serde(default)]
    pub base: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            show_all: false,
            log_capture: default_log_capture(),
            color: default_color(),
            base: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter for the process logger when RUST_LOG is unset
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_log_capture() -> bool {
    true
}

fn default_color() -> String {
    String::from("auto")
}

pub fn default_level() -> String {
    String::from("nestreport=warn")
}

impl Config {
    /// Load configuration from the current directory, then the home directory
    pub fn load() -> Option<Self> {
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd.join(CONFIG_FILE_NAME));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(CONFIG_FILE_NAME));
        }

        paths
            .iter()
            .find(|path| path.exists())
            .and_then(|path| Self::load_from_file(path))
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Option<Self> {
        toml::from_str(content).ok()
    }

    /// Generate configuration as TOML
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_else(|_| String::new())
    }

    /// Reporter options described by this file
    pub fn reporter_options(&self) -> Result<ReporterOptions, ReportError> {
        Ok(ReporterOptions {
            show_all: self.report.show_all,
            log_capture: self.report.log_capture,
            color: self.report.color.parse()?,
            base: self.report.base.clone(),
        })
    }
}

/// Tri-state color preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl FromStr for ColorChoice {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" | "on" | "true" => Ok(Self::Always),
            "never" | "off" | "false" => Ok(Self::Never),
            _ => Err(ReportError::InvalidColor(s.to_string())),
        }
    }
}

impl ColorChoice {
    /// Resolve against what the terminal supports
    pub fn enabled(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => console::colors_enabled(),
        }
    }
}

/// Options every backend is initialized with
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReporterOptions {
    /// Disables quiet mode
    pub show_all: bool,
    pub log_capture: bool,
    pub color: ColorChoice,
    pub base: Option<PathBuf>,
}

impl ReporterOptions {
    pub fn quiet(&self) -> bool {
        !self.show_all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
[report]
show_all = true
log_capture = false
color = "never"
base = "./run-tests"

[logging]
level = "nestreport=debug"
"#;

        let config = Config::parse(toml).expect("Failed to parse config");
        assert!(config.report.show_all);
        assert!(!config.report.log_capture);
        assert_eq!(config.report.color, "never");
        assert_eq!(config.report.base, Some(PathBuf::from("./run-tests")));
        assert_eq!(config.logging.level, "nestreport=debug");

        let options = config.reporter_options().unwrap();
        assert!(!options.quiet());
        assert_eq!(options.color, ColorChoice::Never);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").expect("empty config is valid");
        assert!(!config.report.show_all);
        assert!(config.report.log_capture);
        assert_eq!(config.report.color, "auto");
        assert!(config.reporter_options().unwrap().quiet());
    }

    #[test]
    fn test_invalid_color_is_rejected() {
        let err = "purple".parse::<ColorChoice>().unwrap_err();
        assert!(matches!(err, ReportError::InvalidColor(ref v) if v == "purple"));

        let config = Config::parse("[report]\ncolor = \"sometimes\"\n").unwrap();
        assert!(config.reporter_options().is_err());
    }

    #[test]
    fn test_color_choice_forced() {
        assert!(ColorChoice::Always.enabled());
        assert!(!ColorChoice::Never.enabled());
    }
}

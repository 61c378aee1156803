use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::calendar::DEFAULT_MARKER_LIMIT;
use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Empty means "the data directory of the active profile"
    #[serde(default)]
    pub database_path: String,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default = "default_current_theme")]
    pub current_theme: String,
    #[serde(default)]
    pub themes: HashMap<String, Theme>,
    /// Most to-do markers drawn in one calendar cell
    #[serde(default = "default_max_day_markers")]
    pub max_day_markers: usize,
    /// Additional holidays (YYYY-MM-DD) merged into the built-in list
    #[serde(default)]
    pub extra_holidays: Vec<String>,
    /// Author used for board posts that leave the author blank
    #[serde(default = "default_author")]
    pub default_author: String,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_help")]
    pub help: String,
    #[serde(default = "default_next_tab")]
    pub next_tab: String,
    #[serde(default = "default_prev_tab")]
    pub prev_tab: String,
    #[serde(default = "default_tab_1")]
    pub tab_1: String,
    #[serde(default = "default_tab_2")]
    pub tab_2: String,
    #[serde(default = "default_tab_3")]
    pub tab_3: String,
    #[serde(default = "default_tab_4")]
    pub tab_4: String,
    #[serde(default = "default_tab_5")]
    pub tab_5: String,
    #[serde(default = "default_new")]
    pub new: String,
    #[serde(default = "default_delete")]
    pub delete: String,
    #[serde(default = "default_toggle")]
    pub toggle: String,
    #[serde(default = "default_stars")]
    pub stars: String,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default = "default_list_up")]
    pub list_up: String,
    #[serde(default = "default_list_down")]
    pub list_down: String,
    #[serde(default = "default_prev_period")]
    pub prev_period: String,
    #[serde(default = "default_next_period")]
    pub next_period: String,
    #[serde(default = "default_today")]
    pub today: String,
    #[serde(default = "default_unlock")]
    pub unlock: String,
    #[serde(default = "default_lock")]
    pub lock: String,
    #[serde(default = "default_set_pin")]
    pub set_pin: String,
    #[serde(default = "default_edit_notes")]
    pub edit_notes: String,
    #[serde(default = "default_cycle_theme")]
    pub cycle_theme: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_fg")]
    pub fg: String,
    #[serde(default = "default_bg")]
    pub bg: String,
    #[serde(default = "default_highlight_bg")]
    pub highlight_bg: String,
    #[serde(default = "default_highlight_fg")]
    pub highlight_fg: String,
    #[serde(default = "default_tab_bg")]
    pub tab_bg: String,
    /// Sundays, holidays and to-do markers
    #[serde(default = "default_attention")]
    pub attention: String,
    /// Stars and chart lines
    #[serde(default = "default_accent")]
    pub accent: String,
}

impl Default for Config {
    fn default() -> Self {
        let mut themes = HashMap::new();

        // Example custom theme for users to see how to define themes
        themes.insert(
            "lightblue".to_string(),
            Theme {
                fg: "cyan".to_string(),
                bg: "black".to_string(),
                highlight_bg: "blue".to_string(),
                highlight_fg: "white".to_string(),
                tab_bg: "gray".to_string(),
                attention: "lightred".to_string(),
                accent: "yellow".to_string(),
            },
        );

        Self {
            database_path: String::new(),
            key_bindings: KeyBindings::default(),
            current_theme: default_current_theme(),
            themes,
            max_day_markers: default_max_day_markers(),
            extra_holidays: Vec::new(),
            default_author: default_author(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            help: default_help(),
            next_tab: default_next_tab(),
            prev_tab: default_prev_tab(),
            tab_1: default_tab_1(),
            tab_2: default_tab_2(),
            tab_3: default_tab_3(),
            tab_4: default_tab_4(),
            tab_5: default_tab_5(),
            new: default_new(),
            delete: default_delete(),
            toggle: default_toggle(),
            stars: default_stars(),
            priority: default_priority(),
            list_up: default_list_up(),
            list_down: default_list_down(),
            prev_period: default_prev_period(),
            next_period: default_next_period(),
            today: default_today(),
            unlock: default_unlock(),
            lock: default_lock(),
            set_pin: default_set_pin(),
            edit_notes: default_edit_notes(),
            cycle_theme: default_cycle_theme(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: default_fg(),
            bg: default_bg(),
            highlight_bg: default_highlight_bg(),
            highlight_fg: default_highlight_fg(),
            tab_bg: default_tab_bg(),
            attention: default_attention(),
            accent: default_accent(),
        }
    }
}

impl Theme {
    /// Get preset themes that are always available
    pub fn get_preset_themes() -> HashMap<String, Theme> {
        let mut themes = HashMap::new();

        themes.insert("default".to_string(), Theme::default());

        themes.insert(
            "dark".to_string(),
            Theme {
                highlight_bg: "cyan".to_string(),
                highlight_fg: "black".to_string(),
                ..Theme::default()
            },
        );

        themes.insert(
            "light".to_string(),
            Theme {
                fg: "black".to_string(),
                bg: "white".to_string(),
                attention: "red".to_string(),
                accent: "#b8860b".to_string(),
                ..Theme::default()
            },
        );

        themes.insert(
            "monochrome".to_string(),
            Theme {
                highlight_bg: "white".to_string(),
                highlight_fg: "black".to_string(),
                attention: "white".to_string(),
                accent: "white".to_string(),
                ..Theme::default()
            },
        );

        themes
    }
}

// Default value functions
fn default_quit() -> String {
    "q".to_string()
}

fn default_help() -> String {
    "F1".to_string()
}

fn default_next_tab() -> String {
    "Tab".to_string()
}

fn default_prev_tab() -> String {
    "BackTab".to_string()
}

fn default_tab_1() -> String {
    "1".to_string()
}

fn default_tab_2() -> String {
    "2".to_string()
}

fn default_tab_3() -> String {
    "3".to_string()
}

fn default_tab_4() -> String {
    "4".to_string()
}

fn default_tab_5() -> String {
    "5".to_string()
}

fn default_new() -> String {
    "n".to_string()
}

fn default_delete() -> String {
    "d".to_string()
}

fn default_toggle() -> String {
    "Space".to_string()
}

fn default_stars() -> String {
    "s".to_string()
}

fn default_priority() -> String {
    "p".to_string()
}

fn default_list_up() -> String {
    "k".to_string()
}

fn default_list_down() -> String {
    "j".to_string()
}

fn default_prev_period() -> String {
    "[".to_string()
}

fn default_next_period() -> String {
    "]".to_string()
}

fn default_today() -> String {
    "t".to_string()
}

fn default_unlock() -> String {
    "u".to_string()
}

fn default_lock() -> String {
    "l".to_string()
}

fn default_set_pin() -> String {
    "P".to_string()
}

fn default_edit_notes() -> String {
    "e".to_string()
}

fn default_cycle_theme() -> String {
    "F2".to_string()
}

fn default_current_theme() -> String {
    "default".to_string()
}

fn default_max_day_markers() -> usize {
    DEFAULT_MARKER_LIMIT
}

fn default_author() -> String {
    "anonymous".to_string()
}

fn default_fg() -> String {
    "white".to_string()
}

fn default_bg() -> String {
    "black".to_string()
}

fn default_highlight_bg() -> String {
    "blue".to_string()
}

fn default_highlight_fg() -> String {
    "white".to_string()
}

fn default_tab_bg() -> String {
    "gray".to_string()
}

fn default_attention() -> String {
    "lightred".to_string()
}

fn default_accent() -> String {
    "yellow".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Theme not found: {0}")]
    ThemeNotFound(String),
}

impl Config {
    /// Load configuration from an explicit file, creating it with defaults if missing
    pub fn load_from_path(config_path: &Path, profile: utils::Profile) -> Result<Self, ConfigError> {
        if config_path.exists() {
            debug!("Reading config from {}", config_path.display());
            let contents = fs::read_to_string(config_path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let mut config: Config = toml::from_str(&contents)?;
            if config.database_path.trim().is_empty() {
                config.database_path = Self::default_database_path_for_profile(profile);
            }
            Ok(config)
        } else {
            info!("Creating default config at {}", config_path.display());
            let mut config = Config::default();
            config.database_path = Self::default_database_path_for_profile(profile);
            config.save_to_path(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to_path(&mut self, config_path: &Path) -> Result<(), ConfigError> {
        // Ensure config version is set before saving
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, toml_string).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile).ok_or_else(|| {
            ConfigError::ConfigDirError("Could not determine config directory".to_string())
        })?;
        Ok(config_dir.join("config.toml"))
    }

    /// Get default database path for a specific profile
    fn default_database_path_for_profile(profile: utils::Profile) -> String {
        if let Some(data_dir) = utils::get_data_dir(profile) {
            data_dir.join("daybook.db").to_string_lossy().to_string()
        } else {
            format!("~/.local/share/{}/daybook.db", profile.app_name())
        }
    }

    /// Get the expanded database path (with ~ expansion)
    pub fn get_database_path(&self) -> PathBuf {
        utils::expand_path(&self.database_path)
    }

    /// Get the currently active theme
    /// If highlight_fg is not set (empty string), it is derived from highlight_bg
    pub fn get_active_theme(&self) -> Theme {
        use crate::tui::widgets::color::{format_color_for_display, get_contrast_text_color, parse_color};

        let mut theme = if let Some(theme) = self.themes.get(&self.current_theme) {
            theme.clone()
        } else if let Some(theme) = Theme::get_preset_themes().get(&self.current_theme) {
            theme.clone()
        } else {
            Theme::default()
        };

        if theme.highlight_fg.is_empty() {
            let highlight_bg_color = parse_color(&theme.highlight_bg);
            let calculated_fg = get_contrast_text_color(highlight_bg_color);
            theme.highlight_fg = format_color_for_display(&calculated_fg);
        }

        theme
    }

    /// Set the active theme by name
    pub fn set_theme(&mut self, name: &str) -> Result<(), ConfigError> {
        if !self.themes.contains_key(name) && !Theme::get_preset_themes().contains_key(name) {
            return Err(ConfigError::ThemeNotFound(name.to_string()));
        }

        self.current_theme = name.to_string();
        Ok(())
    }

    /// Get all available theme names (presets + user-defined), sorted
    pub fn get_available_themes(&self) -> Vec<String> {
        let mut themes: Vec<String> = Theme::get_preset_themes().keys().cloned().collect();

        for theme_name in self.themes.keys() {
            if !themes.contains(theme_name) {
                themes.push(theme_name.clone());
            }
        }

        themes.sort();
        themes
    }

    /// Name of the theme after the current one, wrapping around
    pub fn next_theme_name(&self) -> String {
        let themes = self.get_available_themes();
        let pos = themes.iter().position(|t| t == &self.current_theme);
        let next = pos.map(|p| (p + 1) % themes.len()).unwrap_or(0);
        themes[next].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: Config = toml::from_str("current_theme = \"dark\"\n").unwrap();
        assert_eq!(config.max_day_markers, DEFAULT_MARKER_LIMIT);
        assert_eq!(config.key_bindings.quit, "q");
        assert_eq!(config.default_author, "anonymous");
        assert_eq!(config.get_active_theme().highlight_bg, "cyan");
    }

    #[test]
    fn test_load_from_path_creates_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cfg").join("config.toml");

        let created = Config::load_from_path(&path, utils::Profile::Dev).unwrap();
        assert!(path.exists());
        assert!(created.database_path.ends_with("daybook.db"));

        let mut edited = created.clone();
        edited.extra_holidays.push("2027-01-01".to_string());
        edited.set_theme("light").unwrap();
        edited.save_to_path(&path).unwrap();

        let reloaded = Config::load_from_path(&path, utils::Profile::Dev).unwrap();
        assert_eq!(reloaded.extra_holidays, vec!["2027-01-01".to_string()]);
        assert_eq!(reloaded.current_theme, "light");
    }

    #[test]
    fn test_unknown_theme_is_rejected() {
        let mut config = Config::default();
        assert!(matches!(config.set_theme("neon"), Err(ConfigError::ThemeNotFound(_))));
    }

    #[test]
    fn test_theme_cycle_wraps() {
        let mut config = Config::default();
        let themes = config.get_available_themes();
        config.set_theme(themes.last().unwrap()).unwrap();
        assert_eq!(config.next_theme_name(), themes[0]);
    }

    #[test]
    fn test_empty_highlight_fg_is_derived() {
        let mut config = Config::default();
        config.themes.insert(
            "custom".to_string(),
            Theme {
                highlight_bg: "white".to_string(),
                highlight_fg: String::new(),
                ..Theme::default()
            },
        );
        config.set_theme("custom").unwrap();
        assert_eq!(config.get_active_theme().highlight_fg, "black");
    }
}

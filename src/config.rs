use directories::ProjectDirs;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct EngineSettings {
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub suggestions: SuggestionSettings,
    #[serde(default)]
    pub highlight: HighlightSettings,
}

/// Settings for the approximate term index
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchSettings {
    /// Candidates scoring at or above this are discarded by the index
    #[serde(default = "default_search_threshold")]
    pub threshold: f32,
    #[serde(default = "default_min_match_char_length")]
    pub min_match_char_length: usize,
    /// Ranked lookups only report candidates below this score
    #[serde(default = "default_ranked_threshold")]
    pub ranked_threshold: f32,
}

/// Settings for building and applying suggestions
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SuggestionSettings {
    #[serde(default = "default_min_token_chars")]
    pub min_token_chars: usize,
    #[serde(default = "default_auto_replace_threshold")]
    pub auto_replace_threshold: f32,
    #[serde(default = "default_inline_threshold")]
    pub inline_threshold: f32,
    #[serde(default = "default_inline_candidates")]
    pub inline_candidates: usize,
    #[serde(default = "default_word_suggestion_limit")]
    pub word_suggestion_limit: usize,
    #[serde(default = "default_strip_particles")]
    pub strip_particles: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HighlightSettings {
    /// Claim longer terms before shorter ones when occurrences overlap
    #[serde(default = "default_longest_first")]
    pub longest_first: bool,
}

fn default_search_threshold() -> f32 {
    0.6
}

fn default_min_match_char_length() -> usize {
    2
}

fn default_ranked_threshold() -> f32 {
    0.8
}

fn default_min_token_chars() -> usize {
    2
}

fn default_auto_replace_threshold() -> f32 {
    0.4 // Only near-certain matches are rewritten without asking
}

fn default_inline_threshold() -> f32 {
    0.7
}

fn default_inline_candidates() -> usize {
    2
}

fn default_word_suggestion_limit() -> usize {
    5
}

fn default_strip_particles() -> bool {
    true
}

fn default_longest_first() -> bool {
    true
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            threshold: default_search_threshold(),
            min_match_char_length: default_min_match_char_length(),
            ranked_threshold: default_ranked_threshold(),
        }
    }
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            min_token_chars: default_min_token_chars(),
            auto_replace_threshold: default_auto_replace_threshold(),
            inline_threshold: default_inline_threshold(),
            inline_candidates: default_inline_candidates(),
            word_suggestion_limit: default_word_suggestion_limit(),
            strip_particles: default_strip_particles(),
        }
    }
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            longest_first: default_longest_first(),
        }
    }
}

fn get_project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "autoterm", "Autoterm")
}

fn get_config_path() -> Option<PathBuf> {
    get_project_dirs().map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
}

fn check_unit_interval(name: &str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{} must be within [0, 1], got {}", name, value)))
    }
}

fn check_non_zero(name: &str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::Invalid(format!("{} must be at least 1", name)))
    } else {
        Ok(())
    }
}

impl EngineSettings {
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        get_config_path().ok_or(ConfigError::NoConfigDir)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit_interval("search.threshold", self.search.threshold)?;
        check_unit_interval("search.ranked_threshold", self.search.ranked_threshold)?;
        check_unit_interval("suggestions.auto_replace_threshold", self.suggestions.auto_replace_threshold)?;
        check_unit_interval("suggestions.inline_threshold", self.suggestions.inline_threshold)?;
        check_non_zero("search.min_match_char_length", self.search.min_match_char_length)?;
        check_non_zero("suggestions.min_token_chars", self.suggestions.min_token_chars)?;
        check_non_zero("suggestions.inline_candidates", self.suggestions.inline_candidates)?;
        check_non_zero("suggestions.word_suggestion_limit", self.suggestions.word_suggestion_limit)?;
        Ok(())
    }

    /// Parse and validate settings from a TOML file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: EngineSettings = toml::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let config_content = toml::to_string_pretty(self)?;
        fs::write(path, config_content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("[Config] Settings saved to: {}", path.display());
        Ok(())
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Load settings from the platform config directory.
    ///
    /// Never fails: a missing file is replaced with a freshly written default,
    /// an unreadable or invalid one is logged and defaults are used instead.
    pub fn load_or_default() -> Self {
        match get_config_path() {
            Some(config_path) => Self::load_or_create(&config_path),
            None => {
                error!("[Config] Could not determine project directories. Using default settings.");
                Self::default()
            }
        }
    }

    pub fn load_or_create(config_path: &Path) -> Self {
        info!("[Config] Trying to load settings from: {}", config_path.display());
        match Self::load_from(config_path) {
            Ok(settings) => {
                info!(
                    "[Config] Settings loaded: threshold={}, auto_replace={}, inline={}",
                    settings.search.threshold,
                    settings.suggestions.auto_replace_threshold,
                    settings.suggestions.inline_threshold
                );
                return settings;
            }
            Err(ConfigError::Io { ref source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                info!("[Config] Config file not found. Creating default.");
            }
            Err(e) => {
                warn!("[Config] Failed to load '{}': {}. Using defaults.", config_path.display(), e);
                // Leave a broken file in place for the user to fix
                return Self::default();
            }
        }

        let default_settings = Self::default();
        if let Err(e) = default_settings.save_to(config_path) {
            error!("[Config] Failed to write default config file: {}", e);
        }
        default_settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_engine_constants() {
        let settings = EngineSettings::default();
        assert_eq!(settings.search.threshold, 0.6);
        assert_eq!(settings.search.ranked_threshold, 0.8);
        assert_eq!(settings.search.min_match_char_length, 2);
        assert_eq!(settings.suggestions.auto_replace_threshold, 0.4);
        assert_eq!(settings.suggestions.inline_threshold, 0.7);
        assert_eq!(settings.suggestions.word_suggestion_limit, 5);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[suggestions]\nauto_replace_threshold = 0.25\n").unwrap();

        let settings = EngineSettings::load_from(&path).unwrap();
        assert_eq!(settings.suggestions.auto_replace_threshold, 0.25);
        assert_eq!(settings.suggestions.inline_threshold, 0.7);
        assert_eq!(settings.search, SearchSettings::default());
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[search]\nthreshold = 1.5\n").unwrap();

        assert!(matches!(EngineSettings::load_from(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file_writes_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let settings = EngineSettings::load_or_create(&path);
        assert_eq!(settings, EngineSettings::default());
        assert!(path.exists());
        assert_eq!(EngineSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_malformed_file_falls_back_without_overwriting() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is = = not toml").unwrap();

        let settings = EngineSettings::load_or_create(&path);
        assert_eq!(settings, EngineSettings::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), "this is = = not toml");
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut settings = EngineSettings::default();
        settings.highlight.longest_first = false;
        settings.suggestions.strip_particles = false;

        settings.save_to(&path).unwrap();
        assert_eq!(EngineSettings::load_from(&path).unwrap(), settings);
    }
}

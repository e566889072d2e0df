use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::SenbetsuError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub anime: AnimeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// `tracing` env-filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Overrides the platform data directory for the keyword database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
}

/// Anime settings page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeConfig {
    pub use_anidb: bool,
    pub anidb_username: String,
    pub anidb_password: String,
    pub anidb_use_mylist: bool,
    pub split_home: bool,
}

/// Form submission for the anime settings page. Checkbox fields carry the
/// raw submitted value; a missing checkbox means unchecked.
#[derive(Debug, Clone, Default)]
pub struct AnimeForm {
    pub use_anidb: Option<String>,
    pub anidb_username: String,
    pub anidb_password: String,
    pub anidb_use_mylist: Option<String>,
    pub split_home: Option<String>,
}

impl AnimeConfig {
    /// Overwrite every field from a submitted form.
    pub fn apply_form(&mut self, form: &AnimeForm) {
        self.use_anidb = checkbox_to_value(form.use_anidb.as_deref());
        self.anidb_username = form.anidb_username.clone();
        self.anidb_password = form.anidb_password.clone();
        self.anidb_use_mylist = checkbox_to_value(form.anidb_use_mylist.as_deref());
        self.split_home = checkbox_to_value(form.split_home.as_deref());
    }
}

/// Interpret an HTML checkbox value.
pub fn checkbox_to_value(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("on" | "true" | "1" | "yes")
    )
}

impl AppConfig {
    /// Load config: user file if it exists, built-in defaults otherwise.
    pub fn load() -> Result<Self, SenbetsuError> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit path, falling back to the defaults.
    pub fn load_from(path: &std::path::Path) -> Result<Self, SenbetsuError> {
        if path.exists() {
            let user_str =
                std::fs::read_to_string(path).map_err(|e| SenbetsuError::Config(e.to_string()))?;
            toml::from_str(&user_str).map_err(|e| SenbetsuError::Config(e.to_string()))
        } else {
            toml::from_str(DEFAULT_CONFIG).map_err(|e| SenbetsuError::Config(e.to_string()))
        }
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), SenbetsuError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<(), SenbetsuError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| SenbetsuError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Path to the keyword database, honouring `general.database`.
    pub fn db_path(&self) -> PathBuf {
        self.general.database.clone().unwrap_or_else(|| {
            Self::project_dirs()
                .map(|d| d.data_dir().join("senbetsu.db"))
                .unwrap_or_else(|| PathBuf::from("senbetsu.db"))
        })
    }

    /// Ensure the data directory exists and return the DB path.
    pub fn ensure_db_path(&self) -> Result<PathBuf, SenbetsuError> {
        let path = self.db_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "senbetsu")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}

use super::Config;
use crate::error::{ConfigError, Result};
use directories::UserDirs;
use std::fs;
use std::path::Path;

impl Config {
    /// Load `~/.postwright/config.toml`, writing defaults on first run.
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .ok_or_else(|| ConfigError::Load("could not find home directory".into()))?;
        let postwright_dir = home.join(".postwright");
        let config_path = postwright_dir.join("config.toml");

        if !postwright_dir.exists() {
            fs::create_dir_all(&postwright_dir).map_err(ConfigError::from)?;
        }

        if config_path.exists() {
            return Self::load_from(&config_path);
        }

        let mut config = Self {
            config_path,
            ..Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        // Persist the file defaults only; env overrides stay in memory.
        Self {
            config_path: config.config_path.clone(),
            ..Self::default()
        }
        .save()?;
        Ok(config)
    }

    /// Load an explicit config file. Env overrides apply on top.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(ConfigError::from)?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
        config.config_path = path.to_path_buf();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Load(format!("failed to serialize config: {e}")))?;
        fs::write(&self.config_path, toml_str).map_err(ConfigError::from)?;
        Ok(())
    }
}

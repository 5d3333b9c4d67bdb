//! Skill loader configuration
//!
//! Parses and manages loader configuration from YAML files.
//! Every field has a default, so an empty document is a valid config.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where skill documents live and how a load treats them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Root of the data pack
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Skill documents, relative to `data_dir`. Only `*.xml` files directly
    /// inside are read.
    #[serde(default = "default_skills_dir")]
    pub skills_dir: String,

    /// Also load `custom_skills_dir` after the main set
    #[serde(default)]
    pub custom_skills_load: bool,

    #[serde(default = "default_custom_skills_dir")]
    pub custom_skills_dir: String,

    /// Log every `(id, level, subLevel)` defined more than once.
    /// Duplicates are counted in the load report either way.
    #[serde(default)]
    pub warn_on_duplicate: bool,
}

fn default_data_dir() -> String {
    "./data/".to_string()
}

fn default_skills_dir() -> String {
    "stats/skills".to_string()
}

fn default_custom_skills_dir() -> String {
    "stats/skills/custom".to_string()
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            skills_dir: default_skills_dir(),
            custom_skills_load: false,
            custom_skills_dir: default_custom_skills_dir(),
            warn_on_duplicate: false,
        }
    }
}

impl LoaderConfig {
    /// Load configuration from a YAML file
    ///
    /// # Example
    /// ```no_run
    /// use skilldata::config::LoaderConfig;
    ///
    /// let config = LoaderConfig::from_file("conf/skills.yaml")
    ///     .expect("Failed to load config");
    /// println!("skills: {}", config.skills_path().display());
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: LoaderConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML in {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from a YAML string
    pub fn from_str(contents: &str) -> Result<Self> {
        // serde_yaml rejects an empty document; treat it as all defaults
        let config: LoaderConfig = if contents.trim().is_empty() {
            LoaderConfig::default()
        } else {
            serde_yaml::from_str(contents).context("Failed to parse YAML")?
        };

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.skills_dir.trim().is_empty(), "skills_dir cannot be empty");
        if self.custom_skills_load {
            anyhow::ensure!(
                !self.custom_skills_dir.trim().is_empty(),
                "custom_skills_dir cannot be empty when custom_skills_load is set"
            );
        }
        Ok(())
    }

    /// Main skill directory
    pub fn skills_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.skills_dir)
    }

    /// Custom skill directory, when enabled
    pub fn custom_skills_path(&self) -> Option<PathBuf> {
        self.custom_skills_load
            .then(|| Path::new(&self.data_dir).join(&self.custom_skills_dir))
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(&self)
            .context("Failed to serialize config to YAML")?;

        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write config to {}", path.as_ref().display()))?;

        Ok(())
    }
}

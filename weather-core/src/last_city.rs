use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use std::{fs, path::PathBuf};

/// Remembers the last city submitted on the search screen.
#[derive(Debug, Clone)]
pub struct LastCityStore {
    path: PathBuf,
}

impl LastCityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the platform data directory.
    pub fn open_default() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "weather-app", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(Self::new(dirs.data_dir().join("last_city")))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// The saved city, or `None` if nothing (or only whitespace) was saved.
    pub fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read last city from {}", self.path.display()))?;

        let city = contents.trim();
        Ok((!city.is_empty()).then(|| city.to_string()))
    }

    pub fn save(&self, city: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create data directory: {}", parent.display())
            })?;
        }

        fs::write(&self.path, city)
            .with_context(|| format!("Failed to write last city to {}", self.path.display()))?;

        Ok(())
    }
}

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    pub fn load(db_override: Option<PathBuf>) -> Result<Self> {
        if let Some(db_path) = db_override {
            return Ok(Config { db_path });
        }

        let proj_dirs =
            ProjectDirs::from("", "", "larder").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join("larder.db");

        Ok(Config { db_path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::service::PantryService;

    #[test]
    fn override_path_is_used_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.db");

        let config = Config::load(Some(path.clone())).unwrap();
        assert_eq!(config.db_path, path);
    }

    #[test]
    fn service_creates_database_file_at_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(dir.path().join("larder.db"))).unwrap();

        let svc = PantryService::new(&config.db_path).unwrap();
        svc.register_user("alice", "alice@example.com", "pw").unwrap();

        assert!(config.db_path.exists());
    }
}

use config::{Config, ConfigError, File as ConfigFile};
use serde::Deserialize;
use std::path::Path;

/// Immutable run configuration, built once at startup and passed by
/// reference into every component.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Root of the curated library whose files are never lower quality
    /// than what replaces them.
    pub library_root: String,
    /// Backup locations searched for duplicate copies.
    pub backup_roots: Vec<String>,
    /// Scratch directory holding better copies before they replace
    /// library originals.
    pub staging_root: String,
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// IANA timezone identifier used for capture-date arbitration.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// Canonical square frame size both sides are rescaled to before
    /// similarity scoring, removing resolution bias.
    #[serde(default = "default_frame_size")]
    pub frame_size: u32,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_db_path() -> String {
    "mediamerge.db".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_similarity_threshold() -> f64 {
    0.8
}

fn default_frame_size() -> u32 {
    500
}

fn default_batch_size() -> usize {
    300
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Remove directories that are subdirectories of other directories in the
/// list, so overlapping backup roots are not walked twice.
pub fn non_overlapping_directories(dirs: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();

    for dir in dirs {
        let dir_path = Path::new(&dir);
        let mut should_add = true;
        let result_clone = result.clone();

        for res_dir in &result_clone {
            let res_dir_path = Path::new(res_dir);

            if dir_path.starts_with(res_dir_path) {
                should_add = false;
                break;
            }

            if res_dir_path.starts_with(dir_path) {
                result.retain(|x| x != res_dir);
                break;
            }
        }

        if should_add {
            result.push(dir);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> AppConfig {
        AppConfig {
            library_root: "/photos".to_string(),
            backup_roots: vec!["/backup".to_string()],
            staging_root: "/staging".to_string(),
            db_path: default_db_path(),
            timezone: default_timezone(),
            similarity_threshold: default_similarity_threshold(),
            frame_size: default_frame_size(),
            batch_size: default_batch_size(),
        }
    }

    #[test]
    fn test_defaults() {
        let config = minimal_config();
        assert_eq!(config.similarity_threshold, 0.8);
        assert_eq!(config.frame_size, 500);
        assert_eq!(config.batch_size, 300);
        assert_eq!(config.timezone, "UTC");
    }

    #[test]
    fn test_non_overlapping_no_overlap() {
        let dirs = vec![
            "/home/user/backup_a".to_string(),
            "/home/user/backup_b".to_string(),
            "/var/data".to_string(),
        ];
        let result = non_overlapping_directories(dirs);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_non_overlapping_with_subdirectory() {
        let dirs = vec![
            "/home/user".to_string(),
            "/home/user/backup".to_string(),
            "/var/data".to_string(),
        ];
        let result = non_overlapping_directories(dirs);
        assert_eq!(result.len(), 2);
        assert!(result.contains(&"/home/user".to_string()));
        assert!(result.contains(&"/var/data".to_string()));
        assert!(!result.contains(&"/home/user/backup".to_string()));
    }
}

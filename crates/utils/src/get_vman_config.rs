use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs::{read_to_string, try_exists};
use vman_core::Config;

/// Reads `<dir>/.vman/config.json`, falling back to defaults when absent.
pub async fn get_vman_config(dir: &Path) -> Result<Config> {
    let config_file = dir.join(".vman").join("config.json");
    if !try_exists(&config_file).await.unwrap_or(false) {
        return Ok(Config::default());
    }
    let content = read_to_string(&config_file)
        .await
        .context(format!("Failed to read config - {}", config_file.display()))?;
    serde_json::from_str(&content)
        .context(format!("Failed to parse config - {}", config_file.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_get_vman_config_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = get_vman_config(temp_dir.path()).await.unwrap();
        assert_eq!(config, Config::default());
        temp_dir.close().unwrap();
    }

    #[tokio::test]
    async fn test_get_vman_config_from_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join(".vman")).unwrap();
        fs::write(
            temp_dir.path().join(".vman/config.json"),
            r#"{"boms": ["bom.xml"], "recursive": true, "toolchain": "org.example:toolchain:1"}"#,
        )
        .unwrap();

        let config = get_vman_config(temp_dir.path()).await.unwrap();
        assert_eq!(config.boms, vec![PathBuf::from("bom.xml")]);
        assert!(config.recursive);
        assert_eq!(config.toolchain.as_deref(), Some("org.example:toolchain:1"));
        assert_eq!(config.pattern, "**/pom.xml");
        temp_dir.close().unwrap();
    }

    #[tokio::test]
    async fn test_get_vman_config_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join(".vman")).unwrap();
        fs::write(temp_dir.path().join(".vman/config.json"), "{ not json").unwrap();

        let result = get_vman_config(temp_dir.path()).await;
        assert!(result.is_err());
        temp_dir.close().unwrap();
    }
}

use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub platform: PlatformConfig,
  /// Default page size for feed lists (articles, projects, threads)
  #[serde(default = "default_page_size")]
  pub page_size: u32,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
  /// Base URL of the Agora backend, e.g. "https://api.agora.example"
  pub url: String,
  /// Id of the signed-in viewer; likes are per (user, entity)
  pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// How long a cached first page stays fresh, in seconds
  #[serde(default = "default_cache_ttl")]
  pub ttl_seconds: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      ttl_seconds: default_cache_ttl(),
    }
  }
}

fn default_page_size() -> u32 {
  10
}

fn default_cache_ttl() -> u64 {
  120
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./agora.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/agora/config.yaml
  /// 4. ~/.config/agora/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/agora/config.yaml"
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("agora.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("agora").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Get the API token from environment variables.
  ///
  /// Checks AGORA_API_TOKEN first, then AGORA_TOKEN as fallback.
  pub fn get_api_token() -> Result<String> {
    std::env::var("AGORA_API_TOKEN")
      .or_else(|_| std::env::var("AGORA_TOKEN"))
      .map_err(|_| {
        eyre!("API token not found. Set AGORA_API_TOKEN or AGORA_TOKEN environment variable.")
      })
  }

  /// Cache TTL as a chrono duration.
  pub fn cache_ttl(&self) -> chrono::Duration {
    chrono::Duration::seconds(self.cache.ttl_seconds as i64)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_minimal_config() {
    let yaml = r#"
platform:
  url: "https://api.agora.example"
  user_id: "u_1"
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.page_size, 10);
    assert_eq!(config.cache.ttl_seconds, 120);
  }

  #[test]
  fn test_parse_full_config() {
    let yaml = r#"
platform:
  url: "https://api.agora.example"
  user_id: "u_1"
page_size: 25
cache:
  ttl_seconds: 30
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.page_size, 25);
    assert_eq!(config.cache_ttl(), chrono::Duration::seconds(30));
  }
}

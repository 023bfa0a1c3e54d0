use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  /// Project whose notes are shown when none is given on the command line
  pub project: Option<String>,
  /// Upper bound for any single call to the note store
  #[serde(default = "default_request_timeout_secs")]
  pub request_timeout_secs: u64,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// GraphQL endpoint
  pub url: url::Url,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Minutes before a cached note list is read from the store again
  #[serde(default = "default_stale_minutes")]
  pub stale_minutes: i64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      stale_minutes: default_stale_minutes(),
    }
  }
}

impl CacheConfig {
  pub fn stale_time(&self) -> chrono::Duration {
    chrono::Duration::minutes(self.stale_minutes.max(0))
  }
}

fn default_request_timeout_secs() -> u64 {
  30
}

fn default_stale_minutes() -> i64 {
  5
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./noted.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/noted/config.yaml
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
        "No configuration file found. Create one at ~/.config/noted/config.yaml"
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("noted.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("noted").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    let config: Self = serde_yaml::from_str(contents).map_err(|e| eyre!("{}", e))?;
    config.validate()?;
    Ok(config)
  }

  fn validate(&self) -> Result<()> {
    if self.request_timeout_secs == 0 {
      return Err(eyre!("request_timeout_secs must be at least 1"));
    }
    Ok(())
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }

  /// Get the API token from the environment, if one is set.
  ///
  /// Checks NOTED_API_TOKEN. Requests go out unauthenticated without it.
  pub fn get_api_token() -> Option<String> {
    std::env::var("NOTED_API_TOKEN")
      .ok()
      .filter(|t| !t.is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_minimal_config_uses_defaults() {
    let config = Config::parse("api:\n  url: https://notes.example.com/graphql\n").unwrap();
    assert_eq!(config.api.url.host_str(), Some("notes.example.com"));
    assert!(config.project.is_none());
    assert_eq!(config.request_timeout(), Duration::from_secs(30));
    assert_eq!(config.cache.stale_time(), chrono::Duration::minutes(5));
  }

  #[test]
  fn test_full_config() {
    let yaml = r#"
api:
  url: http://localhost:4000/graphql
project: P1
request_timeout_secs: 5
cache:
  stale_minutes: 1
"#;
    let config = Config::parse(yaml).unwrap();
    assert_eq!(config.project.as_deref(), Some("P1"));
    assert_eq!(config.request_timeout(), Duration::from_secs(5));
    assert_eq!(config.cache.stale_time(), chrono::Duration::minutes(1));
  }

  #[test]
  fn test_invalid_url_is_rejected() {
    assert!(Config::parse("api:\n  url: not a url\n").is_err());
  }

  #[test]
  fn test_zero_timeout_is_rejected() {
    let yaml = "api:\n  url: http://localhost:4000/graphql\nrequest_timeout_secs: 0\n";
    let err = Config::parse(yaml).unwrap_err();
    assert!(err.to_string().contains("request_timeout_secs"));
  }

  #[test]
  fn test_missing_explicit_path() {
    let err = Config::load(Some(Path::new("/nonexistent/noted.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }
}

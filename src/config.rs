use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::{
  fs,
  path::{Path, PathBuf},
};

const FILE_NAME: &str = "config.yml";
const CONFIG_DIR: &str = ".config";
const APP_CONFIG_DIR: &str = "jukectl";

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;
pub const DEFAULT_TICK_RATE_MS: u64 = 250;
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Clone)]
pub struct ClientConfigPaths {
  pub config_file_path: PathBuf,
}

/// On-disk shape of the config file: everything optional, so a partial file
/// only overrides what it names.
#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientConfigString {
  pub server_url: Option<String>,
  pub poll_interval_milliseconds: Option<u64>,
  pub tick_rate_milliseconds: Option<u64>,
  pub page_size: Option<usize>,
}

#[derive(Clone)]
pub struct ClientConfig {
  /// Base URL of the jukebox server; every endpoint is resolved against this
  /// one value.
  pub server_url: String,
  pub poll_interval_milliseconds: u64,
  pub tick_rate_milliseconds: u64,
  pub page_size: usize,
  pub path_to_config: Option<ClientConfigPaths>,
}

impl ClientConfig {
  pub fn new() -> ClientConfig {
    ClientConfig {
      server_url: DEFAULT_SERVER_URL.to_string(),
      poll_interval_milliseconds: DEFAULT_POLL_INTERVAL_MS,
      tick_rate_milliseconds: DEFAULT_TICK_RATE_MS,
      page_size: DEFAULT_PAGE_SIZE,
      path_to_config: None,
    }
  }

  pub fn get_or_build_paths(&mut self) -> Result<()> {
    match dirs::home_dir() {
      Some(home) => {
        let path = Path::new(&home);
        let home_config_dir = path.join(CONFIG_DIR);
        let app_config_dir = home_config_dir.join(APP_CONFIG_DIR);

        if !home_config_dir.exists() {
          fs::create_dir(&home_config_dir)?;
        }

        if !app_config_dir.exists() {
          fs::create_dir(&app_config_dir)?;
        }

        let config_file_path = &app_config_dir.join(FILE_NAME);

        let paths = ClientConfigPaths {
          config_file_path: config_file_path.to_path_buf(),
        };
        self.path_to_config = Some(paths);
        Ok(())
      }
      None => Err(anyhow!("No $HOME directory found for client config")),
    }
  }

  pub fn load_config(&mut self, path_override: Option<&PathBuf>) -> Result<()> {
    let config_file_path = match path_override {
      Some(path) => path.clone(),
      None => {
        if self.path_to_config.is_none() {
          self.get_or_build_paths()?;
        }
        match &self.path_to_config {
          Some(paths) => paths.config_file_path.clone(),
          None => return Err(anyhow!("config path could not be determined")),
        }
      }
    };

    if config_file_path.exists() {
      let config_string = fs::read_to_string(&config_file_path)?;
      // serde fails if file is empty
      if config_string.trim().is_empty() {
        return Ok(());
      }

      let config_yml: ClientConfigString = serde_yaml::from_str(&config_string)?;
      self.merge(config_yml);
    }

    Ok(())
  }

  pub fn merge(&mut self, config: ClientConfigString) {
    if let Some(server_url) = config.server_url {
      self.server_url = server_url;
    }

    if let Some(poll_interval_milliseconds) = config.poll_interval_milliseconds {
      self.poll_interval_milliseconds = poll_interval_milliseconds;
    }

    if let Some(tick_rate_milliseconds) = config.tick_rate_milliseconds {
      self.tick_rate_milliseconds = tick_rate_milliseconds;
    }

    if let Some(page_size) = config.page_size {
      // A zero page size would make every track invisible.
      if page_size > 0 {
        self.page_size = page_size;
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn merge_keeps_defaults_for_unset_fields() {
    let mut config = ClientConfig::new();
    config.merge(ClientConfigString {
      server_url: Some("http://jukebox.local:5000".to_string()),
      ..Default::default()
    });
    assert_eq!(config.server_url, "http://jukebox.local:5000");
    assert_eq!(config.poll_interval_milliseconds, DEFAULT_POLL_INTERVAL_MS);
    assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
  }

  #[test]
  fn merge_rejects_zero_page_size() {
    let mut config = ClientConfig::new();
    config.merge(ClientConfigString {
      page_size: Some(0),
      ..Default::default()
    });
    assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
  }

  #[test]
  fn partial_yaml_parses_into_config_string() {
    let parsed: ClientConfigString =
      serde_yaml::from_str("poll_interval_milliseconds: 5000\n").unwrap();
    assert_eq!(parsed.poll_interval_milliseconds, Some(5000));
    assert_eq!(parsed.server_url, None);
  }
}

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration, loaded from YAML. Every section falls back
/// to its defaults when missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub data: DataSection,
  #[serde(default)]
  pub logging: LoggingSection,
  #[serde(default)]
  pub jobs: JobsSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSection {
  /// Directory the collection files live in.
  #[serde(default = "default_data_dir")]
  pub dir: String,
}

fn default_data_dir() -> String {
  "./data".into()
}

impl Default for DataSection {
  fn default() -> Self {
    Self {
      dir: default_data_dir(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
  #[serde(default = "default_level")]
  pub level: String,
}

fn default_level() -> String {
  "info".into()
}

impl Default for LoggingSection {
  fn default() -> Self {
    Self {
      level: default_level(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsSection {
  /// Whether the notification sweep runs at all.
  #[serde(default = "default_true")]
  pub notifications: bool,
  /// Seconds between notification sweeps.
  #[serde(default = "default_notification_interval")]
  pub notification_interval_secs: u64,
}

fn default_true() -> bool {
  true
}

fn default_notification_interval() -> u64 {
  3600
}

impl Default for JobsSection {
  fn default() -> Self {
    Self {
      notifications: default_true(),
      notification_interval_secs: default_notification_interval(),
    }
  }
}

impl Config {
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
    let content = std::fs::read_to_string(&path)?;
    Ok(serde_yaml::from_str(&content)?)
  }

  pub fn find_and_load() -> Result<Option<Self>, anyhow::Error> {
    for p in ["placetrack.yaml", "placetrack.yml"] {
      if Path::new(p).exists() {
        tracing::info!("Loading config from {}", p);
        return Ok(Some(Self::from_file(p)?));
      }
    }
    Ok(None)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_apply_to_missing_sections() {
    let config: Config = serde_yaml::from_str("data:\n  dir: /tmp/pt\n").unwrap();
    assert_eq!(config.data.dir, "/tmp/pt");
    assert_eq!(config.logging.level, "info");
    assert!(config.jobs.notifications);
    assert_eq!(config.jobs.notification_interval_secs, 3600);
  }
}

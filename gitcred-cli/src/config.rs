//! # Configuration Management
//!
//! Locates the helper's directories and loads `config.toml`. The helper must
//! answer git even when the file is broken, so callers fall back to defaults
//! after reporting a load failure.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use gitcred_core::store::Persistence;
use serde::{Deserialize, Serialize};

/// Overrides the config file location
pub const CONFIG_ENV: &str = "GITCRED_CONFIG";

/// Overrides the netrc store location
pub const NETRC_ENV: &str = "GITCRED_NETRC";

/// Set to `0` by git when it must not prompt
pub const TERMINAL_PROMPT_ENV: &str = "GIT_TERMINAL_PROMPT";

/// Represents the configuration directories for the helper
#[derive(Debug, Clone)]
pub struct ConfigDirs {
  pub config_dir: PathBuf,
  pub data_dir: PathBuf,
}

impl ConfigDirs {
  /// Create a new ConfigDirs instance
  pub fn new() -> Result<Self> {
    let proj_dirs = ProjectDirs::from("", "", "gitcred").context("Failed to determine project directories")?;

    Ok(Self {
      config_dir: proj_dirs.config_dir().to_path_buf(),
      data_dir: proj_dirs.data_dir().to_path_buf(),
    })
  }

  /// Get the path to the configuration file
  pub fn config_path(&self) -> PathBuf {
    self.config_dir.join("config.toml")
  }

  /// Default location of the netrc credential store
  pub fn default_netrc_path(&self) -> PathBuf {
    self.data_dir.join("credentials.netrc")
  }

  /// Default directory the installer copies the helper into
  pub fn install_dir(&self) -> PathBuf {
    self.data_dir.join("bin")
  }
}

/// When the helper may prompt after a store miss
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractiveMode {
  #[default]
  Auto,
  Always,
  Never,
}

/// Persistence requested for native credentials
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersistMode {
  Session,
  LocalMachine,
  #[default]
  Enterprise,
}

impl From<PersistMode> for Persistence {
  fn from(mode: PersistMode) -> Self {
    match mode {
      PersistMode::Session => Persistence::Session,
      PersistMode::LocalMachine => Persistence::LocalMachine,
      PersistMode::Enterprise => Persistence::Enterprise,
    }
  }
}

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HelperConfig {
  pub netrc_path: Option<PathBuf>,
  pub interactive: InteractiveMode,
  pub persist: PersistMode,
}

impl HelperConfig {
  /// Parse a configuration file's content
  pub fn parse(content: &str) -> Result<Self> {
    toml::from_str(content).context("Failed to parse helper config")
  }

  /// Load the configuration from `path`, or defaults when it does not exist
  pub fn load_from(path: &Path) -> Result<Self> {
    if !path.exists() {
      return Ok(Self::default());
    }

    let content =
      fs::read_to_string(path).with_context(|| format!("Failed to read helper config from {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse helper config from {}", path.display()))
  }

  /// Load the configuration named by `GITCRED_CONFIG` or the default location
  pub fn load(dirs: Option<&ConfigDirs>) -> Result<Self> {
    let path = match env::var_os(CONFIG_ENV) {
      Some(path) => PathBuf::from(path),
      None => match dirs {
        Some(dirs) => dirs.config_path(),
        None => return Ok(Self::default()),
      },
    };
    Self::load_from(&path)
  }

  /// Where the netrc store lives: `GITCRED_NETRC`, then the config, then the
  /// data directory
  pub fn resolve_netrc_path(&self, dirs: Option<&ConfigDirs>) -> Result<PathBuf> {
    if let Some(path) = env::var_os(NETRC_ENV).filter(|path| !path.is_empty()) {
      return Ok(PathBuf::from(path));
    }
    if let Some(path) = &self.netrc_path {
      return Ok(path.clone());
    }
    dirs
      .map(ConfigDirs::default_netrc_path)
      .context("Failed to determine the netrc store location; set netrc_path or GITCRED_NETRC")
  }

  /// Whether the dispatcher may fall back to an interactive prompt
  ///
  /// `terminal_attached` is only consulted for `auto` on platforms without a
  /// dialog prompt.
  pub fn interactive_prompt_supported(&self, terminal_prompt: Option<&str>, terminal_attached: bool) -> bool {
    match self.interactive {
      InteractiveMode::Always => true,
      InteractiveMode::Never => false,
      InteractiveMode::Auto => {
        if terminal_prompt.is_some_and(|value| value.trim() == "0") {
          false
        } else {
          cfg!(windows) || terminal_attached
        }
      }
    }
  }
}

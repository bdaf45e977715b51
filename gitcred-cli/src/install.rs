//! # Self Installer
//!
//! Copies the running executable into an install directory and registers it
//! as git's global credential helper.

use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use console::Term;
use dialoguer::Confirm;
use gitcred_core::prompt::terminal::prompt_theme;
use tracing::{debug, info};

use crate::config::ConfigDirs;
use crate::output::{format_command, format_path, print_info, print_success};

/// Options collected from the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallOptions {
  /// Skip the confirmation prompt
  pub silent: bool,
  /// Explicit git executable
  pub git_path: Option<PathBuf>,
  /// Explicit install directory
  pub install_dir: Option<PathBuf>,
}

/// How an install attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
  Installed(PathBuf),
  Declined,
}

/// Names git may be installed under
fn git_executable_names() -> &'static [&'static str] {
  if cfg!(windows) { &["git.exe", "git"] } else { &["git"] }
}

/// The first git executable in `path_var`
pub fn find_git_on_path(path_var: &OsStr) -> Option<PathBuf> {
  env::split_paths(path_var).find_map(|dir| {
    git_executable_names()
      .iter()
      .map(|name| dir.join(name))
      .find(|candidate| candidate.is_file())
  })
}

/// Resolve the git executable from the option or `PATH`
pub fn locate_git(explicit: Option<&Path>) -> Result<PathBuf> {
  if let Some(path) = explicit {
    if path.is_file() {
      return Ok(path.to_path_buf());
    }
    bail!("Git was not found at {}", path.display());
  }

  env::var_os("PATH")
    .and_then(|path_var| find_git_on_path(&path_var))
    .context("Git was not found on PATH; pass its location with -i <path>")
}

/// Value stored in `credential.helper` for an installed executable
pub fn helper_config_value(installed: &Path) -> String {
  format!("!'{}'", installed.display())
}

/// Copy `source` into `dir`, replacing an earlier install
pub fn copy_executable(source: &Path, dir: &Path) -> Result<PathBuf> {
  let file_name = source
    .file_name()
    .with_context(|| format!("Executable path has no file name: {}", source.display()))?;
  fs::create_dir_all(dir).with_context(|| format!("Failed to create install directory {}", dir.display()))?;

  let target = dir.join(file_name);
  if target == source {
    debug!("Helper already runs from {}", target.display());
    return Ok(target);
  }

  fs::copy(source, &target)
    .with_context(|| format!("Failed to copy {} to {}", source.display(), target.display()))?;
  Ok(target)
}

/// Register `installed` as the global credential helper
pub fn configure_git(git: &Path, installed: &Path) -> Result<()> {
  let value = helper_config_value(installed);
  info!("Running {} config --global credential.helper {}", git.display(), value);

  let status = Command::new(git)
    .args(["config", "--global", "credential.helper"])
    .arg(&value)
    .status()
    .with_context(|| format!("Failed to run {}", git.display()))?;

  if !status.success() {
    bail!("git config exited with {status}");
  }
  Ok(())
}

fn confirm() -> Result<bool> {
  Confirm::with_theme(&prompt_theme())
    .with_prompt("Install gitcred as git's global credential helper?")
    .default(true)
    .interact_on(&Term::stderr())
    .context("Failed to read confirmation; rerun with -s to install without prompting")
}

/// Install the running executable
pub fn install(options: &InstallOptions, dirs: Option<&ConfigDirs>) -> Result<InstallOutcome> {
  if !options.silent && !confirm()? {
    print_info("Installation cancelled");
    return Ok(InstallOutcome::Declined);
  }

  let git = locate_git(options.git_path.as_deref())?;
  debug!("Using git at {}", git.display());

  let install_dir = match (&options.install_dir, dirs) {
    (Some(dir), _) => dir.clone(),
    (None, Some(dirs)) => dirs.install_dir(),
    (None, None) => bail!("Failed to determine an install directory; pass one with -t <path>"),
  };

  let current = env::current_exe().context("Failed to locate the running executable")?;
  let installed = copy_executable(&current, &install_dir)?;
  configure_git(&git, &installed)?;

  print_success(&format!(
    "Installed {} as {}",
    format_path(&installed),
    format_command("credential.helper")
  ));
  Ok(InstallOutcome::Installed(installed))
}

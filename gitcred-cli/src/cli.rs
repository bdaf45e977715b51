//! # Command Line Interface
//!
//! Git calls the helper as `git-credential-gitcred <operation>`. Anything that
//! is not a credential operation is handled here: the help text, the
//! installer flags and the install-on-no-arguments behavior.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{ArgAction, CommandFactory, Parser};
use gitcred_core::Invocation;
use tracing::debug;

use crate::config::{ConfigDirs, HelperConfig};
use crate::helper;
use crate::install::{self, InstallOptions};
use crate::output::{ColorMode, print_error, print_warning};

/// Top-level command line of the credential helper
#[derive(Parser, Debug)]
#[command(name = "git-credential-gitcred")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(about = "A git credential helper backed by the operating system's credential store")]
#[command(
  long_about = "Git runs this helper to look up, save and forget credentials.\n\n\
        Run without arguments (or with -s, -i or -t) to install it as git's\n\
        global credential helper."
)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(disable_help_flag = true)]
#[command(max_term_width = 120)]
#[command(styles = Styles::styled()
    .header(AnsiColor::BrightGreen.on_default().bold().underline())
    .usage(AnsiColor::Green.on_default().bold())
    .literal(AnsiColor::BrightGreen.on_default().bold())
    .placeholder(AnsiColor::BrightWhite.on_default().italic())
    .valid(AnsiColor::Green.on_default())
    .invalid(AnsiColor::BrightRed.on_default().bold())
)]
pub struct Cli {
  /// Sets the level of verbosity (can be used multiple times)
  #[arg(
    short = 'v',
    long = "verbose",
    action = ArgAction::Count,
    long_help = "Sets the level of verbosity for tracing and logging output.\n\n\
             -v: Show info level messages\n\
             -vv: Show debug level messages\n\
             -vvv: Show trace level messages"
  )]
  pub verbose: u8,

  /// Controls when colored output is used
  #[arg(
    long,
    value_enum,
    ignore_case = true,
    default_value_t = ColorMode::Auto,
  )]
  pub colors: ColorMode,

  /// Print help
  #[arg(short = 'h', short_alias = '?', long = "help", action = ArgAction::SetTrue)]
  pub help: bool,

  /// Install without asking for confirmation
  #[arg(short = 's', long = "silent")]
  pub silent: bool,

  /// Git executable to configure (default: first git on PATH)
  #[arg(short = 'i', long = "git-path", value_name = "PATH")]
  pub git_path: Option<PathBuf>,

  /// Directory to install the helper into
  #[arg(short = 't', long = "install-path", value_name = "DIR")]
  pub install_path: Option<PathBuf>,

  /// Credential operation: get, store or erase
  #[arg(value_name = "OPERATION")]
  pub operation: Option<String>,

  /// Extra arguments git may append
  #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
  pub extra: Vec<String>,
}

impl Cli {
  /// Whether any installer flag was given
  pub fn has_install_parameter(&self) -> bool {
    self.silent || self.git_path.is_some() || self.install_path.is_some()
  }

  fn install_options(&self) -> InstallOptions {
    InstallOptions {
      silent: self.silent,
      git_path: self.git_path.clone(),
      install_dir: self.install_path.clone(),
    }
  }
}

/// Rendered help text
pub fn usage() -> String {
  Cli::command().render_help().to_string()
}

fn config_dirs() -> Option<ConfigDirs> {
  ConfigDirs::new()
    .inspect_err(|err| debug!("No project directories: {err:#}"))
    .ok()
}

fn load_config(dirs: Option<&ConfigDirs>) -> HelperConfig {
  HelperConfig::load(dirs).unwrap_or_else(|err| {
    print_warning(&format!("{err:#}; using default settings"));
    HelperConfig::default()
  })
}

pub fn handle_cli(cli: Cli) -> ExitCode {
  cli.colors.apply();

  if cli.help {
    eprintln!("{}", usage());
    return ExitCode::SUCCESS;
  }

  let dirs = config_dirs();

  let operation = match &cli.operation {
    Some(operation) if !cli.has_install_parameter() => operation,
    _ => {
      return match install::install(&cli.install_options(), dirs.as_ref()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
          print_error(&format!("{err:#}"));
          ExitCode::FAILURE
        }
      };
    }
  };

  let invocation = match operation.parse::<Invocation>() {
    Ok(invocation) => invocation,
    Err(err) => {
      print_error(&err.to_string());
      eprintln!("{}", usage());
      return ExitCode::FAILURE;
    }
  };
  if !cli.extra.is_empty() {
    debug!("Ignoring extra arguments: {:?}", cli.extra);
  }

  let config = load_config(dirs.as_ref());
  helper::run(invocation, &config, dirs.as_ref())
}

#[cfg(test)]
mod tests {
  use test_case::test_case;

  use super::*;

  #[test]
  fn test_cli_debug_assert() {
    Cli::command().debug_assert();
  }

  #[test]
  fn test_no_arguments_means_install() {
    let cli = Cli::try_parse_from(["git-credential-gitcred"]).unwrap();
    assert!(cli.operation.is_none());
    assert!(!cli.has_install_parameter());
  }

  #[test_case(&["-s"] ; "silent")]
  #[test_case(&["-i", "/usr/bin/git"] ; "git path")]
  #[test_case(&["-t", "/opt/bin"] ; "install path")]
  #[test_case(&["get", "-s"] ; "flag after operation")]
  fn test_install_parameters(args: &[&str]) {
    let cli = Cli::try_parse_from(std::iter::once("git-credential-gitcred").chain(args.iter().copied())).unwrap();
    assert!(cli.has_install_parameter());
  }

  #[test_case("-h" ; "short")]
  #[test_case("-?" ; "question mark")]
  #[test_case("--help" ; "long")]
  fn test_help_flags(flag: &str) {
    let cli = Cli::try_parse_from(["git-credential-gitcred", flag]).unwrap();
    assert!(cli.help);
  }

  #[test]
  fn test_operation_with_trailing_arguments() {
    let cli = Cli::try_parse_from(["git-credential-gitcred", "get", "extra", "--x"]).unwrap();
    assert_eq!(cli.operation.as_deref(), Some("get"));
    assert_eq!(cli.extra, vec!["extra", "--x"]);
  }

  #[test]
  fn test_usage_mentions_installer_flags() {
    let usage = usage();
    assert!(usage.contains("--silent"));
    assert!(usage.contains("OPERATION"));
  }
}

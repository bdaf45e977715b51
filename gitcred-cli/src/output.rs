//! # Output Formatting
//!
//! User-facing messages with colors and emojis. Everything is printed to
//! stderr because stdout is reserved for the credential protocol.

use std::fmt::Display;
use std::path::Path;

use owo_colors::{OwoColorize, Stream, Style};

/// Enum representing different color modes for output
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
  /// Enable colored output
  Yes,
  /// Enable colored output (alias for Yes)
  Always,
  /// Automatically detect if colors should be used based on terminal
  /// capabilities
  Auto,
  /// Disable colored output
  No,
  /// Disable colored output (alias for No)
  Never,
}

impl ColorMode {
  /// Apply this mode to every later colored write
  pub fn apply(self) {
    match self {
      Self::Yes | Self::Always => owo_colors::set_override(true),
      Self::No | Self::Never => owo_colors::set_override(false),
      Self::Auto => owo_colors::unset_override(),
    }
  }
}

/// Helper function to safely get an emoji or fallback to a default character
pub fn get_emoji_or_default(name: &str, default: &str) -> String {
  match emojis::get_by_shortcode(name) {
    Some(emoji) => emoji.to_string(),
    None => default.to_string(),
  }
}

/// Paint `text` for stderr, honoring the `--colors` override
fn paint<T: Display>(text: T, style: Style) -> String {
  text
    .if_supports_color(Stream::Stderr, |text| text.style(style))
    .to_string()
}

/// Print a success message
pub fn print_success(message: &str) {
  let check = get_emoji_or_default("check_mark", "✓");
  eprintln!("{} {}", paint(check, Style::new().green().bold()), message);
}

/// Print an error message
pub fn print_error(message: &str) {
  let cross = get_emoji_or_default("cross_mark", "✗");
  eprintln!("{} {}", paint(cross, Style::new().red().bold()), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
  let warning = get_emoji_or_default("warning", "⚠");
  eprintln!("{} {}", paint(warning, Style::new().yellow().bold()), message);
}

/// Print an info message
pub fn print_info(message: &str) {
  let info = get_emoji_or_default("information", "ℹ");
  eprintln!("{} {}", paint(info, Style::new().blue().bold()), message);
}

/// Format a filesystem path
pub fn format_path(path: &Path) -> String {
  paint(path.display(), Style::new().bright_green())
}

/// Format a command or command example
pub fn format_command(cmd: &str) -> String {
  paint(cmd, Style::new().purple())
}

//! # gitcred CLI Library
//!
//! Wiring between the process and [`gitcred_core`]: argument parsing,
//! configuration, logging setup, user-facing output and the self-installer.

pub mod cli;
pub mod config;
pub mod helper;
pub mod install;
pub mod logging;
pub mod output;

//! Test utilities shared across the gitcred workspace
//!
//! This crate provides common testing infrastructure including:
//! - An in-memory secret store that records every call ([`MemoryStore`])
//! - A prompt with a predetermined answer ([`ScriptedPrompt`])
//! - Temporary netrc files ([`NetrcGuard`])
//! - Environment variable isolation ([`EnvVarGuard`])
//!
//! The clippy dead_code lint is disabled for this crate because test utilities
//! may not be used by all tests, and the compiler cannot detect usage across
//! crate boundaries in development dependencies.

#![allow(dead_code)]

pub mod env;
pub mod netrc;
pub mod prompt;
pub mod store;

// Re-export commonly used items
pub use env::EnvVarGuard;
pub use netrc::NetrcGuard;
pub use prompt::{PromptScript, ScriptedPrompt};
pub use store::{MemoryStore, StoreCall};

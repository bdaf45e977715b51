//! # gitcred Core Library
//!
//! Protocol engine for the gitcred credential helper. Git invokes the helper
//! with one of `get`, `store` or `erase` and writes a block of `key=value`
//! lines to its standard input; this crate decodes that block, derives a
//! host-scoped storage key, mediates between the secret store and the
//! interactive prompt, and encodes the response.
//!
//! The binary crate wires these pieces to the real process streams. Tests
//! substitute the [`store::SecretStore`] and [`prompt::CredentialPrompt`]
//! capabilities with in-memory doubles.

pub mod credential;
pub mod dispatch;
pub mod error;
pub mod platform;
pub mod prompt;
pub mod protocol;
pub mod session;
pub mod store;
pub mod target;

pub use credential::Credential;
pub use dispatch::{Command, Dispatcher, Reply};
pub use error::{Error, Result};
pub use protocol::{AttributeMap, decode, encode};
pub use session::{Invocation, Phase, Session};
pub use target::TargetKey;

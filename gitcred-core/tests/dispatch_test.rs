use gitcred_core::dispatch::{Command, Dispatcher};
use gitcred_core::error::Error;
use gitcred_core::protocol::AttributeMap;
use gitcred_core::target::TargetKey;
use gitcred_core::Credential;
use gitcred_test_utils::{MemoryStore, PromptScript, ScriptedPrompt, StoreCall};

const EXAMPLE_KEY: &str = "git:https://example.com";

fn attrs(pairs: &[(&str, &str)]) -> AttributeMap {
  pairs.iter().copied().collect()
}

fn example(extra: &[(&str, &str)]) -> AttributeMap {
  let mut attributes = attrs(&[("protocol", "https"), ("host", "example.com")]);
  for (key, value) in extra {
    attributes.insert(*key, *value);
  }
  attributes
}

#[test]
fn test_store_then_get_round_trip() {
  let store = MemoryStore::new();
  let prompt = ScriptedPrompt::cancelling();
  let dispatcher = Dispatcher::new(&store, &prompt);

  let stored = dispatcher.dispatch(
    Command::Store,
    &example(&[("path", "org/repo.git"), ("username", "u"), ("password", "p")]),
  );
  assert!(stored.response.is_empty());
  assert!(stored.diagnostics.is_empty());

  let fetched = dispatcher.dispatch(Command::Get, &example(&[]));
  assert!(fetched.diagnostics.is_empty());
  assert_eq!(fetched.response, attrs(&[("username", "u"), ("password", "p")]));
  assert_eq!(prompt.times_shown(), 0);
}

#[test]
fn test_get_found_under_different_path() {
  let store = MemoryStore::new().with_entry(EXAMPLE_KEY, "alice", "s3cr3t");
  let prompt = ScriptedPrompt::cancelling();
  let dispatcher = Dispatcher::new(&store, &prompt);

  let reply = dispatcher.dispatch(Command::Get, &example(&[("path", "another/repo.git")]));

  assert_eq!(reply.response.get("username"), Some("alice"));
  assert_eq!(reply.response.get("password"), Some("s3cr3t"));
}

#[test]
fn test_host_scoping_invariant() {
  for (first, second) in [("a.git", "b.git"), ("/x/y", "z"), ("", "deep/nested/path.git")] {
    let one = TargetKey::derive(&example(&[("path", first)])).unwrap();
    let two = TargetKey::derive(&example(&[("path", second)])).unwrap();
    assert_eq!(one, two, "paths {first:?} and {second:?} must share a key");
  }
}

#[test]
fn test_get_miss_with_cancelled_prompt() {
  let store = MemoryStore::new();
  let prompt = ScriptedPrompt::cancelling();
  let dispatcher = Dispatcher::new(&store, &prompt);

  let reply = dispatcher.dispatch(Command::Get, &example(&[]));

  assert!(reply.response.is_empty());
  assert!(reply.diagnostics.is_empty());
  assert_eq!(prompt.times_shown(), 1);
  assert_eq!(store.writes(), 0);
}

#[test]
fn test_get_miss_with_unavailable_prompt() {
  let store = MemoryStore::new();
  let prompt = ScriptedPrompt::new(PromptScript::Unavailable);
  let dispatcher = Dispatcher::new(&store, &prompt);

  let reply = dispatcher.dispatch(Command::Get, &example(&[]));

  assert!(reply.response.is_empty());
  assert!(reply.diagnostics.is_empty());
}

#[test]
fn test_get_prompted_credential_is_not_persisted() {
  let store = MemoryStore::new();
  let prompt = ScriptedPrompt::entering("bob", "hunter2");
  let dispatcher = Dispatcher::new(&store, &prompt);

  let reply = dispatcher.dispatch(Command::Get, &example(&[]));

  assert_eq!(reply.response, attrs(&[("username", "bob"), ("password", "hunter2")]));
  assert_eq!(store.writes(), 0);
  assert!(store.is_empty());
}

#[test]
fn test_get_prompt_context() {
  let store = MemoryStore::new();
  let prompt = ScriptedPrompt::cancelling();
  let dispatcher = Dispatcher::new(&store, &prompt);

  dispatcher.dispatch(Command::Get, &example(&[("username", "alice"), ("path", "repo.git")]));

  let shown = prompt.shown();
  assert_eq!(shown.len(), 1);
  assert_eq!(shown[0].caption, "Git Credentials");
  assert_eq!(shown[0].message, "Enter your credentials for: https://example.com");
  assert_eq!(shown[0].prefill_username.as_deref(), Some("alice"));
}

#[test]
fn test_get_prompt_without_username_has_no_prefill() {
  let store = MemoryStore::new();
  let prompt = ScriptedPrompt::cancelling();
  let dispatcher = Dispatcher::new(&store, &prompt);

  dispatcher.dispatch(Command::Get, &example(&[]));

  assert_eq!(prompt.shown()[0].prefill_username, None);
}

#[test]
fn test_get_without_interactive_support_skips_prompt() {
  let store = MemoryStore::new();
  let prompt = ScriptedPrompt::entering("bob", "hunter2");
  let dispatcher = Dispatcher::new(&store, &prompt).with_interactive_prompt(false);

  let reply = dispatcher.dispatch(Command::Get, &example(&[]));

  assert!(reply.response.is_empty());
  assert_eq!(prompt.times_shown(), 0);
}

#[test]
fn test_get_store_error_degrades_to_prompt() {
  let store = MemoryStore::failing();
  let prompt = ScriptedPrompt::entering("bob", "hunter2");
  let dispatcher = Dispatcher::new(&store, &prompt);

  let reply = dispatcher.dispatch(Command::Get, &example(&[]));

  assert_eq!(reply.response.get("username"), Some("bob"));
  assert!(reply.diagnostics.is_empty());
  assert_eq!(prompt.times_shown(), 1);
}

#[test]
fn test_get_prompt_failure_is_diagnosed() {
  let store = MemoryStore::new();
  let prompt = ScriptedPrompt::new(PromptScript::Fail);
  let dispatcher = Dispatcher::new(&store, &prompt);

  let reply = dispatcher.dispatch(Command::Get, &example(&[]));

  assert!(reply.response.is_empty());
  assert!(matches!(reply.diagnostics.as_slice(), [Error::Prompt(_)]));
}

#[test]
fn test_get_invalid_target_touches_nothing() {
  let store = MemoryStore::new();
  let prompt = ScriptedPrompt::entering("bob", "hunter2");
  let dispatcher = Dispatcher::new(&store, &prompt);

  let reply = dispatcher.dispatch(Command::Get, &attrs(&[("protocol", "ht tp"), ("host", "example.com")]));

  assert!(reply.response.is_empty());
  assert!(matches!(reply.diagnostics.as_slice(), [Error::InvalidTarget(_)]));
  assert!(store.calls().is_empty());
  assert_eq!(prompt.times_shown(), 0);
}

#[test]
fn test_store_missing_password_is_rejected() {
  let store = MemoryStore::new();
  let prompt = ScriptedPrompt::cancelling();
  let dispatcher = Dispatcher::new(&store, &prompt);

  let reply = dispatcher.dispatch(Command::Store, &example(&[("username", "u")]));

  assert!(reply.response.is_empty());
  assert!(store.calls().is_empty());
  assert!(matches!(reply.diagnostics.as_slice(), [Error::MissingField("password")]));
  assert_eq!(reply.diagnostics[0].to_string(), "password parameter must be provided");
}

#[test]
fn test_store_reports_each_missing_field() {
  let store = MemoryStore::new();
  let prompt = ScriptedPrompt::cancelling();
  let dispatcher = Dispatcher::new(&store, &prompt);

  let reply = dispatcher.dispatch(Command::Store, &example(&[("username", ""), ("password", "")]));

  assert!(store.calls().is_empty());
  assert!(matches!(
    reply.diagnostics.as_slice(),
    [Error::MissingField("username"), Error::MissingField("password")]
  ));
}

#[test]
fn test_store_write_failure_is_diagnosed() {
  let store = MemoryStore::failing();
  let prompt = ScriptedPrompt::cancelling();
  let dispatcher = Dispatcher::new(&store, &prompt);

  let reply = dispatcher.dispatch(Command::Store, &example(&[("username", "u"), ("password", "p")]));

  assert!(reply.response.is_empty());
  assert_eq!(reply.diagnostics.len(), 1);
  assert_eq!(reply.diagnostics[0].to_string(), "Failed to write credential: Access is denied.");
}

#[test]
fn test_store_overwrites_existing_entry() {
  let store = MemoryStore::new().with_entry(EXAMPLE_KEY, "old", "old-secret");
  let prompt = ScriptedPrompt::cancelling();
  let dispatcher = Dispatcher::new(&store, &prompt);

  dispatcher.dispatch(Command::Store, &example(&[("username", "new"), ("password", "new-secret")]));

  assert_eq!(store.entry(EXAMPLE_KEY), Some(Credential::new("new", "new-secret")));
}

#[test]
fn test_erase_is_idempotent() {
  let store = MemoryStore::new().with_entry(EXAMPLE_KEY, "alice", "s3cr3t");
  let prompt = ScriptedPrompt::cancelling();
  let dispatcher = Dispatcher::new(&store, &prompt);

  for _ in 0..2 {
    let reply = dispatcher.dispatch(Command::Erase, &example(&[("path", "repo.git")]));
    assert!(reply.response.is_empty());
    assert!(reply.diagnostics.is_empty());
  }

  assert!(store.is_empty());
  assert_eq!(
    store.calls(),
    vec![
      StoreCall::Delete(EXAMPLE_KEY.to_string()),
      StoreCall::Delete(EXAMPLE_KEY.to_string()),
    ]
  );
}

#[test]
fn test_erase_failure_is_diagnosed() {
  let store = MemoryStore::failing();
  let prompt = ScriptedPrompt::cancelling();
  let dispatcher = Dispatcher::new(&store, &prompt);

  let reply = dispatcher.dispatch(Command::Erase, &example(&[]));

  assert!(reply.response.is_empty());
  assert!(matches!(reply.diagnostics.as_slice(), [Error::Store { operation: "erase", .. }]));
}

#[test]
fn test_commands_use_case_insensitive_attributes() {
  let store = MemoryStore::new();
  let prompt = ScriptedPrompt::cancelling();
  let dispatcher = Dispatcher::new(&store, &prompt);

  let reply = dispatcher.dispatch(
    Command::Store,
    &attrs(&[("Protocol", "https"), ("HOST", "example.com"), ("UserName", "u"), ("Password", "p")]),
  );

  assert!(reply.diagnostics.is_empty());
  assert_eq!(store.entry(EXAMPLE_KEY), Some(Credential::new("u", "p")));
}

#[test]
fn test_get_prompted_empty_password_is_not_returned() {
  let store = MemoryStore::new();
  let prompt = ScriptedPrompt::entering("bob", "");
  let dispatcher = Dispatcher::new(&store, &prompt);

  let reply = dispatcher.dispatch(Command::Get, &example(&[]));

  assert!(reply.response.is_empty());
  assert!(reply.diagnostics.is_empty());
  assert_eq!(prompt.times_shown(), 1);
}

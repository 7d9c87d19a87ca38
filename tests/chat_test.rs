// tests/chat_test.rs — Integration test: chat host REPL driven from scripted input

use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use scribe::cli::chat::{open_conversation, run_chat, run_chat_host, ChatEnd};
use scribe::core::conversation::Conversation;
use scribe::infra::config::Config;
use scribe::infra::errors::ScribeError;
use scribe::persona::catalog::{ProjectContext, PromptCatalog};
use scribe::persona::Persona;
use scribe::provider::*;
use scribe::session::store::SessionStore;

struct MockProvider {
    reply: String,
    fail: bool,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockProvider {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            fail: false,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: String::new(),
            fail: true,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn id(&self) -> &str {
        "mock"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ScribeError> {
        self.requests.lock().unwrap().push(request);
        if self.fail {
            return Err(ScribeError::provider("connection refused"));
        }
        Ok(ChatResponse {
            content: self.reply.clone(),
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 5,
            },
        })
    }
}

const CATALOG: &str = r#"{
    "conductor": {"system_prompt": "You are the conductor."},
    "gdpr_expert": {"system_prompt": "You are a GDPR specialist."},
    "nis2_expert": {"system_prompt": "You are a NIS 2 specialist."}
}"#;

fn conversation() -> Conversation {
    let catalog = PromptCatalog::from_json(CATALOG).unwrap();
    let context = ProjectContext::new(serde_json::json!({"project": "portal"}));
    Conversation::new(catalog, &context, "llama3:8b")
}

fn script(lines: &str) -> Cursor<Vec<u8>> {
    Cursor::new(lines.as_bytes().to_vec())
}

/// Config whose prompt catalog and context live in `dir`.
fn config_in(dir: &Path) -> Config {
    std::fs::write(dir.join("prompts.json"), CATALOG).unwrap();
    std::fs::write(dir.join("project_context.json"), r#"{"project": "portal"}"#).unwrap();
    let mut config = Config::default();
    config.files.prompts = dir.join("prompts.json");
    config.files.context = dir.join("project_context.json");
    config.files.log_dir = dir.join("logs");
    config
}

#[tokio::test]
async fn test_failed_save_keeps_session_running() {
    let dir = TempDir::new().unwrap();
    // a regular file where the log directory should be
    let blocked = dir.path().join("not_a_dir");
    std::fs::write(&blocked, "").unwrap();
    let store = SessionStore::new(&blocked);
    let provider = MockProvider::new("Noted.");
    let mut c = conversation();

    let end = run_chat(
        provider.clone(),
        &mut c,
        &store,
        &mut script("hello\n/save\n/status\n"),
    )
    .await
    .unwrap();

    assert_eq!(end, ChatEnd::InputClosed);
    assert_eq!(provider.calls(), 1);
    let visible: Vec<&Message> = c.visible_messages().collect();
    assert_eq!(visible.len(), 3);
    assert_eq!(visible[1], &Message::user("hello"));
    assert_eq!(visible[2], &Message::assistant("Noted."));

    // the same conversation can still be saved once the store is usable
    let good = SessionStore::new(dir.path().join("logs"));
    let end = run_chat(provider.clone(), &mut c, &good, &mut script("/save\n"))
        .await
        .unwrap();
    let path = match end {
        ChatEnd::Saved(path) => path,
        other => panic!("expected a saved session, got {:?}", other),
    };
    let log = SessionStore::load(&path).unwrap();
    assert_eq!(log.history[1], Message::user("hello"));
    assert_eq!(log.metadata.model_name, "llama3:8b");
}

#[tokio::test]
async fn test_save_ends_session_and_lists_file() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::new(dir.path());
    let provider = MockProvider::new("Connecting...");
    let mut c = conversation();

    let end = run_chat(
        provider,
        &mut c,
        &store,
        &mut script("gdpr please\n/save\nnever read\n"),
    )
    .await
    .unwrap();

    let path = match end {
        ChatEnd::Saved(path) => path,
        other => panic!("expected a saved session, got {:?}", other),
    };
    let name = path.file_name().unwrap().to_str().unwrap();
    assert_eq!(store.list_resumable_sessions(), vec![name]);
    let log = SessionStore::load(&path).unwrap();
    assert_eq!(log.metadata.persona, Some(Persona::GdprExpert));
    assert!(log.history.iter().all(|m| m.content != "never read"));
}

#[tokio::test]
async fn test_quit_ends_without_saving() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::new(dir.path().join("logs"));
    let provider = MockProvider::new("ok");
    let mut c = conversation();

    let end = run_chat(provider.clone(), &mut c, &store, &mut script("\n/help\nexit\nhello\n"))
        .await
        .unwrap();

    assert_eq!(end, ChatEnd::Quit);
    assert_eq!(provider.calls(), 0);
    assert!(!store.dir().exists());
}

#[tokio::test]
async fn test_failed_turn_keeps_session_running() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::new(dir.path());
    let provider = MockProvider::failing();
    let mut c = conversation();

    let end = run_chat(
        provider.clone(),
        &mut c,
        &store,
        &mut script("nis2 scope?\nstill there?\n/quit\n"),
    )
    .await
    .unwrap();

    assert_eq!(end, ChatEnd::Quit);
    assert_eq!(provider.calls(), 2);
    assert_eq!(c.persona(), Persona::Nis2Expert);
    assert!(c
        .visible_messages()
        .any(|m| m == &Message::user("still there?")));
}

#[tokio::test]
async fn test_chat_host_refuses_model_mismatch() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    let log_path = dir.path().join("session_20260101_000000.json");
    std::fs::write(
        &log_path,
        r#"{"metadata": {"model_name": "llama3:8b"}, "history": []}"#,
    )
    .unwrap();

    let err = run_chat_host(&config, "mistral:7b", Some(&log_path))
        .await
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("--model mistral:7b"));
    assert!(msg.contains("llama3:8b"));
}

#[test]
fn test_open_conversation_resumes_matching_model() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    let log_path = dir.path().join("session_20260101_000000.json");
    std::fs::write(
        &log_path,
        r#"{
            "metadata": {"model_name": "llama3:8b", "persona": "gdpr_expert"},
            "history": [
                {"role": "ASSISTANT", "content": "Greetings!"},
                {"role": "USER", "content": "gdpr"},
                {"role": "ASSISTANT", "content": "Excellent. Connecting you to our GDPR specialist now..."}
            ]
        }"#,
    )
    .unwrap();

    let c = open_conversation(&config, "llama3:8b", Some(&log_path)).unwrap();
    assert_eq!(c.model_name(), "llama3:8b");
    assert_eq!(c.persona(), Persona::GdprExpert);
    assert_eq!(c.visible_messages().count(), 3);

    let fresh = open_conversation(&config, "qwen2", None).unwrap();
    assert_eq!(fresh.model_name(), "qwen2");
    assert_eq!(fresh.persona(), Persona::Conductor);
}

#[test]
fn test_open_conversation_rejects_invalid_log() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    let log_path = dir.path().join("session_20260101_000000.json");
    std::fs::write(&log_path, r#"[{"role": "USER", "content": "hi"}]"#).unwrap();

    let err = open_conversation(&config, "llama3:8b", Some(&log_path)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScribeError>(),
        Some(ScribeError::InvalidSessionLog { .. })
    ));
}

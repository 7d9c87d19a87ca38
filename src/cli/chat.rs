// src/cli/chat.rs — Interactive chat host

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::conversation::Conversation;
use crate::infra::config::Config;
use crate::persona::catalog::{ProjectContext, PromptCatalog};
use crate::provider::ollama::OllamaProvider;
use crate::provider::{Message, ModelProvider, Role};
use crate::session::store::SessionStore;

/// Counters shown by `/status`.
#[derive(Default)]
struct ChatState {
    turns: u32,
    total_tokens: u32,
}

/// One line of user input, classified.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    Save,
    Status,
    Help,
    Quit,
    Unknown(&'a str),
    Message(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    match trimmed {
        "" => Input::Empty,
        "quit" | "exit" | "/quit" | "/exit" => Input::Quit,
        "/save" => Input::Save,
        "/status" => Input::Status,
        "/help" => Input::Help,
        cmd if cmd.starts_with('/') => Input::Unknown(cmd),
        text => Input::Message(text),
    }
}

/// How a REPL run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEnd {
    Saved(PathBuf),
    Quit,
    InputClosed,
}

/// Entry point for `scribe chat`: load prompts and context, start or resume
/// the conversation, then hand over to the REPL on stdin.
pub async fn run_chat_host(config: &Config, model: &str, resume: Option<&Path>) -> anyhow::Result<()> {
    let mut conversation = open_conversation(config, model, resume)?;
    let store = SessionStore::new(&config.files.log_dir);
    let provider: Arc<dyn ModelProvider> = Arc::new(OllamaProvider::new(&config.ollama)?);

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    run_chat(provider, &mut conversation, &store, &mut input).await?;
    Ok(())
}

/// Build the conversation for `--model` / `--resume`. A resumed log must have
/// been recorded with the same model.
pub fn open_conversation(
    config: &Config,
    model: &str,
    resume: Option<&Path>,
) -> anyhow::Result<Conversation> {
    let catalog = PromptCatalog::load(&config.files.prompts)?;
    let context = ProjectContext::load(&config.files.context)?;

    let Some(path) = resume else {
        return Ok(Conversation::new(catalog, &context, model));
    };

    let log = SessionStore::load(path)?;
    if log.metadata.model_name != model {
        anyhow::bail!(
            "--model {} does not match the session's model {}",
            model,
            log.metadata.model_name
        );
    }
    Ok(Conversation::resume(catalog, &context, log))
}

/// Run the REPL over `input` until the user saves, quits, or input ends.
/// Failed turns and failed saves are reported and the session stays open.
pub async fn run_chat(
    provider: Arc<dyn ModelProvider>,
    conversation: &mut Conversation,
    store: &SessionStore,
    input: &mut impl BufRead,
) -> anyhow::Result<ChatEnd> {
    print_header(conversation);
    for message in conversation.visible_messages() {
        print_message(message);
    }

    let mut state = ChatState::default();

    while let Some(line) = read_input(input) {
        match parse_input(&line) {
            Input::Empty => continue,
            Input::Quit => {
                eprintln!("Session ended without saving.");
                return Ok(ChatEnd::Quit);
            }
            Input::Save => {
                let log = conversation.transcript();
                match store.save(&log.history, &log.metadata) {
                    Ok(path) => {
                        println!("Session saved to:\n{}", path.display());
                        return Ok(ChatEnd::Saved(path));
                    }
                    Err(e) => {
                        tracing::error!(dir = %store.dir().display(), "session save failed: {}", e);
                        eprintln!("[error] Could not save session: {}", e);
                        eprintln!("The session is still open. Fix the problem and /save again.");
                    }
                }
            }
            Input::Status => {
                eprintln!("  Model: {}", conversation.model_name());
                eprintln!("  Persona: {}", conversation.persona());
                eprintln!(
                    "  Session: {} turn(s) | {} tokens | {} messages",
                    state.turns,
                    state.total_tokens,
                    conversation.visible_messages().count()
                );
            }
            Input::Help => print_help(),
            Input::Unknown(cmd) => {
                eprintln!("Unknown command: {}. Type /help for commands.", cmd);
            }
            Input::Message(text) => {
                eprintln!("The Scribe is thinking...");
                match conversation.turn(provider.as_ref(), text).await {
                    Ok(outcome) => {
                        if let Some(handoff) = outcome.handoff {
                            print_message(&Message::assistant(handoff.announcement));
                        }
                        print_message(&Message::assistant(outcome.reply));
                        state.turns += 1;
                        state.total_tokens += outcome.usage.total();
                    }
                    Err(e) => {
                        tracing::error!("chat turn failed: {}", e);
                        eprintln!("[error] {}", e);
                    }
                }
            }
        }
    }

    eprintln!("\nInput closed. Session ended without saving.");
    Ok(ChatEnd::InputClosed)
}

fn print_header(conversation: &Conversation) {
    println!("The Scribe");
    println!(
        "Compliance Co-Pilot | Powered by: {} | Persona: {}\n",
        conversation.model_name(),
        conversation.persona()
    );
}

fn print_message(message: &Message) {
    let who = match message.role {
        Role::User => "You",
        Role::Assistant => "Scribe",
        Role::System => return,
    };
    println!("{}: {}\n", who, message.content);
}

fn print_help() {
    eprintln!("Commands:");
    eprintln!("  /save              Save the session and end it");
    eprintln!("  /status            Show model, persona and usage");
    eprintln!("  /help              Show this help");
    eprintln!("  /quit, quit, exit  End without saving");
}

fn read_input(input: &mut impl BufRead) -> Option<String> {
    print!("> ");
    std::io::stdout().flush().ok();

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => Some(line),
        Err(_) => None,
    }
}

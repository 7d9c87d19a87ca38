// src/cli/launcher.rs — Interactive launcher
//
// Asks whether to start fresh or resume, resolves the model (picker for a new
// session, metadata for a resumed one) and runs the chat host as a child
// process with that model on its command line.

use anyhow::{anyhow, bail, Result};
use inquire::Select;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::infra::config::Config;
use crate::infra::errors::ScribeError;
use crate::provider::ollama::OllamaProvider;
use crate::session::store::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StartMode {
    New,
    Resume,
}

impl fmt::Display for StartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartMode::New => write!(f, "Start New Session"),
            StartMode::Resume => write!(f, "Resume Existing Session"),
        }
    }
}

/// Everything the chat host needs on its command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub model: String,
    pub resume: Option<PathBuf>,
}

impl LaunchPlan {
    pub fn new_session(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            resume: None,
        }
    }

    /// Plan for continuing a saved session: the model comes from the log.
    pub fn from_session_log(path: &Path) -> Result<Self, ScribeError> {
        let log = SessionStore::load(path)?;
        Ok(Self {
            model: log.metadata.model_name,
            resume: Some(path.to_path_buf()),
        })
    }

    /// Arguments for `scribe chat`. `verbose` repeats the launcher's `-v`s.
    pub fn host_args(&self, config_path: Option<&Path>, verbose: u8) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["chat".into(), "--model".into(), (&self.model).into()];
        if let Some(resume) = &self.resume {
            args.push("--resume".into());
            args.push(resume.into());
        }
        if let Some(config) = config_path {
            args.push("--config".into());
            args.push(config.into());
        }
        if verbose > 0 {
            args.push(format!("-{}", "v".repeat(verbose as usize)).into());
        }
        args
    }
}

/// Entry point for `scribe` / `scribe launch`.
pub async fn run_launcher(config: &Config, config_path: Option<&Path>, verbose: u8) -> Result<()> {
    println!("--- The Scribe: Compliance Co-Pilot ---");

    let mode = match Select::new(
        "What would you like to do?",
        vec![StartMode::New, StartMode::Resume],
    )
    .prompt()
    {
        Ok(m) => m,
        Err(_) => {
            println!("Nothing selected. Exiting.");
            return Ok(());
        }
    };

    let plan = match mode {
        StartMode::New => select_new_session(config).await?,
        StartMode::Resume => select_saved_session(config)?,
    };

    let Some(plan) = plan else {
        return Ok(());
    };

    println!("\nLaunching The Scribe with model: {}", plan.model);
    launch_chat_host(&plan, config_path, verbose).await
}

/// `Ok(None)` when the user backs out of the picker.
async fn select_new_session(config: &Config) -> Result<Option<LaunchPlan>> {
    let provider = OllamaProvider::new(&config.ollama)?;
    let models = provider.list_models(&config.ollama.exclude_prefix).await;
    if models.is_empty() {
        return Err(ScribeError::NoModels.into());
    }

    match Select::new("Please select the LLM to use for the session:", models)
        .with_help_message("Use arrow keys to browse, type to filter")
        .prompt()
    {
        Ok(model) => Ok(Some(LaunchPlan::new_session(model))),
        Err(_) => {
            println!("No model selected. Exiting.");
            Ok(None)
        }
    }
}

fn select_saved_session(config: &Config) -> Result<Option<LaunchPlan>> {
    let store = SessionStore::new(&config.files.log_dir);
    let sessions = store.list_resumable_sessions();
    if sessions.is_empty() {
        bail!(
            "No resumable sessions found in {}. Start a new session instead.",
            store.dir().display()
        );
    }

    let name = match Select::new("Select a session to resume:", sessions).prompt() {
        Ok(name) => name,
        Err(_) => {
            println!("No session selected. Exiting.");
            return Ok(None);
        }
    };

    let plan = LaunchPlan::from_session_log(&store.resolve(&name))?;
    Ok(Some(plan))
}

async fn launch_chat_host(plan: &LaunchPlan, config_path: Option<&Path>, verbose: u8) -> Result<()> {
    let exe = std::env::current_exe()
        .map_err(|e| anyhow!("Cannot locate the scribe executable: {}", e))?;

    tracing::debug!(exe = %exe.display(), model = %plan.model, "starting chat host");

    let status = tokio::process::Command::new(&exe)
        .args(plan.host_args(config_path, verbose))
        .status()
        .await
        .map_err(|e| anyhow!("Failed to start the chat host ({}): {}", exe.display(), e))?;

    if !status.success() {
        let code = status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "terminated by signal".into());
        bail!("The chat host exited unexpectedly. Code: {}", code);
    }
    Ok(())
}

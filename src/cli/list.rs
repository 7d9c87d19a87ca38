// src/cli/list.rs — Non-interactive listings

use crate::infra::config::Config;
use crate::provider::ollama::OllamaProvider;
use crate::session::store::SessionStore;

/// `scribe models`
pub async fn run_models(config: &Config) -> anyhow::Result<()> {
    let provider = OllamaProvider::new(&config.ollama)?;
    let models = provider.list_models(&config.ollama.exclude_prefix).await;
    if models.is_empty() {
        eprintln!("No compatible models found at {}.", provider.base_url());
        return Ok(());
    }
    for m in models {
        println!("{}", m);
    }
    Ok(())
}

/// `scribe sessions`
pub fn run_sessions(config: &Config) -> anyhow::Result<()> {
    let store = SessionStore::new(&config.files.log_dir);
    let sessions = store.list_resumable_sessions();
    if sessions.is_empty() {
        eprintln!("No resumable sessions in {}.", store.dir().display());
        return Ok(());
    }
    for name in sessions {
        println!("{}", store.resolve(&name).display());
    }
    Ok(())
}

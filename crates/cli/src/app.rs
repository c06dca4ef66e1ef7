use crate::prompt::TerminalPrompt;
use anyhow::{Context, Result};
use providers::http::{HttpAnnotationServer, HttpConfig};
use providers::AnnotationServer;
use std::sync::Arc;
use storage::Preferences;
use tagger_core::config::AppConfig;
use tagger_core::session::{Prompt, TaggerSession};
use tagger_core::state::TaggerState;
use tagger_core::theme::ThemePreference;

pub fn http_server(cfg: &AppConfig) -> Result<Arc<dyn AnnotationServer>> {
    let server = HttpAnnotationServer::new(HttpConfig {
        base_url: cfg.server.base_url.clone(),
    })
    .with_context(|| format!("bad server url {}", cfg.server.base_url))?;
    Ok(Arc::new(server))
}

pub fn session(
    cfg: &AppConfig,
    server: Arc<dyn AnnotationServer>,
    prompt: Arc<dyn Prompt>,
) -> TaggerSession {
    TaggerSession::new(
        TaggerState::new(cfg.tags.top_n),
        server,
        prompt,
        cfg.editor.debounce(),
    )
}

/// Session against the configured HTTP server, with terminal dialogs.
pub fn terminal_session(cfg: &AppConfig, assume_yes: bool) -> Result<TaggerSession> {
    let server = http_server(cfg)?;
    Ok(session(cfg, server, Arc::new(TerminalPrompt::new(assume_yes))))
}

pub async fn theme(cfg: &AppConfig) -> Result<ThemePreference<Preferences>> {
    let prefs = storage::open_preferences(&cfg.storage.path)
        .await
        .with_context(|| format!("open preferences at {}", cfg.storage.path))?;
    ThemePreference::init(prefs).await
}

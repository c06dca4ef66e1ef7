use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub editor: EditorConfig,
    pub tags: TagConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Quiet period for live annotation edits.
    pub debounce_ms: u64,
}

impl EditorConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagConfig {
    pub top_n: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                base_url: "http://127.0.0.1:5000".to_string(),
            },
            editor: EditorConfig { debounce_ms: 500 },
            tags: TagConfig { top_n: 10 },
            storage: StorageConfig {
                path: ".tagger/preferences.db".to_string(),
            },
        }
    }
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();
    let mut settings = config::Config::builder()
        .set_default("server.base_url", defaults.server.base_url)?
        .set_default("editor.debounce_ms", defaults.editor.debounce_ms as i64)?
        .set_default("tags.top_n", defaults.tags.top_n as i64)?
        .set_default("storage.path", defaults.storage.path)?;
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(
        config::Environment::with_prefix("TAGGER")
            .prefix_separator("__")
            .separator("__"),
    );
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}

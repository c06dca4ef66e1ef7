//! Light/dark UI preference, persisted between sessions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use storage::Preferences;
use tracing::{info, warn};

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Icon of the toggle button: it shows the theme you would switch to.
    pub fn marker(self) -> &'static str {
        match self {
            Theme::Light => "🌙",
            Theme::Dark => "☀️",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

#[async_trait::async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

#[async_trait::async_trait]
impl PreferenceStore for Preferences {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Preferences::get(self, key).await
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        Preferences::set(self, key, value).await
    }
}

pub struct ThemePreference<S> {
    store: S,
    current: Theme,
}

impl<S: PreferenceStore> ThemePreference<S> {
    /// Reads the stored theme; missing or unreadable values fall back to light.
    pub async fn init(store: S) -> anyhow::Result<Self> {
        let current = match store.get(THEME_KEY).await? {
            Some(raw) => raw.parse::<Theme>().unwrap_or_else(|e| {
                warn!("ignoring stored theme: {e}");
                Theme::default()
            }),
            None => Theme::default(),
        };
        Ok(Self { store, current })
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn marker(&self) -> &'static str {
        self.current.marker()
    }

    pub async fn toggle(&mut self) -> anyhow::Result<Theme> {
        let next = self.current.toggled();
        self.store.set(THEME_KEY, next.as_str()).await?;
        self.current = next;
        info!(theme = %next, "theme switched");
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapStore(Mutex<HashMap<String, String>>);

    #[async_trait::async_trait]
    impl PreferenceStore for MapStore {
        async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
            self.0
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn defaults_to_light_and_persists_toggle() {
        let mut pref = ThemePreference::init(MapStore::default()).await.unwrap();
        assert_eq!(pref.current(), Theme::Light);
        assert_eq!(pref.marker(), "🌙");
        assert_eq!(pref.toggle().await.unwrap(), Theme::Dark);
        assert_eq!(pref.marker(), "☀️");
        assert_eq!(
            pref.store.get(THEME_KEY).await.unwrap().as_deref(),
            Some("dark")
        );
    }

    #[tokio::test]
    async fn unknown_stored_value_falls_back_to_light() {
        let store = MapStore::default();
        store.set(THEME_KEY, "sepia").await.unwrap();
        let pref = ThemePreference::init(store).await.unwrap();
        assert_eq!(pref.current(), Theme::Light);
    }
}

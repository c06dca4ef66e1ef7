//! Storage layer: SQLite pool setup and the client preference table.
//!
//! Holds DB pool setup, the migration runner and the key/value store that
//! survives between sessions.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

pub mod preferences;

pub use preferences::Preferences;

/// Opens (creating if needed) the database at `location`, which is either a
/// `sqlite:` URL or a plain file path whose parent directory is created too.
pub async fn connect(location: &str) -> anyhow::Result<SqlitePool> {
    let options = if location.starts_with("sqlite:") {
        SqliteConnectOptions::from_str(location)?
    } else {
        let path = Path::new(location);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        SqliteConnectOptions::new().filename(path)
    };
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options.create_if_missing(true))
        .await?;
    debug!(location, "preferences database opened");
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    // Migrations live in crates/storage/migrations; rerunning is a no-op.
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Connects, migrates and wraps the pool in a [`Preferences`] store.
pub async fn open_preferences(database_url: &str) -> anyhow::Result<Preferences> {
    let pool = connect(database_url).await?;
    migrate(&pool).await?;
    Ok(Preferences::new(pool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn plain_path_creates_missing_directories() {
        let temp = tempfile::tempdir().unwrap();
        let db = temp.path().join(".tagger").join("preferences.db");
        let prefs = open_preferences(&db.to_string_lossy()).await.unwrap();
        prefs.set("theme", "dark").await.unwrap();
        assert!(db.exists());
    }

    #[tokio::test]
    async fn sqlite_urls_are_used_as_given() {
        let prefs = open_preferences("sqlite::memory:").await.unwrap();
        prefs.set("theme", "dark").await.unwrap();
        assert_eq!(prefs.get("theme").await.unwrap().as_deref(), Some("dark"));
    }
}

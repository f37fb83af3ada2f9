//! Persisted player settings (mode, volume, repeat flag).

use crate::error::Result;
use crate::navigator::PlaybackMode;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::OptionalExtension;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tokio_rusqlite::Connection;
use tracing::{debug, info, warn};

pub const MODE_KEY: &str = "mode";
pub const VOLUME_KEY: &str = "volume";
pub const LOOP_KEY: &str = "loop";

const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
";

/// Key/value store whose values survive process restarts.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// SQLite-backed settings store
pub struct SqliteSettingsStore {
    conn: Connection,
}

impl SqliteSettingsStore {
    /// Open the store at the default location
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or opened.
    pub async fn new() -> Result<Self> {
        Self::open(&crate::paths::settings_db_path()).await
    }

    /// Open a store at a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub async fn open(path: &Path) -> Result<Self> {
        info!("Opening settings database at {:?}", path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path).await?;
        Self::init(conn).await
    }

    /// Open a store that lives only as long as this value.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be initialized.
    pub async fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA_SQL)?;
            Ok(())
        })
        .await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.conn
            .call(move |conn| {
                let value = conn
                    .prepare_cached("SELECT value FROM settings WHERE key = ?1")?
                    .query_row([&key], |row| row.get::<_, String>(0))
                    .optional()?;
                Ok(value)
            })
            .await
            .map_err(Into::into)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        debug!("Storing setting {} = {}", key, value);
        let key = key.to_string();
        let value = value.to_string();
        let now = Utc::now().timestamp();
        self.conn
            .call(move |conn| {
                conn.execute(
                    r"
                    INSERT INTO settings (key, value, updated_at)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(key) DO UPDATE SET
                        value = excluded.value,
                        updated_at = excluded.updated_at
                    ",
                    rusqlite::params![key, value, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Into::into)
    }
}

/// Volatile settings store for tests and embedders without persistence.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .values
            .lock()
            .ok()
            .and_then(|values| values.get(key).cloned()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

/// Typed view of the persisted player settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSettings {
    pub mode: PlaybackMode,
    pub volume: f64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            mode: PlaybackMode::Cycle,
            volume: 1.0,
        }
    }
}

impl PlayerSettings {
    /// Read settings, falling back to defaults for missing or invalid values.
    ///
    /// A stored volume is only accepted strictly inside `(0, 1)`; anything
    /// else (including a full `1`) yields the default of `1.0`.
    pub async fn load(store: &dyn SettingsStore) -> Self {
        let mut settings = Self::default();

        match store.get(MODE_KEY).await {
            Ok(Some(raw)) => match raw.parse() {
                Ok(mode) => settings.mode = mode,
                Err(e) => warn!("Ignoring stored mode: {}", e),
            },
            Ok(None) => {}
            Err(e) => warn!("Failed to read stored mode: {}", e),
        }

        match store.get(VOLUME_KEY).await {
            Ok(Some(raw)) => match raw.parse::<f64>() {
                Ok(volume) if volume > 0.0 && volume < 1.0 => settings.volume = volume,
                Ok(volume) => debug!("Stored volume {} out of range, using 1.0", volume),
                Err(e) => warn!("Ignoring stored volume {:?}: {}", raw, e),
            },
            Ok(None) => {}
            Err(e) => warn!("Failed to read stored volume: {}", e),
        }

        settings
    }

    /// Persist the mode along with the derived repeat flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub async fn save_mode(store: &dyn SettingsStore, mode: PlaybackMode) -> Result<()> {
        store.set(MODE_KEY, mode.as_str()).await?;
        store
            .set(LOOP_KEY, if mode.loops_track() { "true" } else { "false" })
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub async fn save_volume(store: &dyn SettingsStore, volume: f64) -> Result<()> {
        store.set(VOLUME_KEY, &volume.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_store_round_trip_and_overwrite() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();
        assert_eq!(store.get(MODE_KEY).await.unwrap(), None);

        store.set(MODE_KEY, "random").await.unwrap();
        store.set(MODE_KEY, "single").await.unwrap();
        assert_eq!(store.get(MODE_KEY).await.unwrap().as_deref(), Some("single"));
    }

    #[tokio::test]
    async fn test_sqlite_store_survives_reopen() {
        let path = std::env::temp_dir().join(format!(
            "cadenza-settings-{}-{}.db",
            std::process::id(),
            rand::random::<u32>()
        ));

        {
            let store = SqliteSettingsStore::open(&path).await.unwrap();
            PlayerSettings::save_volume(&store, 0.5).await.unwrap();
        }

        let reopened = SqliteSettingsStore::open(&path).await.unwrap();
        let settings = PlayerSettings::load(&reopened).await;
        assert!((settings.volume - 0.5).abs() < f64::EPSILON);

        drop(reopened);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_load_defaults_when_empty() {
        let store = MemorySettingsStore::default();
        assert_eq!(PlayerSettings::load(&store).await, PlayerSettings::default());
    }

    #[tokio::test]
    async fn test_load_rejects_out_of_range_volume() {
        let store = MemorySettingsStore::default();
        for raw in ["0", "1", "1.5", "-0.2", "loud"] {
            store.set(VOLUME_KEY, raw).await.unwrap();
            let settings = PlayerSettings::load(&store).await;
            assert!((settings.volume - 1.0).abs() < f64::EPSILON, "raw {raw}");
        }
    }

    #[tokio::test]
    async fn test_save_mode_writes_loop_flag() {
        let store = MemorySettingsStore::default();
        PlayerSettings::save_mode(&store, PlaybackMode::SingleRepeat).await.unwrap();
        assert_eq!(store.get(LOOP_KEY).await.unwrap().as_deref(), Some("true"));
        assert_eq!(PlayerSettings::load(&store).await.mode, PlaybackMode::SingleRepeat);

        PlayerSettings::save_mode(&store, PlaybackMode::Random).await.unwrap();
        assert_eq!(store.get(LOOP_KEY).await.unwrap().as_deref(), Some("false"));
    }
}

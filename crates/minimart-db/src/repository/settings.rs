//! # Settings Repository
//!
//! Key/value store for the store profile (name, address, GSTIN, receipt
//! footer). Receipt rendering falls back to built-in defaults for any key
//! that is missing, so a fresh database prints sensible receipts.

use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::debug;

use crate::error::DbResult;

/// Repository for store settings.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Gets a single setting value.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value)
    }

    /// Gets all settings as a map.
    pub async fn get_all(&self) -> DbResult<HashMap<String, String>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM settings")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().collect())
    }

    /// Inserts or replaces a setting.
    pub async fn upsert(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key = %key, "Upserting setting");

        let now = Utc::now();
        sqlx::query(
            "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT (key) DO UPDATE SET value = ?2, updated_at = ?3",
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

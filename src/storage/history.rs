use super::Database;
use crate::verdict::Verdict;
use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_MAX_RECORDS_PER_USER: usize = 50;

/// A verdict decorated with request metadata, as returned to and stored for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: String,
    #[serde(flatten)]
    pub verdict: Verdict,
    pub analysis_timestamp: String,
    #[serde(default)]
    pub email_subject: String,
    #[serde(default)]
    pub email_sender: String,
    #[serde(default)]
    pub user_id: String,
}

impl AnalysisRecord {
    pub fn new(
        verdict: Verdict,
        subject: &str,
        sender: &str,
        user_id: &str,
        at: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Self {
            id: format!("analysis_{}_{}", at.timestamp(), user_id),
            verdict,
            analysis_timestamp: at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            email_subject: subject.to_string(),
            email_sender: sender.to_string(),
            user_id: user_id.to_string(),
        }
    }
}

pub struct HistoryStore {
    db: Arc<Database>,
    max_records_per_user: usize,
}

impl HistoryStore {
    pub fn new(db: Arc<Database>, max_records_per_user: usize) -> Self {
        Self {
            db,
            max_records_per_user,
        }
    }

    /// Inserts or replaces the owner's record with this id, then prunes the owner's
    /// oldest records beyond the cap. Ids are scoped per user.
    pub fn save(&self, record: &AnalysisRecord) -> Result<()> {
        let payload = serde_json::to_string(record).context("Failed to serialize analysis")?;
        let conn = self.db.lock()?;

        conn.execute(
            "INSERT OR REPLACE INTO analyses (id, user_id, analysis_timestamp, payload)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.id,
                record.user_id,
                record.analysis_timestamp,
                payload
            ],
        )
        .with_context(|| format!("Failed to save analysis {}", record.id))?;

        let pruned = conn.execute(
            "DELETE FROM analyses WHERE user_id = ?1 AND id NOT IN (
                SELECT id FROM analyses WHERE user_id = ?1
                ORDER BY analysis_timestamp DESC LIMIT ?2
            )",
            params![record.user_id, self.max_records_per_user as i64],
        )?;
        if pruned > 0 {
            log::debug!("Pruned {} old analyses for {}", pruned, record.user_id);
        }

        Ok(())
    }

    /// Newest first.
    pub fn list(&self, user_id: &str) -> Result<Vec<AnalysisRecord>> {
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare(
            "SELECT payload FROM analyses WHERE user_id = ?1
             ORDER BY analysis_timestamp DESC, id DESC",
        )?;

        let payloads = stmt
            .query_map(params![user_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        payloads
            .iter()
            .map(|p| serde_json::from_str(p).context("Corrupted analysis record"))
            .collect()
    }

    pub fn get(&self, user_id: &str, id: &str) -> Result<Option<AnalysisRecord>> {
        let conn = self.db.lock()?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM analyses WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                |row| row.get(0),
            )
            .optional()?;

        payload
            .map(|p| serde_json::from_str(&p).context("Corrupted analysis record"))
            .transpose()
    }

    /// Returns false when the user owns no record with this id.
    pub fn delete(&self, user_id: &str, id: &str) -> Result<bool> {
        let conn = self.db.lock()?;
        let deleted = conn.execute(
            "DELETE FROM analyses WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(deleted > 0)
    }
}

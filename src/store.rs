// src/store.rs

use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::models::exam_info::{ExamInfo, ExamInfoPatch};
use crate::models::exam_record::{AttemptResult, ExamRecord};
use crate::models::student::StudentIdentity;

/// Fixed key holding the JSON array of all exam records.
const RECORDS_KEY: &str = "exam_results";
/// Fixed key holding the cached exam info payload.
const EXAM_INFO_KEY: &str = "exam_info_config";

/// The local durable store: two keyed JSON-text blobs in SQLite, always read
/// and rewritten whole. This is the authoritative sink; the sheet webhook is
/// best-effort replication on top of it.
#[derive(Clone)]
pub struct LocalStore {
    pool: SqlitePool,
    /// Serializes record read-modify-write cycles so two submissions landing
    /// together cannot drop each other's merge.
    write_lock: Arc<Mutex<()>>,
}

impl LocalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    async fn read_blob(&self, key: &str) -> Result<Option<String>, AppError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn write_blob(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Loads all stored records. An unparsable blob is treated as empty: the
    /// exam must keep working even if the cache was corrupted.
    pub async fn load_records(&self) -> Result<Vec<ExamRecord>, AppError> {
        let Some(blob) = self.read_blob(RECORDS_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&blob) {
            Ok(records) => Ok(records),
            Err(e) => {
                tracing::warn!("stored exam records are unparsable, starting empty: {}", e);
                Ok(Vec::new())
            }
        }
    }

    async fn save_records(&self, records: &[ExamRecord]) -> Result<(), AppError> {
        let blob = serde_json::to_string(records)?;
        self.write_blob(RECORDS_KEY, &blob).await
    }

    /// Reconciles one submitted attempt against any prior record for the same
    /// identity and persists the result, replacing the old record. The whole
    /// read-merge-write cycle holds the write lock, making it atomic with
    /// respect to other submissions.
    pub async fn upsert_record(
        &self,
        student: &StudentIdentity,
        attempt: &AttemptResult,
        timestamp: i64,
    ) -> Result<ExamRecord, AppError> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.load_records().await?;
        let record_id = student.record_id();
        let merged = match records.iter().position(|r| r.id == record_id) {
            Some(index) => {
                let merged = records[index].merged_with(student, attempt, timestamp);
                records[index] = merged.clone();
                merged
            }
            None => {
                let record = ExamRecord::from_attempt(student, attempt, timestamp);
                records.push(record.clone());
                record
            }
        };
        self.save_records(&records).await?;
        Ok(merged)
    }

    /// Loads the cached exam info payload, if any. Unparsable cache behaves
    /// like no cache at all.
    pub async fn load_exam_info(&self) -> Result<Option<ExamInfoPatch>, AppError> {
        let Some(blob) = self.read_blob(EXAM_INFO_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&blob) {
            Ok(patch) => Ok(Some(patch)),
            Err(e) => {
                tracing::warn!("cached exam info is unparsable, using defaults: {}", e);
                Ok(None)
            }
        }
    }

    pub async fn save_exam_info(&self, info: &ExamInfo) -> Result<(), AppError> {
        let blob = serde_json::to_string(info)?;
        self.write_blob(EXAM_INFO_KEY, &blob).await
    }

    /// Caches a remote settings payload verbatim (the fetched text, not the
    /// merged result).
    pub async fn save_exam_info_raw(&self, payload: &str) -> Result<(), AppError> {
        self.write_blob(EXAM_INFO_KEY, payload).await
    }
}

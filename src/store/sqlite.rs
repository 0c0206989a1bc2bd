use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Row, params};

use super::records::{DataQualityRecord, ModelMetricsRecord, NewDataQuality, NewModelMetrics};
use super::{MetricsStore, StoreError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS model_metrics (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    model_name TEXT    NOT NULL,
    accuracy   REAL    NOT NULL,
    precision  REAL    NOT NULL,
    recall     REAL    NOT NULL,
    f1_score   REAL    NOT NULL,
    timestamp  TEXT    NOT NULL
);
CREATE INDEX IF NOT EXISTS model_metrics_timestamp ON model_metrics (timestamp);

CREATE TABLE IF NOT EXISTS data_quality (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    dataset_name TEXT    NOT NULL,
    completeness REAL    NOT NULL,
    accuracy     REAL    NOT NULL,
    consistency  REAL    NOT NULL,
    timestamp    TEXT    NOT NULL
);
CREATE INDEX IF NOT EXISTS data_quality_timestamp ON data_quality (timestamp);
";

/// [`MetricsStore`] backed by a single SQLite connection.
///
/// Timestamps are written as fixed-width RFC 3339 UTC text, so ordering by
/// the column is chronological.
pub struct SqliteMetricsStore {
    connection: Mutex<Connection>,
}

impl SqliteMetricsStore {
    /// Open (creating if needed) the database file at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        log::info!("Opening metrics store at {}", path.display());
        Self::with_connection(Connection::open(path)?)
    }

    /// A private, non-persistent store.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(connection: Connection) -> Result<Self, StoreError> {
        connection.execute_batch(SCHEMA)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Flush and release the connection.
    pub fn close(self) -> Result<(), StoreError> {
        let connection = self.connection.into_inner().map_err(|_| StoreError::Poisoned)?;
        connection.close().map_err(|(_, err)| StoreError::Db(err))?;
        log::debug!("Metrics store closed");
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.connection.lock().map_err(|_| StoreError::Poisoned)
    }
}

/// Timestamps are kept to the microsecond, matching what reads return.
fn stored_precision(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(6)
}

fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

impl MetricsStore for SqliteMetricsStore {
    fn insert_model_metrics(&self, new: NewModelMetrics) -> Result<ModelMetricsRecord, StoreError> {
        let timestamp = stored_precision(new.timestamp.unwrap_or_else(Utc::now));
        let connection = self.lock()?;
        connection.execute(
            "INSERT INTO model_metrics (model_name, accuracy, precision, recall, f1_score, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                new.model_name,
                new.accuracy,
                new.precision,
                new.recall,
                new.f1_score,
                encode_timestamp(&timestamp),
            ],
        )?;
        let id = connection.last_insert_rowid();
        log::debug!("Stored model metrics #{id} for {}", new.model_name);

        Ok(ModelMetricsRecord {
            id,
            model_name: new.model_name,
            accuracy: new.accuracy,
            precision: new.precision,
            recall: new.recall,
            f1_score: new.f1_score,
            timestamp,
        })
    }

    fn insert_data_quality(&self, new: NewDataQuality) -> Result<DataQualityRecord, StoreError> {
        let timestamp = stored_precision(new.timestamp.unwrap_or_else(Utc::now));
        let connection = self.lock()?;
        connection.execute(
            "INSERT INTO data_quality (dataset_name, completeness, accuracy, consistency, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                new.dataset_name,
                new.completeness,
                new.accuracy,
                new.consistency,
                encode_timestamp(&timestamp),
            ],
        )?;
        let id = connection.last_insert_rowid();
        log::debug!("Stored data quality #{id} for {}", new.dataset_name);

        Ok(DataQualityRecord {
            id,
            dataset_name: new.dataset_name,
            completeness: new.completeness,
            accuracy: new.accuracy,
            consistency: new.consistency,
            timestamp,
        })
    }

    fn recent_model_metrics(&self, limit: usize) -> Result<Vec<ModelMetricsRecord>, StoreError> {
        let connection = self.lock()?;
        let mut stmt = connection.prepare(
            "SELECT id, model_name, accuracy, precision, recall, f1_score, timestamp
             FROM model_metrics
             ORDER BY timestamp DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map([sql_limit(limit)], |row| {
            Ok(ModelMetricsRecord {
                id: row.get(0)?,
                model_name: row.get(1)?,
                accuracy: row.get(2)?,
                precision: row.get(3)?,
                recall: row.get(4)?,
                f1_score: row.get(5)?,
                timestamp: decode_timestamp(row, 6)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn recent_data_quality(&self, limit: usize) -> Result<Vec<DataQualityRecord>, StoreError> {
        let connection = self.lock()?;
        let mut stmt = connection.prepare(
            "SELECT id, dataset_name, completeness, accuracy, consistency, timestamp
             FROM data_quality
             ORDER BY timestamp DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map([sql_limit(limit)], |row| {
            Ok(DataQualityRecord {
                id: row.get(0)?,
                dataset_name: row.get(1)?,
                completeness: row.get(2)?,
                accuracy: row.get(3)?,
                consistency: row.get(4)?,
                timestamp: decode_timestamp(row, 5)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;

    fn model(name: &str, timestamp: Option<DateTime<Utc>>) -> NewModelMetrics {
        NewModelMetrics {
            model_name: name.to_string(),
            accuracy: 0.9,
            precision: 0.8,
            recall: 0.7,
            f1_score: 0.75,
            timestamp,
        }
    }

    fn quality(name: &str, timestamp: Option<DateTime<Utc>>) -> NewDataQuality {
        NewDataQuality {
            dataset_name: name.to_string(),
            completeness: 0.99,
            accuracy: 0.95,
            consistency: 0.9,
            timestamp,
        }
    }

    fn at(day: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap())
    }

    #[test]
    fn insert_assigns_increasing_ids_and_timestamp() {
        let store = SqliteMetricsStore::open_in_memory().unwrap();
        let before = Utc::now();
        let first = store.insert_model_metrics(model("a", None)).unwrap();
        let second = store.insert_model_metrics(model("b", None)).unwrap();

        assert!(second.id > first.id);
        assert!(first.timestamp >= before.trunc_subsecs(6));
    }

    #[test]
    fn recent_is_newest_first_by_timestamp_not_insert_order() {
        let store = SqliteMetricsStore::open_in_memory().unwrap();
        store.insert_data_quality(quality("mid", at(10))).unwrap();
        store.insert_data_quality(quality("old", at(1))).unwrap();
        store.insert_data_quality(quality("new", at(20))).unwrap();

        let names: Vec<String> = store
            .recent_data_quality(10)
            .unwrap()
            .into_iter()
            .map(|r| r.dataset_name)
            .collect();
        assert_eq!(names, ["new", "mid", "old"]);
    }

    #[test]
    fn recent_respects_limit() {
        let store = SqliteMetricsStore::open_in_memory().unwrap();
        for day in 1..=12 {
            store.insert_model_metrics(model(&format!("m{day}"), at(day))).unwrap();
        }
        let recent = store.recent_model_metrics(10).unwrap();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].model_name, "m12");
        assert_eq!(recent[9].model_name, "m3");

        assert_eq!(store.recent_model_metrics(0).unwrap().len(), 0);
    }

    #[test]
    fn timestamp_ties_favour_latest_insert() {
        let store = SqliteMetricsStore::open_in_memory().unwrap();
        store.insert_model_metrics(model("first", at(3))).unwrap();
        store.insert_model_metrics(model("second", at(3))).unwrap();
        assert_eq!(store.recent_model_metrics(1).unwrap()[0].model_name, "second");
    }

    #[test]
    fn inserted_record_reads_back_unchanged() {
        let store = SqliteMetricsStore::open_in_memory().unwrap();
        store.insert_model_metrics(model("older", at(1))).unwrap();
        let stored = store.insert_model_metrics(model("fresh", None)).unwrap();
        assert_eq!(store.recent_model_metrics(10).unwrap()[0], stored);
    }

    #[test]
    fn empty_store_returns_nothing() {
        let store = SqliteMetricsStore::open_in_memory().unwrap();
        assert!(store.recent_model_metrics(10).unwrap().is_empty());
        assert!(store.recent_data_quality(10).unwrap().is_empty());
    }

    #[test]
    fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.db");

        let store = SqliteMetricsStore::open(&path).unwrap();
        let stored = store.insert_data_quality(quality("persisted", at(7))).unwrap();
        store.close().unwrap();

        let store = SqliteMetricsStore::open(&path).unwrap();
        let recent = store.recent_data_quality(10).unwrap();
        assert_eq!(recent, vec![stored]);
    }

    #[test]
    fn concurrent_inserts_get_unique_ids() {
        let store = Arc::new(SqliteMetricsStore::open_in_memory().unwrap());

        std::thread::scope(|scope| {
            for t in 0..4 {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    for i in 0..25 {
                        store.insert_model_metrics(model(&format!("t{t}-{i}"), None)).unwrap();
                    }
                });
            }
        });

        let ids: BTreeSet<i64> = store
            .recent_model_metrics(1000)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids.len(), 100);
    }
}

//! Append-only metrics store.
//!
//! Two record kinds are persisted: model evaluation metrics and dataset
//! quality metrics. Records are only ever inserted; there is no update or
//! delete path.

pub mod records;
pub mod sqlite;

use thiserror::Error;

pub use records::{
    DataQualityInput, DataQualityRecord, ModelMetricsInput, ModelMetricsRecord, NewDataQuality,
    NewModelMetrics, ValidationError,
};
pub use sqlite::SqliteMetricsStore;

/// How many records the recent-history queries return by default.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("metrics store db error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("metrics store connection mutex poisoned")]
    Poisoned,
}

/// Persistence seam for the query service.
///
/// Implementations must make each insert indivisible: the id a record
/// receives and the row being appended cannot be observed separately.
pub trait MetricsStore: Send + Sync {
    /// Append a model metrics record. The store assigns the id, and the
    /// timestamp when the input carries none.
    fn insert_model_metrics(&self, new: NewModelMetrics) -> Result<ModelMetricsRecord, StoreError>;

    /// Append a data quality record.
    fn insert_data_quality(&self, new: NewDataQuality) -> Result<DataQualityRecord, StoreError>;

    /// Up to `limit` model metrics records, newest first.
    fn recent_model_metrics(&self, limit: usize) -> Result<Vec<ModelMetricsRecord>, StoreError>;

    /// Up to `limit` data quality records, newest first.
    fn recent_data_quality(&self, limit: usize) -> Result<Vec<DataQualityRecord>, StoreError>;
}

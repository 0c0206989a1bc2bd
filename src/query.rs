//! Named dashboard queries.
//!
//! Each query re-reads the dataset file, narrows it with the request's
//! filters, runs one metric derivation and returns a serialisable view. The
//! two write queries validate their input and append to the metrics store.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::filter::DatasetFilter;
use crate::data::loader::load_file;
use crate::data::model::ProductDataset;
use crate::metrics::aggregate::{FilterCatalog, LaptopData, PricePerformance};
use crate::metrics::comparison::ModelComparison;
use crate::metrics::display_timestamp;
use crate::metrics::quality::{ModelMetricsEntry, top_models};
use crate::store::{
    DataQualityInput, DataQualityRecord, MetricsStore, ModelMetricsInput, ModelMetricsRecord,
    StoreError, ValidationError,
};

#[derive(Debug, Error)]
pub enum QueryError {
    /// The caller sent an incomplete or unreadable write request.
    #[error("invalid request: {0}")]
    Invalid(#[from] ValidationError),
    #[error("dataset unavailable: {0:#}")]
    Dataset(anyhow::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl QueryError {
    /// Whether the failure is the caller's fault (as opposed to the server's).
    pub fn is_client_error(&self) -> bool {
        matches!(self, QueryError::Invalid(_))
    }
}

/// Reply to a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub status: String,
}

impl Acknowledgement {
    pub fn success() -> Self {
        Acknowledgement {
            status: "success".to_string(),
        }
    }
}

/// One row of the data quality history, as served to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityEntry {
    pub dataset_name: String,
    pub completeness: f64,
    pub accuracy: f64,
    pub consistency: f64,
    pub timestamp: String,
}

impl From<DataQualityRecord> for DataQualityEntry {
    fn from(record: DataQualityRecord) -> Self {
        DataQualityEntry {
            timestamp: display_timestamp(&record.timestamp),
            dataset_name: record.dataset_name,
            completeness: record.completeness,
            accuracy: record.accuracy,
            consistency: record.consistency,
        }
    }
}

impl From<ModelMetricsRecord> for ModelMetricsEntry {
    fn from(record: ModelMetricsRecord) -> Self {
        ModelMetricsEntry {
            timestamp: display_timestamp(&record.timestamp),
            model_name: record.model_name,
            accuracy: record.accuracy,
            precision: record.precision,
            recall: record.recall,
            f1_score: record.f1_score,
        }
    }
}

/// Entry point for every dashboard query.
pub struct QueryService<S> {
    dataset_path: PathBuf,
    store: Arc<S>,
}

impl<S: MetricsStore> QueryService<S> {
    pub fn new(dataset_path: impl Into<PathBuf>, store: Arc<S>) -> Self {
        QueryService {
            dataset_path: dataset_path.into(),
            store,
        }
    }

    fn load(&self) -> Result<ProductDataset, QueryError> {
        load_file(&self.dataset_path).map_err(|err| {
            log::error!("Failed to load dataset: {err:#}");
            QueryError::Dataset(err)
        })
    }

    /// The ten most accurate models by synthetic quality metrics.
    pub fn top_model_metrics(&self) -> Result<Vec<ModelMetricsEntry>, QueryError> {
        let dataset = self.load()?;
        Ok(top_models(&dataset.products, Utc::now()))
    }

    /// Most recently stored model evaluation records.
    pub fn recent_model_metrics(&self, limit: usize) -> Result<Vec<ModelMetricsEntry>, QueryError> {
        let records = self.store.recent_model_metrics(limit)?;
        Ok(records.into_iter().map(ModelMetricsEntry::from).collect())
    }

    /// Most recently stored data quality records.
    pub fn recent_data_quality(&self, limit: usize) -> Result<Vec<DataQualityEntry>, QueryError> {
        let records = self.store.recent_data_quality(limit)?;
        Ok(records.into_iter().map(DataQualityEntry::from).collect())
    }

    pub fn add_model_metrics(
        &self,
        input: ModelMetricsInput,
    ) -> Result<Acknowledgement, QueryError> {
        let new = input.validate().inspect_err(|err| {
            log::warn!("Rejected model metrics write: {err}");
        })?;
        let record = self.store.insert_model_metrics(new)?;
        log::info!("Recorded model metrics #{} ({})", record.id, record.model_name);
        Ok(Acknowledgement::success())
    }

    pub fn add_data_quality(&self, input: DataQualityInput) -> Result<Acknowledgement, QueryError> {
        let new = input.validate().inspect_err(|err| {
            log::warn!("Rejected data quality write: {err}");
        })?;
        let record = self.store.insert_data_quality(new)?;
        log::info!("Recorded data quality #{} ({})", record.id, record.dataset_name);
        Ok(Acknowledgement::success())
    }

    /// Grouped chart data plus the matching rows.
    pub fn laptop_data(&self, filter: &DatasetFilter) -> Result<LaptopData, QueryError> {
        let dataset = self.load()?;
        let rows = filter.apply(dataset.products);
        log::debug!("Laptop data: {} rows after {filter:?}", rows.len());
        Ok(LaptopData::from_products(rows))
    }

    pub fn filter_catalog(&self) -> Result<FilterCatalog, QueryError> {
        Ok(FilterCatalog::from_dataset(&self.load()?))
    }

    pub fn price_performance(&self) -> Result<PricePerformance, QueryError> {
        Ok(PricePerformance::from_products(&self.load()?.products))
    }

    pub fn model_comparison(&self) -> Result<ModelComparison, QueryError> {
        Ok(ModelComparison::from_products(&self.load()?.products))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn record_views_use_display_timestamps() {
        let ts = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 58).unwrap();
        let entry = DataQualityEntry::from(DataQualityRecord {
            id: 4,
            dataset_name: "laptops".into(),
            completeness: 0.98,
            accuracy: 0.97,
            consistency: 0.96,
            timestamp: ts,
        });
        assert_eq!(entry.timestamp, "2024-02-29 23:59:58");

        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["dataset_name"], "laptops");
    }

    #[test]
    fn only_validation_failures_are_client_errors() {
        assert!(QueryError::Invalid(ValidationError::MissingField("recall")).is_client_error());
        assert!(!QueryError::Dataset(anyhow::anyhow!("gone")).is_client_error());
        assert!(!QueryError::Store(StoreError::Poisoned).is_client_error());
    }

    #[test]
    fn acknowledgement_shape() {
        assert_eq!(
            serde_json::to_value(Acknowledgement::success()).unwrap(),
            serde_json::json!({ "status": "success" })
        );
    }
}

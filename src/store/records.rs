use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Persisted records
// ---------------------------------------------------------------------------

/// An evaluation result for a named model, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetricsRecord {
    pub id: i64,
    pub model_name: String,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub timestamp: DateTime<Utc>,
}

/// A quality assessment of a named dataset, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityRecord {
    pub id: i64,
    pub dataset_name: String,
    pub completeness: f64,
    pub accuracy: f64,
    pub consistency: f64,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Write inputs
// ---------------------------------------------------------------------------

/// Rejection of a write request before anything reaches the store.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("malformed request body: {0}")]
    Malformed(String),
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingField(field))
}

/// Body of an "add model metrics" request. Every field is optional at the
/// wire level so a missing one can be reported by name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelMetricsInput {
    pub model_name: Option<String>,
    pub accuracy: Option<f64>,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1_score: Option<f64>,
    /// Server time is used when absent.
    pub timestamp: Option<DateTime<Utc>>,
}

/// A validated model metrics write; ready for [`super::MetricsStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewModelMetrics {
    pub model_name: String,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

impl ModelMetricsInput {
    pub fn from_json(body: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(body).map_err(|e| ValidationError::Malformed(e.to_string()))
    }

    pub fn validate(self) -> Result<NewModelMetrics, ValidationError> {
        Ok(NewModelMetrics {
            model_name: required(self.model_name, "model_name")?,
            accuracy: required(self.accuracy, "accuracy")?,
            precision: required(self.precision, "precision")?,
            recall: required(self.recall, "recall")?,
            f1_score: required(self.f1_score, "f1_score")?,
            timestamp: self.timestamp,
        })
    }
}

/// Body of an "add data quality" request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataQualityInput {
    pub dataset_name: Option<String>,
    pub completeness: Option<f64>,
    pub accuracy: Option<f64>,
    pub consistency: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// A validated data quality write.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDataQuality {
    pub dataset_name: String,
    pub completeness: f64,
    pub accuracy: f64,
    pub consistency: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

impl DataQualityInput {
    pub fn from_json(body: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(body).map_err(|e| ValidationError::Malformed(e.to_string()))
    }

    pub fn validate(self) -> Result<NewDataQuality, ValidationError> {
        Ok(NewDataQuality {
            dataset_name: required(self.dataset_name, "dataset_name")?,
            completeness: required(self.completeness, "completeness")?,
            accuracy: required(self.accuracy, "accuracy")?,
            consistency: required(self.consistency, "consistency")?,
            timestamp: self.timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_model_metrics_body_validates() {
        let input = ModelMetricsInput::from_json(
            r#"{"model_name":"resnet","accuracy":0.91,"precision":0.9,"recall":0.8,"f1_score":0.85}"#,
        )
        .unwrap();
        let new = input.validate().unwrap();
        assert_eq!(new.model_name, "resnet");
        assert_eq!(new.f1_score, 0.85);
        assert!(new.timestamp.is_none());
    }

    #[test]
    fn missing_field_is_named() {
        let input = ModelMetricsInput::from_json(
            r#"{"model_name":"resnet","accuracy":0.91,"precision":0.9,"f1_score":0.85}"#,
        )
        .unwrap();
        assert_eq!(input.validate(), Err(ValidationError::MissingField("recall")));

        let input =
            DataQualityInput::from_json(r#"{"completeness":1,"accuracy":1,"consistency":1}"#)
                .unwrap();
        assert_eq!(
            input.validate(),
            Err(ValidationError::MissingField("dataset_name"))
        );
    }

    #[test]
    fn empty_name_is_stored_as_given() {
        let input = ModelMetricsInput::from_json(
            r#"{"model_name":"","accuracy":0.9,"precision":0.9,"recall":0.9,"f1_score":0.9}"#,
        )
        .unwrap();
        assert_eq!(input.validate().unwrap().model_name, "");

        let input = DataQualityInput {
            dataset_name: Some("  ".into()),
            completeness: Some(1.0),
            accuracy: Some(1.0),
            consistency: Some(1.0),
            timestamp: None,
        };
        assert_eq!(input.validate().unwrap().dataset_name, "  ");
    }

    #[test]
    fn out_of_range_scores_are_accepted() {
        let input = ModelMetricsInput {
            model_name: Some("m".into()),
            accuracy: Some(-3.0),
            precision: Some(42.0),
            recall: Some(0.0),
            f1_score: Some(1.5),
            timestamp: None,
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn non_json_body_is_malformed() {
        assert!(matches!(
            DataQualityInput::from_json("dataset_name=x"),
            Err(ValidationError::Malformed(_))
        ));
    }

    #[test]
    fn explicit_timestamp_is_kept() {
        let input = DataQualityInput::from_json(
            r#"{"dataset_name":"d","completeness":1,"accuracy":1,"consistency":1,
                "timestamp":"2024-01-02T03:04:05Z"}"#,
        )
        .unwrap();
        let new = input.validate().unwrap();
        assert_eq!(
            new.timestamp.unwrap().to_rfc3339(),
            "2024-01-02T03:04:05+00:00"
        );
    }
}

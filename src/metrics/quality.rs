use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::display_timestamp;
use crate::data::model::Product;

/// How many rows the synthetic model ranking returns.
pub const TOP_MODEL_COUNT: usize = 10;

/// Evaluation-style scores synthesised from a product's defect and sales
/// figures, for when no labelled evaluation data exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityScores {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

impl QualityScores {
    pub fn for_product(product: &Product) -> Self {
        let accuracy = (100.0 - product.defect_rate) / 100.0;
        let precision = (1.0 - product.defect_rate / 100.0).clamp(0.0, 1.0);
        let recall = (product.sales_count as f64 / 1000.0).clamp(0.0, 1.0);
        QualityScores {
            accuracy,
            precision,
            recall,
            f1_score: f1(precision, recall),
        }
    }
}

/// Harmonic mean of precision and recall; zero when both are zero.
pub fn f1(precision: f64, recall: f64) -> f64 {
    let denominator = precision + recall;
    if denominator == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / denominator
    }
}

/// One row of a model metrics listing, as served to the dashboard.
///
/// Used both for the synthetic ranking and for evaluation records read
/// back from the metrics store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetricsEntry {
    pub model_name: String,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub timestamp: String,
}

/// Score every row and return the [`TOP_MODEL_COUNT`] most accurate.
///
/// The sort is stable, so rows with equal accuracy keep their dataset order.
/// `now` stamps every entry.
pub fn top_models(products: &[Product], now: DateTime<Utc>) -> Vec<ModelMetricsEntry> {
    let timestamp = display_timestamp(&now);

    let mut scored: Vec<(&Product, QualityScores)> = products
        .iter()
        .map(|p| (p, QualityScores::for_product(p)))
        .collect();
    scored.sort_by(|(_, a), (_, b)| b.accuracy.total_cmp(&a.accuracy));

    scored
        .into_iter()
        .take(TOP_MODEL_COUNT)
        .map(|(product, scores)| ModelMetricsEntry {
            model_name: product.label(),
            accuracy: scores.accuracy,
            precision: scores.precision,
            recall: scores.recall,
            f1_score: scores.f1_score,
            timestamp: timestamp.clone(),
        })
        .collect()
}

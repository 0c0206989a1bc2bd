use serde::{Deserialize, Serialize};

use crate::data::model::Product;

/// How many best-selling models the comparison chart shows.
pub const COMPARISON_MODEL_COUNT: usize = 5;

/// Axis of the comparison radar chart. Every score is on a 0–10 scale for
/// typical inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonMetric {
    Quality,
    Performance,
    Value,
    Storage,
    Popularity,
}

impl ComparisonMetric {
    /// Every metric, in chart order.
    pub const ALL: [ComparisonMetric; 5] = [
        ComparisonMetric::Quality,
        ComparisonMetric::Performance,
        ComparisonMetric::Value,
        ComparisonMetric::Storage,
        ComparisonMetric::Popularity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ComparisonMetric::Quality => "Quality",
            ComparisonMetric::Performance => "Performance",
            ComparisonMetric::Value => "Value",
            ComparisonMetric::Storage => "Storage",
            ComparisonMetric::Popularity => "Popularity",
        }
    }

    pub fn score(self, p: &Product) -> f64 {
        match self {
            ComparisonMetric::Quality => (100.0 - p.defect_rate) / 100.0 * 10.0,
            ComparisonMetric::Performance => p.ram / 32.0 * 10.0,
            ComparisonMetric::Value => (2000.0 - p.price) / 2000.0 * 10.0,
            ComparisonMetric::Storage => p.storage / 1024.0 * 10.0,
            ComparisonMetric::Popularity => p.sales_count as f64 / 1200.0 * 10.0,
        }
    }
}

/// The `n` rows with the largest `sales_count`, best seller first.
/// Equal counts keep dataset order.
pub fn top_sellers(products: &[Product], n: usize) -> Vec<&Product> {
    let mut ranked: Vec<&Product> = products.iter().collect();
    ranked.sort_by(|a, b| b.sales_count.cmp(&a.sales_count));
    ranked.truncate(n);
    ranked
}

/// Comparison chart data. `scores[m][i]` is metric `metrics[m]` for model
/// `models[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelComparison {
    pub models: Vec<String>,
    pub metrics: Vec<String>,
    pub scores: Vec<Vec<f64>>,
}

impl ModelComparison {
    pub fn from_products(products: &[Product]) -> Self {
        let top = top_sellers(products, COMPARISON_MODEL_COUNT);

        ModelComparison {
            models: top.iter().map(|p| p.label()).collect(),
            metrics: ComparisonMetric::ALL
                .iter()
                .map(|m| m.name().to_string())
                .collect(),
            scores: ComparisonMetric::ALL
                .iter()
                .map(|m| top.iter().map(|p| m.score(p)).collect())
                .collect(),
        }
    }

    /// Scores of a single metric, aligned with [`Self::models`].
    pub fn scores_for(&self, metric: ComparisonMetric) -> Option<&[f64]> {
        self.metrics
            .iter()
            .position(|name| name == metric.name())
            .and_then(|idx| self.scores.get(idx))
            .map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::product;
    use crate::metrics::assert_close;

    #[test]
    fn picks_best_sellers_with_stable_ties() {
        let products = vec![
            product("A", "low", "c", 1.0, 10, 1.0),
            product("A", "tie1", "c", 1.0, 300, 1.0),
            product("A", "top", "c", 1.0, 900, 1.0),
            product("A", "tie2", "c", 1.0, 300, 1.0),
            product("A", "mid", "c", 1.0, 200, 1.0),
            product("A", "tie3", "c", 1.0, 300, 1.0),
            product("A", "lowest", "c", 1.0, 5, 1.0),
        ];
        let models: Vec<&str> = top_sellers(&products, 5)
            .into_iter()
            .map(|p| p.model.as_str())
            .collect();
        assert_eq!(models, ["top", "tie1", "tie2", "tie3", "mid"]);
    }

    #[test]
    fn scores_align_with_models() {
        let products = vec![
            product("A", "one", "c", 1000.0, 600, 10.0),
            product("B", "two", "c", 500.0, 1200, 0.0),
        ];
        let cmp = ModelComparison::from_products(&products);

        assert_eq!(cmp.models, ["B two", "A one"]);
        assert_eq!(
            cmp.metrics,
            ["Quality", "Performance", "Value", "Storage", "Popularity"]
        );
        assert_eq!(cmp.scores.len(), 5);

        let popularity = cmp.scores_for(ComparisonMetric::Popularity).unwrap();
        assert_close(popularity[0], 10.0);
        assert_close(popularity[1], 5.0);

        let value = cmp.scores_for(ComparisonMetric::Value).unwrap();
        assert_close(value[0], 7.5);
        assert_close(value[1], 5.0);

        let quality = cmp.scores_for(ComparisonMetric::Quality).unwrap();
        assert_close(quality[1], 9.0);
    }

    #[test]
    fn caps_at_five_models() {
        let products: Vec<Product> = (0..8)
            .map(|i| product("A", &format!("{i}"), "c", 1.0, i * 10, 1.0))
            .collect();
        let cmp = ModelComparison::from_products(&products);
        assert_eq!(cmp.models.len(), COMPARISON_MODEL_COUNT);
        assert!(cmp.scores.iter().all(|s| s.len() == COMPARISON_MODEL_COUNT));
    }

    #[test]
    fn empty_dataset_keeps_metric_names() {
        let cmp = ModelComparison::from_products(&[]);
        assert!(cmp.models.is_empty());
        assert_eq!(cmp.metrics.len(), 5);
        assert!(cmp.scores.iter().all(Vec::is_empty));
    }
}

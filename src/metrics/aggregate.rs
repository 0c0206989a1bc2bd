use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::filter::PriceRange;
use crate::data::model::{Product, ProductDataset};

// ---------------------------------------------------------------------------
// Grouped aggregates
// ---------------------------------------------------------------------------

/// Chart data for the (optionally filtered) laptop table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaptopData {
    /// brand → total units sold.
    pub brand_sales: BTreeMap<String, u64>,
    /// category → mean defect rate.
    pub category_defects: BTreeMap<String, f64>,
    /// category → mean price.
    pub price_distribution: BTreeMap<String, f64>,
    /// The rows themselves, in dataset order.
    pub raw_data: Vec<Product>,
}

impl LaptopData {
    pub fn from_products(products: Vec<Product>) -> Self {
        let mut brand_sales: BTreeMap<String, u64> = BTreeMap::new();
        for p in &products {
            *brand_sales.entry(p.brand.clone()).or_default() += p.sales_count;
        }

        LaptopData {
            brand_sales,
            category_defects: group_mean(&products, |p| &p.category, |p| p.defect_rate),
            price_distribution: group_mean(&products, |p| &p.category, |p| p.price),
            raw_data: products,
        }
    }
}

/// Mean of `value` per distinct `key`.
fn group_mean<K, V>(products: &[Product], key: K, value: V) -> BTreeMap<String, f64>
where
    K: Fn(&Product) -> &String,
    V: Fn(&Product) -> f64,
{
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for p in products {
        let slot = sums.entry(key(p).clone()).or_insert((0.0, 0));
        slot.0 += value(p);
        slot.1 += 1;
    }
    sums.into_iter()
        .map(|(k, (sum, n))| (k, sum / n as f64))
        .collect()
}

// ---------------------------------------------------------------------------
// Price vs. performance
// ---------------------------------------------------------------------------

/// Weighted hardware/quality score on a 0–100 scale (RAM 30%, storage 30%,
/// defect-free share 40%). Not clamped: machines above 32 GB RAM or 1 TB
/// storage score above 100.
pub fn performance_score(product: &Product) -> f64 {
    (product.ram / 32.0 * 0.3
        + product.storage / 1024.0 * 0.3
        + (100.0 - product.defect_rate) / 100.0 * 0.4)
        * 100.0
}

/// Parallel series for the price/performance scatter plot. Index `i` of
/// every vector describes dataset row `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePerformance {
    pub prices: Vec<f64>,
    pub performance: Vec<f64>,
    pub models: Vec<String>,
    pub categories: Vec<String>,
}

impl PricePerformance {
    pub fn from_products(products: &[Product]) -> Self {
        PricePerformance {
            prices: products.iter().map(|p| p.price).collect(),
            performance: products.iter().map(performance_score).collect(),
            models: products.iter().map(Product::label).collect(),
            categories: products.iter().map(|p| p.category.clone()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter catalog
// ---------------------------------------------------------------------------

/// Values the dashboard offers in its filter controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCatalog {
    pub categories: Vec<String>,
    pub brands: Vec<String>,
    pub price_ranges: Vec<String>,
}

impl FilterCatalog {
    pub fn from_dataset(dataset: &ProductDataset) -> Self {
        FilterCatalog {
            categories: dataset.categories.iter().cloned().collect(),
            brands: dataset.brands.iter().cloned().collect(),
            price_ranges: PriceRange::ALL.iter().map(|r| r.id().to_string()).collect(),
        }
    }
}

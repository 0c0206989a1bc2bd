use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize, de};

// ---------------------------------------------------------------------------
// Product – one row of the dataset
// ---------------------------------------------------------------------------

/// A single laptop listing (one row of the source table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub brand: String,
    pub model: String,
    pub category: String,
    /// Non-negative list price.
    pub price: f64,
    /// Memory in GB.
    pub ram: f64,
    /// Storage in GB.
    pub storage: f64,
    #[serde(deserialize_with = "whole_count")]
    pub sales_count: u64,
    /// Percentage of units returned as defective, in `[0, 100]`.
    pub defect_rate: f64,
}

impl Product {
    /// Display label used across every derived view: `"{brand} {model}"`.
    pub fn label(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }
}

/// `value` as a count, if it is a finite non-negative whole number.
pub(crate) fn count_from_f64(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value < u64::MAX as f64)
        .then_some(value as u64)
}

/// Accepts `500` as well as `500.0`.
fn whole_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    count_from_f64(value).ok_or_else(|| {
        let msg = format!("expected a non-negative whole number, got {value}");
        <D::Error as de::Error>::custom(msg)
    })
}

/// Column names every dataset source must provide.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "brand",
    "model",
    "category",
    "price",
    "ram",
    "storage",
    "sales_count",
    "defect_rate",
];

// ---------------------------------------------------------------------------
// ProductDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed unique column values.
#[derive(Debug, Clone, Default)]
pub struct ProductDataset {
    /// All rows, in file order.
    pub products: Vec<Product>,
    /// Sorted distinct categories.
    pub categories: BTreeSet<String>,
    /// Sorted distinct brands.
    pub brands: BTreeSet<String>,
}

impl ProductDataset {
    /// Build the unique-value indices from the loaded rows.
    pub fn from_products(products: Vec<Product>) -> Self {
        let categories = products.iter().map(|p| p.category.clone()).collect();
        let brands = products.iter().map(|p| p.brand.clone()).collect();
        ProductDataset {
            products,
            categories,
            brands,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn product(
    brand: &str,
    model: &str,
    category: &str,
    price: f64,
    sales_count: u64,
    defect_rate: f64,
) -> Product {
    Product {
        brand: brand.to_string(),
        model: model.to_string(),
        category: category.to_string(),
        price,
        ram: 16.0,
        storage: 512.0,
        sales_count,
        defect_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_values_are_sorted_and_deduplicated() {
        let ds = ProductDataset::from_products(vec![
            product("Zeta", "Z1", "Ultrabook", 900.0, 10, 1.0),
            product("Acme", "A1", "Gaming", 1500.0, 20, 2.0),
            product("Acme", "A2", "Budget", 500.0, 30, 3.0),
        ]);

        assert_eq!(ds.len(), 3);
        assert_eq!(
            ds.categories.iter().collect::<Vec<_>>(),
            ["Budget", "Gaming", "Ultrabook"]
        );
        assert_eq!(ds.brands.iter().collect::<Vec<_>>(), ["Acme", "Zeta"]);
    }

    #[test]
    fn counts_must_be_whole_and_non_negative() {
        assert_eq!(count_from_f64(500.0), Some(500));
        assert_eq!(count_from_f64(0.0), Some(0));
        assert_eq!(count_from_f64(500.5), None);
        assert_eq!(count_from_f64(-1.0), None);
        assert_eq!(count_from_f64(f64::NAN), None);
    }

    #[test]
    fn label_joins_brand_and_model() {
        assert_eq!(product("Acme", "X1", "Gaming", 1.0, 1, 1.0).label(), "Acme X1");
    }
}

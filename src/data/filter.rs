use serde::{Deserialize, Serialize};

use super::model::Product;

// ---------------------------------------------------------------------------
// Price bands
// ---------------------------------------------------------------------------

/// Named price band. Bounds are inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceRange {
    Budget,
    Mid,
    Premium,
}

impl PriceRange {
    /// Every band, in catalog order.
    pub const ALL: [PriceRange; 3] = [PriceRange::Budget, PriceRange::Mid, PriceRange::Premium];

    /// Identifier used in query parameters and the filter catalog.
    pub fn id(self) -> &'static str {
        match self {
            PriceRange::Budget => "budget",
            PriceRange::Mid => "mid",
            PriceRange::Premium => "premium",
        }
    }

    /// Look up a band by identifier. Unknown identifiers yield `None`.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.id() == id)
    }

    /// `(min, max)` price bounds, both inclusive.
    pub fn bounds(self) -> (f64, f64) {
        match self {
            PriceRange::Budget => (0.0, 700.0),
            PriceRange::Mid => (701.0, 1200.0),
            PriceRange::Premium => (1201.0, f64::INFINITY),
        }
    }

    pub fn contains(self, price: f64) -> bool {
        let (min, max) = self.bounds();
        price >= min && price <= max
    }
}

// ---------------------------------------------------------------------------
// Dataset filter
// ---------------------------------------------------------------------------

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";

/// Row predicate built from the optional `category` / `price_range`
/// request parameters. Both constraints are ANDed together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetFilter {
    /// Exact category match; `None` keeps every category.
    pub category: Option<String>,
    /// Price band; `None` keeps every price.
    pub price_range: Option<PriceRange>,
}

impl DatasetFilter {
    /// Resolve raw request parameters.
    ///
    /// * `category` absent, empty or `"All"` → no category constraint
    /// * `price_range` absent or not one of `budget` / `mid` / `premium` →
    ///   no price constraint
    pub fn from_params(category: Option<&str>, price_range: Option<&str>) -> Self {
        let category = category
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
            .map(str::to_string);

        let price_range = price_range.and_then(|id| {
            let range = PriceRange::from_id(id);
            if range.is_none() && !id.is_empty() {
                log::debug!("Ignoring unrecognised price range {id:?}");
            }
            range
        });

        DatasetFilter {
            category,
            price_range,
        }
    }

    /// Whether this filter constrains anything at all.
    pub fn is_unfiltered(&self) -> bool {
        self.category.is_none() && self.price_range.is_none()
    }

    /// Whether a single row passes every active constraint.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if product.category != *category {
                return false;
            }
        }
        if let Some(range) = self.price_range {
            if !range.contains(product.price) {
                return false;
            }
        }
        true
    }

    /// Keep the rows that pass, in their original order.
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        if self.is_unfiltered() {
            return products;
        }
        products.into_iter().filter(|p| self.matches(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::product;

    fn rows() -> Vec<Product> {
        vec![
            product("Acme", "A1", "Gaming", 1500.0, 100, 2.0),
            product("Acme", "A2", "Budget", 700.0, 200, 4.0),
            product("Bolt", "B1", "Budget", 701.0, 300, 6.0),
            product("Bolt", "B2", "Ultrabook", 1200.0, 400, 8.0),
            product("Core", "C1", "Gaming", 1201.0, 500, 1.0),
            product("Core", "C2", "Budget", 0.0, 600, 3.0),
        ]
    }

    fn models(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.model.as_str()).collect()
    }

    #[test]
    fn budget_boundary_is_inclusive_at_700() {
        let filter = DatasetFilter::from_params(None, Some("budget"));
        assert!(filter.matches(&product("a", "b", "c", 700.0, 0, 0.0)));
        assert!(!filter.matches(&product("a", "b", "c", 701.0, 0, 0.0)));
    }

    #[test]
    fn price_bands_partition_the_rows() {
        let all = rows();
        let mut seen = Vec::new();
        for range in PriceRange::ALL {
            let filter = DatasetFilter::from_params(None, Some(range.id()));
            seen.extend(models(&filter.apply(all.clone())).into_iter().map(str::to_string));
        }
        seen.sort();
        let mut expected: Vec<String> = models(&all).into_iter().map(str::to_string).collect();
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn category_all_or_empty_means_no_filter() {
        assert!(DatasetFilter::from_params(Some("All"), None).is_unfiltered());
        assert!(DatasetFilter::from_params(Some(""), None).is_unfiltered());
        assert!(DatasetFilter::from_params(None, None).is_unfiltered());
    }

    #[test]
    fn unknown_price_range_is_ignored() {
        let filter = DatasetFilter::from_params(None, Some("luxury"));
        assert!(filter.is_unfiltered());
        assert_eq!(filter.apply(rows()).len(), rows().len());
    }

    #[test]
    fn filters_compose_and_preserve_order() {
        let filter = DatasetFilter::from_params(Some("Budget"), Some("budget"));
        assert_eq!(models(&filter.apply(rows())), ["A2", "C2"]);

        let filter = DatasetFilter::from_params(Some("Gaming"), Some("premium"));
        assert_eq!(models(&filter.apply(rows())), ["A1", "C1"]);
    }

    #[test]
    fn no_match_is_empty_not_error() {
        let filter = DatasetFilter::from_params(Some("Workstation"), None);
        assert!(filter.apply(rows()).is_empty());
    }
}

//! Quality dashboard core: derived quality/performance metrics over a laptop
//! product dataset, and an append-only store of evaluation results.

pub mod config;
pub mod data;
pub mod metrics;
pub mod query;
pub mod store;

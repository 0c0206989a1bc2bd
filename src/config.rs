use std::path::PathBuf;

use clap::Args;

pub const DEFAULT_DATA_PATH: &str = "static/data/laptops.csv";
pub const DEFAULT_STORE_PATH: &str = "ai_quality.db";

/// Where the dashboard reads its dataset and keeps its metrics history.
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Product dataset (.csv, .json or .parquet)
    #[arg(
        long = "data",
        env = "QUALITY_DASHBOARD_DATA",
        default_value = DEFAULT_DATA_PATH,
        global = true
    )]
    pub data_path: PathBuf,

    /// SQLite file holding stored model and data quality metrics
    #[arg(
        long = "store",
        env = "QUALITY_DASHBOARD_STORE",
        default_value = DEFAULT_STORE_PATH,
        global = true
    )]
    pub store_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

use std::io::Read;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use quality_dashboard::config::Settings;
use quality_dashboard::data::filter::DatasetFilter;
use quality_dashboard::query::{QueryError, QueryService};
use quality_dashboard::store::{
    DEFAULT_RECENT_LIMIT, DataQualityInput, ModelMetricsInput, SqliteMetricsStore,
};

#[derive(Parser)]
#[command(name = "quality-dashboard")]
#[command(about = "Quality and performance metrics for the laptop product dataset")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Top 10 models by synthetic accuracy
    ModelMetrics,
    /// Most recently stored model evaluation records
    StoredModelMetrics {
        #[arg(short, long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: usize,
    },
    /// Most recently stored data quality records
    DataQuality {
        #[arg(short, long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: usize,
    },
    /// Store a model evaluation record
    AddModelMetrics {
        /// JSON body, or `-` to read it from stdin
        body: String,
    },
    /// Store a data quality record
    AddDataQuality {
        /// JSON body, or `-` to read it from stdin
        body: String,
    },
    /// Grouped chart data for the (optionally filtered) laptop table
    LaptopData {
        /// Category to keep; `All` keeps every category
        #[arg(long)]
        category: Option<String>,
        /// One of budget, mid, premium; anything else is ignored
        #[arg(long)]
        price_range: Option<String>,
    },
    /// Values available to the filter controls
    Filters,
    /// Price against weighted performance score, per row
    PricePerformance,
    /// Scores of the five best-selling models
    ModelComparison,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            let client_error = err
                .downcast_ref::<QueryError>()
                .is_some_and(QueryError::is_client_error);
            if client_error {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Settings {
        data_path,
        store_path,
    } = cli.settings;

    let store = Arc::new(SqliteMetricsStore::open(&store_path).context("opening metrics store")?);
    let service = QueryService::new(data_path, Arc::clone(&store));

    let result = dispatch(&service, cli.command);

    drop(service);
    match Arc::try_unwrap(store) {
        Ok(store) => store.close().context("closing metrics store")?,
        Err(_) => log::warn!("Metrics store still shared at shutdown"),
    }
    result
}

fn dispatch(service: &QueryService<SqliteMetricsStore>, command: Command) -> Result<()> {
    match command {
        Command::ModelMetrics => print_json(&service.top_model_metrics()?),
        Command::StoredModelMetrics { limit } => print_json(&service.recent_model_metrics(limit)?),
        Command::DataQuality { limit } => print_json(&service.recent_data_quality(limit)?),
        Command::AddModelMetrics { body } => {
            let input = ModelMetricsInput::from_json(&read_body(body)?).map_err(QueryError::from)?;
            print_json(&service.add_model_metrics(input)?)
        }
        Command::AddDataQuality { body } => {
            let input = DataQualityInput::from_json(&read_body(body)?).map_err(QueryError::from)?;
            print_json(&service.add_data_quality(input)?)
        }
        Command::LaptopData {
            category,
            price_range,
        } => {
            let filter = DatasetFilter::from_params(category.as_deref(), price_range.as_deref());
            print_json(&service.laptop_data(&filter)?)
        }
        Command::Filters => print_json(&service.filter_catalog()?),
        Command::PricePerformance => print_json(&service.price_performance()?),
        Command::ModelComparison => print_json(&service.model_comparison()?),
    }
}

fn read_body(body: String) -> Result<String> {
    if body != "-" {
        return Ok(body);
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading request body from stdin")?;
    Ok(buf)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, ArrayRef, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
    UInt32Array, UInt64Array,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Product, ProductDataset, REQUIRED_COLUMNS, count_from_f64};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a product dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row naming the product columns (recommended)
/// * `.json`    – `[{ "brand": "...", "model": "...", ... }, ...]`
/// * `.parquet` – one column per product field
pub fn load_file(path: &Path) -> Result<ProductDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let products = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading dataset {}", path.display()))?;

    log::debug!("Loaded {} products from {}", products.len(), path.display());
    Ok(ProductDataset::from_products(products))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one product per line.
/// Columns may appear in any order; columns beyond the product fields are
/// ignored.
fn load_csv(path: &Path) -> Result<Vec<Product>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;

    let headers = reader.headers().context("reading CSV headers")?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            bail!("CSV missing '{column}' column");
        }
    }

    reader
        .deserialize::<Product>()
        .enumerate()
        .map(|(row_no, result)| result.with_context(|| format!("CSV row {row_no}")))
        .collect()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "brand": "Acme", "model": "X1", "category": "Gaming",
///     "price": 1299, "ram": 16, "storage": 512,
///     "sales_count": 500, "defect_rate": 2.5 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<Product>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            if !rec.is_object() {
                bail!("Row {i} is not a JSON object");
            }
            serde_json::from_value(rec.clone()).with_context(|| format!("Row {i}"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing product rows.
///
/// Expected schema: one column per product field. Text columns are
/// `Utf8`/`LargeUtf8`; numeric columns may be any of the common integer or
/// float widths written by Pandas or Polars.
fn load_parquet(path: &Path) -> Result<Vec<Product>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut products = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let brand = column(&batch, "brand")?;
        let model = column(&batch, "model")?;
        let category = column(&batch, "category")?;
        let price = column(&batch, "price")?;
        let ram = column(&batch, "ram")?;
        let storage = column(&batch, "storage")?;
        let sales_count = column(&batch, "sales_count")?;
        let defect_rate = column(&batch, "defect_rate")?;

        for row in 0..batch.num_rows() {
            let product = Product {
                brand: extract_string(brand, row).context("brand")?,
                model: extract_string(model, row).context("model")?,
                category: extract_string(category, row).context("category")?,
                price: extract_f64(price, row).context("price")?,
                ram: extract_f64(ram, row).context("ram")?,
                storage: extract_f64(storage, row).context("storage")?,
                sales_count: extract_u64(sales_count, row).context("sales_count")?,
                defect_rate: extract_f64(defect_rate, row).context("defect_rate")?,
            };
            products.push(product);
        }
    }

    Ok(products)
}

// -- Parquet / Arrow helpers --

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

fn extract_string(col: &ArrayRef, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("Row {row}: null value");
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => bail!("Row {row}: expected string column, got {other:?}"),
    }
}

fn extract_f64(col: &ArrayRef, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("Row {row}: null value");
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Float64 => any.downcast_ref::<Float64Array>().map(|a| a.value(row)),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => any.downcast_ref::<Int64Array>().map(|a| a.value(row) as f64),
        DataType::Int32 => any.downcast_ref::<Int32Array>().map(|a| a.value(row) as f64),
        DataType::UInt64 => any.downcast_ref::<UInt64Array>().map(|a| a.value(row) as f64),
        DataType::UInt32 => any.downcast_ref::<UInt32Array>().map(|a| a.value(row) as f64),
        other => bail!("Row {row}: expected numeric column, got {other:?}"),
    };
    value.with_context(|| format!("Row {row}: column type mismatch"))
}

fn extract_u64(col: &ArrayRef, row: usize) -> Result<u64> {
    if col.is_null(row) {
        bail!("Row {row}: null value");
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::UInt64 => any.downcast_ref::<UInt64Array>().map(|a| a.value(row)),
        DataType::UInt32 => any.downcast_ref::<UInt32Array>().map(|a| a.value(row) as u64),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| signed_count(a.value(row), row))
            .transpose()?,
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| signed_count(a.value(row).into(), row))
            .transpose()?,
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| float_count(a.value(row), row))
            .transpose()?,
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| float_count(a.value(row).into(), row))
            .transpose()?,
        other => bail!("Row {row}: expected numeric column, got {other:?}"),
    };
    value.with_context(|| format!("Row {row}: column type mismatch"))
}

fn signed_count(value: i64, row: usize) -> Result<u64> {
    u64::try_from(value).with_context(|| format!("Row {row}: negative count {value}"))
}

fn float_count(value: f64, row: usize) -> Result<u64> {
    count_from_f64(value).with_context(|| format!("Row {row}: {value} is not a whole count"))
}

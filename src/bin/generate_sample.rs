use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use quality_dashboard::data::model::Product;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next_f64()
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// (category, price range, RAM options, storage options, typical defect rate)
type CategoryProfile = (&'static str, (f64, f64), &'static [f64], &'static [f64], f64);

const CATEGORIES: [CategoryProfile; 5] = [
    ("Budget", (350.0, 700.0), &[4.0, 8.0], &[128.0, 256.0, 512.0], 6.0),
    ("Business", (800.0, 1600.0), &[8.0, 16.0, 32.0], &[256.0, 512.0, 1024.0], 2.5),
    ("Gaming", (1000.0, 2400.0), &[16.0, 32.0, 64.0], &[512.0, 1024.0, 2048.0], 4.0),
    ("Ultrabook", (900.0, 1900.0), &[8.0, 16.0, 32.0], &[256.0, 512.0, 1024.0], 2.0),
    ("Workstation", (1500.0, 3200.0), &[32.0, 64.0], &[1024.0, 2048.0], 1.5),
];

const BRANDS: [&str; 7] = ["Acer", "Apple", "Asus", "Dell", "HP", "Lenovo", "MSI"];

fn generate_products(rng: &mut SimpleRng) -> Vec<Product> {
    let mut products = Vec::new();
    for (category, (min_price, max_price), rams, storages, defect_base) in CATEGORIES {
        for series in 1..=6 {
            let brand = *rng.pick(&BRANDS);
            let price = rng.range(min_price, max_price).round();
            products.push(Product {
                brand: brand.to_string(),
                model: format!("{}{}-{}", &category[..1], series, 100 + rng.next_u64() % 900),
                category: category.to_string(),
                price,
                ram: *rng.pick(rams),
                storage: *rng.pick(storages),
                sales_count: 50 + rng.next_u64() % 1400,
                defect_rate: (defect_base * rng.range(0.3, 2.0) * 10.0).round() / 10.0,
            });
        }
    }
    products
}

fn string_column(products: &[Product], f: impl Fn(&Product) -> &str) -> StringArray {
    StringArray::from(products.iter().map(f).collect::<Vec<_>>())
}

fn float_column(products: &[Product], f: impl Fn(&Product) -> f64) -> Float64Array {
    Float64Array::from(products.iter().map(f).collect::<Vec<_>>())
}

fn write_csv(path: &Path, products: &[Product]) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create CSV file");
    for product in products {
        writer.serialize(product).expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV file");
}

fn write_parquet(path: &Path, products: &[Product]) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("brand", DataType::Utf8, false),
        Field::new("model", DataType::Utf8, false),
        Field::new("category", DataType::Utf8, false),
        Field::new("price", DataType::Float64, false),
        Field::new("ram", DataType::Float64, false),
        Field::new("storage", DataType::Float64, false),
        Field::new("sales_count", DataType::Int64, false),
        Field::new("defect_rate", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(string_column(products, |p| p.brand.as_str())),
            Arc::new(string_column(products, |p| p.model.as_str())),
            Arc::new(string_column(products, |p| p.category.as_str())),
            Arc::new(float_column(products, |p| p.price)),
            Arc::new(float_column(products, |p| p.ram)),
            Arc::new(float_column(products, |p| p.storage)),
            Arc::new(Int64Array::from(
                products.iter().map(|p| p.sales_count as i64).collect::<Vec<_>>(),
            )),
            Arc::new(float_column(products, |p| p.defect_rate)),
        ],
    )
    .expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn main() {
    env_logger::init();

    let out_dir = PathBuf::from(
        std::env::args()
            .nth(1)
            .unwrap_or_else(|| "static/data".to_string()),
    );
    std::fs::create_dir_all(&out_dir).expect("Failed to create output directory");

    let mut rng = SimpleRng::new(42);
    let products = generate_products(&mut rng);

    let csv_path = out_dir.join("laptops.csv");
    let parquet_path = out_dir.join("laptops.parquet");
    write_csv(&csv_path, &products);
    write_parquet(&parquet_path, &products);

    log::info!("Generated {} products", products.len());
    println!(
        "Wrote {} laptops to {} and {}",
        products.len(),
        csv_path.display(),
        parquet_path.display()
    );
}

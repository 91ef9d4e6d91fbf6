use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// (country, life expectancy in 1970, yearly gain, spending in 1970, yearly growth)
const COUNTRIES: [(&str, f64, f64, f64, f64); 6] = [
    ("Canada", 72.8, 0.17, 290.0, 0.062),
    ("France", 72.2, 0.20, 190.0, 0.070),
    ("Great Britain", 71.9, 0.18, 120.0, 0.072),
    ("Germany", 70.6, 0.21, 250.0, 0.058),
    ("Japan", 72.0, 0.24, 150.0, 0.064),
    ("USA", 70.9, 0.15, 330.0, 0.074),
];

#[derive(Serialize)]
struct Row<'a> {
    #[serde(rename = "Year")]
    year: i64,
    #[serde(rename = "Country")]
    country: &'a str,
    #[serde(rename = "Spending_USD")]
    spending_usd: f64,
    #[serde(rename = "Life_Expectancy")]
    life_expectancy: f64,
}

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Writes `healthexp.csv` and `healthexp.parquet` into the directory given as
/// the first argument (default: current directory).
fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let mut rng = SimpleRng::new(42);

    let mut years = Vec::new();
    let mut countries = Vec::new();
    let mut spending = Vec::new();
    let mut life = Vec::new();

    // Year-major, like the seaborn `healthexp` dataset.
    for year in 1970..=2020_i64 {
        let t = (year - 1970) as f64;
        for &(country, life0, gain, spend0, growth) in &COUNTRIES {
            years.push(year);
            countries.push(country);
            spending.push(round3(spend0 * (1.0 + growth).powf(t) * rng.gauss(1.0, 0.01)));
            life.push(round1(life0 + gain * t + rng.gauss(0.0, 0.15)));
        }
    }

    // CSV
    let csv_path = out_dir.join("healthexp.csv");
    let mut writer = csv::Writer::from_path(&csv_path)
        .with_context(|| format!("creating {}", csv_path.display()))?;
    for i in 0..years.len() {
        writer.serialize(Row {
            year: years[i],
            country: countries[i],
            spending_usd: spending[i],
            life_expectancy: life[i],
        })?;
    }
    writer.flush()?;

    // Parquet
    let schema = Arc::new(Schema::new(vec![
        Field::new("Year", DataType::Int64, false),
        Field::new("Country", DataType::Utf8, false),
        Field::new("Spending_USD", DataType::Float64, false),
        Field::new("Life_Expectancy", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(years.clone())),
            Arc::new(StringArray::from(countries)),
            Arc::new(Float64Array::from(spending)),
            Arc::new(Float64Array::from(life)),
        ],
    )
    .context("building record batch")?;

    let parquet_path = out_dir.join("healthexp.parquet");
    let file = std::fs::File::create(&parquet_path)
        .with_context(|| format!("creating {}", parquet_path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;

    println!(
        "Wrote {} rows ({} countries, 1970-2020) to {} and {}",
        years.len(),
        COUNTRIES.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Data layer: core types, loading, filtering and summary statistics.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table (once per session)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  Arc<[Record]>, shared read-only
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year range ∩ country set → derived Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  means over a derived Table
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;

/// Deterministic dataset shared by unit tests across modules.
#[cfg(test)]
pub mod fixtures {
    use super::model::{Record, Table};

    pub const COUNTRIES: [&str; 6] = [
        "Canada",
        "France",
        "Great Britain",
        "Germany",
        "Japan",
        "USA",
    ];

    pub fn record(country: &str, year: i32, life_expectancy: f64, spending_usd: f64) -> Record {
        Record {
            country: country.to_string(),
            year,
            life_expectancy,
            spending_usd,
        }
    }

    /// One row per (year, country) for 1970..=2020, year-major like the source file.
    pub fn sample_table() -> Table {
        let mut rows = Vec::new();
        for year in 1970..=2020 {
            for (i, country) in COUNTRIES.iter().enumerate() {
                let t = f64::from(year - 1970);
                rows.push(record(
                    country,
                    year,
                    70.0 + i as f64 + 0.2 * t,
                    100.0 * (i as f64 + 1.0) + 50.0 * t,
                ));
            }
        }
        Table::from_records(rows)
    }
}

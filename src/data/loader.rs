use std::io::Read;
use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use thiserror::Error;

use super::model::{Record, Table, COUNTRY, LIFE_EXPECTANCY, SPENDING_USD, YEAR};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Anything that prevents the dataset from loading. Fatal at startup.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dataset file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("missing column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}, column '{column}': cannot read '{value}'")]
    Malformed {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the expenditure dataset from a file.  Dispatch by extension.
///
/// Every format carries the same four columns:
/// `Country`, `Year`, `Life_Expectancy`, `Spending_USD`.
/// * `.csv`     – header row, columns in any order
/// * `.json`    – `[{ "Country": ..., "Year": ..., ... }, ...]`
/// * `.parquet` – one Arrow column per field; numeric types are cast
pub fn load_file(path: &Path) -> Result<Table, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(std::fs::File::open(path)?)?,
        "json" => load_json(std::fs::File::open(path)?)?,
        "parquet" | "pq" => load_parquet(std::fs::File::open(path)?)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    log::info!("Loaded {} rows from {}", table.len(), path.display());
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with at least the four schema columns.
/// Extra columns are ignored; empty cells are malformed.
pub fn load_csv<R: Read>(input: R) -> Result<Table, LoadError> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader.headers()?.clone();

    let position = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or(LoadError::MissingColumn(name))
    };
    let country_idx = position(COUNTRY)?;
    let year_idx = position(YEAR)?;
    let life_idx = position(LIFE_EXPECTANCY)?;
    let spending_idx = position(SPENDING_USD)?;

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        let country = field(country_idx);
        if country.is_empty() {
            return Err(malformed(row_no, COUNTRY, country));
        }

        rows.push(Record {
            country: country.to_string(),
            year: parse_field(field(year_idx), row_no, YEAR)?,
            life_expectancy: parse_field(field(life_idx), row_no, LIFE_EXPECTANCY)?,
            spending_usd: parse_field(field(spending_idx), row_no, SPENDING_USD)?,
        });
    }

    Ok(Table::from_records(rows))
}

fn parse_field<T: std::str::FromStr>(
    raw: &str,
    row: usize,
    column: &'static str,
) -> Result<T, LoadError> {
    raw.parse::<T>().map_err(|_| malformed(row, column, raw))
}

fn malformed(row: usize, column: &'static str, value: &str) -> LoadError {
    LoadError::Malformed {
        row,
        column,
        value: value.to_string(),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "Country": "USA", "Year": 2000, "Life_Expectancy": 76.7, "Spending_USD": 4536.6 },
///   ...
/// ]
/// ```
pub fn load_json<R: Read>(input: R) -> Result<Table, LoadError> {
    let records: Vec<Record> = serde_json::from_reader(input)?;
    Ok(Table::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by Pandas (`df.to_parquet()`) or Polars.
/// Integer and float widths are normalised through Arrow casts.
pub fn load_parquet(file: std::fs::File) -> Result<Table, LoadError> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut rows = Vec::new();
    for batch in reader {
        append_batch(&batch?, &mut rows)?;
    }
    Ok(Table::from_records(rows))
}

fn append_batch(batch: &RecordBatch, rows: &mut Vec<Record>) -> Result<(), LoadError> {
    let column = |name: &'static str, to: &DataType| -> Result<ArrayRef, LoadError> {
        let col = batch
            .column_by_name(name)
            .ok_or(LoadError::MissingColumn(name))?;
        Ok(cast(col, to)?)
    };

    let countries = column(COUNTRY, &DataType::Utf8)?;
    let years = column(YEAR, &DataType::Int64)?;
    let life = column(LIFE_EXPECTANCY, &DataType::Float64)?;
    let spending = column(SPENDING_USD, &DataType::Float64)?;

    let countries = countries.as_string::<i32>();
    let years = years.as_primitive::<Int64Type>();
    let life = life.as_primitive::<Float64Type>();
    let spending = spending.as_primitive::<Float64Type>();

    let offset = rows.len();
    for i in 0..batch.num_rows() {
        let row = offset + i;
        for (array, name) in [
            (countries as &dyn Array, COUNTRY),
            (years as &dyn Array, YEAR),
            (life as &dyn Array, LIFE_EXPECTANCY),
            (spending as &dyn Array, SPENDING_USD),
        ] {
            if array.is_null(i) {
                return Err(malformed(row, name, "null"));
            }
        }

        let year = years.value(i);
        let year = i32::try_from(year).map_err(|_| malformed(row, YEAR, &year.to_string()))?;

        rows.push(Record {
            country: countries.value(i).to_string(),
            year,
            life_expectancy: life.value(i),
            spending_usd: spending.value(i),
        });
    }
    Ok(())
}

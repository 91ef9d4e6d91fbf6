use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Column names of the fixed input schema
// ---------------------------------------------------------------------------

pub const COUNTRY: &str = "Country";
pub const YEAR: &str = "Year";
pub const LIFE_EXPECTANCY: &str = "Life_Expectancy";
pub const SPENDING_USD: &str = "Spending_USD";

// ---------------------------------------------------------------------------
// Record – one row of the dataset
// ---------------------------------------------------------------------------

/// A single (country, year) observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Life_Expectancy")]
    pub life_expectancy: f64,
    #[serde(rename = "Spending_USD")]
    pub spending_usd: f64,
}

// ---------------------------------------------------------------------------
// Column – the sortable / displayable columns of a Record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Country,
    Year,
    LifeExpectancy,
    SpendingUsd,
}

impl Column {
    pub const ALL: [Column; 4] = [
        Column::Country,
        Column::Year,
        Column::LifeExpectancy,
        Column::SpendingUsd,
    ];

    /// Header text as it appears in the source file.
    pub fn header(self) -> &'static str {
        match self {
            Column::Country => COUNTRY,
            Column::Year => YEAR,
            Column::LifeExpectancy => LIFE_EXPECTANCY,
            Column::SpendingUsd => SPENDING_USD,
        }
    }

    /// Cell text for a record.
    pub fn format(self, record: &Record) -> String {
        match self {
            Column::Country => record.country.clone(),
            Column::Year => record.year.to_string(),
            Column::LifeExpectancy => format!("{:.1}", record.life_expectancy),
            Column::SpendingUsd => format!("{:.3}", record.spending_usd),
        }
    }

    /// Total order of two records on this column.
    pub fn compare(self, a: &Record, b: &Record) -> std::cmp::Ordering {
        match self {
            Column::Country => a.country.cmp(&b.country),
            Column::Year => a.year.cmp(&b.year),
            Column::LifeExpectancy => a.life_expectancy.total_cmp(&b.life_expectancy),
            Column::SpendingUsd => a.spending_usd.total_cmp(&b.spending_usd),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ---------------------------------------------------------------------------
// Table – ordered, immutable sequence of records
// ---------------------------------------------------------------------------

/// An ordered sequence of records. Cloning is cheap: rows are shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    rows: Arc<[Record]>,
}

impl Default for Table {
    fn default() -> Self {
        Self::from_records(Vec::new())
    }
}

impl FromIterator<Record> for Table {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::from_records(iter.into_iter().collect())
    }
}

impl Table {
    pub fn from_records(records: Vec<Record>) -> Self {
        Table {
            rows: Arc::from(records),
        }
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.rows.iter()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sorted set of distinct country names.
    pub fn countries(&self) -> BTreeSet<String> {
        self.rows.iter().map(|r| r.country.clone()).collect()
    }

    /// Smallest and largest year present, if any.
    pub fn year_span(&self) -> Option<(i32, i32)> {
        let min = self.rows.iter().map(|r| r.year).min()?;
        let max = self.rows.iter().map(|r| r.year).max()?;
        Some((min, max))
    }

    /// Stable sort by `column`; ties keep their original relative order.
    pub fn sorted_by(&self, column: Column, ascending: bool) -> Table {
        let mut rows = self.rows.to_vec();
        rows.sort_by(|a, b| {
            let ord = column.compare(a, b);
            if ascending { ord } else { ord.reverse() }
        });
        Table::from_records(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{record, sample_table};

    #[test]
    fn countries_and_year_span_cover_the_fixture() {
        let table = sample_table();
        assert_eq!(table.countries().len(), 6);
        assert_eq!(table.year_span(), Some((1970, 2020)));
        assert_eq!(Table::default().year_span(), None);
    }

    #[test]
    fn sorting_is_stable_and_respects_direction() {
        let table = Table::from_records(vec![
            record("USA", 2001, 77.0, 5000.0),
            record("Japan", 2001, 81.0, 2000.0),
            record("France", 2000, 79.0, 3000.0),
        ]);

        let by_year = table.sorted_by(Column::Year, true);
        let countries: Vec<&str> = by_year.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(countries, ["France", "USA", "Japan"]);

        let by_spending = table.sorted_by(Column::SpendingUsd, false);
        assert_eq!(by_spending.rows()[0].country, "USA");
        assert_eq!(by_spending.rows()[2].country, "Japan");

        // Source table is untouched.
        assert_eq!(table.rows()[0].country, "USA");
    }

    #[test]
    fn column_formatting_matches_headers() {
        let r = record("Canada", 1999, 78.96, 2260.5);
        let cells: Vec<String> = Column::ALL.iter().map(|c| c.format(&r)).collect();
        assert_eq!(cells, ["Canada", "1999", "79.0", "2260.500"]);
        assert_eq!(Column::LifeExpectancy.to_string(), "Life_Expectancy");
    }
}

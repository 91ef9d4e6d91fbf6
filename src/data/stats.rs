use super::model::{Record, Table};

/// Numeric columns that can be summarised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    LifeExpectancy,
    SpendingUsd,
}

impl Measure {
    pub fn of(self, record: &Record) -> f64 {
        match self {
            Measure::LifeExpectancy => record.life_expectancy,
            Measure::SpendingUsd => record.spending_usd,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Measure::LifeExpectancy => "Average Life Expectancy",
            Measure::SpendingUsd => "Average Healthcare Expenditure",
        }
    }
}

/// Arithmetic mean of `measure` over the table; NaN when the table is empty.
pub fn mean(table: &Table, measure: Measure) -> f64 {
    if table.is_empty() {
        return f64::NAN;
    }
    let sum: f64 = table.iter().map(|r| measure.of(r)).sum();
    sum / table.len() as f64
}

/// Round to two decimals, ties to even like Python's `round(x, 2)`.
/// NaN stays NaN.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

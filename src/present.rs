//! Presentation adapters: turn a derived table into something a widget can
//! draw without further computation.
//!
//! Adapters are pure. Their outputs are registered as derived cells of the
//! dashboard graph (see [`Views`]) so the UI, which repaints every frame,
//! only rebuilds them when the underlying view changes.

use std::collections::BTreeMap;

use crate::data::model::{Column, Table};
use crate::data::stats::round2;
use crate::reactive::{Derived, RecomputeError};
use crate::state::DashboardState;

/// Shown instead of a summary value that is not a number.
pub const PLACEHOLDER: &str = "n/a";

/// Fixed rendering interface: a table in, a presentation out.
pub trait Adapter {
    type Presentation;

    fn render(&self, view: &Table) -> Self::Presentation;
}

// ---------------------------------------------------------------------------
// Summary value
// ---------------------------------------------------------------------------

/// Two-decimal text for a summary value; NaN (empty view) becomes the placeholder.
pub fn format_mean(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}", round2(value))
    } else {
        PLACEHOLDER.to_string()
    }
}

/// Text shown in place of a view whose recomputation failed.
pub fn error_text(err: &RecomputeError) -> String {
    format!("⚠ {err}")
}

// ---------------------------------------------------------------------------
// Scatter plot
// ---------------------------------------------------------------------------

/// One country's points: x = spending (USD), y = life expectancy.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub country: String,
    pub points: Vec<[f64; 2]>,
    /// Year of each point, parallel to `points`.
    pub years: Vec<i32>,
}

pub struct ScatterAdapter;

impl Adapter for ScatterAdapter {
    type Presentation = Vec<ScatterSeries>;

    /// Series ordered by country name; points keep table order.
    fn render(&self, view: &Table) -> Vec<ScatterSeries> {
        let mut by_country: BTreeMap<&str, ScatterSeries> = BTreeMap::new();
        for r in view.iter() {
            let series = by_country
                .entry(r.country.as_str())
                .or_insert_with(|| ScatterSeries {
                    country: r.country.clone(),
                    points: Vec::new(),
                    years: Vec::new(),
                });
            series.points.push([r.spending_usd, r.life_expectancy]);
            series.years.push(r.year);
        }
        by_country.into_values().collect()
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

pub struct GridAdapter {
    pub columns: Vec<Column>,
}

impl Default for GridAdapter {
    fn default() -> Self {
        GridAdapter {
            columns: Column::ALL.to_vec(),
        }
    }
}

impl Adapter for GridAdapter {
    type Presentation = Grid;

    fn render(&self, view: &Table) -> Grid {
        let rows = view
            .iter()
            .map(|r| self.columns.iter().map(|c| c.format(r)).collect())
            .collect();
        Grid {
            columns: self.columns.clone(),
            rows,
        }
    }
}

// ---------------------------------------------------------------------------
// Presentation cells
// ---------------------------------------------------------------------------

/// Adapter outputs as derived cells on the dashboard graph.
#[derive(Debug, Clone, Copy)]
pub struct Views {
    pub scatter: Derived<Vec<ScatterSeries>>,
    /// Grid of the sorted, filtered view.
    pub frame_grid: Derived<Grid>,
    /// Grid of the filtered view in dataset order.
    pub table_grid: Derived<Grid>,
}

impl Views {
    pub fn register(state: &DashboardState) -> Self {
        let graph = state.graph();
        let filtered = state.filtered;
        let frame = state.frame;
        let table = state.table;

        Views {
            scatter: graph.derived("scatter", move |g| {
                Ok(ScatterAdapter.render(&*g.get(&filtered)?))
            }),
            frame_grid: graph.derived("frame_grid", move |g| {
                Ok(GridAdapter::default().render(&*g.get(&frame)?))
            }),
            table_grid: graph.derived("table_grid", move |g| {
                Ok(GridAdapter::default().render(&*g.get(&table)?))
            }),
        }
    }
}

use std::collections::BTreeSet;
use std::rc::Rc;

use crate::data::filter::FilterState;
use crate::data::model::{Column, Table};
use crate::data::stats::{self, Measure};
use crate::reactive::{Derived, Graph, Input, RecomputeError};

// ---------------------------------------------------------------------------
// Input cells
// ---------------------------------------------------------------------------

/// The sidebar controls, one input cell each.
#[derive(Debug, Clone, Copy)]
pub struct FilterCells {
    pub min_year: Input<i32>,
    pub max_year: Input<i32>,
    pub countries: Input<BTreeSet<String>>,
}

/// Row order of the "Data frame" view. `column: None` keeps dataset order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortOrder {
    pub column: Option<Column>,
    pub ascending: bool,
}

impl SortOrder {
    /// Clicking a header: a new column sorts ascending, the same column flips.
    pub fn toggled(self, column: Column) -> SortOrder {
        if self.column == Some(column) {
            SortOrder {
                column: Some(column),
                ascending: !self.ascending,
            }
        } else {
            SortOrder {
                column: Some(column),
                ascending: true,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// The full dashboard state, independent of rendering: one loaded table and
/// the recomputation graph built over it.
pub struct DashboardState {
    graph: Graph,
    base: Table,
    known_countries: BTreeSet<String>,
    year_span: (i32, i32),

    pub filters: FilterCells,
    /// Year emphasized in the scatter plot; kept inside the selected range.
    pub focus_year: Input<i32>,
    pub sort: Input<SortOrder>,

    /// Base table restricted by year range and countries.
    pub filtered: Derived<Table>,
    pub mean_life_expectancy: Derived<f64>,
    pub mean_spending: Derived<f64>,
    pub clamped_focus_year: Derived<i32>,
    /// Filtered rows in the requested sort order ("Data frame" tab).
    pub frame: Derived<Table>,
    /// Filtered rows in dataset order ("Table" tab).
    pub table: Derived<Table>,
}

impl DashboardState {
    /// Build the graph over a freshly loaded table with everything selected.
    pub fn new(base: Table) -> Self {
        let graph = Graph::new();
        let initial = FilterState::select_all(&base);
        let known_countries = base.countries();
        let year_span = (initial.min_year, initial.max_year);

        let filters = FilterCells {
            min_year: graph.input("min_year", initial.min_year),
            max_year: graph.input("max_year", initial.max_year),
            countries: graph.input("countries", initial.selected_countries),
        };
        let focus_year = graph.input("focus_year", year_span.1);
        let sort = graph.input("sort", SortOrder::default());

        let filtered = {
            let base = base.clone();
            let known = known_countries.clone();
            let span = base.year_span();
            graph.derived("filtered", move |g| {
                let state = read_filter_state(g, &filters)?;
                state.validate(&known, span)?;
                Ok(state.apply(&base))
            })
        };

        let mean_life_expectancy = graph.derived("mean_life_expectancy", move |g| {
            Ok(stats::mean(&*g.get(&filtered)?, Measure::LifeExpectancy))
        });
        let mean_spending = graph.derived("mean_spending", move |g| {
            Ok(stats::mean(&*g.get(&filtered)?, Measure::SpendingUsd))
        });

        let clamped_focus_year = graph.derived("clamped_focus_year", move |g| {
            let focus = *g.get(&focus_year)?;
            let min_year = *g.get(&filters.min_year)?;
            let max_year = *g.get(&filters.max_year)?;
            Ok(focus.min(max_year).max(min_year))
        });

        let frame = graph.derived("frame", move |g| {
            let view = g.get(&filtered)?;
            let order = *g.get(&sort)?;
            Ok(match order.column {
                Some(column) => view.sorted_by(column, order.ascending),
                None => Table::clone(&view),
            })
        });

        let table = graph.derived("table", move |g| Ok(Table::clone(&*g.get(&filtered)?)));

        DashboardState {
            graph,
            base,
            known_countries,
            year_span,
            filters,
            focus_year,
            sort,
            filtered,
            mean_life_expectancy,
            mean_spending,
            clamped_focus_year,
            frame,
            table,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn base(&self) -> &Table {
        &self.base
    }

    /// Countries offered by the checkbox group.
    pub fn known_countries(&self) -> &BTreeSet<String> {
        &self.known_countries
    }

    /// Bounds of the year sliders.
    pub fn year_span(&self) -> (i32, i32) {
        self.year_span
    }

    /// Snapshot of the current control values.
    pub fn filter_state(&self) -> Result<FilterState, RecomputeError> {
        read_filter_state(&self.graph, &self.filters)
    }

    pub fn mean(&self, measure: Measure) -> Result<Rc<f64>, RecomputeError> {
        match measure {
            Measure::LifeExpectancy => self.graph.get(&self.mean_life_expectancy),
            Measure::SpendingUsd => self.graph.get(&self.mean_spending),
        }
    }

    pub fn filtered(&self) -> Result<Rc<Table>, RecomputeError> {
        self.graph.get(&self.filtered)
    }

    // -- input writes --

    pub fn set_min_year(&self, year: i32) -> bool {
        self.graph.set(&self.filters.min_year, year)
    }

    pub fn set_max_year(&self, year: i32) -> bool {
        self.graph.set(&self.filters.max_year, year)
    }

    pub fn set_countries(&self, countries: BTreeSet<String>) -> bool {
        self.graph.set(&self.filters.countries, countries)
    }

    /// Add or remove a single country from the selection.
    pub fn toggle_country(&self, country: &str) -> Result<bool, RecomputeError> {
        let mut selected = BTreeSet::clone(&*self.graph.get(&self.filters.countries)?);
        if !selected.remove(country) {
            selected.insert(country.to_string());
        }
        Ok(self.set_countries(selected))
    }

    pub fn select_all_countries(&self) -> bool {
        self.set_countries(self.known_countries.clone())
    }

    pub fn select_no_countries(&self) -> bool {
        self.set_countries(BTreeSet::new())
    }

    pub fn set_focus_year(&self, year: i32) -> bool {
        self.graph.set(&self.focus_year, year)
    }

    pub fn set_sort(&self, order: SortOrder) -> bool {
        self.graph.set(&self.sort, order)
    }
}

fn read_filter_state(graph: &Graph, cells: &FilterCells) -> Result<FilterState, RecomputeError> {
    Ok(FilterState {
        min_year: *graph.get(&cells.min_year)?,
        max_year: *graph.get(&cells.max_year)?,
        selected_countries: BTreeSet::clone(&*graph.get(&cells.countries)?),
    })
}

/// Reactive recomputation graph.
///
/// Input cells are written by the UI; derived cells are pure functions of
/// other cells and are recomputed lazily, only when read while stale.
///
/// ```text
///   min_year ─┐
///   max_year ─┼─▶ filtered ─┬─▶ mean_life_expectancy
///   countries ┘             ├─▶ mean_spending
///                           └─▶ frame ◀── sort
/// ```
///
/// Edges are recorded dynamically: every cell read during a recomputation
/// becomes a dependency of the cell being recomputed, replacing the edges
/// recorded on the previous run.

mod graph;

use std::marker::PhantomData;

use thiserror::Error;

use crate::data::filter::FilterError;

pub use graph::Graph;

// ---------------------------------------------------------------------------
// Cell identity and state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(usize);

/// Lifecycle of a derived cell. Input cells are always `Fresh`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Fresh,
    Stale,
    Computing,
}

// ---------------------------------------------------------------------------
// Typed handles
// ---------------------------------------------------------------------------

/// Anything that can be read from a [`Graph`] as a `T`.
pub trait Cell<T> {
    fn id(&self) -> CellId;
}

/// Handle to a value written from outside the graph.
#[derive(Debug)]
pub struct Input<T> {
    id: CellId,
    _marker: PhantomData<fn() -> T>,
}

/// Handle to a value computed from other cells.
#[derive(Debug)]
pub struct Derived<T> {
    id: CellId,
    _marker: PhantomData<fn() -> T>,
}

macro_rules! handle_impls {
    ($handle:ident) => {
        impl<T> $handle<T> {
            fn new(id: CellId) -> Self {
                $handle {
                    id,
                    _marker: PhantomData,
                }
            }
        }

        impl<T> Clone for $handle<T> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<T> Copy for $handle<T> {}

        impl<T> Cell<T> for $handle<T> {
            fn id(&self) -> CellId {
                self.id
            }
        }
    };
}

handle_impls!(Input);
handle_impls!(Derived);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure while bringing a derived cell up to date.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecomputeError {
    #[error("cell '{0}' depends on itself")]
    Cycle(String),
    #[error("cell '{0}' holds a value of a different type")]
    TypeMismatch(String),
    #[error("recomputing '{cell}' failed: {message}")]
    Failed { cell: String, message: String },
    #[error(transparent)]
    Filter(#[from] FilterError),
}

impl RecomputeError {
    pub fn failed(cell: &str, message: impl Into<String>) -> Self {
        RecomputeError::Failed {
            cell: cell.to_string(),
            message: message.into(),
        }
    }
}

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use super::{Cell, CellId, CellState, Derived, Input, RecomputeError};

type Value = Rc<dyn Any>;
type Recompute = Rc<dyn Fn(&Graph) -> Result<Value, RecomputeError>>;

enum Kind {
    Input(Value),
    Derived {
        recompute: Recompute,
        cached: Option<Value>,
    },
}

struct Node {
    name: String,
    kind: Kind,
    state: CellState,
    /// Cells read during the last recomputation.
    dependencies: BTreeSet<CellId>,
    /// Cells whose last recomputation read this one.
    dependents: BTreeSet<CellId>,
    invalidated_while_computing: bool,
    recomputations: u64,
}

/// A recomputation in progress and the cells it has read so far.
struct Frame {
    cell: CellId,
    reads: BTreeSet<CellId>,
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// Single-threaded dependency graph of input and derived cells.
///
/// Writes only mark dependents stale; work happens on read. Any number of
/// writes between two reads therefore cost one recomputation per affected
/// cell, computed from the final input values.
#[derive(Default)]
pub struct Graph {
    nodes: RefCell<Vec<Node>>,
    frames: RefCell<Vec<Frame>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an input cell holding `initial`.
    pub fn input<T: PartialEq + 'static>(&self, name: &str, initial: T) -> Input<T> {
        Input::new(self.push(name, Kind::Input(Rc::new(initial)), CellState::Fresh))
    }

    /// Register a derived cell. `recompute` reads its dependencies through
    /// the graph it is handed; those reads become the cell's edges.
    pub fn derived<T, F>(&self, name: &str, recompute: F) -> Derived<T>
    where
        T: 'static,
        F: Fn(&Graph) -> Result<T, RecomputeError> + 'static,
    {
        let recompute: Recompute =
            Rc::new(move |graph: &Graph| recompute(graph).map(|v| Rc::new(v) as Value));
        Derived::new(self.push(
            name,
            Kind::Derived {
                recompute,
                cached: None,
            },
            CellState::Stale,
        ))
    }

    fn push(&self, name: &str, kind: Kind, state: CellState) -> CellId {
        let mut nodes = self.nodes.borrow_mut();
        let id = CellId(nodes.len());
        nodes.push(Node {
            name: name.to_string(),
            kind,
            state,
            dependencies: BTreeSet::new(),
            dependents: BTreeSet::new(),
            invalidated_while_computing: false,
            recomputations: 0,
        });
        id
    }

    /// Read a cell, recomputing it first if it is stale.
    pub fn get<T: 'static>(&self, cell: &impl Cell<T>) -> Result<Rc<T>, RecomputeError> {
        let id = cell.id();
        self.value(id)?
            .downcast::<T>()
            .map_err(|_| RecomputeError::TypeMismatch(self.name_of(id)))
    }

    /// Write an input cell. Returns `false`, and invalidates nothing, when
    /// the new value equals the current one.
    pub fn set<T: PartialEq + 'static>(&self, input: &Input<T>, value: T) -> bool {
        let id = input.id();
        {
            let mut nodes = self.nodes.borrow_mut();
            let node = &mut nodes[id.0];
            let Kind::Input(current) = &mut node.kind else {
                return false;
            };
            if (**current).downcast_ref::<T>() == Some(&value) {
                return false;
            }
            *current = Rc::new(value);
            log::trace!("input '{}' changed", node.name);
        }
        self.invalidate_dependents(id);
        true
    }

    pub fn state<T>(&self, cell: &impl Cell<T>) -> CellState {
        self.nodes.borrow()[cell.id().0].state
    }

    /// How many times a derived cell has run its recomputation.
    pub fn recomputations<T>(&self, cell: &impl Cell<T>) -> u64 {
        self.nodes.borrow()[cell.id().0].recomputations
    }

    pub fn name<T>(&self, cell: &impl Cell<T>) -> String {
        self.name_of(cell.id())
    }

    fn name_of(&self, id: CellId) -> String {
        self.nodes.borrow()[id.0].name.clone()
    }

    // -- internals --

    fn value(&self, id: CellId) -> Result<Value, RecomputeError> {
        self.record_read(id);

        let recompute = {
            let mut nodes = self.nodes.borrow_mut();
            let node = &mut nodes[id.0];
            match (&node.kind, node.state) {
                (Kind::Input(value), _) => return Ok(value.clone()),
                (Kind::Derived { cached: Some(value), .. }, CellState::Fresh) => {
                    return Ok(value.clone())
                }
                (Kind::Derived { .. }, CellState::Computing) => {
                    return Err(RecomputeError::Cycle(node.name.clone()))
                }
                (Kind::Derived { recompute, .. }, _) => {
                    let recompute = recompute.clone();
                    node.state = CellState::Computing;
                    node.invalidated_while_computing = false;
                    recompute
                }
            }
        };

        // No borrow is held while user code runs: it may read other cells
        // (recursively recomputing them) or write inputs.
        self.frames.borrow_mut().push(Frame {
            cell: id,
            reads: BTreeSet::new(),
        });
        let outcome = recompute(self);
        let reads = self
            .frames
            .borrow_mut()
            .pop()
            .map(|frame| frame.reads)
            .unwrap_or_default();
        self.rewire(id, reads);

        let mut nodes = self.nodes.borrow_mut();
        let node = &mut nodes[id.0];
        node.recomputations += 1;
        let cache = match &outcome {
            Ok(value) if !node.invalidated_while_computing => {
                node.state = CellState::Fresh;
                log::debug!("recomputed '{}' (run {})", node.name, node.recomputations);
                Some(value.clone())
            }
            Ok(_) => {
                node.state = CellState::Stale;
                log::debug!("'{}' was invalidated while computing; left stale", node.name);
                None
            }
            Err(err) => {
                node.state = CellState::Stale;
                log::warn!("recomputing '{}' failed: {err}", node.name);
                None
            }
        };
        if let Kind::Derived { cached, .. } = &mut node.kind {
            *cached = cache;
        }
        outcome
    }

    fn record_read(&self, id: CellId) {
        if let Some(frame) = self.frames.borrow_mut().last_mut() {
            frame.reads.insert(id);
        }
    }

    /// Replace the edges of `id` with the cells read on its latest run.
    fn rewire(&self, id: CellId, mut reads: BTreeSet<CellId>) {
        reads.remove(&id);
        let mut nodes = self.nodes.borrow_mut();
        let previous = std::mem::take(&mut nodes[id.0].dependencies);
        for dep in previous.difference(&reads) {
            nodes[dep.0].dependents.remove(&id);
        }
        for dep in reads.difference(&previous) {
            nodes[dep.0].dependents.insert(id);
        }
        nodes[id.0].dependencies = reads;
    }

    /// Mark everything downstream of `changed` stale.
    fn invalidate_dependents(&self, changed: CellId) {
        let mut nodes = self.nodes.borrow_mut();
        let mut visited = BTreeSet::from([changed]);
        let mut pending: Vec<CellId> = nodes[changed.0].dependents.iter().copied().collect();

        while let Some(id) = pending.pop() {
            if !visited.insert(id) {
                continue;
            }
            let node = &mut nodes[id.0];
            match node.state {
                CellState::Fresh => {
                    node.state = CellState::Stale;
                    if let Kind::Derived { cached, .. } = &mut node.kind {
                        *cached = None;
                    }
                }
                CellState::Computing => node.invalidated_while_computing = true,
                CellState::Stale => {}
            }
            pending.extend(node.dependents.iter().copied());
        }

        // Cells mid-recomputation have not published their edges yet.
        // Innermost first, so an outer frame sees the inner cell it is reading.
        for frame in self.frames.borrow().iter().rev() {
            if frame.reads.iter().any(|r| visited.contains(r)) {
                nodes[frame.cell.0].invalidated_while_computing = true;
                visited.insert(frame.cell);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::OnceCell;

    use super::*;

    #[test]
    fn derived_cells_start_stale_and_become_fresh_on_read() {
        let g = Graph::new();
        let a = g.input("a", 2);
        let double = g.derived("double", move |g| Ok(*g.get(&a)? * 2));

        assert_eq!(g.state(&double), CellState::Stale);
        assert_eq!(g.recomputations(&double), 0);

        assert_eq!(*g.get(&double).unwrap(), 4);
        assert_eq!(g.state(&double), CellState::Fresh);
        assert_eq!(g.recomputations(&double), 1);
        assert_eq!(g.name(&double), "double");
    }

    #[test]
    fn rereading_a_fresh_cell_returns_the_cached_value() {
        let g = Graph::new();
        let a = g.input("a", vec![1, 2, 3]);
        let total = g.derived("total", move |g| Ok(g.get(&a)?.iter().sum::<i32>()));

        let first = g.get(&total).unwrap();
        let second = g.get(&total).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(g.recomputations(&total), 1);
    }

    #[test]
    fn several_writes_before_a_read_cost_one_recomputation() {
        let g = Graph::new();
        let min = g.input("min_year", 1970);
        let max = g.input("max_year", 2020);
        let span = g.derived("span", move |g| Ok(*g.get(&max)? - *g.get(&min)?));

        assert_eq!(*g.get(&span).unwrap(), 50);

        assert!(g.set(&min, 2000));
        assert!(g.set(&max, 2010));
        assert_eq!(g.state(&span), CellState::Stale);

        assert_eq!(*g.get(&span).unwrap(), 10);
        assert_eq!(g.recomputations(&span), 2);
    }

    #[test]
    fn writing_an_equal_value_invalidates_nothing() {
        let g = Graph::new();
        let a = g.input("a", 5);
        let b = g.derived("b", move |g| Ok(*g.get(&a)? + 1));
        g.get(&b).unwrap();

        assert!(!g.set(&a, 5));
        assert_eq!(g.state(&b), CellState::Fresh);
        g.get(&b).unwrap();
        assert_eq!(g.recomputations(&b), 1);
    }

    #[test]
    fn invalidation_is_transitive() {
        let g = Graph::new();
        let a = g.input("a", 1);
        let double = g.derived("double", move |g| Ok(*g.get(&a)? * 2));
        let plus_one = g.derived("plus_one", move |g| Ok(*g.get(&double)? + 1));

        assert_eq!(*g.get(&plus_one).unwrap(), 3);
        g.set(&a, 10);
        assert_eq!(g.state(&double), CellState::Stale);
        assert_eq!(g.state(&plus_one), CellState::Stale);

        assert_eq!(*g.get(&plus_one).unwrap(), 21);
        assert_eq!(g.recomputations(&double), 2);
        assert_eq!(g.recomputations(&plus_one), 2);
    }

    #[test]
    fn unobserved_cells_are_not_recomputed() {
        let g = Graph::new();
        let a = g.input("a", 1);
        let left = g.derived("left", move |g| Ok(*g.get(&a)? - 1));
        let right = g.derived("right", move |g| Ok(*g.get(&a)? + 1));
        g.get(&left).unwrap();
        g.get(&right).unwrap();

        g.set(&a, 7);
        assert_eq!(*g.get(&left).unwrap(), 6);
        assert_eq!(g.recomputations(&left), 2);
        assert_eq!(g.recomputations(&right), 1);
        assert_eq!(g.state(&right), CellState::Stale);
    }

    #[test]
    fn failed_recomputation_stays_stale_and_retries() {
        let g = Graph::new();
        let a = g.input("a", 4.0_f64);
        let root = g.derived("sqrt", move |g| {
            let v = *g.get(&a)?;
            if v < 0.0 {
                return Err(RecomputeError::failed("sqrt", "negative input"));
            }
            Ok(v.sqrt())
        });
        let label = g.derived("label", move |g| Ok(format!("{:.1}", g.get(&root)?)));

        assert_eq!(*g.get(&label).unwrap(), "2.0");

        g.set(&a, -1.0);
        let err = g.get(&label).unwrap_err();
        assert_eq!(err, RecomputeError::failed("sqrt", "negative input"));
        assert_eq!(g.state(&root), CellState::Stale);
        assert_eq!(g.state(&label), CellState::Stale);

        // Retried from scratch on the next read.
        assert!(g.get(&root).is_err());
        assert_eq!(g.recomputations(&root), 3);

        g.set(&a, 9.0);
        assert_eq!(*g.get(&label).unwrap(), "3.0");
        assert_eq!(g.state(&label), CellState::Fresh);
    }

    #[test]
    fn self_dependency_is_reported_as_a_cycle() {
        let g = Graph::new();
        let slot: Rc<OnceCell<Derived<i32>>> = Rc::new(OnceCell::new());
        let me = slot.clone();
        let looping = g.derived("loop", move |g| {
            let this = me
                .get()
                .ok_or_else(|| RecomputeError::failed("loop", "unset"))?;
            Ok(*g.get(this)? + 1)
        });
        assert!(slot.set(looping).is_ok());

        assert_eq!(
            g.get(&looping).unwrap_err(),
            RecomputeError::Cycle("loop".to_string())
        );
        assert_eq!(g.state(&looping), CellState::Stale);
    }

    #[test]
    fn edges_follow_the_latest_run() {
        let g = Graph::new();
        let use_a = g.input("use_a", true);
        let a = g.input("a", 1);
        let b = g.input("b", 100);
        let pick = g.derived("pick", move |g| {
            if *g.get(&use_a)? {
                Ok(*g.get(&a)?)
            } else {
                Ok(*g.get(&b)?)
            }
        });

        assert_eq!(*g.get(&pick).unwrap(), 1);
        g.set(&b, 200);
        assert_eq!(g.state(&pick), CellState::Fresh);

        g.set(&use_a, false);
        assert_eq!(*g.get(&pick).unwrap(), 200);
        g.set(&a, 2);
        assert_eq!(g.state(&pick), CellState::Fresh);
        assert_eq!(g.recomputations(&pick), 2);
    }

    #[test]
    fn write_during_recomputation_leaves_the_cell_stale() {
        let g = Graph::new();
        let a = g.input("a", 0);
        let echo = g.derived("echo", move |g| {
            let v = *g.get(&a)?;
            if v == 0 {
                g.set(&a, 1);
            }
            Ok(v)
        });

        assert_eq!(*g.get(&echo).unwrap(), 0);
        assert_eq!(g.state(&echo), CellState::Stale);

        assert_eq!(*g.get(&echo).unwrap(), 1);
        assert_eq!(g.state(&echo), CellState::Fresh);
        assert_eq!(g.recomputations(&echo), 2);
    }
}

/// egui rendering layer. Widgets read derived cells and write input cells;
/// they never filter or aggregate themselves.
pub mod grid;
pub mod panels;
pub mod plot;
pub mod summary;

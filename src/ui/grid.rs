use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column as GridColumn, TableBuilder};

use crate::data::model::Column;
use crate::present::{error_text, Grid, Views};
use crate::state::{DashboardState, SortOrder};

/// Tabs of the data card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    /// Filtered rows, sortable by header click.
    #[default]
    Frame,
    /// The complete dataset.
    Table,
}

// ---------------------------------------------------------------------------
// Data card: "Data frame" and "Table" tabs
// ---------------------------------------------------------------------------

pub fn data_card(ui: &mut Ui, tab: &mut Tab, state: &DashboardState, views: &Views) {
    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(tab, Tab::Frame, "Data frame");
        ui.selectable_value(tab, Tab::Table, "Table");
    });
    ui.separator();

    match *tab {
        Tab::Frame => {
            let order = state
                .graph()
                .get(&state.sort)
                .map(|o| *o)
                .unwrap_or_default();
            match state.graph().get(&views.frame_grid) {
                Ok(grid) => {
                    let clicked = ui
                        .push_id("frame_grid", |ui: &mut Ui| grid_table(ui, &grid, Some(order)))
                        .inner;
                    // The grid above was drawn with the old order.
                    if let Some(column) = clicked {
                        if state.set_sort(order.toggled(column)) {
                            ui.ctx().request_repaint();
                        }
                    }
                }
                Err(e) => {
                    ui.label(RichText::new(error_text(&e)).color(Color32::RED));
                }
            }
        }
        Tab::Table => match state.graph().get(&views.table_grid) {
            Ok(grid) => {
                ui.push_id("table_grid", |ui: &mut Ui| grid_table(ui, &grid, None));
            }
            Err(e) => {
                ui.label(RichText::new(error_text(&e)).color(Color32::RED));
            }
        },
    }
}

/// Draw a text grid. With `order`, headers are buttons and the clicked
/// column is returned.
fn grid_table(ui: &mut Ui, grid: &Grid, order: Option<SortOrder>) -> Option<Column> {
    let mut clicked = None;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .columns(GridColumn::remainder().at_least(80.0), grid.columns.len())
        .header(22.0, |mut header| {
            for &column in &grid.columns {
                header.col(|ui: &mut Ui| match order {
                    Some(order) => {
                        let mut text = column.header().to_string();
                        if order.column == Some(column) {
                            text.push_str(if order.ascending { " ▲" } else { " ▼" });
                        }
                        if ui.button(RichText::new(text).strong()).clicked() {
                            clicked = Some(column);
                        }
                    }
                    None => {
                        ui.strong(column.header());
                    }
                });
            }
        })
        .body(|body| {
            body.rows(18.0, grid.rows.len(), |mut row| {
                let cells = &grid.rows[row.index()];
                for cell in cells {
                    row.col(|ui: &mut Ui| {
                        ui.label(cell.as_str());
                    });
                }
            });
        });

    clicked
}

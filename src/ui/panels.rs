use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::app::DashboardApp;
use crate::config::DashboardConfig;
use crate::present::error_text;
use crate::state::DashboardState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the sidebar. Control changes are written straight into the
/// input cells; dependents recompute when the central panel reads them.
/// A changing write asks for another frame so panels drawn earlier catch up.
pub fn side_panel(ui: &mut Ui, state: &DashboardState, config: &DashboardConfig) {
    ui.heading(config.subtitle.as_str());
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.label(config.description.as_str());
            ui.add_space(8.0);

            let mut changed = false;
            let filters = match state.filter_state() {
                Ok(filters) => filters,
                Err(e) => {
                    ui.label(RichText::new(error_text(&e)).color(Color32::RED));
                    return;
                }
            };

            // ---- Year range ----
            ui.strong("Select the year range below:");
            let (first, last) = state.year_span();

            let mut min_year = filters.min_year;
            if ui
                .add(egui::Slider::new(&mut min_year, first..=last).text("Min Year"))
                .changed()
            {
                changed |= state.set_min_year(min_year);
            }
            let mut max_year = filters.max_year;
            if ui
                .add(egui::Slider::new(&mut max_year, first..=last).text("Max Year"))
                .changed()
            {
                changed |= state.set_max_year(max_year);
            }

            // ---- Focus year, bounded by the selected range ----
            if let Ok(focus) = state.graph().get(&state.clamped_focus_year) {
                let mut focus = *focus;
                let (lo, hi) = (filters.min_year, filters.max_year.max(filters.min_year));
                if ui
                    .add(egui::Slider::new(&mut focus, lo..=hi).text("Highlight Year"))
                    .changed()
                {
                    changed |= state.set_focus_year(focus);
                }
            }
            ui.separator();

            // ---- Countries ----
            let n_selected = filters.selected_countries.len();
            let n_total = state.known_countries().len();
            ui.strong(format!("Country  ({n_selected}/{n_total})"));
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    changed |= state.select_all_countries();
                }
                if ui.small_button("None").clicked() {
                    changed |= state.select_no_countries();
                }
            });

            for country in state.known_countries() {
                let mut checked = filters.selected_countries.contains(country);
                if ui.checkbox(&mut checked, country.as_str()).changed() {
                    match state.toggle_country(country) {
                        Ok(toggled) => changed |= toggled,
                        Err(e) => log::error!("Failed to toggle '{country}': {e}"),
                    }
                }
            }
            ui.separator();

            if changed {
                ui.ctx().request_repaint();
            }

            // ---- Links ----
            ui.hyperlink_to("GitHub Source", &config.source_url);
            ui.hyperlink_to("GitHub App", &config.app_url);
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, app: &mut DashboardApp) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(app);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.strong(app.config.title.as_str());
        ui.separator();

        let state = &app.state;
        match state.filtered() {
            Ok(view) => {
                ui.label(format!(
                    "{} rows loaded, {} visible",
                    state.base().len(),
                    view.len()
                ));
            }
            Err(e) => {
                ui.label(RichText::new(error_text(&e)).color(Color32::RED));
            }
        }

        if let Some(msg) = &app.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

/// Replace the session with a dataset picked by the user. The current
/// dashboard is kept if loading fails.
pub fn open_file_dialog(app: &mut DashboardApp) {
    let file = rfd::FileDialog::new()
        .set_title("Open expenditure data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(table) => {
                log::info!(
                    "Opened {} with {} rows and countries {:?}",
                    path.display(),
                    table.len(),
                    table.countries()
                );
                app.replace_dataset(table);
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                app.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::stats::Measure;
use crate::present::{error_text, format_mean};
use crate::state::DashboardState;

// ---------------------------------------------------------------------------
// Value boxes
// ---------------------------------------------------------------------------

const BOX_FILL: Color32 = Color32::from_rgb(0xD8, 0xBF, 0xD8);

/// Two value boxes side by side: mean life expectancy and mean spending.
pub fn value_boxes(ui: &mut Ui, state: &DashboardState) {
    ui.columns(2, |columns: &mut [Ui]| {
        value_box(&mut columns[0], state, Measure::LifeExpectancy, "♥");
        value_box(&mut columns[1], state, Measure::SpendingUsd, "$");
    });
}

fn value_box(ui: &mut Ui, state: &DashboardState, measure: Measure, icon: &str) {
    egui::Frame::group(ui.style())
        .fill(BOX_FILL)
        .inner_margin(12.0)
        .show(ui, |ui: &mut Ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui: &mut Ui| {
                ui.label(RichText::new(icon).size(32.0).color(Color32::BLACK));
                ui.vertical(|ui: &mut Ui| {
                    ui.label(RichText::new(measure.label()).color(Color32::BLACK));
                    let value = match state.mean(measure) {
                        Ok(mean) => RichText::new(format_mean(*mean))
                            .size(28.0)
                            .strong()
                            .color(Color32::BLACK),
                        Err(e) => RichText::new(error_text(&e)).color(Color32::DARK_RED),
                    };
                    ui.label(value);
                });
            });
        });
}

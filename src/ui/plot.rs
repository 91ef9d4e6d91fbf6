use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Legend, MarkerShape, Plot, PlotPoints, Points};

use crate::color::ColorMap;
use crate::present::{error_text, Views};
use crate::state::DashboardState;

// ---------------------------------------------------------------------------
// Scatter plot (central panel)
// ---------------------------------------------------------------------------

/// Spending against life expectancy, one series per country. Points of the
/// highlighted year are drawn larger.
pub fn scatter_plot(ui: &mut Ui, state: &DashboardState, views: &Views, colors: &ColorMap) {
    let series = match state.graph().get(&views.scatter) {
        Ok(series) => series,
        Err(e) => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.label(RichText::new(error_text(&e)).color(Color32::RED));
            });
            return;
        }
    };
    if series.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No rows match the current filters");
        });
        return;
    }

    let focus = state.graph().get(&state.clamped_focus_year).ok().map(|y| *y);

    Plot::new("scatter_plot")
        .legend(Legend::default())
        .x_axis_label("Spending_USD")
        .y_axis_label("Life_Expectancy")
        .label_formatter(|name, value| {
            if name.is_empty() {
                String::new()
            } else {
                format!("{name}\nspending: ${:.0}\nlife expectancy: {:.1}", value.x, value.y)
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for s in series.iter() {
                let color = colors.color_for(&s.country);

                plot_ui.points(
                    Points::new(PlotPoints::new(s.points.clone()))
                        .name(&s.country)
                        .color(color)
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(3.0),
                );

                let highlighted: Vec<[f64; 2]> = s
                    .points
                    .iter()
                    .zip(&s.years)
                    .filter(|(_, year)| Some(**year) == focus)
                    .map(|(p, _)| *p)
                    .collect();
                if !highlighted.is_empty() {
                    plot_ui.points(
                        Points::new(PlotPoints::new(highlighted))
                            .name(&s.country)
                            .color(color)
                            .shape(MarkerShape::Diamond)
                            .filled(true)
                            .radius(7.0),
                    );
                }
            }
        });
}

use eframe::egui;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::model::Table;
use crate::present::Views;
use crate::state::DashboardState;
use crate::ui::grid::{self, Tab};
use crate::ui::{panels, plot, summary};

const SIDEBAR_FILL: egui::Color32 = egui::Color32::from_rgb(0xD8, 0xBF, 0xD8);

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub config: DashboardConfig,
    pub state: DashboardState,
    pub views: Views,
    pub colors: ColorMap,
    pub tab: Tab,
    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl DashboardApp {
    pub fn new(config: DashboardConfig, table: Table) -> Self {
        let state = DashboardState::new(table);
        let views = Views::register(&state);
        let colors = ColorMap::new(state.known_countries());
        Self {
            config,
            state,
            views,
            colors,
            tab: Tab::default(),
            status_message: None,
        }
    }

    /// Start a new session over another dataset; filters reset to "everything".
    pub fn replace_dataset(&mut self, table: Table) {
        self.state = DashboardState::new(table);
        self.views = Views::register(&self.state);
        self.colors = ColorMap::new(self.state.known_countries());
        self.status_message = None;
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, self);
        });

        // ---- Left side panel: filters ----
        // Writes here can land after the top bar already read `filtered`;
        // the sidebar requests a repaint so the next frame shows them.
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .frame(egui::Frame::side_top_panel(&ctx.style()).fill(SIDEBAR_FILL))
            .show(ctx, |ui| {
                panels::side_panel(ui, &self.state, &self.config);
            });

        // ---- Bottom panel: data tabs ----
        egui::TopBottomPanel::bottom("data_card")
            .resizable(true)
            .default_height(280.0)
            .show(ctx, |ui| {
                grid::data_card(ui, &mut self.tab, &self.state, &self.views);
            });

        // ---- Central panel: value boxes and scatter plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            summary::value_boxes(ui, &self.state);
            ui.add_space(8.0);
            plot::scatter_plot(ui, &self.state, &self.views, &self.colors);
        });
    }
}

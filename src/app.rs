use std::sync::Arc;

use eframe::egui;

use crate::data::model::Dataset;
use crate::forecast::TrendPredictor;
use crate::state::{ArtifactBoard, Dashboard};
use crate::ui::{panels, plot, table};

/// Which page the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Dashboard,
    RidesTable,
}

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

/// Application context: built once in `main`, handed to every panel.
pub struct RustyRidesApp {
    pub dashboard: Dashboard,
    pub board: ArtifactBoard,
    pub page: Page,
    /// Zero-based page of the rides table.
    pub table_page: usize,
    pub page_size: usize,
    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl RustyRidesApp {
    /// Build the dashboard over `dataset` and publish the initial artifacts.
    pub fn new(dataset: Arc<Dataset>, page_size: usize) -> Self {
        let mut dashboard = Dashboard::new(dataset, Box::new(TrendPredictor::default()));
        let mut board = ArtifactBoard::default();
        dashboard.refresh(&mut board);

        Self {
            dashboard,
            board,
            page: Page::default(),
            table_page: 0,
            page_size,
            status_message: None,
        }
    }
}

impl eframe::App for RustyRidesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar + navigation ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, self);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, self);
            });

        // ---- Central panel: current page ----
        egui::CentralPanel::default().show(ctx, |ui| match self.page {
            Page::Dashboard => plot::dashboard_page(ui, &self.board),
            Page::RidesTable => table::rides_table(ui, self),
        });
    }
}

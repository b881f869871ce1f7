use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, Ui};

use crate::app::{Page, RustyRidesApp};
use crate::data::filter::{Choice, FilteredView, HourRange};
use crate::data::loader::load_file;
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the filter controls. Each widget reads its current value from the
/// dashboard and calls the matching setter only when the user changes it.
pub fn side_panel(ui: &mut Ui, app: &mut RustyRidesApp) {
    ui.heading("Filters");
    ui.separator();

    let dataset = Arc::clone(app.dashboard.dataset());
    let selection = app.dashboard.selection().clone();

    // ---- Booking status ----
    ui.strong("Booking Status");
    let mut status = selection.status.clone();
    egui::ComboBox::from_id_salt("status_select")
        .selected_text(status.to_string())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut status, Choice::All, "All");
            for s in dataset.statuses() {
                ui.selectable_value(&mut status, Choice::Only(s.clone()), s.as_str());
            }
        });
    if status != selection.status {
        app.dashboard.set_status(status, &mut app.board);
    }
    ui.add_space(6.0);

    // ---- Vehicle type ----
    ui.strong("Vehicle Type");
    let mut vehicle = selection.vehicle.clone();
    egui::ComboBox::from_id_salt("vehicle_select")
        .selected_text(vehicle.to_string())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut vehicle, Choice::All, "All");
            for v in dataset.vehicle_types() {
                ui.selectable_value(&mut vehicle, Choice::Only(v.clone()), v.as_str());
            }
        });
    if vehicle != selection.vehicle {
        app.dashboard.set_vehicle(vehicle, &mut app.board);
    }
    ui.add_space(6.0);

    // ---- Hour of day ----
    ui.strong("Hour of Day");
    let (old_start, old_end) = (selection.hours.start(), selection.hours.end());
    let mut start = old_start;
    let mut end = old_end;
    ui.add(egui::Slider::new(&mut start, 0..=23).text("from"));
    ui.add(egui::Slider::new(&mut end, 0..=23).text("to"));

    if (start, end) != (old_start, old_end) {
        let (start, end) = ordered_hours(start, end, start != old_start);
        match HourRange::new(start, end) {
            Ok(hours) => app.dashboard.set_hours(hours, &mut app.board),
            Err(e) => log::warn!("ignoring hour selection: {e}"),
        }
    }
}

fn rides_label(dataset: &Dataset, view: &FilteredView<'_>) -> String {
    if dataset.is_empty() {
        "No rides loaded".to_string()
    } else if view.is_empty() {
        format!("{} rides loaded, none match the filters", dataset.len())
    } else {
        format!("{} rides loaded, {} visible", dataset.len(), view.len())
    }
}

/// Keep `start <= end` by dragging the other handle along with the one that moved.
fn ordered_hours(start: u8, end: u8, start_moved: bool) -> (u8, u8) {
    if start <= end {
        (start, end)
    } else if start_moved {
        (start, start)
    } else {
        (end, end)
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, app: &mut RustyRidesApp) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(app);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.selectable_value(&mut app.page, Page::Dashboard, "Dashboard");
        ui.selectable_value(&mut app.page, Page::RidesTable, "Rides Table");

        ui.separator();

        ui.label(rides_label(app.dashboard.dataset(), &app.dashboard.view()));

        if let Some(msg) = &app.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(app: &mut RustyRidesApp) {
    let file = rfd::FileDialog::new()
        .set_title("Open ride bookings")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = reload(app, &path) {
            log::error!("Failed to load file: {e:#}");
            app.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

/// Load `path` and swap it in; the current dataset stays on failure.
fn reload(app: &mut RustyRidesApp, path: &Path) -> Result<()> {
    let dataset = load_file(path).with_context(|| format!("loading {}", path.display()))?;
    log::info!(
        "Loaded {} rides from {} (vehicle types {:?})",
        dataset.len(),
        path.display(),
        dataset.vehicle_types()
    );

    app.dashboard.replace_dataset(Arc::new(dataset), &mut app.board);
    app.table_page = 0;
    app.status_message = None;
    Ok(())
}

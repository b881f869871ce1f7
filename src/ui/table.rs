use std::ops::Range;
use std::sync::Arc;

use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::app::RustyRidesApp;
use crate::data::model::Booking;

/// Columns shown in the rides table, a reduced view of the CSV.
const TABLE_COLUMNS: [&str; 8] = [
    "Date",
    "Booking Status",
    "Vehicle Type",
    "Pickup Location",
    "Drop Location",
    "Ride Distance",
    "Driver Ratings",
    "Payment Method",
];

const ROW_HEIGHT: f32 = 18.0;

/// Number of pages needed for `total` rows (at least one, even when empty).
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// Row range of `page`, clamped to the data.
pub fn page_bounds(total: usize, page_size: usize, page: usize) -> Range<usize> {
    let page_size = page_size.max(1);
    let start = page.saturating_mul(page_size).min(total);
    start..(start + page_size).min(total)
}

fn optional(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_default()
}

fn table_cells(b: &Booking) -> [String; 8] {
    [
        b.date.to_string(),
        b.status.to_string(),
        b.vehicle_type.clone(),
        b.pickup_location.clone(),
        b.drop_location.clone(),
        optional(b.ride_distance),
        optional(b.driver_rating),
        b.payment_method.clone().unwrap_or_default(),
    ]
}

/// Paginated table over every loaded booking.
pub fn rides_table(ui: &mut Ui, app: &mut RustyRidesApp) {
    let dataset = Arc::clone(app.dashboard.dataset());
    let total = dataset.len();
    let pages = page_count(total, app.page_size);
    app.table_page = app.table_page.min(pages - 1);

    ui.heading("Detailed Ride Table");
    ui.horizontal(|ui: &mut Ui| {
        if ui
            .add_enabled(app.table_page > 0, egui::Button::new("◀ Prev"))
            .clicked()
        {
            app.table_page -= 1;
        }
        ui.label(format!("Page {} of {pages}", app.table_page + 1));
        if ui
            .add_enabled(app.table_page + 1 < pages, egui::Button::new("Next ▶"))
            .clicked()
        {
            app.table_page += 1;
        }
        ui.weak(format!("{total} rides"));
    });
    ui.separator();

    let rows = &dataset.bookings()[page_bounds(total, app.page_size, app.table_page)];

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .columns(Column::auto().at_least(80.0), TABLE_COLUMNS.len())
        .header(20.0, |mut header| {
            for name in TABLE_COLUMNS {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                let booking = &rows[row.index()];
                for cell in table_cells(booking) {
                    row.col(|ui| {
                        ui.label(cell);
                    });
                }
            });
        });
}

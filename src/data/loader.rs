use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use super::model::{Booking, BookingStatus, Dataset};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("row {row}, column '{column}': cannot parse '{value}' ({reason})")]
    Parse {
        row: usize,
        column: &'static str,
        value: String,
        reason: String,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

const DATE: &str = "Date";
const TIME: &str = "Time";
const BOOKING_ID: &str = "Booking ID";
const STATUS: &str = "Booking Status";
const CUSTOMER_ID: &str = "Customer ID";
const VEHICLE: &str = "Vehicle Type";
const PICKUP: &str = "Pickup Location";
const DROP: &str = "Drop Location";
const DISTANCE: &str = "Ride Distance";
const DRIVER_RATING: &str = "Driver Ratings";
const CUSTOMER_RATING: &str = "Customer Rating";
const PAYMENT: &str = "Payment Method";

/// Columns the dashboard needs; any others in the file are ignored.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    DATE,
    TIME,
    BOOKING_ID,
    STATUS,
    CUSTOMER_ID,
    VEHICLE,
    PICKUP,
    DROP,
    DISTANCE,
    DRIVER_RATING,
    CUSTOMER_RATING,
    PAYMENT,
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d-%m-%Y", "%m/%d/%Y", "%d/%m/%Y"];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// Spellings of a missing cell in the exports we've seen.
const ABSENT: [&str; 6] = ["", "null", "NULL", "NaN", "nan", "None"];

/// Position of each required column in the header row.
struct ColumnIndex([usize; 12]);

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, LoadError> {
        let mut positions = [0usize; 12];
        let mut missing = Vec::new();

        for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            match headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
            {
                Some(idx) => *slot = idx,
                None => missing.push(name.to_string()),
            }
        }

        if missing.is_empty() {
            Ok(ColumnIndex(positions))
        } else {
            Err(LoadError::Schema { missing })
        }
    }

    fn of(&self, column: &str) -> usize {
        let slot = REQUIRED_COLUMNS
            .iter()
            .position(|c| *c == column)
            .unwrap_or_default();
        self.0[slot]
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the bookings CSV at `path`.
///
/// The first row that fails to parse aborts the load with
/// [`LoadError::Parse`]; no rows are silently dropped.
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_from_reader(file)
}

/// Load bookings from any CSV byte source (header row required).
pub fn load_from_reader<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = ColumnIndex::from_headers(reader.headers()?)?;
    let records = reader.records().collect::<Result<Vec<_>, _>>()?;
    let date_format = infer_date_format(&records, &columns);

    let mut bookings = Vec::with_capacity(records.len());
    for (row_no, record) in records.iter().enumerate() {
        // Row numbers are 1-based and count the header, like a spreadsheet.
        bookings.push(parse_row(record, &columns, date_format, row_no + 2)?);
    }

    Ok(Dataset::from_bookings(bookings))
}

// ---------------------------------------------------------------------------
// Row parsing
// ---------------------------------------------------------------------------

struct Row<'a> {
    record: &'a csv::StringRecord,
    columns: &'a ColumnIndex,
    row: usize,
}

/// Cell text with stray surrounding quotes removed.
fn cell<'r>(record: &'r csv::StringRecord, columns: &ColumnIndex, column: &str) -> &'r str {
    let raw = record.get(columns.of(column)).unwrap_or("");
    raw.trim_matches('"').trim()
}

impl Row<'_> {
    fn cell(&self, column: &'static str) -> &str {
        cell(self.record, self.columns, column)
    }

    fn optional(&self, column: &'static str) -> Option<&str> {
        let value = self.cell(column);
        (!ABSENT.contains(&value)).then_some(value)
    }

    fn required(&self, column: &'static str) -> Result<&str, LoadError> {
        self.optional(column)
            .ok_or_else(|| self.error(column, self.cell(column), "value is missing"))
    }

    fn optional_f64(&self, column: &'static str) -> Result<Option<f64>, LoadError> {
        self.optional(column)
            .map(|s| {
                s.parse::<f64>()
                    .map_err(|e| self.error(column, s, &e.to_string()))
            })
            .transpose()
    }

    fn error(&self, column: &'static str, value: &str, reason: &str) -> LoadError {
        LoadError::Parse {
            row: self.row,
            column,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

fn parse_row(
    record: &csv::StringRecord,
    columns: &ColumnIndex,
    date_format: Option<&str>,
    row: usize,
) -> Result<Booking, LoadError> {
    let r = Row { record, columns, row };

    let date_text = r.required(DATE)?;
    let date = date_format
        .and_then(|fmt| NaiveDate::parse_from_str(date_text, fmt).ok())
        .ok_or_else(|| match date_format {
            Some(fmt) => r.error(
                DATE,
                date_text,
                &format!("does not match the file's date format {fmt}"),
            ),
            None => r.error(DATE, date_text, "unrecognised date format"),
        })?;
    let time_text = r.required(TIME)?;
    let time = parse_time(time_text)
        .ok_or_else(|| r.error(TIME, time_text, "unrecognised time format"))?;

    let ride_distance = r.optional_f64(DISTANCE)?;
    if let Some(d) = ride_distance {
        if !d.is_finite() || d < 0.0 {
            return Err(r.error(DISTANCE, r.cell(DISTANCE), "distance must be non-negative"));
        }
    }

    let status = BookingStatus::from(r.required(STATUS)?);

    Ok(Booking {
        date,
        time,
        booking_id: r.cell(BOOKING_ID).to_string(),
        status,
        customer_id: r.cell(CUSTOMER_ID).to_string(),
        vehicle_type: r.required(VEHICLE)?.to_string(),
        pickup_location: r.cell(PICKUP).to_string(),
        drop_location: r.cell(DROP).to_string(),
        ride_distance,
        driver_rating: r.optional_f64(DRIVER_RATING)?,
        customer_rating: r.optional_f64(CUSTOMER_RATING)?,
        payment_method: r.optional(PAYMENT).map(str::to_string),
        pickup: date.and_time(time),
    })
}

fn date_formats_for(s: &str) -> impl Iterator<Item = &'static str> + '_ {
    DATE_FORMATS
        .into_iter()
        .filter(move |fmt| NaiveDate::parse_from_str(s, fmt).is_ok())
}

/// One date format for the whole column.
///
/// The first date that only one format can read decides it; if every date is
/// ambiguous, the first format that reads the first parseable date wins.
/// `None` when no date in the file parses at all.
fn infer_date_format(
    records: &[csv::StringRecord],
    columns: &ColumnIndex,
) -> Option<&'static str> {
    let mut fallback = None;
    for record in records {
        let mut candidates = date_formats_for(cell(record, columns, DATE));
        let Some(first) = candidates.next() else {
            continue;
        };
        if candidates.next().is_none() {
            return Some(first);
        }
        fallback.get_or_insert(first);
    }
    fallback
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const HEADER: &str = "Date,Time,Booking ID,Booking Status,Customer ID,Vehicle Type,\
Pickup Location,Drop Location,Avg VTAT,Ride Distance,Driver Ratings,Customer Rating,Payment Method";

    fn csv_with(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    #[test]
    fn loads_rows_and_derives_hour() {
        let text = csv_with(&[
            r#"2024-03-23,12:29:38,"""CNR5884300""",No Driver Found,"""CID1982111""",eBike,Palam Vihar,Jhilmil,null,null,null,null,null"#,
            r#"2024-11-29,18:01:39,"""CNR1326809""",Incomplete,"""CID4604802""",Go Sedan,Shastri Nagar,Gurgaon Sector 56,4.9,5.73,4.1,4.4,UPI"#,
        ]);

        let ds = load_from_reader(text.as_bytes()).unwrap();

        assert_eq!(ds.len(), 2);
        let first = &ds.bookings()[0];
        assert_eq!(first.booking_id, "CNR5884300");
        assert_eq!(first.status, BookingStatus::NoDriverFound);
        assert_eq!(first.ride_distance, None);
        assert_eq!(first.payment_method, None);
        assert_eq!(first.hour(), 12);

        let second = &ds.bookings()[1];
        assert_eq!(second.ride_distance, Some(5.73));
        assert_eq!(second.driver_rating, Some(4.1));
        assert_eq!(second.hour(), 18);
        assert_eq!(ds.vehicle_types(), &["eBike".to_string(), "Go Sedan".to_string()]);
    }

    #[test]
    fn missing_columns_are_all_reported() {
        let text = "Date,Time,Booking Status\n2024-01-01,10:00:00,Complete";
        match load_from_reader(text.as_bytes()) {
            Err(LoadError::Schema { missing }) => {
                assert_eq!(missing.len(), 9);
                assert!(missing.contains(&"Vehicle Type".to_string()));
                assert!(missing.contains(&"Payment Method".to_string()));
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_time_rejects_the_load() {
        let text = csv_with(&[
            "2024-03-23,12:29:38,A,Complete,C,Auto,X,Y,1,2.0,4,4,Cash",
            "2024-03-23,25:99,B,Complete,C,Auto,X,Y,1,2.0,4,4,Cash",
        ]);
        match load_from_reader(text.as_bytes()) {
            Err(LoadError::Parse { row, column, .. }) => {
                assert_eq!(row, 3);
                assert_eq!(column, "Time");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn negative_distance_is_a_parse_error() {
        let text = csv_with(&["2024-03-23,08:00,A,Complete,C,Auto,X,Y,1,-3,4,4,Cash"]);
        assert!(matches!(
            load_from_reader(text.as_bytes()),
            Err(LoadError::Parse { column: "Ride Distance", .. })
        ));
    }

    #[test]
    fn alternate_date_formats_are_accepted() {
        let text = csv_with(&["11/29/2024,07:05,A,Complete,C,Auto,X,Y,1,3,4,4,Cash"]);
        let ds = load_from_reader(text.as_bytes()).unwrap();
        assert_eq!(
            ds.bookings()[0].date,
            NaiveDate::from_ymd_opt(2024, 11, 29).unwrap()
        );
        assert_eq!(ds.bookings()[0].hour(), 7);
    }

    #[test]
    fn day_first_column_is_read_day_first_throughout() {
        let text = csv_with(&[
            "05/03/2024,07:05,A,Complete,C,Auto,X,Y,1,3,4,4,Cash",
            "13/03/2024,08:05,B,Complete,C,Auto,X,Y,1,3,4,4,Cash",
        ]);
        let ds = load_from_reader(text.as_bytes()).unwrap();
        let dates: Vec<_> = ds.bookings().iter().map(|b| b.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 13).unwrap(),
            ]
        );
    }

    #[test]
    fn ambiguous_dates_default_to_month_first() {
        let text = csv_with(&["05/03/2024,07:05,A,Complete,C,Auto,X,Y,1,3,4,4,Cash"]);
        let ds = load_from_reader(text.as_bytes()).unwrap();
        assert_eq!(
            ds.bookings()[0].date,
            NaiveDate::from_ymd_opt(2024, 5, 3).unwrap()
        );
    }

    #[test]
    fn mixed_date_formats_reject_the_load() {
        let text = csv_with(&[
            "2024-03-05,07:05,A,Complete,C,Auto,X,Y,1,3,4,4,Cash",
            "13/03/2024,08:05,B,Complete,C,Auto,X,Y,1,3,4,4,Cash",
        ]);
        match load_from_reader(text.as_bytes()) {
            Err(LoadError::Parse { row, column, value, .. }) => {
                assert_eq!(row, 3);
                assert_eq!(column, "Date");
                assert_eq!(value, "13/03/2024");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn byte_order_mark_on_the_header_is_ignored() {
        let text = format!(
            "\u{feff}{}",
            csv_with(&["2024-03-23,12:29:38,A,Complete,C,Auto,X,Y,1,2.0,4,4,Cash"])
        );
        let ds = load_from_reader(text.as_bytes()).unwrap();
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            csv_with(&["2024-03-23,21:10:00,A,Cancelled by Customer,C,Bike,X,Y,1,,,,"])
        )
        .unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.statuses(), &[BookingStatus::CancelledByCustomer]);
        assert_eq!(ds.bookings()[0].hour(), 21);
    }
}

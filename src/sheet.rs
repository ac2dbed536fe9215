use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Reader};
use chrono::NaiveDate;
use serde::Serialize;

use crate::dates;
use crate::error::DigestError;

/// One spreadsheet row identifying a flight and its airline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlightRecord {
    pub flight_number: String,
    pub airline_code: String,
}

/// Flights selected for a day, unique by flight number, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlightSchedule {
    records: Vec<FlightRecord>,
}

impl FlightSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a flight. A repeated flight number keeps its original position
    /// but takes the newer airline code.
    pub fn insert(&mut self, flight_number: &str, airline_code: &str) {
        match self
            .records
            .iter_mut()
            .find(|r| r.flight_number == flight_number)
        {
            Some(existing) => existing.airline_code = airline_code.to_string(),
            None => self.records.push(FlightRecord {
                flight_number: flight_number.to_string(),
                airline_code: airline_code.to_string(),
            }),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FlightRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a FlightSchedule {
    type Item = &'a FlightRecord;
    type IntoIter = std::slice::Iter<'a, FlightRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Open the workbook at `path` and pick out the flights departing on `day`.
pub fn read_tomorrow_flights(
    path: &Path,
    sheet_name: &str,
    day: NaiveDate,
) -> Result<FlightSchedule, DigestError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| DigestError::FileOpen(format!("{}: {}", path.display(), e)))?;

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| DigestError::RowRead(format!("sheet '{}': {}", sheet_name, e)))?;

    let rows = range.rows().map(row_to_text);
    let schedule = select_flights(rows, &dates::sheet_date(day));

    log::info!(
        "[sheet] {} flight(s) scheduled for {} in {}",
        schedule.len(),
        dates::sheet_date(day),
        path.display()
    );
    Ok(schedule)
}

/// Keep rows whose third column equals `date`. Rows with fewer than three
/// columns are ignored.
pub fn select_flights<I, R>(rows: I, date: &str) -> FlightSchedule
where
    I: IntoIterator<Item = R>,
    R: AsRef<[String]>,
{
    let mut schedule = FlightSchedule::new();
    for row in rows {
        let row = row.as_ref();
        if row.len() < 3 {
            continue;
        }
        if row[2] == date {
            schedule.insert(&row[0], &row[1]);
        }
    }
    schedule
}

/// Render a row's cells as displayed text, dropping trailing blanks.
fn row_to_text(row: &[Data]) -> Vec<String> {
    let mut cells: Vec<String> = row.iter().map(cell_to_text).collect();
    while cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells
}

fn cell_to_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| dt.format(dates::SHEET_DATE_FORMAT).to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{Format, Workbook};
    use tempfile::TempDir;

    /// Excel serial number for 2024-06-15.
    const JUNE_15_SERIAL: f64 = 45458.0;

    /// Write a one-sheet workbook and return its directory and path.
    fn write_workbook(sheet: &str) -> (TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flight_ids.xlsx");

        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("mm-dd-yy");
        let ws = workbook.add_worksheet();
        ws.set_name(sheet).unwrap();

        // Header, text date, date-typed cell, short row, other day, numeric flight
        ws.write_string(0, 0, "Flight").unwrap();
        ws.write_string(0, 1, "Airline").unwrap();
        ws.write_string(0, 2, "Date").unwrap();
        ws.write_string(1, 0, "AA100").unwrap();
        ws.write_string(1, 1, "AA").unwrap();
        ws.write_string(1, 2, "06-15-24").unwrap();
        ws.write_string(2, 0, "BA22").unwrap();
        ws.write_string(2, 1, "BA").unwrap();
        ws.write_number_with_format(2, 2, JUNE_15_SERIAL, &date_format).unwrap();
        ws.write_string(3, 0, "UA9").unwrap();
        ws.write_string(3, 1, "UA").unwrap();
        ws.write_string(4, 0, "DL7").unwrap();
        ws.write_string(4, 1, "DL").unwrap();
        ws.write_string(4, 2, "06-16-24").unwrap();
        ws.write_number(5, 0, 4321.0).unwrap();
        ws.write_string(5, 1, "WN").unwrap();
        ws.write_string(5, 2, "06-15-24").unwrap();

        workbook.save(&path).unwrap();
        (dir, path)
    }

    fn airline<'a>(schedule: &'a FlightSchedule, flight: &str) -> Option<&'a str> {
        schedule
            .iter()
            .find(|r| r.flight_number == flight)
            .map(|r| r.airline_code.as_str())
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn short_rows_are_skipped() {
        let rows = vec![
            row(&[]),
            row(&["AA100"]),
            row(&["AA100", "AA"]),
            row(&["UA5", "UA", "06-15-24"]),
        ];
        let schedule = select_flights(rows, "06-15-24");
        assert_eq!(schedule.len(), 1);
        assert_eq!(airline(&schedule, "UA5"), Some("UA"));
    }

    #[test]
    fn only_matching_dates_are_selected() {
        let rows = vec![
            row(&["Flight", "Airline", "Date"]),
            row(&["AA100", "AA", "06-15-24"]),
            row(&["DL7", "DL", "06-16-24"]),
            row(&["BA9", "BA", "6-15-24"]),
            row(&["LH4", "LH", " 06-15-24 "]),
        ];
        let schedule = select_flights(rows, "06-15-24");
        let flights: Vec<&str> = schedule.iter().map(|r| r.flight_number.as_str()).collect();
        assert_eq!(flights, vec!["AA100"]);
    }

    #[test]
    fn duplicate_flight_takes_later_airline() {
        let rows = vec![
            row(&["XY12", "XY", "06-15-24"]),
            row(&["ZZ1", "ZZ", "06-15-24"]),
            row(&["XY12", "QQ", "06-15-24"]),
        ];
        let schedule = select_flights(rows, "06-15-24");
        assert_eq!(schedule.len(), 2);
        assert_eq!(airline(&schedule, "XY12"), Some("QQ"));
        assert_eq!(schedule.iter().next().unwrap().flight_number, "XY12");
    }

    #[test]
    fn extra_columns_are_ignored() {
        let rows = vec![row(&["AA100", "AA", "06-15-24", "note", "gate 4"])];
        let schedule = select_flights(rows, "06-15-24");
        assert_eq!(airline(&schedule, "AA100"), Some("AA"));
    }

    #[test]
    fn trailing_blank_cells_shorten_the_row() {
        let cells = vec![
            Data::String("AA100".into()),
            Data::String("AA".into()),
            Data::Empty,
        ];
        assert_eq!(row_to_text(&cells), row(&["AA100", "AA"]));
    }

    #[test]
    fn numeric_cells_render_like_the_sheet() {
        assert_eq!(cell_to_text(&Data::Float(100.0)), "100");
        assert_eq!(cell_to_text(&Data::Int(42)), "42");
        assert_eq!(cell_to_text(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_to_text(&Data::Bool(true)), "true");
    }

    #[test]
    fn workbook_rows_are_selected_for_the_day() {
        let (_dir, path) = write_workbook("Sheet1");
        let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

        let schedule = read_tomorrow_flights(&path, "Sheet1", day).unwrap();
        let got: Vec<(&str, &str)> = schedule
            .iter()
            .map(|r| (r.flight_number.as_str(), r.airline_code.as_str()))
            .collect();
        assert_eq!(got, vec![("AA100", "AA"), ("BA22", "BA"), ("4321", "WN")]);
    }

    #[test]
    fn date_typed_cell_only_matches_its_own_day() {
        let (_dir, path) = write_workbook("Sheet1");
        let day = NaiveDate::from_ymd_opt(2024, 6, 16).unwrap();

        let schedule = read_tomorrow_flights(&path, "Sheet1", day).unwrap();
        assert_eq!(schedule.len(), 1);
        assert_eq!(airline(&schedule, "DL7"), Some("DL"));
        assert_eq!(airline(&schedule, "BA22"), None);
    }

    #[test]
    fn wrong_sheet_name_is_row_read_error() {
        let (_dir, path) = write_workbook("Flights");
        let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

        let err = read_tomorrow_flights(&path, "Sheet1", day).unwrap_err();
        assert!(matches!(err, DigestError::RowRead(_)));
    }

    #[test]
    fn missing_workbook_is_file_open_error() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let err = read_tomorrow_flights(Path::new("no_such_flights.xlsx"), "Sheet1", day)
            .unwrap_err();
        assert!(matches!(err, DigestError::FileOpen(_)));
    }
}

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};

/// Date format used in the spreadsheet's third column.
pub const SHEET_DATE_FORMAT: &str = "%m-%d-%y";

/// Date format used in the status endpoint's path.
pub const URL_DATE_FORMAT: &str = "%Y/%m/%d";

/// The calendar day 24 hours after `now`.
pub fn tomorrow_from<Tz: TimeZone>(now: DateTime<Tz>) -> NaiveDate {
    (now + Duration::hours(24)).date_naive()
}

/// Tomorrow in local time.
pub fn tomorrow() -> NaiveDate {
    tomorrow_from(Local::now())
}

/// `MM-DD-YY`, matched against the sheet's date column.
pub fn sheet_date(day: NaiveDate) -> String {
    day.format(SHEET_DATE_FORMAT).to_string()
}

/// `YYYY/MM/DD`, the trailing segment of a status URL.
pub fn url_date(day: NaiveDate) -> String {
    day.format(URL_DATE_FORMAT).to_string()
}

use chrono::NaiveDate;

use crate::config::Config;
use crate::email::Mailer;
use crate::error::DigestError;
use crate::report::ReportRenderer;
use crate::sheet::{self, FlightSchedule};
use crate::status::{StatusFetcher, StatusSource};

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub scheduled: usize,
    pub reported: usize,
    pub report: String,
    pub delivered: bool,
}

impl RunSummary {
    pub fn skipped(&self) -> usize {
        self.scheduled - self.reported
    }
}

/// Read the sheet, then fetch, render and mail tomorrow's flights.
pub fn run(
    config: &Config,
    tomorrow: NaiveDate,
    source: &dyn StatusSource,
    mailer: &dyn Mailer,
) -> Result<RunSummary, DigestError> {
    let renderer = ReportRenderer::new(config.report.template.as_deref())?;
    let schedule =
        sheet::read_tomorrow_flights(&config.spreadsheet_path, &config.sheet_name, tomorrow)?;
    deliver(config, &schedule, tomorrow, source, &renderer, mailer)
}

/// Everything after the spreadsheet step.
pub fn deliver(
    config: &Config,
    schedule: &FlightSchedule,
    tomorrow: NaiveDate,
    source: &dyn StatusSource,
    renderer: &ReportRenderer,
    mailer: &dyn Mailer,
) -> Result<RunSummary, DigestError> {
    if schedule.is_empty() {
        log::info!("[digest] No flights scheduled for {}", crate::dates::sheet_date(tomorrow));
    }

    let fetcher = StatusFetcher::new(source, &config.status.base_url);
    let statuses = fetcher.fetch_all(schedule, tomorrow);

    let report = renderer.render(&statuses);
    log::info!("[digest] Report:\n{}", report);

    let sent = mailer.send(&config.email.subject, &report);
    let summary = RunSummary {
        scheduled: schedule.len(),
        reported: statuses.len(),
        report,
        delivered: sent.is_ok(),
    };
    log::info!(
        "[digest] {} scheduled, {} reported, {} skipped, delivered: {}",
        summary.scheduled,
        summary.reported,
        summary.skipped(),
        summary.delivered
    );

    sent?;
    log::info!("[email] Email sent successfully to {}", config.email.recipient);
    Ok(summary)
}

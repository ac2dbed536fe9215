use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::StatusConfig;
use crate::dates;
use crate::error::DigestError;
use crate::sheet::{FlightRecord, FlightSchedule};

// ── Types ─────────────────────────────────────────────

/// Status of one flight as it appears in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlightStatus {
    pub flight_number: String,
    pub status_text: String,
}

/// Body returned by the flight-tracker endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub data: StatusData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusData {
    pub status: StatusDetail,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDetail {
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status_description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub delay: Delay,
    #[serde(default, deserialize_with = "null_as_default")]
    pub delay_status: DelayStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_updated_text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub diverted: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Delay {
    #[serde(default, deserialize_with = "null_as_default")]
    pub departure: DelayMinutes,
    #[serde(default, deserialize_with = "null_as_default")]
    pub arrival: DelayMinutes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DelayMinutes {
    #[serde(default, deserialize_with = "null_as_default")]
    pub minutes: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DelayStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub wording: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub minutes: i64,
}

/// The endpoint sends `null` for fields it has nothing to say about.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl StatusDetail {
    /// One-line rendering of the full status for the run log.
    pub fn describe(&self) -> String {
        let mut out = format!("{} [{}/{}]", self.status, self.status_code, self.color);
        if !self.status_description.is_empty() {
            out.push_str(&format!(" {}", self.status_description));
        }
        out.push_str(&format!(
            ", departure +{}m, arrival +{}m",
            self.delay.departure.minutes, self.delay.arrival.minutes
        ));
        if !self.delay_status.wording.is_empty() {
            out.push_str(&format!(
                ", {} ({}m)",
                self.delay_status.wording, self.delay_status.minutes
            ));
        }
        if self.diverted {
            out.push_str(", DIVERTED");
        }
        if !self.last_updated_text.is_empty() {
            out.push_str(&format!(" - {}", self.last_updated_text));
        }
        out
    }
}

// ── Transport ─────────────────────────────────────────

/// Something that can GET a URL and hand back the body.
pub trait StatusSource {
    fn fetch_body(&self, url: &str) -> Result<String, DigestError>;
}

/// Blocking reqwest client talking to the real endpoint.
pub struct HttpStatusSource {
    client: reqwest::blocking::Client,
}

impl HttpStatusSource {
    pub fn new(config: &StatusConfig) -> Result<Self, DigestError> {
        // The blocking client otherwise gives up after 30s.
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| DigestError::Request(format!("HTTP client error: {}", e)))?;
        Ok(HttpStatusSource { client })
    }
}

impl StatusSource for HttpStatusSource {
    fn fetch_body(&self, url: &str) -> Result<String, DigestError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| DigestError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            log::warn!("[status] {} returned {}", url, resp.status());
        }

        resp.text().map_err(|e| DigestError::BodyRead(e.to_string()))
    }
}

// ── Fetcher ───────────────────────────────────────────

/// Looks up flight statuses one at a time through a `StatusSource`.
pub struct StatusFetcher<'a> {
    source: &'a dyn StatusSource,
    base_url: String,
}

impl<'a> StatusFetcher<'a> {
    pub fn new(source: &'a dyn StatusSource, base_url: &str) -> Self {
        StatusFetcher {
            source,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn status_url(&self, record: &FlightRecord, day: NaiveDate) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            record.airline_code,
            bare_flight_number(&record.flight_number, &record.airline_code),
            dates::url_date(day)
        )
    }

    /// Fetch and decode the status of a single flight.
    pub fn fetch(
        &self,
        record: &FlightRecord,
        day: NaiveDate,
    ) -> Result<FlightStatus, DigestError> {
        let url = self.status_url(record, day);
        log::info!("[status] GET {}", url);

        let body = self.source.fetch_body(&url)?;
        let detail = parse_status(&body)?.data.status;
        log::info!("[status] {}: {}", record.flight_number, detail.describe());
        let status_text = detail.status;

        Ok(FlightStatus {
            flight_number: record.flight_number.clone(),
            status_text,
        })
    }

    /// Fetch every scheduled flight in order. A failing flight is logged and
    /// left out; the others are unaffected.
    pub fn fetch_all(&self, schedule: &FlightSchedule, day: NaiveDate) -> Vec<FlightStatus> {
        let mut statuses = Vec::with_capacity(schedule.len());
        for record in schedule {
            match self.fetch(record, day) {
                Ok(status) => statuses.push(status),
                Err(e) => log::error!("[status] Skipping {}: {}", record.flight_number, e),
            }
        }
        statuses
    }
}

/// Flight number with every occurrence of the airline code removed.
pub fn bare_flight_number(flight_number: &str, airline_code: &str) -> String {
    if airline_code.is_empty() {
        return flight_number.to_string();
    }
    flight_number.replace(airline_code, "")
}

pub fn parse_status(body: &str) -> Result<StatusResponse, DigestError> {
    serde_json::from_str(body).map_err(|e| DigestError::JsonParse(e.to_string()))
}

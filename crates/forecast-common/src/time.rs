//! Forecast cycle selection and time handling.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::{ForecastError, ForecastResult};

/// GFS model run cycles, four per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CycleHour {
    /// 00Z run
    Z00,
    /// 06Z run
    Z06,
    /// 12Z run
    Z12,
    /// 18Z run
    Z18,
}

impl CycleHour {
    pub fn from_hour(hour: u32) -> Option<Self> {
        match hour {
            0 => Some(CycleHour::Z00),
            6 => Some(CycleHour::Z06),
            12 => Some(CycleHour::Z12),
            18 => Some(CycleHour::Z18),
            _ => None,
        }
    }

    pub fn hour(&self) -> u32 {
        match self {
            CycleHour::Z00 => 0,
            CycleHour::Z06 => 6,
            CycleHour::Z12 => 12,
            CycleHour::Z18 => 18,
        }
    }

    pub fn all() -> &'static [CycleHour] {
        &[CycleHour::Z00, CycleHour::Z06, CycleHour::Z12, CycleHour::Z18]
    }
}

/// One model run: a calendar date plus a cycle hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForecastCycle {
    pub date: NaiveDate,
    pub hour: CycleHour,
}

impl ForecastCycle {
    pub fn new(date: NaiveDate, hour: CycleHour) -> Self {
        Self { date, hour }
    }

    /// Absolute start instant of the run (date 00:00 UTC + cycle hour).
    pub fn run_start(&self) -> DateTime<Utc> {
        let midnight = self.date.and_time(NaiveTime::MIN);
        Utc.from_utc_datetime(&midnight) + Duration::hours(i64::from(self.hour.hour()))
    }

    /// Date formatted as `YYYYMMDD`.
    pub fn date_stamp(&self) -> String {
        self.date.format("%Y%m%d").to_string()
    }

    /// Cycle hour formatted as two digits.
    pub fn hour_stamp(&self) -> String {
        format!("{:02}", self.hour.hour())
    }
}

impl std::fmt::Display for ForecastCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}z", self.date_stamp(), self.hour_stamp())
    }
}

/// Select the most recent forecast run that is expected to be published.
///
/// Runs become available roughly six hours after they start, so at 18:00 the
/// 12Z run is the newest one, at 12:00 the 06Z run, at 06:00 the 00Z run, and
/// before 06:00 the 18Z run of the previous day. Boundary instants fall into
/// the later branch.
pub fn select_cycle(now: DateTime<Utc>) -> ForecastCycle {
    let date = now.date_naive();
    match now.hour() {
        18.. => ForecastCycle::new(date, CycleHour::Z12),
        12.. => ForecastCycle::new(date, CycleHour::Z06),
        6.. => ForecastCycle::new(date, CycleHour::Z00),
        _ => {
            let previous = date.pred_opt().unwrap_or(date);
            ForecastCycle::new(previous, CycleHour::Z18)
        }
    }
}

/// Truncate an instant to the start of its hour.
pub fn start_of_hour(instant: DateTime<Utc>) -> DateTime<Utc> {
    let seconds = instant.timestamp();
    let floored = seconds - seconds.rem_euclid(3600);
    Utc.timestamp_opt(floored, 0).single().unwrap_or(instant)
}

/// Parse an ISO-8601 instant.
///
/// Accepts RFC 3339 with an offset, or a naive `YYYY-MM-DDTHH:MM:SS`
/// (optionally with fractional seconds) which is taken as UTC.
pub fn parse_instant(s: &str) -> ForecastResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    Err(ForecastError::InvalidTime(s.to_string()))
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

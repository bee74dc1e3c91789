//! Forecast request planning.
//!
//! Turns a target instant and a selected cycle into the exact upstream
//! resource to fetch and how long it stays valid.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{ForecastCycle, ForecastError, ForecastResult};

/// Offsets up to this value are published hourly.
pub const HOURLY_OFFSET_LIMIT: u32 = 120;

/// Last offset published by the model.
pub const MAX_OFFSET: u32 = 384;

/// Hours between a run's start and the requested instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ForecastOffset(u32);

impl ForecastOffset {
    /// Validate an hour count against the published offsets: every hour up
    /// to 120, then every third hour up to 384.
    pub fn new(hours: i64) -> ForecastResult<Self> {
        if Self::is_valid(hours) {
            Ok(Self(hours as u32))
        } else {
            Err(ForecastError::InvalidForecastOffset { offset: hours })
        }
    }

    pub fn is_valid(hours: i64) -> bool {
        match hours {
            h if h < 0 => false,
            h if h <= i64::from(HOURLY_OFFSET_LIMIT) => true,
            h if h <= i64::from(MAX_OFFSET) => h % 3 == 0,
            _ => false,
        }
    }

    pub fn hours(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ForecastOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

/// Atmospheric level of a wind request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindLevel {
    /// 10 m above ground
    #[serde(rename = "m10")]
    M10,
}

impl WindLevel {
    /// Route name of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            WindLevel::M10 => "m10",
        }
    }

    /// Suffix used in resource keys.
    pub fn key_suffix(&self) -> &'static str {
        match self {
            WindLevel::M10 => "ugrd-vgrd.10m",
        }
    }
}

impl FromStr for WindLevel {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "m10" | "10m" => Ok(WindLevel::M10),
            _ => Err(ForecastError::UnsupportedLevel(s.to_string())),
        }
    }
}

impl std::fmt::Display for WindLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies exactly one upstream grid file.
///
/// Canonical form: `gfs.YYYYMMDD.tHHz.fOOO.ugrd-vgrd.10m`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    id: String,
    cycle: ForecastCycle,
    offset: ForecastOffset,
    level: WindLevel,
}

impl ResourceKey {
    pub fn new(cycle: ForecastCycle, offset: ForecastOffset, level: WindLevel) -> Self {
        let id = format!(
            "gfs.{}.t{}z.f{}.{}",
            cycle.date_stamp(),
            cycle.hour_stamp(),
            offset,
            level.key_suffix()
        );
        Self {
            id,
            cycle,
            offset,
            level,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }

    pub fn cycle(&self) -> ForecastCycle {
        self.cycle
    }

    pub fn offset(&self) -> ForecastOffset {
        self.offset
    }

    pub fn level(&self) -> WindLevel {
        self.level
    }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

/// A planned fetch: which grid to use and when it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRequest {
    pub key: ResourceKey,
    pub expiration: DateTime<Utc>,
}

impl ForecastRequest {
    /// Instant the grid describes (run start + offset).
    pub fn valid_time(&self) -> DateTime<Utc> {
        self.key.cycle().run_start() + Duration::hours(i64::from(self.key.offset().hours()))
    }
}

/// Plan the grid lookup for `target` within `cycle`.
///
/// The offset is the whole number of hours between the run start and the
/// target, truncated. Targets before the run start are rejected. The grid
/// expires one hour after the instant it describes.
pub fn plan_request(
    target: DateTime<Utc>,
    cycle: &ForecastCycle,
    level: WindLevel,
) -> ForecastResult<ForecastRequest> {
    let run_start = cycle.run_start();
    let elapsed = target - run_start;
    if elapsed < Duration::zero() {
        return Err(ForecastError::InvalidForecastOffset {
            offset: elapsed.num_hours().min(-1),
        });
    }

    let offset = ForecastOffset::new(elapsed.num_hours())?;
    let key = ResourceKey::new(*cycle, offset, level);
    let expiration = run_start + Duration::hours(i64::from(offset.hours()) + 1);

    Ok(ForecastRequest { key, expiration })
}

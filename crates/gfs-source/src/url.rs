//! Upstream URL templates.
//!
//! Placeholders:
//! - `{date}`: cycle date as `YYYYMMDD`
//! - `{cycle}` / `{cycle:02}`: cycle hour, two digits
//! - `{offset}` / `{offset:03}`: forecast hour, three digits

use forecast_common::ResourceKey;

/// NOMADS grib filter for the 0.25° GFS, 10 m U/V wind only.
pub const DEFAULT_GFS_URL_TEMPLATE: &str = "https://nomads.ncep.noaa.gov/cgi-bin/filter_gfs_0p25.pl?dir=%2Fgfs.{date}%2F{cycle:02}%2Fatmos&file=gfs.t{cycle:02}z.pgrb2.0p25.f{offset:03}&var_UGRD=on&var_VGRD=on&lev_10_m_above_ground=on";

/// A URL pattern expanded per resource key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    template: String,
}

impl UrlTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Expand the template for one grid.
    pub fn render(&self, key: &ResourceKey) -> String {
        let cycle = key.cycle();
        let hour = cycle.hour_stamp();
        let offset = key.offset().to_string();

        self.template
            .replace("{date}", &cycle.date_stamp())
            .replace("{cycle:02}", &hour)
            .replace("{cycle}", &hour)
            .replace("{offset:03}", &offset)
            .replace("{offset}", &offset)
    }
}

impl Default for UrlTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_GFS_URL_TEMPLATE)
    }
}

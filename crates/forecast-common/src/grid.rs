//! Global wind grids on a regular lat/lon mesh.

use crate::{ForecastError, ForecastResult, GeoPoint};
use serde::{Deserialize, Serialize};

/// Columns in the GFS 0.25° global grid.
pub const GFS_0P25_WIDTH: usize = 1440;

/// Rows kept from the GFS 0.25° global grid.
///
/// GFS publishes 721 rows (90N through 90S inclusive). The south-pole row is
/// dropped on decode so that rows map onto `180 / 720` degree bands.
pub const GFS_0P25_HEIGHT: usize = 720;

/// Dimensions of a global regular lat/lon grid.
///
/// Row 0 is the northern edge (90°), column 0 is the prime meridian, and
/// columns increase eastward around the full 360°.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    pub width: usize,
    pub height: usize,
}

impl GridSpec {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// The production GFS 0.25° grid (1440 × 720).
    pub fn gfs_0p25() -> Self {
        Self::new(GFS_0P25_WIDTH, GFS_0P25_HEIGHT)
    }

    /// Total number of grid points.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn rows_per_degree(&self) -> f64 {
        self.height as f64 / 180.0
    }

    pub fn cols_per_degree(&self) -> f64 {
        self.width as f64 / 360.0
    }

    /// Fractional row from a latitude, clamped to `[0, height - 1]`.
    pub fn fractional_row(&self, latitude: f64) -> f64 {
        let max_row = self.height.saturating_sub(1) as f64;
        ((90.0 - latitude) * self.rows_per_degree()).clamp(0.0, max_row)
    }

    /// Fractional column from a longitude, in `[0, width)`.
    pub fn fractional_col(&self, point: &GeoPoint) -> f64 {
        let col = point.longitude_360() * self.cols_per_degree();
        if col >= self.width as f64 {
            0.0
        } else {
            col
        }
    }

    /// Fractional `(row, col)` position of a point on this grid.
    pub fn fractional_position(&self, point: &GeoPoint) -> (f64, f64) {
        (self.fractional_row(point.latitude), self.fractional_col(point))
    }

    /// Wrap an integer column into `[0, width)`.
    pub fn wrap_col(&self, col: i64) -> usize {
        col.rem_euclid(self.width as i64) as usize
    }

    /// Clamp an integer row into `[0, height)`.
    pub fn clamp_row(&self, row: i64) -> usize {
        row.clamp(0, self.height as i64 - 1) as usize
    }

    /// Row-major flat index of an in-range cell.
    pub fn flat_index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }
}

/// A wind vector in m/s: `u` eastward, `v` northward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindVector {
    pub u: f32,
    pub v: f32,
}

impl WindVector {
    pub fn new(u: f32, v: f32) -> Self {
        Self { u, v }
    }

    /// Magnitude in m/s.
    pub fn speed(&self) -> f32 {
        self.u.hypot(self.v)
    }

    /// Mathematical direction `atan2(v, u)` in radians.
    pub fn direction(&self) -> f64 {
        f64::from(self.v).atan2(f64::from(self.u))
    }
}

/// An immutable grid of wind vectors stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct WindGrid {
    spec: GridSpec,
    data: Vec<WindVector>,
}

impl WindGrid {
    /// Create a grid, checking that `data` covers exactly `width * height`
    /// cells.
    pub fn new(spec: GridSpec, data: Vec<WindVector>) -> ForecastResult<Self> {
        if spec.is_empty() {
            return Err(ForecastError::InvalidGrid(format!(
                "empty grid {}x{}",
                spec.width, spec.height
            )));
        }
        if data.len() != spec.len() {
            return Err(ForecastError::InvalidGrid(format!(
                "expected {} cells for {}x{}, got {}",
                spec.len(),
                spec.width,
                spec.height,
                data.len()
            )));
        }
        Ok(Self { spec, data })
    }

    /// Create a grid from separate U and V component arrays.
    pub fn from_components(spec: GridSpec, u: &[f32], v: &[f32]) -> ForecastResult<Self> {
        if u.len() != v.len() {
            return Err(ForecastError::InvalidGrid(format!(
                "component length mismatch: u={} v={}",
                u.len(),
                v.len()
            )));
        }
        let data = u
            .iter()
            .zip(v)
            .map(|(&u, &v)| WindVector::new(u, v))
            .collect();
        Self::new(spec, data)
    }

    pub fn spec(&self) -> GridSpec {
        self.spec
    }

    pub fn width(&self) -> usize {
        self.spec.width
    }

    pub fn height(&self) -> usize {
        self.spec.height
    }

    pub fn data(&self) -> &[WindVector] {
        &self.data
    }

    /// Vector at an integer cell. Rows are clamped, columns wrap.
    pub fn at(&self, row: i64, col: i64) -> WindVector {
        let r = self.spec.clamp_row(row);
        let c = self.spec.wrap_col(col);
        self.data[self.spec.flat_index(r, c)]
    }

    /// Approximate heap size in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<WindVector>()
    }
}

//! Slippy-map tile geometry.
//!
//! Tiles follow the Web Mercator z/x/y scheme: at zoom `z` the world is a
//! `2^z × 2^z` grid with `x` growing east from -180° and `y` growing south
//! from the northern Mercator limit (≈85.0511°).

use crate::{BoundingBox, ForecastError, ForecastResult, GeoPoint};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Deepest zoom level accepted at the boundary.
pub const MAX_ZOOM: u32 = 24;

/// A tile coordinate (z/x/y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y)
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Build a tile, rejecting zoom levels past [`MAX_ZOOM`] and indices
    /// outside the `2^z` range.
    pub fn validated(z: u32, x: u32, y: u32) -> ForecastResult<Self> {
        let tile = Self::new(z, x, y);
        tile.validate()?;
        Ok(tile)
    }

    pub fn validate(&self) -> ForecastResult<()> {
        if self.z > MAX_ZOOM {
            return Err(ForecastError::InvalidTile(format!(
                "zoom {} exceeds maximum {}",
                self.z, MAX_ZOOM
            )));
        }
        let n = self.tiles_per_side();
        if u64::from(self.x) >= n || u64::from(self.y) >= n {
            return Err(ForecastError::InvalidTile(format!(
                "tile {}/{}/{} outside the {}x{} matrix",
                self.z, self.x, self.y, n, n
            )));
        }
        Ok(())
    }

    /// Number of tiles along one side at this zoom.
    pub fn tiles_per_side(&self) -> u64 {
        1u64 << self.z.min(63)
    }

    /// Geographic bounding box of this tile.
    ///
    /// The center is computed from the fractional tile position
    /// `(x + 0.5, y + 0.5)`, not from the corners.
    pub fn bounding_box(&self) -> BoundingBox {
        let x = f64::from(self.x);
        let y = f64::from(self.y);
        BoundingBox::new(
            self.fractional_to_geo(x, y),
            self.fractional_to_geo(x + 1.0, y + 1.0),
            self.fractional_to_geo(x + 0.5, y + 0.5),
        )
    }

    /// Geographic center of this tile.
    pub fn center(&self) -> GeoPoint {
        self.fractional_to_geo(f64::from(self.x) + 0.5, f64::from(self.y) + 0.5)
    }

    /// Convert fractional tile coordinates at this zoom to a geographic point.
    pub fn fractional_to_geo(&self, x: f64, y: f64) -> GeoPoint {
        let n = self.tiles_per_side() as f64;
        let longitude = x / n * 360.0 - 180.0;
        let latitude = (PI * (1.0 - 2.0 * y / n)).sinh().atan().to_degrees();
        GeoPoint::new(latitude, longitude)
    }

    /// Fractional tile coordinates of a geographic point at this zoom.
    ///
    /// The result is in tile units; `(self.x, self.y)` is the tile's
    /// north-west corner.
    pub fn geo_to_fractional(&self, point: &GeoPoint) -> (f64, f64) {
        let n = self.tiles_per_side() as f64;
        let x = (point.longitude + 180.0) / 360.0 * n;
        let lat = point.latitude.to_radians();
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * n;
        (x, y)
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

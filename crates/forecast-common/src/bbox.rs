//! Geographic points and bounding boxes.

use serde::{Deserialize, Serialize};

/// A geographic position in degrees.
///
/// Longitude may be given in either [-180, 180) or [0, 360); the grid
/// mapping normalizes it with [`GeoPoint::longitude_360`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Longitude normalized into [0, 360).
    pub fn longitude_360(&self) -> f64 {
        let lon = self.longitude.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360.0 for tiny negative inputs
        if lon >= 360.0 {
            0.0
        } else {
            lon
        }
    }
}

/// A geographic bounding box described by its north-west and south-east
/// corners.
///
/// The center is stored separately. For tiles it is computed from the tile's
/// fractional coordinates, which under Web Mercator is not the arithmetic
/// midpoint of the corner latitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north_west: GeoPoint,
    pub south_east: GeoPoint,
    pub center: GeoPoint,
}

impl BoundingBox {
    /// Create a bounding box with an explicit center.
    pub fn new(north_west: GeoPoint, south_east: GeoPoint, center: GeoPoint) -> Self {
        Self {
            north_west,
            south_east,
            center,
        }
    }

    /// Create a bounding box whose center is the midpoint of the corners.
    pub fn from_corners(north_west: GeoPoint, south_east: GeoPoint) -> Self {
        let mut span = south_east.longitude - north_west.longitude;
        if span < 0.0 {
            span += 360.0;
        }
        let center = GeoPoint::new(
            (north_west.latitude + south_east.latitude) / 2.0,
            north_west.longitude + span / 2.0,
        );
        Self::new(north_west, south_east, center)
    }

    /// Eastward longitude extent in degrees.
    ///
    /// A box whose east edge is numerically west of its west edge crosses the
    /// antimeridian and wraps.
    pub fn longitude_span(&self) -> f64 {
        let span = self.south_east.longitude - self.north_west.longitude;
        if span < 0.0 {
            span + 360.0
        } else {
            span
        }
    }

    /// Northward latitude extent in degrees.
    pub fn latitude_span(&self) -> f64 {
        self.north_west.latitude - self.south_east.latitude
    }

    pub fn is_finite(&self) -> bool {
        self.north_west.is_finite() && self.south_east.is_finite() && self.center.is_finite()
    }
}

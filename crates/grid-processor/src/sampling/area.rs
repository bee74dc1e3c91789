//! Averaging over every grid cell inside a bounding box.

use forecast_common::{BoundingBox, GridSpec, WindGrid, WindVector};

/// Boxes covering this many cells or fewer are point-sampled at their center.
pub const MIN_AREA_CELLS: usize = 4;

/// The block of grid cells whose nodes fall inside a bounding box.
///
/// Rows are a contiguous clamped range. Columns start at `first_col` and run
/// eastward for `col_count` cells, wrapping past the last column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellBlock {
    pub first_row: usize,
    pub row_count: usize,
    pub first_col: i64,
    pub col_count: usize,
}

impl CellBlock {
    /// Map a bounding box onto `spec`.
    pub fn covering(spec: &GridSpec, bbox: &BoundingBox) -> Self {
        let north = spec.fractional_row(bbox.north_west.latitude);
        let south = spec.fractional_row(bbox.south_east.latitude);
        let (top, bottom) = if north <= south {
            (north, south)
        } else {
            (south, north)
        };
        let first_row = top.ceil() as i64;
        let last_row = bottom.floor() as i64;
        let (first_row, row_count) = if last_row < first_row {
            (first_row.max(0) as usize, 0)
        } else {
            (first_row as usize, (last_row - first_row + 1) as usize)
        };

        let span = bbox.longitude_span();
        let (first_col, col_count) = if span >= 360.0 {
            (0, spec.width)
        } else {
            let west = spec.fractional_col(&bbox.north_west);
            let east = west + span * spec.cols_per_degree();
            let first = west.ceil() as i64;
            let last = east.floor() as i64;
            if last < first {
                (first, 0)
            } else {
                (first, ((last - first + 1) as usize).min(spec.width))
            }
        };

        Self {
            first_row,
            row_count,
            first_col,
            col_count,
        }
    }

    pub fn len(&self) -> usize {
        self.row_count * self.col_count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate `(row, col)` cell coordinates. Columns are not yet wrapped.
    pub fn cells(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        let rows = self.first_row as i64..(self.first_row + self.row_count) as i64;
        rows.flat_map(move |row| {
            (self.first_col..self.first_col + self.col_count as i64).map(move |col| (row, col))
        })
    }
}

/// Arithmetic mean of every cell inside `bbox`.
///
/// Returns `None` when the box covers [`MIN_AREA_CELLS`] cells or fewer, in
/// which case the caller point-samples at the box center instead.
pub fn area_mean(grid: &WindGrid, bbox: &BoundingBox) -> Option<WindVector> {
    let block = CellBlock::covering(&grid.spec(), bbox);
    let count = block.len();
    if count <= MIN_AREA_CELLS {
        return None;
    }

    let (u_sum, v_sum) = block
        .cells()
        .map(|(row, col)| grid.at(row, col))
        .fold((0.0f64, 0.0f64), |(u, v), wind| {
            (u + f64::from(wind.u), v + f64::from(wind.v))
        });

    Some(WindVector::new(
        (u_sum / count as f64) as f32,
        (v_sum / count as f64) as f32,
    ))
}

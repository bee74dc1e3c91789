//! Synthetic wind grids with predictable values.

use forecast_common::{GridSpec, WindGrid, WindVector};

/// A grid where every cell holds the same vector.
pub fn create_uniform_wind_grid(width: usize, height: usize, u: f32, v: f32) -> WindGrid {
    let spec = GridSpec::new(width, height);
    WindGrid::new(spec, vec![WindVector::new(u, v); spec.len()])
        .expect("uniform grid has the right length")
}

/// A grid whose values encode their position.
///
/// Each cell holds `u = col * 1000 + row` and `v = -u`, so a sampled value
/// tells exactly which cells contributed.
///
/// ```
/// use test_utils::create_indexed_wind_grid;
///
/// let grid = create_indexed_wind_grid(10, 5);
/// assert_eq!(grid.at(0, 1).u, 1000.0);
/// assert_eq!(grid.at(1, 0).u, 1.0);
/// assert_eq!(grid.at(1, 0).v, -1.0);
/// ```
pub fn create_indexed_wind_grid(width: usize, height: usize) -> WindGrid {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let value = (col * 1000 + row) as f32;
            data.push(WindVector::new(value, -value));
        }
    }
    WindGrid::new(GridSpec::new(width, height), data).expect("indexed grid has the right length")
}

/// The four-cell grid used for interpolation checks.
///
/// ```text
///            col 0        col 1
/// row 0   (1.0, 2.0)   (3.0, 4.0)
/// row 1   (5.0, 6.0)   (7.0, 8.0)
/// ```
///
/// The mean of all cells is `(4.0, 5.0)`.
pub fn create_quad_grid() -> WindGrid {
    let data = vec![
        WindVector::new(1.0, 2.0),
        WindVector::new(3.0, 4.0),
        WindVector::new(5.0, 6.0),
        WindVector::new(7.0, 8.0),
    ];
    WindGrid::new(GridSpec::new(2, 2), data).expect("quad grid has the right length")
}

/// A grid where `u` increases linearly eastward by `1.0` per column and `v`
/// increases southward by `1.0` per row.
pub fn create_linear_wind_grid(width: usize, height: usize) -> WindGrid {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push(WindVector::new(col as f32, row as f32));
        }
    }
    WindGrid::new(GridSpec::new(width, height), data).expect("linear grid has the right length")
}

/// A full-size GFS 0.25° grid filled with one vector.
pub fn create_gfs_wind_grid(u: f32, v: f32) -> WindGrid {
    let spec = GridSpec::gfs_0p25();
    create_uniform_wind_grid(spec.width, spec.height, u, v)
}

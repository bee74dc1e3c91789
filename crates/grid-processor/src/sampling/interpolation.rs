//! Point interpolation on a wind grid.
//!
//! Positions are fractional `(row, col)` grid coordinates. Rows are clamped
//! to the grid and columns wrap around the globe, so every lookup stays in
//! bounds.

use forecast_common::{WindGrid, WindVector};

/// Distance below which a query point is treated as sitting on a node.
pub const NODE_EPSILON: f64 = 1e-9;

/// Inverse-distance weighting over the floor/ceil neighbours.
///
/// Uses up to four distinct cells around the position. Distances are
/// measured in unwrapped fractional space, so the cell past the last column
/// is one column away even though it wraps to column 0.
pub fn inverse_distance(grid: &WindGrid, row: f64, col: f64) -> WindVector {
    let rows = [row.floor(), row.ceil()];
    let cols = [col.floor(), col.ceil()];

    let mut neighbours: Vec<(f64, f64)> = Vec::with_capacity(4);
    for &r in &rows {
        for &c in &cols {
            if !neighbours.contains(&(r, c)) {
                neighbours.push((r, c));
            }
        }
    }

    let mut weight_sum = 0.0f64;
    let mut u_sum = 0.0f64;
    let mut v_sum = 0.0f64;

    for (r, c) in neighbours {
        let value = grid.at(r as i64, c as i64);
        let distance = ((row - r).powi(2) + (col - c).powi(2)).sqrt();
        if distance < NODE_EPSILON {
            return value;
        }
        let weight = 1.0 / distance;
        weight_sum += weight;
        u_sum += weight * f64::from(value.u);
        v_sum += weight * f64::from(value.v);
    }

    WindVector::new((u_sum / weight_sum) as f32, (v_sum / weight_sum) as f32)
}

/// Bicubic Catmull-Rom interpolation over the surrounding 4×4 cells.
///
/// Passes exactly through grid nodes. Overshoot near sharp gradients is
/// expected.
pub fn catmull_rom(grid: &WindGrid, row: f64, col: f64) -> WindVector {
    let ri = row.floor() as i64;
    let ci = col.floor() as i64;
    let rf = row - ri as f64;
    let cf = col - ci as f64;

    let mut u_rows = [0.0f64; 4];
    let mut v_rows = [0.0f64; 4];

    for (j, dr) in (-1..=2).enumerate() {
        let mut u = [0.0f64; 4];
        let mut v = [0.0f64; 4];
        for (i, dc) in (-1..=2).enumerate() {
            let value = grid.at(ri + dr, ci + dc);
            u[i] = f64::from(value.u);
            v[i] = f64::from(value.v);
        }
        u_rows[j] = cubic_1d(u[0], u[1], u[2], u[3], cf);
        v_rows[j] = cubic_1d(v[0], v[1], v[2], v[3], cf);
    }

    WindVector::new(
        cubic_1d(u_rows[0], u_rows[1], u_rows[2], u_rows[3], rf) as f32,
        cubic_1d(v_rows[0], v_rows[1], v_rows[2], v_rows[3], rf) as f32,
    )
}

/// 1D cubic interpolation using Catmull-Rom spline.
fn cubic_1d(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;

    let a = -0.5 * p0 + 1.5 * p1 - 1.5 * p2 + 0.5 * p3;
    let b = p0 - 2.5 * p1 + 2.0 * p2 - 0.5 * p3;
    let c = -0.5 * p0 + 0.5 * p2;
    let d = p1;

    a * t3 + b * t2 + c * t + d
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{assert_wind_approx_eq, create_linear_wind_grid, create_quad_grid};

    #[test]
    fn test_idw_node_hit() {
        let grid = create_quad_grid();
        assert_eq!(inverse_distance(&grid, 0.0, 0.0), WindVector::new(1.0, 2.0));
        assert_eq!(inverse_distance(&grid, 1.0, 1.0), WindVector::new(7.0, 8.0));
        assert_eq!(inverse_distance(&grid, 1.0, 0.0), WindVector::new(5.0, 6.0));
    }

    #[test]
    fn test_idw_center_is_average() {
        let grid = create_quad_grid();
        assert_wind_approx_eq!(inverse_distance(&grid, 0.5, 0.5), (4.0, 5.0), 1e-6);
    }

    #[test]
    fn test_idw_on_edge_uses_two_cells() {
        let grid = create_quad_grid();
        // Halfway along row 0 between (1,2) and (3,4)
        assert_wind_approx_eq!(inverse_distance(&grid, 0.0, 0.5), (2.0, 3.0), 1e-6);
    }

    #[test]
    fn test_idw_favours_nearest() {
        let grid = create_quad_grid();
        let near_origin = inverse_distance(&grid, 0.1, 0.1);
        assert!(near_origin.u < 4.0);
        assert!(near_origin.u > 1.0);
    }

    #[test]
    fn test_idw_wraps_last_column() {
        let grid = create_linear_wind_grid(4, 2);
        // Halfway between column 3 (u=3) and wrapped column 0 (u=0)
        assert_wind_approx_eq!(inverse_distance(&grid, 0.0, 3.5), (1.5, 0.0), 1e-6);
    }

    #[test]
    fn test_catmull_rom_exact_at_nodes() {
        let grid = create_linear_wind_grid(8, 8);
        assert_wind_approx_eq!(catmull_rom(&grid, 3.0, 4.0), (4.0, 3.0), 1e-6);
    }

    #[test]
    fn test_catmull_rom_linear_interior() {
        let grid = create_linear_wind_grid(8, 8);
        // Away from the wrap seam and clamped rows a linear field is reproduced
        assert_wind_approx_eq!(catmull_rom(&grid, 3.25, 4.5), (4.5, 3.25), 1e-5);
    }
}

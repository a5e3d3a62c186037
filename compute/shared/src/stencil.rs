//! Discrete Laplacian stencil
//!
//! We use the five-points stencil: the four axial neighbors of a cell are
//! summed and four times the cell's own value is subtracted. What happens when
//! a neighbor would fall outside of the grid is decided by the grid's
//! [`Boundary`] policy.

use data::{concentration::ConcentrationView, parameters::Boundary, Precision};

/// Discrete Laplacian of `grid` at column `x` and row `y`
///
/// `(x, y)` must lie within the grid.
#[inline]
pub fn laplacian(grid: ConcentrationView<'_>, x: usize, y: usize, boundary: Boundary) -> Precision {
    let [rows, cols] = [grid.nrows(), grid.ncols()];
    let [left, right] = boundary.neighbors(x, cols);
    let [up, down] = boundary.neighbors(y, rows);
    grid[[up, x]] + grid[[down, x]] + grid[[y, left]] + grid[[y, right]] - 4.0 * grid[[y, x]]
}

//! Concentration of chemical species

use crate::{parameters::Boundary, Precision};
use ndarray::{Array2, ArrayView2};
use std::collections::TryReserveError;
use thiserror::Error;

/// Concentration of all species involved
///
/// Each species is double-buffered: simulation steps read the input
/// concentrations and write the output ones, then [`Species::flip()`] makes
/// the outputs become the new inputs. Outside of a step, the input
/// concentrations are the authoritative simulation state.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub struct Species {
    /// Concentration of species U
    pub u: Evolving,

    /// Concentration of species V
    pub v: Evolving,

    /// Boundary policy, fixed for the lifetime of the grids
    boundary: Boundary,
}
//
impl Species {
    /// Set up species concentration storage in the resting state
    ///
    /// U is 1.0 and V is 0.0 everywhere, in both buffers. Storage is fully
    /// allocated before anything is returned, so a failure leaves no partially
    /// built grid behind.
    pub fn new(width: usize, height: usize, boundary: Boundary) -> Result<Self, Error> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let shape = [height, width];
        Ok(Self {
            u: Evolving::filled(shape, 1.0)?,
            v: Evolving::filled(shape, 0.0)?,
            boundary,
        })
    }

    /// Check out the shape of the concentration matrices, as [rows, cols]
    pub fn shape(&self) -> [usize; 2] {
        self.u.shape()
    }

    /// Number of grid columns
    pub fn width(&self) -> usize {
        self.shape()[1]
    }

    /// Number of grid rows
    pub fn height(&self) -> usize {
        self.shape()[0]
    }

    /// Boundary policy of this grid
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Make the output concentrations become the input ones
    pub fn flip(&mut self) {
        self.u.flip();
        self.v.flip();
    }
}

/// Pair of Concentration where one acts as an input and the other as an output
#[derive(Clone, Debug, PartialEq)]
pub struct Evolving([Concentration; 2]);
//
impl Evolving {
    /// Access the input concentration
    pub fn input(&self) -> &Concentration {
        &self.0[0]
    }

    /// Mutably access the input concentration
    ///
    /// This is how perturbations are applied between simulation steps.
    pub fn input_mut(&mut self) -> &mut Concentration {
        &mut self.0[0]
    }

    /// Access the input and output concentration
    pub fn in_out(&mut self) -> (&Concentration, &mut Concentration) {
        let [input, output] = &mut self.0;
        (input, output)
    }

    /// Read the input concentration at grid coordinates (x, y)
    ///
    /// Coordinates outside of the grid are clipped to the nearest edge cell.
    pub fn sample(&self, x: i64, y: i64) -> Precision {
        let input = self.input();
        let [rows, cols] = self.shape();
        let clip = |pos: i64, len: usize| pos.clamp(0, len as i64 - 1) as usize;
        input[[clip(y, rows), clip(x, cols)]]
    }

    /// Set up storage where both concentrations are filled with `value`
    fn filled(shape: [usize; 2], value: Precision) -> Result<Self, Error> {
        let input = try_filled(shape, value)?;
        let output = try_filled(shape, value)?;
        Ok(Self([input, output]))
    }

    /// Check the shape of concentration matrices
    fn shape(&self) -> [usize; 2] {
        let [rows, cols] = self.0[0].shape() else {
            unreachable!("Concentration is two-dimensional")
        };
        [*rows, *cols]
    }

    /// Make the output concentration become the input one
    fn flip(&mut self) {
        let [input, output] = &mut self.0;
        std::mem::swap(input, output);
    }
}

/// Allocate a concentration matrix, reporting allocation failure
fn try_filled(shape @ [rows, cols]: [usize; 2], value: Precision) -> Result<Concentration, Error> {
    let cells = rows.checked_mul(cols).ok_or(Error::Allocation {
        cells: usize::MAX,
        source: None,
    })?;
    let mut storage = Vec::new();
    storage
        .try_reserve_exact(cells)
        .map_err(|source| Error::Allocation {
            cells,
            source: Some(source),
        })?;
    storage.resize(cells, value);
    Ok(Concentration::from_shape_vec(shape, storage).expect("Storage length matches shape"))
}

/// Concentration of a chemical species
pub type Concentration = Array2<Precision>;

/// Read-only view of a chemical species concentration
pub type ConcentrationView<'a> = ArrayView2<'a, Precision>;

/// Error while setting up concentration storage
#[derive(Debug, Error)]
pub enum Error {
    /// One of the grid dimensions is zero
    #[error("invalid grid dimensions {width}x{height}, both must be positive")]
    InvalidDimension { width: usize, height: usize },

    /// Not enough memory for the requested grid
    #[error("failed to allocate a grid of {cells} cells")]
    Allocation {
        cells: usize,
        #[source]
        source: Option<TryReserveError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_species_is_resting() {
        let mut species = Species::new(5, 3, Boundary::Clamped).unwrap();
        assert_eq!(species.shape(), [3, 5]);
        assert_eq!(species.width(), 5);
        assert_eq!(species.height(), 3);
        assert_eq!(species.boundary(), Boundary::Clamped);
        assert!(species.u.input().iter().all(|&u| u == 1.0));
        assert!(species.v.input().iter().all(|&v| v == 0.0));
        let (_, out_u) = species.u.in_out();
        assert_eq!(out_u.shape(), &[3, 5]);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        for (width, height) in [(0, 4), (4, 0), (0, 0)] {
            assert!(matches!(
                Species::new(width, height, Boundary::Toroidal),
                Err(Error::InvalidDimension { .. })
            ));
        }
    }

    #[test]
    fn overflowing_dimensions_are_rejected() {
        assert!(matches!(
            Species::new(usize::MAX, 2, Boundary::Toroidal),
            Err(Error::Allocation { .. })
        ));
    }

    #[test]
    fn flip_exchanges_buffers_without_copying() {
        let mut species = Species::new(4, 4, Boundary::Toroidal).unwrap();
        let (input, output) = species.v.in_out();
        let input_ptr = input.as_ptr();
        let output_ptr = output.as_ptr();
        output[[1, 2]] = 0.5;

        species.flip();
        assert_eq!(species.v.input().as_ptr(), output_ptr);
        assert_eq!(species.v.input()[[1, 2]], 0.5);
        let (input, output) = species.v.in_out();
        assert_eq!(output.as_ptr(), input_ptr);
        assert_eq!(input.as_ptr(), output_ptr);
    }

    #[test]
    fn sample_uses_xy_and_clips() {
        let mut species = Species::new(4, 3, Boundary::Toroidal).unwrap();
        species.v.input_mut()[[2, 3]] = 0.75;
        species.v.input_mut()[[0, 0]] = 0.25;
        assert_eq!(species.v.sample(3, 2), 0.75);
        assert_eq!(species.v.sample(10, 10), 0.75);
        assert_eq!(species.v.sample(-4, -1), 0.25);
        assert_eq!(species.v.sample(1, 1), 0.0);
    }
}

//! Naive implementation of Gray-Scott simulation
//!
//! Every output cell is computed independently from the input concentrations,
//! looking up its stencil neighbors through the grid's boundary policy. Reads
//! and writes go to distinct buffers, so the order in which cells are visited
//! does not affect the result.

use compute::{stencil::laplacian, Simulate};
use data::{clamp_unit, concentration::Species, parameters::Parameters};

/// Gray-Scott reaction simulation
#[derive(Debug)]
pub struct Simulation {
    /// Simulation parameters
    params: Parameters,
}
//
impl Simulate for Simulation {
    fn new(params: Parameters) -> Self {
        Self { params }
    }

    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn perform_step(&self, species: &mut Species) {
        // Access species concentration matrices
        let boundary = species.boundary();
        let (in_u, out_u) = species.u.in_out();
        let (in_v, out_v) = species.v.in_out();

        // Iterate over pixels of the species concentration matrices
        let params = &self.params;
        ndarray::azip!((index (row, col), out_u in out_u, out_v in out_v, &u in in_u, &v in in_v) {
            // Compute diffusion gradient for u and v
            let full_u = laplacian(in_u.view(), col, row, boundary);
            let full_v = laplacian(in_v.view(), col, row, boundary);

            // Deduce change in u and v
            let uv_square = u * v * v;
            let du = params.diffusion_rate_u * full_u - uv_square + params.feed_rate * (1.0 - u);
            let dv = params.diffusion_rate_v * full_v + uv_square
                - (params.feed_rate + params.kill_rate) * v;

            // Keep concentrations bounded, whatever the parameters
            *out_u = clamp_unit(u + du * params.time_step);
            *out_v = clamp_unit(v + dv * params.time_step);
        });
    }
}

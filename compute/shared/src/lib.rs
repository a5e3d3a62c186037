//! Common facilities shared by all compute backends

#[cfg(feature = "criterion")]
#[doc(hidden)]
pub mod benchmark;
pub mod seeding;
pub mod session;
pub mod stencil;

use data::{
    concentration::{self, Species},
    parameters::{ParameterError, Parameters},
};
use thiserror::Error;

/// Simulation compute backend interface
///
/// Parameters are owned by the backend and may be tuned between steps through
/// [`Simulate::parameters_mut()`]. Every step reads them afresh.
pub trait Simulate {
    /// Set up the simulation
    fn new(params: Parameters) -> Self;

    /// Current simulation parameters
    fn parameters(&self) -> &Parameters;

    /// Mutable access to the simulation parameters
    fn parameters_mut(&mut self) -> &mut Parameters;

    /// Compute one simulation time step
    ///
    /// Reads the input concentrations of `species` and fills its output
    /// concentrations. It is the job of the caller to flip the concentrations
    /// if they want the result to be their input.
    fn perform_step(&self, species: &mut Species);

    /// Perform `steps` full simulation time steps
    ///
    /// After this, the input concentrations of `species` hold the result.
    fn perform_steps(&self, species: &mut Species, steps: usize) {
        for _ in 0..steps {
            self.perform_step(species);
            species.flip();
        }
    }
}

/// Errors that can occur while driving a simulation
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to set up the concentration grids
    #[error("failed to set up simulation grid")]
    Grid(#[from] concentration::Error),

    /// Rejected parameter update
    #[error(transparent)]
    Parameter(#[from] ParameterError),
}

/// Result type of simulation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Macro that generates a complete criterion benchmark harness for you
#[macro_export]
#[cfg(feature = "criterion")]
macro_rules! criterion_benchmark {
    ($backend:ident) => {
        fn criterion_benchmark(c: &mut $crate::benchmark::criterion::Criterion) {
            $crate::benchmark::criterion_benchmark::<$backend::Simulation>(
                c,
                stringify!($backend),
            )
        }
        $crate::benchmark::criterion::criterion_group!(benches, criterion_benchmark);
        $crate::benchmark::criterion::criterion_main!(benches);
    };
}

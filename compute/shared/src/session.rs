//! Interactive simulation session
//!
//! A [`Session`] owns everything an interactive front-end needs to drive a
//! simulation: the concentration grids, the compute backend with its tunable
//! parameters, the seeding configuration and a reproducible random number
//! stream. It has no opinion on frame timing: callers decide when to call
//! [`Session::frame()`], and interaction events are applied in between frames.

use crate::{
    seeding::{Disk, SeedingConfig},
    Result, Simulate,
};
use data::{
    concentration::Species,
    parameters::{Boundary, ParameterName, Parameters},
    Precision,
};
use log::{debug, trace, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::num::NonZeroUsize;

/// Initial configuration of a simulation session
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Side length of the square simulation grid
    pub resolution: usize,

    /// Grid boundary policy
    pub boundary: Boundary,

    /// Initial simulation parameters
    pub parameters: Parameters,

    /// Number of simulation steps per displayed frame
    pub steps_per_frame: NonZeroUsize,

    /// How the fields are perturbed
    pub seeding: SeedingConfig,

    /// Seed of the random number stream used for perturbations
    pub seed: u64,
}
//
impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            resolution: 512,
            boundary: Boundary::default(),
            parameters: Parameters::default(),
            steps_per_frame: NonZeroUsize::new(2).expect("Not zero"),
            seeding: SeedingConfig::default(),
            seed: 0,
        }
    }
}

/// Interactive simulation session
#[derive(Debug)]
pub struct Session<S: Simulate> {
    /// Compute backend, owns the simulation parameters
    backend: S,

    /// Current concentration grids
    species: Species,

    /// How the fields are perturbed
    seeding: SeedingConfig,

    /// Number of simulation steps per frame
    steps_per_frame: NonZeroUsize,

    /// Truth that frames are currently skipped
    paused: bool,

    /// Random number stream for perturbations
    rng: ChaCha12Rng,
}
//
impl<S: Simulate> Session<S> {
    /// Set up a session, allocating grids and applying the startup seeding
    pub fn new(config: SessionConfig) -> Result<Self> {
        let SessionConfig {
            resolution,
            boundary,
            parameters,
            steps_per_frame,
            seeding,
            seed,
        } = config;
        let mut rng = ChaCha12Rng::seed_from_u64(seed);
        let species = Self::make_species(resolution, boundary, &seeding, &mut rng)?;
        debug!("Initialized {resolution}x{resolution} {boundary} grid with {parameters:?}");
        Ok(Self {
            backend: S::new(parameters),
            species,
            seeding,
            steps_per_frame,
            paused: false,
            rng,
        })
    }

    /// Discard the grids and start over at a new resolution
    ///
    /// The boundary policy of the previous grids is kept. On error, the
    /// previous grids remain in use.
    pub fn reset(&mut self, resolution: usize) -> Result<()> {
        self.reset_with(resolution, self.species.boundary())
    }

    /// Like `reset()`, but also select a new boundary policy
    pub fn reset_with(&mut self, resolution: usize, boundary: Boundary) -> Result<()> {
        let species = Self::make_species(resolution, boundary, &self.seeding, &mut self.rng)?;
        self.species = species;
        debug!("Reset to {resolution}x{resolution} {boundary} grid");
        Ok(())
    }

    /// Update a simulation parameter by name
    ///
    /// Takes effect on the next simulation step.
    pub fn set_parameter(&mut self, name: &str, value: Precision) -> Result<()> {
        self.backend
            .parameters_mut()
            .set_named(name, value)
            .inspect_err(|e| warn!("Ignored parameter update: {e}"))?;
        debug!("Set {name} to {value}");
        Ok(())
    }

    /// Read a simulation parameter
    pub fn parameter(&self, name: ParameterName) -> Precision {
        self.parameters().get(name)
    }

    /// Current simulation parameters
    pub fn parameters(&self) -> &Parameters {
        self.backend.parameters()
    }

    /// Number of simulation steps per frame
    pub fn steps_per_frame(&self) -> NonZeroUsize {
        self.steps_per_frame
    }

    /// Change the number of simulation steps per frame
    pub fn set_steps_per_frame(&mut self, steps: NonZeroUsize) {
        debug!("Set steps per frame to {steps}");
        self.steps_per_frame = steps;
    }

    /// Seeding configuration
    pub fn seeding(&self) -> &SeedingConfig {
        &self.seeding
    }

    /// Change the seeding configuration
    ///
    /// The startup perturbation will only be applied on the next reset.
    pub fn set_seeding(&mut self, seeding: SeedingConfig) {
        self.seeding = seeding;
    }

    /// Inject the configured deposit at grid coordinates (x, y)
    ///
    /// Out-of-grid coordinates are tolerated, only the in-bounds part of the
    /// deposit is applied.
    pub fn inject_at(&mut self, x: i64, y: i64) {
        let injection = self.seeding.injection;
        self.inject_disk(x, y, &injection);
    }

    /// Inject the configured drag deposit at grid coordinates (x, y)
    ///
    /// Meant to be called on every pointer motion while a press is held.
    pub fn drag_at(&mut self, x: i64, y: i64) {
        let drag = self.seeding.drag;
        self.inject_disk(x, y, &drag);
    }

    /// Like `inject_at()`, but with a custom deposit
    pub fn inject_disk(&mut self, x: i64, y: i64, disk: &Disk) {
        trace!("Injecting {disk:?} at ({x}, {y})");
        disk.apply(&mut self.species, x, y, &mut self.rng);
    }

    /// Apply the configured random perturbation
    pub fn random_perturb(&mut self) {
        trace!("Applying random perturbation");
        let perturbation = self.seeding.perturbation;
        perturbation.apply(&mut self.species, &mut self.rng);
    }

    /// Stop frames from advancing the simulation
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Let frames advance the simulation again
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Truth that frames are currently skipped
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Perform exactly one simulation step, whether paused or not
    pub fn advance(&mut self) {
        self.backend.perform_steps(&mut self.species, 1);
    }

    /// Perform one frame's worth of simulation steps, unless paused
    ///
    /// Returns whether the simulation moved forward.
    pub fn frame(&mut self) -> bool {
        if self.paused {
            return false;
        }
        self.backend
            .perform_steps(&mut self.species, self.steps_per_frame.get());
        true
    }

    /// Current concentration grids
    pub fn species(&self) -> &Species {
        &self.species
    }

    /// Concentration of V at grid coordinates (x, y), clipped to the grid
    pub fn sample_v(&self, x: i64, y: i64) -> Precision {
        self.species.v.sample(x, y)
    }

    /// Concentration of U at grid coordinates (x, y), clipped to the grid
    pub fn sample_u(&self, x: i64, y: i64) -> Precision {
        self.species.u.sample(x, y)
    }

    /// Allocate and seed new grids
    fn make_species(
        resolution: usize,
        boundary: Boundary,
        seeding: &SeedingConfig,
        rng: &mut ChaCha12Rng,
    ) -> Result<Species> {
        let mut species = Species::new(resolution, resolution, boundary)?;
        seeding.startup.apply(&mut species, rng);
        Ok(species)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        seeding::{DiskStyle, Radius, Startup},
        Error,
    };
    use data::{concentration, parameters::ParameterError};
    use std::{cell::Cell, sync::Once};

    fn init_logger() {
        static INIT_LOGGER: Once = Once::new();
        INIT_LOGGER.call_once(|| env_logger::init());
    }

    /// Backend that counts steps and fills V with the step count
    #[derive(Debug)]
    struct Counter {
        params: Parameters,
        steps: Cell<usize>,
    }
    //
    impl Simulate for Counter {
        fn new(params: Parameters) -> Self {
            Self {
                params,
                steps: Cell::new(0),
            }
        }

        fn parameters(&self) -> &Parameters {
            &self.params
        }

        fn parameters_mut(&mut self) -> &mut Parameters {
            &mut self.params
        }

        fn perform_step(&self, species: &mut Species) {
            self.steps.set(self.steps.get() + 1);
            let (_, out_v) = species.v.in_out();
            out_v.fill(self.steps.get() as Precision / 1000.0);
        }
    }

    fn resting(resolution: usize) -> SessionConfig {
        SessionConfig {
            resolution,
            steps_per_frame: NonZeroUsize::new(3).unwrap(),
            seeding: SeedingConfig {
                startup: Startup::Resting,
                ..SeedingConfig::default()
            },
            ..SessionConfig::default()
        }
    }

    #[test]
    fn frames_honor_pause_and_step_count() {
        init_logger();
        let mut session = Session::<Counter>::new(resting(8)).unwrap();
        assert!(session.frame());
        assert_eq!(session.backend.steps.get(), 3);
        assert_eq!(session.sample_v(0, 0), 0.003);

        session.pause();
        assert!(session.is_paused());
        assert!(!session.frame());
        assert_eq!(session.backend.steps.get(), 3);

        // Explicit single steps still work while paused
        session.advance();
        assert_eq!(session.backend.steps.get(), 4);

        session.resume();
        session.set_steps_per_frame(NonZeroUsize::new(5).unwrap());
        assert!(session.frame());
        assert_eq!(session.backend.steps.get(), 9);
    }

    #[test]
    fn parameters_are_updated_by_name() {
        init_logger();
        let mut session = Session::<Counter>::new(resting(8)).unwrap();
        session.set_parameter("feedRate", 0.05).unwrap();
        session.set_parameter("dt", 0.5).unwrap();
        assert_eq!(session.parameter(ParameterName::FeedRate), 0.05);
        assert_eq!(session.parameters().time_step, 0.5);

        assert!(matches!(
            session.set_parameter("killRate", Precision::NAN),
            Err(Error::Parameter(ParameterError::InvalidValue { .. }))
        ));
        assert!(matches!(
            session.set_parameter("entropy", 1.0),
            Err(Error::Parameter(ParameterError::UnknownName(_)))
        ));
        assert_eq!(session.parameters().kill_rate, Parameters::default().kill_rate);
    }

    #[test]
    fn failed_reset_keeps_previous_grid() {
        init_logger();
        let mut session = Session::<Counter>::new(resting(8)).unwrap();
        session.inject_at(4, 4);
        let before = session.species().clone();
        assert!(matches!(
            session.reset(0),
            Err(Error::Grid(concentration::Error::InvalidDimension { .. }))
        ));
        assert_eq!(session.species(), &before);
    }

    #[test]
    fn reset_replaces_grid() {
        init_logger();
        let mut session = Session::<Counter>::new(resting(8)).unwrap();
        session.inject_at(4, 4);
        session.reset(16).unwrap();
        assert_eq!(session.species().shape(), [16, 16]);
        assert_eq!(session.species().boundary(), Boundary::Toroidal);
        assert!(session.species().v.input().iter().all(|&v| v == 0.0));

        session.reset_with(4, Boundary::Clamped).unwrap();
        assert_eq!(session.species().shape(), [4, 4]);
        assert_eq!(session.species().boundary(), Boundary::Clamped);
    }

    #[test]
    fn injection_tolerates_off_grid_positions() {
        init_logger();
        let mut session = Session::<Counter>::new(resting(16)).unwrap();
        session.inject_at(-100, -100);
        assert!(session.species().v.input().iter().all(|&v| v == 0.0));
        session.inject_at(-2, 8);
        assert!(session.sample_v(0, 8) > 0.0);
        assert!(session.sample_u(0, 8) < 1.0);

        let pin = Disk {
            radius: Radius::Fixed(0),
            style: DiskStyle::Set { v: 1.0 },
        };
        session.inject_disk(15, 15, &pin);
        assert_eq!(session.sample_v(15, 15), 1.0);
        assert_eq!(session.sample_u(15, 15), 0.0);
        assert_eq!(session.sample_v(14, 15), 0.0);
    }

    #[test]
    fn press_and_drag_use_their_own_deposits() {
        init_logger();
        let mut session = Session::<Counter>::new(SessionConfig {
            resolution: 48,
            seeding: SeedingConfig {
                startup: Startup::Resting,
                ..SeedingConfig::classic()
            },
            ..SessionConfig::default()
        })
        .unwrap();
        session.inject_at(10, 10);
        session.drag_at(36, 36);

        // Press: radius 8, V set to 0.85
        assert_eq!(session.sample_v(10, 10), 0.85);
        assert_eq!(session.sample_v(18, 10), 0.85);
        assert_eq!(session.sample_v(19, 10), 0.0);

        // Drag: radius 5, V set to 0.7
        assert_eq!(session.sample_v(36, 36), 0.7);
        assert!((session.sample_u(36, 36) - 0.3).abs() < 1e-6);
        assert_eq!(session.sample_v(41, 36), 0.7);
        assert_eq!(session.sample_v(42, 36), 0.0);

        // The additive preset paints with the press deposit
        let additive = SeedingConfig::additive();
        assert_eq!(additive.drag, additive.injection);
    }

    #[test]
    fn perturbations_are_reproducible() {
        init_logger();
        let config = SessionConfig {
            resolution: 32,
            seeding: SeedingConfig::classic(),
            seed: 7,
            ..SessionConfig::default()
        };
        let run = || {
            let mut session = Session::<Counter>::new(config.clone()).unwrap();
            session.random_perturb();
            session.species().clone()
        };
        let species = run();
        assert!(species.v.input().iter().any(|&v| v > 0.0));
        assert_eq!(species, run());
    }
}

//! This crate collects elements that are shared between the programs that
//! drive or display the reaction-diffusion simulation.

#[cfg(feature = "visualization")]
pub mod render;

#[cfg(feature = "simulation")]
use clap::{Args, ValueEnum};
#[cfg(feature = "simulation")]
use compute::{seeding::SeedingConfig, session::SessionConfig};
#[cfg(feature = "tui")]
use indicatif::{ProgressBar, ProgressFinish, ProgressStyle};
#[cfg(feature = "tui")]
use log::LevelFilter;
#[cfg(feature = "simulation")]
use data::parameters::{Boundary, Parameters};
#[cfg(feature = "simulation")]
use data::Precision;
#[cfg(feature = "simulation")]
use std::num::NonZeroUsize;
#[cfg(feature = "tui")]
use std::time::Duration;

/// CLI arguments shared by the programs that run a simulation
#[cfg(feature = "simulation")]
#[derive(Args, Clone, Debug)]
pub struct SharedArgs {
    /// Rate at which V decays
    #[arg(short, long)]
    pub killrate: Option<Precision>,

    /// Rate of the process which feeds U and drains U and V
    #[arg(short, long)]
    pub feedrate: Option<Precision>,

    /// Diffusion rate of species U
    #[arg(long)]
    pub diffusion_u: Option<Precision>,

    /// Diffusion rate of species V
    #[arg(long)]
    pub diffusion_v: Option<Precision>,

    /// Simulated time interval on each simulation step
    #[arg(short = 't', long)]
    pub deltat: Option<Precision>,

    /// Number of simulation steps to perform between images
    #[arg(short = 'e', long, default_value_t = NonZeroUsize::new(2).unwrap())]
    pub nbextrastep: NonZeroUsize,

    /// Side length of the square simulation grid
    #[arg(short, long, default_value_t = 512)]
    pub resolution: usize,

    /// Treatment of the grid edges ("clamped" or "toroidal")
    #[arg(short, long, default_value_t = Boundary::Toroidal)]
    pub boundary: Boundary,

    /// How the concentration fields are perturbed
    #[arg(long, value_enum, default_value_t = SeedingPreset::Additive)]
    pub seeding: SeedingPreset,

    /// Seed of the random perturbations
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

/// Named seeding configurations
#[cfg(feature = "simulation")]
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum SeedingPreset {
    /// Micro-noise and strong disks that set the concentration
    Classic,

    /// Faint noise and disks that add to the concentration
    Additive,
}
//
#[cfg(feature = "simulation")]
impl From<SeedingPreset> for SeedingConfig {
    fn from(preset: SeedingPreset) -> Self {
        match preset {
            SeedingPreset::Classic => Self::classic(),
            SeedingPreset::Additive => Self::additive(),
        }
    }
}

/// Simulation parameters, with defaults for those not set on the CLI
#[cfg(feature = "simulation")]
pub fn parameters(args: &SharedArgs) -> Parameters {
    let defaults = Parameters::default();
    Parameters {
        feed_rate: args.feedrate.unwrap_or(defaults.feed_rate),
        kill_rate: args.killrate.unwrap_or(defaults.kill_rate),
        diffusion_rate_u: args.diffusion_u.unwrap_or(defaults.diffusion_rate_u),
        diffusion_rate_v: args.diffusion_v.unwrap_or(defaults.diffusion_rate_v),
        time_step: args.deltat.unwrap_or(defaults.time_step),
    }
}

/// Session configuration matching the CLI arguments
#[cfg(feature = "simulation")]
pub fn session_config(args: &SharedArgs) -> SessionConfig {
    SessionConfig {
        resolution: args.resolution,
        boundary: args.boundary,
        parameters: parameters(args),
        steps_per_frame: args.nbextrastep,
        seeding: args.seeding.into(),
        seed: args.seed,
    }
}

/// Enable logging to syslog
#[cfg(feature = "tui")]
pub fn init_syslog() {
    syslog::init(
        syslog::Facility::default(),
        if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
        None,
    )
    .expect("Failed to initialize syslog");
}

/// Set up a progress bar over `len` items
#[cfg(feature = "tui")]
pub fn init_progress_reporting(message: impl Into<String>, len: usize) -> ProgressBar {
    let progress = ProgressBar::new(len as u64)
        .with_message(message.into())
        .with_style(
            ProgressStyle::with_template("{msg} {pos}/{len} {wide_bar} {elapsed}/~{duration}")
                .expect("Failed to parse style"),
        )
        .with_finish(ProgressFinish::AndClear);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

#[cfg(all(test, feature = "simulation"))]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        shared: SharedArgs,
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["test"]);
        assert_eq!(parameters(&cli.shared), Parameters::default());
        let config = session_config(&cli.shared);
        assert_eq!(config.resolution, 512);
        assert_eq!(config.boundary, Boundary::Toroidal);
        assert_eq!(config.seeding, SeedingConfig::additive());
        assert_eq!(config.steps_per_frame.get(), 2);
    }

    #[test]
    fn overrides() {
        let cli = Cli::parse_from([
            "test",
            "-f",
            "0.037",
            "--killrate",
            "0.06",
            "--diffusion-u",
            "0.2",
            "-t",
            "0.5",
            "--boundary",
            "clamped",
            "--seeding",
            "classic",
            "-r",
            "128",
        ]);
        let config = session_config(&cli.shared);
        assert_eq!(config.parameters.feed_rate, 0.037);
        assert_eq!(config.parameters.kill_rate, 0.06);
        assert_eq!(config.parameters.diffusion_rate_u, 0.2);
        assert_eq!(config.parameters.time_step, 0.5);
        assert_eq!(config.boundary, Boundary::Clamped);
        assert_eq!(config.seeding, SeedingConfig::classic());
        assert_eq!(config.resolution, 128);
    }
}

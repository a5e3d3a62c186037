//! Localized and randomized perturbations of the concentration fields
//!
//! Pattern formation needs something to start from, since the resting state
//! (U = 1, V = 0 everywhere) is a fixed point of the simulation. This module
//! provides the perturbation primitives and a declarative configuration of
//! when and how they are applied.
//!
//! All operations act on the input (authoritative) concentrations, so they
//! must only be called between simulation steps. Their effect is seen by the
//! very next step. Resulting concentrations always stay within [0, 1].

use data::{
    clamp_unit,
    concentration::{Concentration, Species},
    Precision,
};
use rand::Rng;
use std::num::NonZeroUsize;

/// Add `delta` to every cell within `radius` of `(center_x, center_y)`
///
/// Results are clamped to `[lower, upper]`, which is itself restricted to
/// [0, 1]. Passing `lower == upper` thus sets the disk to a fixed value.
///
/// The center may lie outside of the grid, in which case only the in-bounds
/// part of the disk is affected.
pub fn deposit_disk(
    grid: &mut Concentration,
    center_x: i64,
    center_y: i64,
    radius: usize,
    delta: Precision,
    lower: Precision,
    upper: Precision,
) {
    let lower = clamp_unit(lower);
    let upper = clamp_unit(upper).max(lower);
    let radius = i64::try_from(radius).unwrap_or(i64::MAX);
    let radius2 = radius.saturating_mul(radius);

    let (rows, cols) = grid.dim();
    let axis_range = |center: i64, len: usize| {
        let start = center.saturating_sub(radius).max(0);
        let end = center.saturating_add(radius).min(len as i64 - 1);
        start..=end
    };
    for y in axis_range(center_y, rows) {
        let dy = y.saturating_sub(center_y);
        for x in axis_range(center_x, cols) {
            let dx = x.saturating_sub(center_x);
            if dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy)) > radius2 {
                continue;
            }
            let cell = &mut grid[[y as usize, x as usize]];
            *cell = (*cell + delta).max(lower).min(upper);
        }
    }
}

/// Sprinkle random cells with V and drain some U from them
///
/// Cells are drawn with replacement, so a single cell can be hit more than
/// once. `v` and `u` must have the same shape.
pub fn sprinkle_random(
    v: &mut Concentration,
    u: &mut Concentration,
    sprinkle: &Sprinkle,
    rng: &mut impl Rng,
) {
    debug_assert_eq!(v.dim(), u.dim());
    let (rows, cols) = v.dim();
    for _ in 0..sprinkle.count {
        let pos = [rng.random_range(0..rows), rng.random_range(0..cols)];
        let amount = match sprinkle.strength {
            SprinkleStrength::Randomized => {
                sprinkle.v_amount * (0.5 + rng.random::<Precision>())
            }
            SprinkleStrength::Flat => sprinkle.v_amount,
        };
        v[pos] = clamp_unit(v[pos] + amount);
        u[pos] = clamp_unit(u[pos] - sprinkle.u_drop);
    }
}

/// Put a little bit of noise on a regular subset of cells
///
/// Every `stride`-th cell in row-major order gets `V = r` and `U = 1 - s`,
/// where `r` and `s` are drawn independently and uniformly from
/// `[0, amplitude)`.
pub fn stride_noise(
    v: &mut Concentration,
    u: &mut Concentration,
    noise: &StrideNoise,
    rng: &mut impl Rng,
) {
    debug_assert_eq!(v.dim(), u.dim());
    for (v, u) in (v.iter_mut().zip(u.iter_mut())).step_by(noise.stride.get()) {
        *v = clamp_unit(rng.random::<Precision>() * noise.amplitude);
        *u = clamp_unit(1.0 - rng.random::<Precision>() * noise.amplitude);
    }
}

/// Random sprinkling of V over the whole grid
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sprinkle {
    /// Number of cells to be drawn
    pub count: usize,

    /// Amount of V to be added
    pub v_amount: Precision,

    /// Amount of U to be removed
    pub u_drop: Precision,

    /// How `v_amount` is modulated
    pub strength: SprinkleStrength,
}

/// Strength of each sprinkled drop of V
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum SprinkleStrength {
    /// Each drop adds `v_amount * (0.5 + r)` with `r` uniform in [0, 1)
    #[default]
    Randomized,

    /// Each drop adds exactly `v_amount`
    Flat,
}

/// Low-amplitude noise applied on a regular subset of the grid
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StrideNoise {
    /// Distance between two noisy cells in row-major order
    pub stride: NonZeroUsize,

    /// Maximal V concentration of a noisy cell
    pub amplitude: Precision,
}

/// Disk-shaped deposit
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Disk {
    /// How the disk radius is chosen
    pub radius: Radius,

    /// What is done to the cells within the disk
    pub style: DiskStyle,
}
//
impl Disk {
    /// Apply this deposit to `species`, centered on grid coordinates (x, y)
    pub fn apply(&self, species: &mut Species, x: i64, y: i64, rng: &mut impl Rng) {
        let radius = self.radius.resolve(species.shape(), rng);
        match self.style {
            DiskStyle::Set { v } => {
                let v = clamp_unit(v);
                let u = 1.0 - v;
                deposit_disk(species.v.input_mut(), x, y, radius, 0.0, v, v);
                deposit_disk(species.u.input_mut(), x, y, radius, 0.0, u, u);
            }
            DiskStyle::Add { v, u } => {
                deposit_disk(species.v.input_mut(), x, y, radius, v, 0.0, 1.0);
                deposit_disk(species.u.input_mut(), x, y, radius, u, 0.0, 1.0);
            }
        }
    }
}

/// Radius of a disk-shaped deposit, in grid cells
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Radius {
    /// Always the same radius
    Fixed(usize),

    /// Fraction of the smallest grid dimension, but never below `min`
    Scaled { fraction: Precision, min: usize },

    /// Uniformly drawn from `0..below`, then raised to `min`
    ///
    /// Small radii are thus favored: `min` itself comes up with probability
    /// `(min + 1) / below`.
    AtLeast { min: usize, below: usize },
}
//
impl Radius {
    /// Pick a radius for a grid of a certain [rows, cols] shape
    pub fn resolve(&self, [rows, cols]: [usize; 2], rng: &mut impl Rng) -> usize {
        match *self {
            Self::Fixed(radius) => radius,
            Self::Scaled { fraction, min } => {
                let scaled = (rows.min(cols) as Precision * fraction).floor();
                // Saturating float-to-int conversion, NaN becomes 0
                (scaled as usize).max(min)
            }
            Self::AtLeast { min, below } if below > 0 => rng.random_range(0..below).max(min),
            Self::AtLeast { min, .. } => min,
        }
    }
}

/// Effect of a disk-shaped deposit
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DiskStyle {
    /// Set V to `v` and U to `1 - v`
    Set { v: Precision },

    /// Add `v` to V and `u` to U
    Add { v: Precision, u: Precision },
}

/// Where a perturbation's disk lands
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum Placement {
    /// Center of the grid
    #[default]
    Center,

    /// Uniformly random grid cell
    Random,
}
//
impl Placement {
    /// Pick grid coordinates (x, y) for a grid of a certain [rows, cols] shape
    pub fn resolve(&self, [rows, cols]: [usize; 2], rng: &mut impl Rng) -> [i64; 2] {
        let [x, y] = match self {
            Self::Center => [cols / 2, rows / 2],
            Self::Random => [rng.random_range(0..cols), rng.random_range(0..rows)],
        };
        [x as i64, y as i64]
    }
}

/// Combined sprinkle and disk perturbation
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Perturbation {
    /// Random sprinkling, applied first
    pub sprinkle: Option<Sprinkle>,

    /// Disk-shaped deposit, applied second
    pub disk: Option<Disk>,

    /// Location of the disk
    pub placement: Placement,
}
//
impl Perturbation {
    /// Apply this perturbation to `species`
    pub fn apply(&self, species: &mut Species, rng: &mut impl Rng) {
        if let Some(sprinkle) = &self.sprinkle {
            let Species { u, v, .. } = species;
            sprinkle_random(v.input_mut(), u.input_mut(), sprinkle, rng);
        }
        if let Some(disk) = &self.disk {
            let [x, y] = self.placement.resolve(species.shape(), rng);
            disk.apply(species, x, y, rng);
        }
    }
}

/// Perturbation applied to freshly allocated grids
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Startup {
    /// Leave the grids in the resting state
    Resting,

    /// Apply a perturbation
    Perturb(Perturbation),

    /// Apply low-amplitude noise on a regular subset of cells
    StrideNoise(StrideNoise),
}
//
impl Startup {
    /// Apply this startup perturbation to `species`
    pub fn apply(&self, species: &mut Species, rng: &mut impl Rng) {
        match self {
            Self::Resting => {}
            Self::Perturb(perturbation) => perturbation.apply(species, rng),
            Self::StrideNoise(noise) => {
                let Species { u, v, .. } = species;
                stride_noise(v.input_mut(), u.input_mut(), noise, rng);
            }
        }
    }
}

/// Complete description of how a simulation gets perturbed
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SeedingConfig {
    /// Applied whenever new grids are allocated
    pub startup: Startup,

    /// Applied where the user presses
    pub injection: Disk,

    /// Applied along the path of the user's drag
    pub drag: Disk,

    /// Applied on explicit request for a random perturbation
    pub perturbation: Perturbation,
}
//
impl SeedingConfig {
    /// Micro-noise and strong "set-like" disks
    ///
    /// Grids start with randomized sprinkles and a central disk. Presses set
    /// V to a high value, drags paint a thinner and fainter trail. Random
    /// perturbations combine a dense sprinkle with a randomly located disk.
    pub fn classic() -> Self {
        Self {
            startup: Startup::Perturb(Perturbation {
                sprinkle: Some(Sprinkle {
                    count: 20_000,
                    v_amount: 0.02,
                    u_drop: 0.02,
                    strength: SprinkleStrength::Randomized,
                }),
                disk: Some(Disk {
                    radius: Radius::Scaled {
                        fraction: 0.04,
                        min: 8,
                    },
                    style: DiskStyle::Set { v: 0.5 },
                }),
                placement: Placement::Center,
            }),
            injection: Disk {
                radius: Radius::Fixed(8),
                style: DiskStyle::Set { v: 0.85 },
            },
            drag: Disk {
                radius: Radius::Fixed(5),
                style: DiskStyle::Set { v: 0.7 },
            },
            perturbation: Perturbation {
                sprinkle: Some(Sprinkle {
                    count: 40_000,
                    v_amount: 0.03,
                    u_drop: 0.0,
                    strength: SprinkleStrength::Randomized,
                }),
                disk: Some(Disk {
                    radius: Radius::AtLeast { min: 6, below: 20 },
                    style: DiskStyle::Set { v: 0.9 },
                }),
                placement: Placement::Random,
            },
        }
    }

    /// Faint noise and additive disks
    ///
    /// Grids start with sparse low-amplitude noise. Presses and drags both
    /// add V and remove some U. Random perturbations add V at the center.
    pub fn additive() -> Self {
        const SEED_AMOUNT: Precision = 0.5;
        let injection = Disk {
            radius: Radius::Fixed(6),
            style: DiskStyle::Add {
                v: SEED_AMOUNT,
                u: -SEED_AMOUNT * 0.35,
            },
        };
        Self {
            startup: Startup::StrideNoise(StrideNoise {
                stride: NonZeroUsize::new(7).expect("Not zero"),
                amplitude: 0.01,
            }),
            injection,
            drag: injection,
            perturbation: Perturbation {
                sprinkle: None,
                disk: Some(Disk {
                    radius: Radius::Scaled {
                        fraction: 1.0 / 32.0,
                        min: 8,
                    },
                    style: DiskStyle::Add {
                        v: SEED_AMOUNT,
                        u: 0.0,
                    },
                }),
                placement: Placement::Center,
            },
        }
    }
}
//
impl Default for SeedingConfig {
    fn default() -> Self {
        Self::additive()
    }
}

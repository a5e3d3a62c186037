//! Computation parameters

use crate::Precision;
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Computation parameters
///
/// These are read afresh on every simulation step, so changes made between
/// two steps take effect on the very next one.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Parameters {
    /// Speed of the chemical reaction that feeds U and drains U and V
    pub feed_rate: Precision,

    /// Rate at which V decays
    pub kill_rate: Precision,

    /// Diffusion rate of species U
    pub diffusion_rate_u: Precision,

    /// Diffusion rate of species V
    pub diffusion_rate_v: Precision,

    /// Time step (make it shorter to increase precision)
    pub time_step: Precision,
}
//
impl Default for Parameters {
    fn default() -> Self {
        Self {
            feed_rate: 0.038,
            kill_rate: 0.061,
            diffusion_rate_u: 0.16,
            diffusion_rate_v: 0.08,
            time_step: 1.0,
        }
    }
}
//
impl Parameters {
    /// Read a parameter by name
    pub fn get(&self, name: ParameterName) -> Precision {
        *self.field(name)
    }

    /// Update a parameter
    ///
    /// Any finite non-negative value is accepted, even far outside of the
    /// usual range, since the simulation clamps concentrations on every step.
    /// On error, the previous value is kept.
    pub fn set(&mut self, name: ParameterName, value: Precision) -> Result<(), ParameterError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ParameterError::InvalidValue { name, value });
        }
        *self.field_mut(name) = value;
        Ok(())
    }

    /// Like `set()`, but the parameter is designated by a textual name
    pub fn set_named(&mut self, name: &str, value: Precision) -> Result<(), ParameterError> {
        self.set(name.parse()?, value)
    }

    fn field(&self, name: ParameterName) -> &Precision {
        match name {
            ParameterName::FeedRate => &self.feed_rate,
            ParameterName::KillRate => &self.kill_rate,
            ParameterName::DiffusionU => &self.diffusion_rate_u,
            ParameterName::DiffusionV => &self.diffusion_rate_v,
            ParameterName::TimeStep => &self.time_step,
        }
    }

    fn field_mut(&mut self, name: ParameterName) -> &mut Precision {
        match name {
            ParameterName::FeedRate => &mut self.feed_rate,
            ParameterName::KillRate => &mut self.kill_rate,
            ParameterName::DiffusionU => &mut self.diffusion_rate_u,
            ParameterName::DiffusionV => &mut self.diffusion_rate_v,
            ParameterName::TimeStep => &mut self.time_step,
        }
    }
}

/// Name of a tunable simulation parameter
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum ParameterName {
    FeedRate,
    KillRate,
    DiffusionU,
    DiffusionV,
    TimeStep,
}
//
impl ParameterName {
    /// All parameter names, in a stable order
    pub const ALL: [Self; 5] = [
        Self::FeedRate,
        Self::KillRate,
        Self::DiffusionU,
        Self::DiffusionV,
        Self::TimeStep,
    ];

    /// Canonical textual name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FeedRate => "feedRate",
            Self::KillRate => "killRate",
            Self::DiffusionU => "diffusionU",
            Self::DiffusionV => "diffusionV",
            Self::TimeStep => "timeStep",
        }
    }
}
//
impl fmt::Display for ParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
//
impl FromStr for ParameterName {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "feedRate" | "feed_rate" | "F" => Ok(Self::FeedRate),
            "killRate" | "kill_rate" | "k" => Ok(Self::KillRate),
            "diffusionU" | "diffusion_u" | "Du" => Ok(Self::DiffusionU),
            "diffusionV" | "diffusion_v" | "Dv" => Ok(Self::DiffusionV),
            "timeStep" | "time_step" | "dt" => Ok(Self::TimeStep),
            _ => Err(ParameterError::UnknownName(s.to_owned())),
        }
    }
}

/// Error while updating simulation parameters
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParameterError {
    /// No parameter has this name
    #[error("unknown simulation parameter {0:?}")]
    UnknownName(String),

    /// Value is negative, infinite or NaN
    #[error("invalid value {value} for parameter {name}")]
    InvalidValue {
        name: ParameterName,
        value: Precision,
    },
}

/// Treatment of stencil neighbors that fall outside of the simulation grid
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum Boundary {
    /// Out-of-range neighbors are replaced by the nearest edge cell
    ///
    /// This approximates a zero-flux boundary.
    Clamped,

    /// Out-of-range neighbors wrap around to the opposite edge
    #[default]
    Toroidal,
}
//
impl Boundary {
    /// Indices of the previous and next neighbor of `pos` on an axis of
    /// length `len`
    ///
    /// `pos` must be smaller than `len`.
    #[inline]
    pub fn neighbors(self, pos: usize, len: usize) -> [usize; 2] {
        debug_assert!(pos < len);
        match self {
            Self::Clamped => [pos.saturating_sub(1), (pos + 1).min(len - 1)],
            Self::Toroidal => [
                if pos == 0 { len - 1 } else { pos - 1 },
                if pos + 1 == len { 0 } else { pos + 1 },
            ],
        }
    }
}
//
impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Clamped => "clamped",
            Self::Toroidal => "toroidal",
        })
    }
}
//
impl FromStr for Boundary {
    type Err = BoundaryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clamped" | "clamp" | "edge" => Ok(Self::Clamped),
            "toroidal" | "torus" | "wrap" => Ok(Self::Toroidal),
            _ => Err(BoundaryParseError(s.to_owned())),
        }
    }
}

/// Unrecognized boundary policy name
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("unknown boundary policy {0:?}, expected \"clamped\" or \"toroidal\"")]
pub struct BoundaryParseError(String);

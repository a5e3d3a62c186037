//! Data format used by the Gray-Scott reaction simulation

pub mod concentration;
pub mod parameters;

/// Computation precision
pub type Precision = f32;

/// Clamp a concentration into the [0, 1] range
///
/// NaN, which extreme parameters can produce through `inf * 0`, is mapped to 0.
#[inline]
pub fn clamp_unit(value: Precision) -> Precision {
    value.max(0.0).min(1.0)
}

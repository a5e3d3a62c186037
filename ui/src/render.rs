//! Translation of concentration fields into images

use clap::ValueEnum;
use colorous::Gradient;
use data::{clamp_unit, concentration::ConcentrationView, Precision};
use image::{Rgba, RgbaImage};

/// Color gradient of the [`Palette::Inferno`] palette
pub const GRADIENT: Gradient = colorous::INFERNO;

/// Adjustment of concentrations before color mapping
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ToneMapping {
    /// Scale factor applied around the 0.5 midpoint
    pub contrast: Precision,

    /// Offset added after contrast scaling
    pub brightness: Precision,

    /// Truth that the final value is flipped (1 - value)
    pub invert: bool,
}
//
impl Default for ToneMapping {
    fn default() -> Self {
        Self {
            contrast: 1.0,
            brightness: 0.0,
            invert: false,
        }
    }
}
//
impl ToneMapping {
    /// Map a concentration to a display intensity in [0, 1]
    pub fn apply(&self, value: Precision) -> Precision {
        let value = clamp_unit((value - 0.5) * self.contrast + 0.5 + self.brightness);
        if self.invert {
            1.0 - value
        } else {
            value
        }
    }
}

/// Mapping from display intensity to color
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq, ValueEnum)]
pub enum Palette {
    /// Black to white
    #[default]
    Grayscale,

    /// Pale blue, darkening as intensity increases
    Tinted,

    /// Perceptually uniform black-red-yellow gradient
    Inferno,
}
//
impl Palette {
    /// Color of a display intensity in [0, 1]
    pub fn color(self, intensity: Precision) -> Rgba<u8> {
        let intensity = clamp_unit(intensity);
        match self {
            Self::Grayscale => {
                let gray = (intensity * 255.0) as u8;
                Rgba([gray, gray, gray, 255])
            }
            Self::Tinted => {
                let c = (20.0 + 225.0 * intensity).floor();
                let channel = |base: Precision, weight: Precision| (base - (c * weight).floor()) as u8;
                Rgba([
                    channel(180.0, 0.45),
                    channel(200.0, 0.35),
                    channel(220.0, 0.15),
                    255,
                ])
            }
            Self::Inferno => {
                let color = GRADIENT.eval_continuous(intensity.into());
                Rgba([color.r, color.g, color.b, 255])
            }
        }
    }
}

/// Render a concentration field into a `width` x `height` image
///
/// The field is resampled with nearest-neighbor lookup, so the image does not
/// need to match the simulation grid's resolution.
pub fn render(
    field: ConcentrationView<'_>,
    [width, height]: [u32; 2],
    tone: &ToneMapping,
    palette: Palette,
) -> RgbaImage {
    let (rows, cols) = field.dim();
    RgbaImage::from_fn(width, height, |px, py| {
        let row = py as usize * rows / height as usize;
        let col = px as usize * cols / width as usize;
        palette.color(tone.apply(field[[row, col]]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn default_tone_mapping_is_identity() {
        let tone = ToneMapping::default();
        for value in [0.0, 0.25, 0.5, 1.0] {
            assert_eq!(tone.apply(value), value);
        }
        assert_eq!(tone.apply(1.5), 1.0);
    }

    #[test]
    fn tone_mapping_adjusts_and_inverts() {
        let tone = ToneMapping {
            contrast: 2.0,
            brightness: 0.1,
            invert: true,
        };
        assert!((tone.apply(0.5) - 0.4).abs() < 1e-6);
        assert_eq!(tone.apply(1.0), 0.0);
        assert_eq!(tone.apply(0.0), 1.0);
    }

    #[test]
    fn palette_endpoints() {
        assert_eq!(Palette::Grayscale.color(0.0), Rgba([0, 0, 0, 255]));
        assert_eq!(Palette::Grayscale.color(1.0), Rgba([255, 255, 255, 255]));
        assert_eq!(Palette::Tinted.color(0.0), Rgba([171, 193, 217, 255]));
        assert_eq!(Palette::Tinted.color(1.0), Rgba([70, 115, 184, 255]));
        let Rgba([r, g, b, a]) = Palette::Inferno.color(0.0);
        assert!(r < 10 && g < 10 && b < 10 && a == 255);
    }

    #[test]
    fn render_resamples() {
        let field = array![[0.0, 1.0], [1.0, 0.0]];
        let image = render(field.view(), [4, 4], &ToneMapping::default(), Palette::Grayscale);
        assert_eq!(image.dimensions(), (4, 4));
        assert_eq!(image.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(image.get_pixel(1, 1), &Rgba([0, 0, 0, 255]));
        assert_eq!(image.get_pixel(2, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(image.get_pixel(0, 3), &Rgba([255, 255, 255, 255]));
        assert_eq!(image.get_pixel(3, 3), &Rgba([0, 0, 0, 255]));

        let small = render(field.view(), [1, 1], &ToneMapping::default(), Palette::Grayscale);
        assert_eq!(small.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Colors and the palette they are drawn from.
//!
//! Colors are generated by walking the visible spectrum, 380nm to
//! 780nm, and approximating what each wavelength looks like as a
//! red/green/blue triple.  The approximation is piecewise linear,
//! dims toward the two ends of the spectrum where the eye loses
//! sensitivity, and compresses the result with a 0.8 gamma.

use crate::error::{invalid, Result};

/// The shortest wavelength in the model, in nanometres.
pub const VIOLET: f64 = 380.0;

/// The longest wavelength in the model, in nanometres.
pub const DEEP_RED: f64 = 780.0;

const GAMMA: f64 = 0.8;

/// A red, green, blue triple.  Components are intensities, nominally
/// in [0, 1]; nothing here clamps them.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Color {
    /// Red intensity.
    pub r: f64,
    /// Green intensity.
    pub g: f64,
    /// Blue intensity.
    pub b: f64,
}

impl Color {
    /// Constructor.
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Color { r, g, b }
    }

    /// Converts to 8-bit channels, clamping to [0, 1] first.
    pub fn to_rgb8(self) -> [u8; 3] {
        let channel = |v: f64| (num::clamp(v, 0.0, 1.0) * 255.0).round() as u8;
        [channel(self.r), channel(self.g), channel(self.b)]
    }
}

/// Approximates the color of light at `wavelength` nanometres.
/// Wavelengths outside [380, 780] come back black.
pub fn spectrum(wavelength: f64) -> Color {
    let n = wavelength;
    let mut color = Color::default();
    if n >= 380.0 && n <= 440.0 {
        color.r = (440.0 - n) / 60.0;
        color.b = 1.0;
    } else if n >= 440.0 && n <= 490.0 {
        color.g = (n - 440.0) / 50.0;
        color.b = 1.0;
    } else if n >= 490.0 && n <= 510.0 {
        color.g = 1.0;
        color.b = (510.0 - n) / 20.0;
    } else if n >= 510.0 && n <= 580.0 {
        color.r = (n - 510.0) / 70.0;
        color.g = 1.0;
    } else if n >= 580.0 && n <= 645.0 {
        color.r = 1.0;
        color.g = (645.0 - n) / 65.0;
    } else if n >= 645.0 && n <= 780.0 {
        color.r = 1.0;
    }

    // Intensity falls off toward the edges of vision.
    let s = if n >= 700.0 {
        0.3 + 0.7 * (780.0 - n) / 80.0
    } else if n >= 380.0 && n <= 420.0 {
        0.3 + 0.7 * (n - 380.0) / 40.0
    } else {
        1.0
    };

    Color {
        r: (color.r * s).powf(GAMMA),
        g: (color.g * s).powf(GAMMA),
        b: (color.b * s).powf(GAMMA),
    }
}

/// A fixed, ordered sequence of colors, indexed by iteration count
/// modulo its length.  Built once and never changed, so it can be
/// shared between any number of render threads without locking.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Builds a palette of `n_colors` entries, spaced evenly across
    /// the spectrum starting at violet.  The last entry stops one
    /// step short of 780nm.
    pub fn new(n_colors: usize) -> Result<Self> {
        if n_colors == 0 {
            return invalid("a palette needs at least one color");
        }
        let colors = (0..n_colors)
            .map(|k| spectrum(Palette::wavelength(k, n_colors)))
            .collect();
        Ok(Palette { colors })
    }

    /// The wavelength that entry `k` of an `n_colors` palette samples.
    pub fn wavelength(k: usize, n_colors: usize) -> f64 {
        VIOLET + (k as f64) * (DEEP_RED - VIOLET) / (n_colors as f64)
    }

    /// The color for a pixel that took `iterations` steps.
    #[inline]
    pub fn get(&self, iterations: usize) -> Color {
        self.colors[iterations % self.colors.len()]
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; a palette cannot be built empty.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// All entries in order.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Color, b: Color) -> bool {
        (a.r - b.r).abs() < 1e-12 && (a.g - b.g).abs() < 1e-12 && (a.b - b.b).abs() < 1e-12
    }

    #[test]
    fn empty_palette_is_rejected() {
        assert!(Palette::new(0).is_err());
    }

    #[test]
    fn first_entry_is_dimmed_violet() {
        let palette = Palette::new(10).unwrap();
        assert_eq!(Palette::wavelength(0, 10), 380.0);
        let dim = 0.3f64.powf(0.8);
        assert!(close(palette.colors()[0], Color::new(dim, 0.0, dim)));
    }

    #[test]
    fn last_entry_stops_short_of_deep_red() {
        let palette = Palette::new(10).unwrap();
        assert_eq!(Palette::wavelength(9, 10), 740.0);
        assert!(Palette::wavelength(9, 10) < DEEP_RED);
        // 740nm: pure red, dimmed to 0.3 + 0.7 * 40 / 80
        let expected = Color::new(0.65f64.powf(0.8), 0.0, 0.0);
        assert!(close(palette.colors()[9], expected));
    }

    #[test]
    fn last_wavelength_approaches_but_never_reaches_780() {
        for n in 1..64 {
            let last = Palette::wavelength(n - 1, n);
            assert!(last < DEEP_RED);
            assert!(last >= VIOLET);
        }
    }

    #[test]
    fn spectrum_bands() {
        assert!(close(spectrum(465.0), Color::new(0.0, 0.5f64.powf(0.8), 1.0)));
        assert!(close(spectrum(500.0), Color::new(0.0, 1.0, 0.5f64.powf(0.8))));
        assert!(close(spectrum(545.0), Color::new(0.5f64.powf(0.8), 1.0, 0.0)));
        assert!(close(spectrum(600.0), Color::new(1.0, (45.0f64 / 65.0).powf(0.8), 0.0)));
        assert!(close(spectrum(680.0), Color::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn spectrum_is_black_outside_the_visible_range() {
        assert_eq!(spectrum(300.0), Color::default());
        assert_eq!(spectrum(800.0).g, 0.0);
        assert_eq!(spectrum(800.0).b, 0.0);
    }

    #[test]
    fn lookups_wrap() {
        let palette = Palette::new(4).unwrap();
        assert_eq!(palette.len(), 4);
        assert_eq!(palette.get(1), palette.get(5));
        assert_eq!(palette.get(0), palette.get(4_000));
    }

    #[test]
    fn single_color_palette() {
        let palette = Palette::new(1).unwrap();
        assert_eq!(palette.get(0), palette.get(17));
    }

    #[test]
    fn rgb8_clamps_and_rounds() {
        assert_eq!(Color::new(1.0, 0.5, 0.0).to_rgb8(), [255, 128, 0]);
        assert_eq!(Color::new(1.7, -0.2, 0.999).to_rgb8(), [255, 0, 255]);
    }
}

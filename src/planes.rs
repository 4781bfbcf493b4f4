// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and the complex plane.  Unlike a corner-to-corner mapping, the
//! complex plane here is described by the point the centre of the
//! image represents (the "shift") and the distance a single pixel
//! covers (the "scale").  The same scale is used on both axes, so
//! the image is never stretched.
use num::Complex;

use crate::error::{invalid, Result};

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the x, y (column, row) of a pixel on the integral plane.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pixel(pub usize, pub usize);

/// The scale at which a `width` x `height` image, zoomed by `zoom`,
/// shows the whole of the interesting part of the set: three units
/// across or two units high, whichever is the tighter fit.
pub fn default_scale(zoom: f64, width: usize, height: usize) -> f64 {
    zoom * (3.0 / width as f64).max(2.0 / height as f64)
}

/// Maps pixels on the integral plane to points on the complex plane.
#[derive(Copy, Clone, Debug)]
pub struct PlaneMapper {
    /// The size of the integral plane.
    pub integral_plane: IntegralPlane,
    /// The complex-plane distance covered by one pixel.
    pub scale: f64,
    /// The point on the complex plane that the centre of the image represents.
    pub shift: Complex<f64>,
}

impl PlaneMapper {
    /// Constructor.  The plane must have a size, and the scale must be
    /// a positive, finite number.
    pub fn new(width: usize, height: usize, scale: f64, shift: Complex<f64>) -> Result<Self> {
        if width == 0 || height == 0 {
            return invalid(format!(
                "the image must have a size, got {}x{}",
                width, height
            ));
        }
        if !(scale > 0.0) || !scale.is_finite() {
            return invalid(format!("scale must be positive and finite, got {}", scale));
        }
        if !shift.re.is_finite() || !shift.im.is_finite() {
            return invalid(format!("the centre must be a finite point, got {}", shift));
        }

        Ok(PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            scale,
            shift,
        })
    }

    /// The pixel the shift point sits on, which may fall between two
    /// pixels when a dimension is odd.
    #[inline]
    pub fn centre(&self) -> (f64, f64) {
        (
            self.integral_plane.0 as f64 / 2.0,
            self.integral_plane.1 as f64 / 2.0,
        )
    }

    /// The real coordinate of pixel column `column`.
    #[inline]
    pub fn column_to_re(&self, column: usize) -> f64 {
        self.shift.re + (column as f64 - self.centre().0) * self.scale
    }

    /// The imaginary coordinate of pixel row `row`.
    #[inline]
    pub fn row_to_im(&self, row: usize) -> f64 {
        self.shift.im + (row as f64 - self.centre().1) * self.scale
    }

    /// Given a pixel on the integral cartesian plane, return the
    /// complex number it represents.
    #[inline]
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(self.column_to_re(pixel.0), self.row_to_im(pixel.1))
    }
}

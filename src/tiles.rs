// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Breaks the image up into a grid of rectangular tiles, each of
//! which is one unit of work for a render thread.  The tiles never
//! overlap and between them cover every pixel exactly once.

use itertools::iproduct;
use std::ops::Range;

use crate::error::{invalid, Result};
use crate::planes::Pixel;

/// A half-open rectangle of pixels: columns `top_left.0..bottom_right.0`
/// and rows `top_left.1..bottom_right.1`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    /// The first column and row inside the tile.
    pub top_left: Pixel,
    /// The first column and row past the tile.
    pub bottom_right: Pixel,
}

impl Tile {
    /// Constructor.  Expects `left <= right` and `top <= bottom`.
    pub fn new(left: usize, top: usize, right: usize, bottom: usize) -> Self {
        debug_assert!(left <= right && top <= bottom);
        Tile {
            top_left: Pixel(left, top),
            bottom_right: Pixel(right, bottom),
        }
    }

    /// The columns covered.
    pub fn columns(&self) -> Range<usize> {
        self.top_left.0..self.bottom_right.0
    }

    /// The rows covered.
    pub fn rows(&self) -> Range<usize> {
        self.top_left.1..self.bottom_right.1
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.bottom_right.0 - self.top_left.0
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.bottom_right.1 - self.top_left.1
    }

    /// The number of pixels covered.
    pub fn len(&self) -> usize {
        self.width() * self.height()
    }

    /// True if the tile covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if `pixel` lies inside the tile.
    pub fn contains(&self, pixel: &Pixel) -> bool {
        self.columns().contains(&pixel.0) && self.rows().contains(&pixel.1)
    }
}

/// Splits `0..last` into `count` intervals and returns their `count + 1`
/// boundaries.  Every interval is `last / count` wide except the last,
/// which also takes the remainder.
pub fn mesh(count: usize, last: usize) -> Result<Vec<usize>> {
    if count == 0 {
        return invalid("cannot split an axis into zero intervals");
    }
    if count > last {
        return invalid(format!(
            "cannot split {} pixels into {} non-empty intervals",
            last, count
        ));
    }
    let step = last / count;
    let mut boundaries: Vec<usize> = (0..=count).map(|i| i * step).collect();
    boundaries[count] = last;
    Ok(boundaries)
}

/// Divides a `width` x `height` image into `columns` x `rows` tiles,
/// listed row by row from the top left.
pub fn partition(width: usize, height: usize, columns: usize, rows: usize) -> Result<Vec<Tile>> {
    let xs = mesh(columns, width)?;
    let ys = mesh(rows, height)?;
    Ok(iproduct!(0..rows, 0..columns)
        .map(|(r, c)| Tile::new(xs[c], ys[r], xs[c + 1], ys[r + 1]))
        .collect())
}

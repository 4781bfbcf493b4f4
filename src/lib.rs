#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot renderer
//!
//! The Mandelbrot set is the set of points `c` on the complex plane
//! for which repeatedly squaring `z` and adding `c` never sends `z`
//! off to infinity.  For each pixel of an image we pick the matching
//! point, count how many rounds it takes to leave the circle of
//! radius two (giving up after some limit), and color the pixel by
//! that count.
//!
//! Every pixel is independent of every other, so the work splits
//! cleanly.  The image is cut into rectangular tiles, the tiles go
//! into a queue, and a pool of threads pulls tiles from the queue
//! until it runs dry.
//!
//! ```no_run
//! use mandelbrot::{default_scale, MandelbrotSet, RunParameters};
//! use num::Complex;
//!
//! let mut set = MandelbrotSet::new(1920, 1080, 10)?;
//! let scale = default_scale(1.0, 1920, 1080);
//! set.run(&RunParameters::new(4, 16, 16, scale, Complex::new(-0.5, 0.0), 5000))?;
//! let rgb = set.to_rgb8();
//! # Ok::<(), mandelbrot::MandelbrotError>(())
//! ```

pub mod error;
pub mod escape;
pub mod palette;
pub mod planes;
pub mod queue;
pub mod renderer;
pub mod tiles;

pub use error::{MandelbrotError, Result};
pub use palette::{Color, Palette};
pub use planes::{default_scale, Pixel, PlaneMapper};
pub use renderer::{Coloring, MandelbrotSet, RunParameters};
pub use tiles::Tile;

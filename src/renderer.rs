// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot renderer
//!
//! The image is cut into tiles, the tiles are put in a queue, and a
//! fixed number of threads take tiles off the queue one at a time
//! until it is empty.  Each tile owns its own patch of the canvas, so
//! threads write their pixels without ever touching each other's;
//! the queue is the only thing they share that needs a lock.  The
//! result does not depend on how many threads there are or which
//! tiles each of them happens to get.

use num::Complex;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

use crate::error::{invalid, MandelbrotError, Result};
use crate::escape::{escape, escape_time, smooth_value};
use crate::palette::{spectrum, Color, Palette, DEEP_RED, VIOLET};
use crate::planes::PlaneMapper;
use crate::queue::WorkQueue;
use crate::tiles::{partition, Tile};

/// How an escape count becomes a color.  A render uses exactly one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Coloring {
    /// `palette[iterations % palette.len()]`.  Shows distinct bands.
    Banded,
    /// A continuous escape value walked across the spectrum; the
    /// palette is not consulted.
    Smooth,
}

impl Default for Coloring {
    fn default() -> Self {
        Coloring::Banded
    }
}

impl Coloring {
    /// The color of the point `c`.
    #[inline]
    pub fn color(self, c: Complex<f64>, max_iterations: usize, palette: &Palette) -> Color {
        match self {
            Coloring::Banded => palette.get(escape_time(c, max_iterations)),
            Coloring::Smooth => {
                let value = smooth_value(&escape(c, max_iterations), max_iterations);
                let span = DEEP_RED - VIOLET;
                spectrum(VIOLET + value * span / max_iterations.max(1) as f64)
            }
        }
    }
}

impl FromStr for Coloring {
    type Err = MandelbrotError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "banded" => Ok(Coloring::Banded),
            "smooth" => Ok(Coloring::Smooth),
            _ => invalid(format!(
                "unknown coloring '{}', expected 'banded' or 'smooth'",
                s
            )),
        }
    }
}

impl fmt::Display for Coloring {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Coloring::Banded => write!(f, "banded"),
            Coloring::Smooth => write!(f, "smooth"),
        }
    }
}

/// Everything that controls a single render.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RunParameters {
    /// The number of render threads.
    pub workers: usize,
    /// The number of tile columns.
    pub columns: usize,
    /// The number of tile rows.
    pub rows: usize,
    /// The complex-plane distance covered by one pixel.
    pub scale: f64,
    /// The point the centre of the image represents.
    pub shift: Complex<f64>,
    /// The iteration limit per pixel.
    pub max_iterations: usize,
    /// How escape counts are turned into colors.
    pub coloring: Coloring,
}

impl RunParameters {
    /// Parameters using banded coloring.
    pub fn new(
        workers: usize,
        columns: usize,
        rows: usize,
        scale: f64,
        shift: Complex<f64>,
        max_iterations: usize,
    ) -> Self {
        RunParameters {
            workers,
            columns,
            rows,
            scale,
            shift,
            max_iterations,
            coloring: Coloring::default(),
        }
    }

    /// Replaces the coloring scheme.
    pub fn with_coloring(mut self, coloring: Coloring) -> Self {
        self.coloring = coloring;
        self
    }

    /// Checks the parameters that do not depend on the image size.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return invalid("at least one worker is required");
        }
        if self.columns == 0 || self.rows == 0 {
            return invalid(format!(
                "the tile grid needs at least one column and one row, got {}x{}",
                self.columns, self.rows
            ));
        }
        if !(self.scale > 0.0) || !self.scale.is_finite() {
            return invalid(format!(
                "scale must be positive and finite, got {}",
                self.scale
            ));
        }
        Ok(())
    }
}

// A tile together with the rows of canvas it is allowed to write.
struct TileBuffer<'a> {
    tile: Tile,
    rows: Vec<&'a mut [Color]>,
}

impl<'a> TileBuffer<'a> {
    // Carves a row-major canvas into one buffer per tile.  `tiles`
    // must be a `columns`-wide grid listed row by row, as produced by
    // `partition`.
    fn split(
        canvas: &'a mut [Color],
        width: usize,
        tiles: &[Tile],
        columns: usize,
    ) -> Vec<TileBuffer<'a>> {
        let mut buffers: Vec<TileBuffer<'a>> = tiles
            .iter()
            .map(|&tile| TileBuffer {
                tile,
                rows: Vec::with_capacity(tile.height()),
            })
            .collect();

        let mut band = 0;
        for (y, row) in canvas.chunks_mut(width).enumerate() {
            while y >= tiles[band * columns].bottom_right.1 {
                band += 1;
            }
            let mut rest = row;
            for buffer in &mut buffers[band * columns..(band + 1) * columns] {
                let (segment, tail) =
                    std::mem::take(&mut rest).split_at_mut(buffer.tile.width());
                buffer.rows.push(segment);
                rest = tail;
            }
        }
        buffers
    }

    fn render(&mut self, plane: &PlaneMapper, palette: &Palette, params: &RunParameters) {
        for (row, pixels) in self.tile.rows().zip(self.rows.iter_mut()) {
            let im = plane.row_to_im(row);
            for (column, pixel) in self.tile.columns().zip(pixels.iter_mut()) {
                let c = Complex::new(plane.column_to_re(column), im);
                *pixel = params.coloring.color(c, params.max_iterations, palette);
            }
        }
    }
}

fn render_worker(
    worker: usize,
    queue: &WorkQueue<TileBuffer>,
    plane: &PlaneMapper,
    palette: &Palette,
    params: &RunParameters,
) {
    let mut tiles = 0;
    while let Some(mut buffer) = queue.pop() {
        trace!(worker, tile = ?buffer.tile, "rendering tile");
        buffer.render(plane, palette, params);
        tiles += 1;
    }
    debug!(worker, tiles, "worker finished");
}

/// The canvas, the palette, and the machinery to fill one with the
/// other.
#[derive(Clone, Debug)]
pub struct MandelbrotSet {
    width: usize,
    height: usize,
    palette: Palette,
    canvas: Vec<Color>,
}

impl MandelbrotSet {
    /// Allocates a `width` x `height` canvas and builds an `n_colors`
    /// palette.  The canvas starts out black.
    pub fn new(width: usize, height: usize, n_colors: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return invalid(format!(
                "the image must have a size, got {}x{}",
                width, height
            ));
        }
        // The canvas must be addressable: no more than isize::MAX bytes.
        let pixels = width
            .checked_mul(height)
            .filter(|&n| {
                n.checked_mul(std::mem::size_of::<Color>())
                    .map_or(false, |bytes| bytes <= std::isize::MAX as usize)
            });
        let pixels = match pixels {
            Some(n) => n,
            None => {
                return invalid(format!(
                    "a {}x{} image is too large to allocate",
                    width, height
                ))
            }
        };
        let palette = Palette::new(n_colors)?;
        Ok(MandelbrotSet {
            width,
            height,
            palette,
            canvas: vec![Color::default(); pixels],
        })
    }

    /// Renders the whole image, returning once every worker has
    /// finished.  All parameters are checked before any thread starts;
    /// on error the canvas is left as it was.
    pub fn run(&mut self, params: &RunParameters) -> Result<()> {
        params.validate()?;
        let plane = PlaneMapper::new(self.width, self.height, params.scale, params.shift)?;
        let tiles = partition(self.width, self.height, params.columns, params.rows)?;

        debug!(
            width = self.width,
            height = self.height,
            workers = params.workers,
            columns = params.columns,
            rows = params.rows,
            scale = params.scale,
            max_iterations = params.max_iterations,
            coloring = %params.coloring,
            "starting render"
        );

        let palette = &self.palette;
        let queue: WorkQueue<TileBuffer> =
            TileBuffer::split(&mut self.canvas, self.width, &tiles, params.columns)
                .into_iter()
                .collect();

        crossbeam::scope(|spawner| {
            for worker in 0..params.workers {
                let queue = &queue;
                spawner.spawn(move |_| render_worker(worker, queue, &plane, palette, params));
            }
        })
        .map_err(|_| MandelbrotError::WorkerPanicked)?;

        debug!(tiles = tiles.len(), "render complete");
        Ok(())
    }

    /// The color of the pixel at `row`, `column`.  Panics if the pixel
    /// is outside the image.
    pub fn color_at(&self, row: usize, column: usize) -> Color {
        assert!(
            row < self.height && column < self.width,
            "pixel ({}, {}) is outside a {}x{} image",
            row,
            column,
            self.width,
            self.height
        );
        self.canvas[row * self.width + column]
    }

    /// The whole canvas, row by row.
    pub fn data(&self) -> &[Color] {
        &self.canvas
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The palette built at construction.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// The canvas as packed 8-bit RGB, row by row, ready for an
    /// image encoder.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.canvas.iter().flat_map(|color| color.to_rgb8().to_vec()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planes::default_scale;

    const SENTINEL: Color = Color {
        r: -1.0,
        g: -1.0,
        b: -1.0,
    };

    fn origin() -> Complex<f64> {
        Complex::new(0.0, 0.0)
    }

    #[test]
    fn construction_rejects_empty_images_and_palettes() {
        assert!(MandelbrotSet::new(0, 4, 4).is_err());
        assert!(MandelbrotSet::new(4, 0, 4).is_err());
        assert!(MandelbrotSet::new(4, 4, 0).is_err());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn construction_rejects_unaddressable_images() {
        let huge = [(1 << 32, 1 << 32), (std::usize::MAX, 2), (1 << 31, 1 << 31)];
        for &(width, height) in &huge {
            match MandelbrotSet::new(width, height, 4) {
                Err(MandelbrotError::InvalidArgument(_)) => {}
                other => panic!("{}x{} gave {:?}", width, height, other.map(|m| m.width())),
            }
        }
    }

    #[test]
    fn run_rejects_bad_parameters() {
        let mut m = MandelbrotSet::new(8, 8, 4).unwrap();
        let good = RunParameters::new(2, 2, 2, 0.5, origin(), 10);
        assert!(m.run(&good).is_ok());

        let bad = vec![
            RunParameters { workers: 0, ..good },
            RunParameters { columns: 0, ..good },
            RunParameters { rows: 0, ..good },
            RunParameters { scale: 0.0, ..good },
            RunParameters { scale: -1.0, ..good },
            RunParameters { columns: 9, ..good },
        ];
        for params in bad {
            match m.run(&params) {
                Err(MandelbrotError::InvalidArgument(_)) => {}
                other => panic!("{:?} gave {:?}", params, other),
            }
        }
    }

    #[test]
    fn failed_run_leaves_canvas_untouched() {
        let mut m = MandelbrotSet::new(4, 4, 4).unwrap();
        m.canvas.iter_mut().for_each(|c| *c = SENTINEL);
        assert!(m.run(&RunParameters::new(1, 0, 2, 1.0, origin(), 10)).is_err());
        assert!(m.data().iter().all(|&c| c == SENTINEL));
    }

    #[test]
    fn every_pixel_gets_its_palette_color() {
        let mut m = MandelbrotSet::new(4, 4, 4).unwrap();
        m.canvas.iter_mut().for_each(|c| *c = SENTINEL);
        m.run(&RunParameters::new(3, 2, 2, 1.0, origin(), 10)).unwrap();

        let plane = PlaneMapper::new(4, 4, 1.0, origin()).unwrap();
        for row in 0..4 {
            for column in 0..4 {
                let c = Complex::new(plane.column_to_re(column), plane.row_to_im(row));
                let expected = m.palette().get(escape_time(c, 10));
                assert_eq!(m.color_at(row, column), expected);
                assert_ne!(m.color_at(row, column), Color::default());
            }
        }
    }

    #[test]
    fn split_hands_out_disjoint_rows() {
        let mut canvas = vec![Color::default(); 5 * 3];
        let tiles = partition(5, 3, 2, 2).unwrap();
        let buffers = TileBuffer::split(&mut canvas, 5, &tiles, 2);
        let shapes: Vec<(usize, Vec<usize>)> = buffers
            .iter()
            .map(|b| (b.rows.len(), b.rows.iter().map(|r| r.len()).collect()))
            .collect();
        assert_eq!(
            shapes,
            vec![
                (1, vec![2]),
                (1, vec![3]),
                (2, vec![2, 2]),
                (2, vec![3, 3]),
            ]
        );
    }

    #[test]
    fn split_hands_out_every_pixel_exactly_once() {
        let (width, height) = (23, 17);
        let mut canvas = vec![SENTINEL; width * height];
        let tiles = partition(width, height, 4, 3).unwrap();
        {
            let mut buffers = TileBuffer::split(&mut canvas, width, &tiles, 4);
            let handed_out: usize = buffers
                .iter()
                .map(|b| b.rows.iter().map(|r| r.len()).sum::<usize>())
                .sum();
            assert_eq!(handed_out, width * height);
            for buffer in &mut buffers {
                assert_eq!(buffer.rows.len(), buffer.tile.height());
                for row in buffer.rows.iter_mut() {
                    assert_eq!(row.len(), buffer.tile.width());
                    row.iter_mut().for_each(|c| c.r += 1.0);
                }
            }
        }
        assert!(canvas.iter().all(|c| c.r == 0.0));
    }

    #[test]
    fn worker_count_does_not_change_the_image() {
        let shift = Complex::new(-0.75, 0.1);
        let scale = default_scale(1.0, 97, 61);
        let mut single = MandelbrotSet::new(97, 61, 16).unwrap();
        single.run(&RunParameters::new(1, 13, 7, scale, shift, 200)).unwrap();

        for &workers in &[2, 5, 8] {
            let mut many = MandelbrotSet::new(97, 61, 16).unwrap();
            many.run(&RunParameters::new(workers, 13, 7, scale, shift, 200)).unwrap();
            assert_eq!(single.data(), many.data());
        }
    }

    #[test]
    fn more_workers_than_tiles() {
        let mut one = MandelbrotSet::new(16, 16, 8).unwrap();
        one.run(&RunParameters::new(1, 1, 1, 0.2, origin(), 50)).unwrap();
        let mut crowd = MandelbrotSet::new(16, 16, 8).unwrap();
        crowd.run(&RunParameters::new(12, 1, 1, 0.2, origin(), 50)).unwrap();
        assert_eq!(one.data(), crowd.data());
    }

    #[test]
    fn centre_of_default_view_is_interior() {
        let shift = Complex::new(-0.28676842048, 0.0);
        let mut m = MandelbrotSet::new(64, 36, 10).unwrap();
        m.run(&RunParameters::new(4, 4, 4, default_scale(1.0, 64, 36), shift, 5000))
            .unwrap();
        assert_eq!(m.color_at(18, 32), m.palette().get(5001));
    }

    #[test]
    fn rerun_overwrites_the_canvas() {
        let mut m = MandelbrotSet::new(12, 8, 6).unwrap();
        let banded = RunParameters::new(2, 3, 2, 0.3, origin(), 40);
        m.run(&banded).unwrap();
        let first = m.data().to_vec();
        m.run(&banded.with_coloring(Coloring::Smooth)).unwrap();
        assert_ne!(first, m.data());
        m.run(&banded).unwrap();
        assert_eq!(first, m.data());
    }

    #[test]
    fn smooth_coloring_paints_interior_violet() {
        let mut m = MandelbrotSet::new(4, 4, 4).unwrap();
        let params =
            RunParameters::new(1, 1, 1, 0.01, origin(), 100).with_coloring(Coloring::Smooth);
        m.run(&params).unwrap();
        assert_eq!(m.color_at(2, 2), spectrum(VIOLET));
    }

    #[test]
    fn coloring_parses() {
        assert_eq!("banded".parse::<Coloring>().unwrap(), Coloring::Banded);
        assert_eq!("smooth".parse::<Coloring>().unwrap(), Coloring::Smooth);
        assert!("rainbow".parse::<Coloring>().is_err());
        assert_eq!(Coloring::Smooth.to_string(), "smooth");
    }

    #[test]
    fn rgb8_is_packed_row_major() {
        let mut m = MandelbrotSet::new(3, 2, 5).unwrap();
        m.run(&RunParameters::new(2, 1, 2, 0.5, origin(), 20)).unwrap();
        let bytes = m.to_rgb8();
        assert_eq!(bytes.len(), 3 * 2 * 3);
        // row 1, column 2
        let offset = (3 + 2) * 3;
        assert_eq!(&bytes[offset..offset + 3], &m.color_at(1, 2).to_rgb8()[..]);
    }
}

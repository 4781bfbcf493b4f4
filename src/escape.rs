// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time kernel.  This is where nearly all of a render's
//! time goes, so it is kept to a bare numeric loop: no allocation,
//! no locking, nothing shared.

use num::Complex;
use std::f64::consts::LN_2;

/// Where an orbit stopped: how many steps it took, and the last
/// value of z.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Escape {
    /// The number of times z was squared.  `max_iterations + 1` means
    /// the orbit never left the circle of radius two.
    pub iterations: usize,
    /// The value of z when iteration stopped.
    pub z: Complex<f64>,
}

impl Escape {
    /// True if the orbit left the circle of radius two within the limit.
    pub fn escaped(&self, max_iterations: usize) -> bool {
        self.iterations <= max_iterations
    }
}

/// Iterates `z <- z^2 + c` starting from `z = c` for as long as `z`
/// stays within the circle of radius two, giving up once the count
/// passes `max_iterations`.
#[inline]
pub fn escape(c: Complex<f64>, max_iterations: usize) -> Escape {
    let mut z = c;
    let mut n = 0;
    while z.norm_sqr() < 4.0 && n <= max_iterations {
        z = z * z + c;
        n += 1;
    }
    Escape { iterations: n, z }
}

/// Just the step count from `escape`.
#[inline]
pub fn escape_time(c: Complex<f64>, max_iterations: usize) -> usize {
    escape(c, max_iterations).iterations
}

/// A continuous version of the escape count, for coloring without
/// visible bands.  Points that never escaped get zero.
pub fn smooth_value(escape: &Escape, max_iterations: usize) -> f64 {
    if !escape.escaped(max_iterations) {
        return 0.0;
    }
    let log_modulus = escape.z.norm_sqr().ln() / 2.0;
    (log_modulus / LN_2).log2() + escape.iterations as f64 - 1.0
}

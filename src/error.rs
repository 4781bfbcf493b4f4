// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors raised by the renderer.  Everything here is detected before
//! a single pixel is computed; the kernel itself cannot fail.

use failure::Fail;

/// The things that can go wrong when setting up or running a render.
#[derive(Debug, Fail, PartialEq)]
pub enum MandelbrotError {
    /// A caller-supplied dimension, count or scale is out of range.
    #[fail(display = "invalid argument: {}", _0)]
    InvalidArgument(String),

    /// One of the worker threads panicked before the canvas was complete.
    #[fail(display = "a render worker panicked; the canvas is incomplete")]
    WorkerPanicked,
}

/// Shorthand used throughout the crate.
pub type Result<T> = std::result::Result<T, MandelbrotError>;

pub(crate) fn invalid<T, S: Into<String>>(message: S) -> Result<T> {
    Err(MandelbrotError::InvalidArgument(message.into()))
}

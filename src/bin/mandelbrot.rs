// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::{App, Arg, ArgMatches};
use failure::format_err;
use image::png::PNGEncoder;
use image::ColorType;
use num::Complex;
use std::fmt::Display;
use std::fs::File;
use std::str::FromStr;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use mandelbrot::{default_scale, Coloring, MandelbrotSet, RunParameters};

fn validate_range<T: FromStr + PartialOrd + Display>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(format!("must be between {} and {}", low, high))
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

fn validate_count(s: &str, err: &str) -> Result<(), String> {
    validate_range::<usize>(s, 1, std::usize::MAX, err)
}

fn validate_finite(s: &str, err: &str) -> Result<(), String> {
    match f64::from_str(s) {
        Ok(v) if v.is_finite() => Ok(()),
        _ => Err(err.to_string()),
    }
}

fn validate_positive(s: &str, err: &str) -> Result<(), String> {
    match f64::from_str(s) {
        Ok(v) if v > 0.0 && v.is_finite() => Ok(()),
        _ => Err(err.to_string()),
    }
}

const OUTPUT: &str = "out";
const SCALE: &str = "scale";
const CX: &str = "cx";
const CY: &str = "cy";
const ITERATIONS: &str = "iter";
const WIDTH: &str = "width";
const HEIGHT: &str = "height";
const COLORS: &str = "colors";
const THREADS: &str = "threads";
const NX: &str = "nx";
const NY: &str = "ny";
const COLORING: &str = "coloring";
const LOG: &str = "log";

fn args<'a>() -> ArgMatches<'a> {
    let threads_help = format!(
        "Number of threads to use in solver (this machine has {} cores)",
        num_cpus::get()
    );

    App::new("mandelbrot")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Tiled, multi-threaded Mandelbrot set renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value("result.png")
                .help("Output file"),
        )
        .arg(
            Arg::with_name(SCALE)
                .long(SCALE)
                .short("s")
                .takes_value(true)
                .default_value("1")
                .validator(|s| validate_positive(&s, "Scale must be a positive number"))
                .help("Scale; smaller values zoom in"),
        )
        .arg(
            Arg::with_name(CX)
                .long(CX)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-0.28676842048")
                .validator(|s| validate_finite(&s, "Could not parse X center coordinate"))
                .help("X center coordinate"),
        )
        .arg(
            Arg::with_name(CY)
                .long(CY)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0")
                .validator(|s| validate_finite(&s, "Could not parse Y center coordinate"))
                .help("Y center coordinate"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("5000")
                .validator(|s| validate_count(&s, "Could not parse iteration count"))
                .help("Maximum number of iterations"),
        )
        .arg(
            Arg::with_name(WIDTH)
                .long(WIDTH)
                .takes_value(true)
                .default_value("1920")
                .validator(|s| validate_count(&s, "Could not parse image width"))
                .help("Image width"),
        )
        .arg(
            Arg::with_name(HEIGHT)
                .long(HEIGHT)
                .takes_value(true)
                .default_value("1080")
                .validator(|s| validate_count(&s, "Could not parse image height"))
                .help("Image height"),
        )
        .arg(
            Arg::with_name(COLORS)
                .long(COLORS)
                .takes_value(true)
                .default_value("10")
                .validator(|s| validate_count(&s, "Could not parse number of colors"))
                .help("Number of colors"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("1")
                .validator(|s| validate_count(&s, "Could not parse thread count"))
                .help(&threads_help),
        )
        .arg(
            Arg::with_name(NX)
                .long(NX)
                .takes_value(true)
                .default_value("16")
                .validator(|s| validate_count(&s, "Could not parse column count"))
                .help("Split into nx columns"),
        )
        .arg(
            Arg::with_name(NY)
                .long(NY)
                .takes_value(true)
                .default_value("16")
                .validator(|s| validate_count(&s, "Could not parse row count"))
                .help("Split into ny rows"),
        )
        .arg(
            Arg::with_name(COLORING)
                .long(COLORING)
                .short("c")
                .takes_value(true)
                .possible_values(&["banded", "smooth"])
                .default_value("banded")
                .help("Discrete palette bands or a smooth gradient"),
        )
        .arg(
            Arg::with_name(LOG)
                .long(LOG)
                .takes_value(true)
                .default_value("info")
                .help("Log filter, used when RUST_LOG is not set"),
        )
        .get_matches()
}

fn init_tracing(filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn value_of<T>(matches: &ArgMatches, name: &str) -> Result<T, failure::Error>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = matches
        .value_of(name)
        .ok_or_else(|| format_err!("--{} has no value", name))?;
    T::from_str(raw).map_err(|e| format_err!("could not parse --{} '{}': {}", name, raw, e))
}

fn write_image(outfile: &str, pixels: &[u8], bounds: (usize, usize)) -> Result<(), std::io::Error> {
    let output = File::create(outfile)?;
    let encoder = PNGEncoder::new(output);
    encoder.encode(pixels, bounds.0 as u32, bounds.1 as u32, ColorType::RGB(8))?;
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<(), failure::Error> {
    let outfile: String = value_of(matches, OUTPUT)?;
    let width: usize = value_of(matches, WIDTH)?;
    let height: usize = value_of(matches, HEIGHT)?;
    let zoom: f64 = value_of(matches, SCALE)?;
    let shift: Complex<f64> = Complex::new(value_of(matches, CX)?, value_of(matches, CY)?);
    let coloring: Coloring = value_of(matches, COLORING)?;

    let params = RunParameters::new(
        value_of(matches, THREADS)?,
        value_of(matches, NX)?,
        value_of(matches, NY)?,
        default_scale(zoom, width, height),
        shift,
        value_of(matches, ITERATIONS)?,
    )
    .with_coloring(coloring);

    let mut set = MandelbrotSet::new(width, height, value_of(matches, COLORS)?)?;

    let start = Instant::now();
    set.run(&params)?;
    let run_end = Instant::now();
    write_image(&outfile, &set.to_rgb8(), (width, height))
        .map_err(|e| format_err!("could not write {}: {}", outfile, e))?;
    let write_end = Instant::now();

    info!("Run time: {} ns", (run_end - start).as_nanos());
    info!("Write time: {} ns", (write_end - run_end).as_nanos());
    info!("All time: {} ns", (write_end - start).as_nanos());
    info!("Wrote {}x{} image to {}", width, height, outfile);
    Ok(())
}

fn main() {
    let matches = args();
    init_tracing(matches.value_of(LOG).unwrap_or("info"));

    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}

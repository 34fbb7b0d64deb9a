//! Reader for planar galaxy files.
//!
//! ```text
//! 5                          <- number of bodies
//! 2.50e11                    <- universe radius
//! 1.4960e11 0.0 0.0 2.9800e04 5.9740e24  0 0 255
//! px        py  vx  vy        mass       r g b
//! ```
//!
//! Fields are separated by whitespace (files in the wild carry a double
//! space before the color). The color is optional. Galaxies are planar:
//! z and vz are 0.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::simulation::states::{Body, Rgb};
use crate::simulation::vector::NVec3;

#[derive(Debug, Clone)]
pub struct Galaxy {
    pub radius: f64,
    pub bodies: Vec<Body>,
}

/// Parse a galaxy. `body_radius` maps the universe radius to a visual
/// radius for every body.
pub fn read_galaxy<R: BufRead>(reader: R, body_radius: impl Fn(f64) -> f64) -> Result<Galaxy> {
    let mut lines = reader
        .lines()
        .enumerate()
        .map(|(i, l)| l.map(|l| (i + 1, l)))
        .filter(|l| !matches!(l, Ok((_, s)) if s.trim().is_empty()));

    let (ln, header) = lines.next().context("galaxy file is empty")??;
    let n: usize = header.trim().parse().with_context(|| format!("line {ln}: bad body count {header:?}"))?;

    let (ln, header) = lines.next().context("galaxy file has no radius line")??;
    let radius: f64 = header.trim().parse().with_context(|| format!("line {ln}: bad radius {header:?}"))?;
    if !(radius > 0.0) {
        bail!("line {ln}: radius must be positive, got {radius}");
    }

    let mut bodies = Vec::with_capacity(n);
    for line in lines.take(n) {
        let (ln, text) = line?;
        bodies.push(parse_body(&text, body_radius(radius)).with_context(|| format!("line {ln}"))?);
    }
    if bodies.len() != n {
        bail!("galaxy declares {n} bodies but holds {}", bodies.len());
    }

    Ok(Galaxy { radius, bodies })
}

pub fn load_galaxy(path: &Path, body_radius: impl Fn(f64) -> f64) -> Result<Galaxy> {
    let file = File::open(path).with_context(|| format!("failed to open galaxy {}", path.display()))?;
    read_galaxy(BufReader::new(file), body_radius).with_context(|| format!("failed to read galaxy {}", path.display()))
}

fn parse_body(text: &str, radius: f64) -> Result<Body> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() != 5 && fields.len() != 8 {
        bail!("expected 5 or 8 fields, got {}", fields.len());
    }

    let mut num = [0.0; 5];
    for (slot, f) in num.iter_mut().zip(&fields) {
        *slot = f.parse().with_context(|| format!("bad number {f:?}"))?;
    }
    let [px, py, vx, vy, m] = num;
    if !(m > 0.0) {
        bail!("mass must be positive, got {m}");
    }

    let body = Body::new(NVec3::new(px, py, 0.0), NVec3::new(vx, vy, 0.0), m).with_radius(radius);
    if fields.len() == 8 {
        let mut color: Rgb = [0; 3];
        for (slot, f) in color.iter_mut().zip(&fields[5..]) {
            *slot = f.parse().with_context(|| format!("bad color component {f:?}"))?;
        }
        return Ok(body.with_color(color));
    }
    Ok(body)
}

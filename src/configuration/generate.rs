//! Seeded procedural body generation.
//!
//! Two generators: bodies scattered uniformly through the universe, and
//! clusters built around a heavy core. All draws come from a `ChaCha8Rng`
//! so a seed fully determines the output.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use anyhow::{ensure, Result};

use crate::configuration::config::GeneratorConfig;
use crate::simulation::states::{Body, Rgb};
use crate::simulation::vector::NVec3;

/// Universe radius per display pixel at the canonical scale; default
/// velocities and body radii scale with it.
pub const RADIUS_PER_PIXEL: f64 = 700.0;

pub const DEFAULT_MASS_MIN: f64 = 1.989e10;
pub const DEFAULT_MASS_MAX: f64 = 1.0e19;
pub const DEFAULT_CORE_MASS: f64 = 1.989e20;

/// Resolved generator knobs for a universe of a given radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorSettings {
    pub mass_min: f64,
    pub mass_max: f64,
    pub velocity_range: f64,
    pub body_radius: f64,
}

impl GeneratorSettings {
    pub fn resolve(cfg: &GeneratorConfig, universe_radius: f64) -> Result<Self> {
        let s = Self {
            mass_min: cfg.mass_min.unwrap_or(DEFAULT_MASS_MIN),
            mass_max: cfg.mass_max.unwrap_or(DEFAULT_MASS_MAX),
            velocity_range: cfg.velocity_range.unwrap_or(universe_radius / RADIUS_PER_PIXEL * 4.0),
            body_radius: cfg.body_radius.unwrap_or_else(|| default_body_radius(universe_radius)),
        };
        ensure!(s.mass_min > 0.0 && s.mass_min <= s.mass_max, "mass range must satisfy 0 < min <= max, got [{}, {}]", s.mass_min, s.mass_max);
        ensure!(s.velocity_range >= 0.0, "velocity_range must be non-negative, got {}", s.velocity_range);
        Ok(s)
    }
}

/// Visual radius of a body in a universe of `universe_radius`.
pub fn default_body_radius(universe_radius: f64) -> f64 {
    universe_radius / RADIUS_PER_PIXEL * 2.0
}

pub struct Generator {
    rng: ChaCha8Rng,
    enable_z: bool,
}

impl Generator {
    pub fn new(seed: u64, enable_z: bool) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            enable_z,
        }
    }

    /// `n` bodies uniformly in `[-radius, radius]` on every enabled axis.
    pub fn random(&mut self, n: usize, radius: f64, s: &GeneratorSettings) -> Vec<Body> {
        (0..n).map(|_| self.scattered(NVec3::zeros(), radius, s)).collect()
    }

    /// `n` bodies scattered in a cube of half-width `spread` around `center`.
    ///
    /// The first body is the cluster's core: it sits exactly on `center`
    /// and carries `core_mass`.
    pub fn cluster(&mut self, center: NVec3, n: usize, spread: f64, core_mass: f64, s: &GeneratorSettings) -> Vec<Body> {
        let mut bodies: Vec<Body> = (0..n).map(|_| self.scattered(center, spread, s)).collect();
        if let Some(core) = bodies.first_mut() {
            core.x = self.flatten(center);
            core.m = core_mass;
        }
        bodies
    }

    fn scattered(&mut self, center: NVec3, half: f64, s: &GeneratorSettings) -> Body {
        let x = NVec3::new(
            self.uniform(center.x - half, center.x + half),
            self.uniform(center.y - half, center.y + half),
            self.uniform(center.z - half, center.z + half),
        );
        let v = NVec3::new(
            self.uniform(-s.velocity_range, s.velocity_range),
            self.uniform(-s.velocity_range, s.velocity_range),
            self.uniform(-s.velocity_range, s.velocity_range),
        );
        let m = self.uniform(s.mass_min, s.mass_max);
        let color = self.bright_color();

        Body::new(self.flatten(x), self.flatten(v), m)
            .with_radius(s.body_radius)
            .with_color(color)
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if lo >= hi {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }

    fn flatten(&self, mut p: NVec3) -> NVec3 {
        if !self.enable_z {
            p.z = 0.0;
        }
        p
    }

    /// Random hue and saturation, brightness in [0.8, 1].
    fn bright_color(&mut self) -> Rgb {
        let h: f64 = self.rng.gen();
        let s: f64 = self.rng.gen();
        let b = 0.8 + 0.2 * self.rng.gen::<f64>();
        hsb_to_rgb(h, s, b)
    }
}

fn hsb_to_rgb(h: f64, s: f64, b: f64) -> Rgb {
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = b * (1.0 - s);
    let q = b * (1.0 - s * f);
    let t = b * (1.0 - s * (1.0 - f));
    let (r, g, bl) = match sector as i64 % 6 {
        0 => (b, t, p),
        1 => (q, b, p),
        2 => (p, b, t),
        3 => (p, q, b),
        4 => (t, p, b),
        _ => (b, p, q),
    };
    let to_u8 = |c: f64| (c * 255.0 + 0.5).clamp(0.0, 255.0) as u8;
    [to_u8(r), to_u8(g), to_u8(bl)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> GeneratorSettings {
        GeneratorSettings::resolve(&GeneratorConfig::default(), 700.0).unwrap()
    }

    #[test]
    fn defaults_scale_with_radius() {
        let s = settings();
        assert_eq!(s.velocity_range, 4.0);
        assert_eq!(s.body_radius, 2.0);
        assert_eq!(s.mass_min, DEFAULT_MASS_MIN);
    }

    #[test]
    fn invalid_mass_range_is_rejected() {
        let cfg = GeneratorConfig { mass_min: Some(10.0), mass_max: Some(1.0), ..GeneratorConfig::default() };
        assert!(GeneratorSettings::resolve(&cfg, 1.0).is_err());
    }

    #[test]
    fn random_bodies_stay_in_range_and_plane() {
        let s = settings();
        let bodies = Generator::new(7, false).random(200, 50.0, &s);
        assert_eq!(bodies.len(), 200);
        for b in &bodies {
            assert!(b.x.x.abs() <= 50.0 && b.x.y.abs() <= 50.0);
            assert_eq!(b.x.z, 0.0);
            assert_eq!(b.v.z, 0.0);
            assert!(b.v.x.abs() <= s.velocity_range);
            assert!(b.m >= s.mass_min && b.m <= s.mass_max);
        }
    }

    #[test]
    fn same_seed_same_bodies() {
        let s = settings();
        let a = Generator::new(99, true).random(10, 5.0, &s);
        let b = Generator::new(99, true).random(10, 5.0, &s);
        let c = Generator::new(100, true).random(10, 5.0, &s);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn cluster_core_sits_on_center() {
        let s = settings();
        let center = NVec3::new(10.0, -10.0, 3.0);
        let bodies = Generator::new(1, true).cluster(center, 12, 2.0, DEFAULT_CORE_MASS, &s);

        assert_eq!(bodies[0].x, center);
        assert_eq!(bodies[0].m, DEFAULT_CORE_MASS);
        for b in &bodies[1..] {
            assert!((b.x - center).amax() <= 2.0);
        }
        assert!(Generator::new(1, true).cluster(center, 0, 2.0, 1.0, &s).is_empty());
    }

    #[test]
    fn colors_are_bright() {
        assert_eq!(hsb_to_rgb(0.0, 1.0, 1.0), [255, 0, 0]);
        assert_eq!(hsb_to_rgb(0.5, 0.0, 0.8), [204, 204, 204]);

        let mut g = Generator::new(3, true);
        for _ in 0..50 {
            let c = g.bright_color();
            assert!(c.iter().copied().max().unwrap_or(0) >= 203);
        }
    }
}

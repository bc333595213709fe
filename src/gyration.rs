//! A grid of particles gyrating around field lines perpendicular to the
//! plane, in phase with each other. Loosely what an electron Bernstein wave
//! looks like.

use std::f64::consts::PI;
use std::time::Duration;

use crate::animation::{linspace, Animation};
use crate::error::{Error, Result};
use crate::output::OutputConfig;
use crate::scene::{Aspect, Bounds, Color, Primitive, Scene};

/// Points, a 10 pt wide dot.
const MARKER_RADIUS: f32 = 5.0;
/// Upper limits that keep the buffers allocatable.
pub const MAX_PARTICLES: usize = 10_000;
pub const MAX_FRAMES: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq)]
pub struct GyrationConfig {
    pub radius: f64,
    pub cols: usize,
    pub rows: usize,
    pub rotations: usize,
    pub steps_per_rotation: usize,
    pub output: OutputConfig,
}

impl Default for GyrationConfig {
    fn default() -> Self {
        Self {
            radius: 3.0,
            cols: 8,
            rows: 4,
            rotations: 4,
            steps_per_rotation: 180,
            output: OutputConfig::default(),
        }
    }
}

impl GyrationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(Error::config(format!(
                "gyration radius must be positive, got {}",
                self.radius
            )));
        }
        if self.cols == 0 || self.rows == 0 {
            return Err(Error::config(format!(
                "particle grid must not be empty, got {}x{}",
                self.cols, self.rows
            )));
        }
        if self.rotations == 0 || self.steps_per_rotation == 0 {
            return Err(Error::config(
                "rotations and steps per rotation must be at least 1",
            ));
        }
        self.counts().map(|_| ())
    }

    /// Number of particles and of frames, bounded by [`MAX_PARTICLES`] and
    /// [`MAX_FRAMES`].
    pub fn counts(&self) -> Result<(usize, usize)> {
        let particles = self
            .cols
            .checked_mul(self.rows)
            .filter(|&n| n <= MAX_PARTICLES)
            .ok_or_else(|| {
                Error::config(format!(
                    "particle grid {}x{} is larger than {MAX_PARTICLES} particles",
                    self.cols, self.rows
                ))
            })?;
        let frames = self
            .rotations
            .checked_mul(self.steps_per_rotation)
            .filter(|&n| n <= MAX_FRAMES)
            .ok_or_else(|| {
                Error::config(format!(
                    "{} rotations of {} steps is more than {MAX_FRAMES} frames",
                    self.rotations, self.steps_per_rotation
                ))
            })?;
        Ok((particles, frames))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub phase_offset: f64,
    pub center: (f64, f64),
    pub position: (f64, f64),
}

/// Point on a circle of `radius` around `center` at angle `phi + phase_offset`.
pub fn circle(phi: f64, phase_offset: f64, center: (f64, f64), radius: f64) -> (f64, f64) {
    let angle = phi + phase_offset;
    (
        center.0 + radius * angle.cos(),
        center.1 + radius * angle.sin(),
    )
}

pub struct Gyration {
    radius: f64,
    cols: usize,
    particles: Vec<Particle>,
    phases: Vec<f64>,
}

impl Gyration {
    pub fn new(config: &GyrationConfig) -> Result<Self> {
        config.validate()?;
        let (n, n_frames) = config.counts()?;
        let r = config.radius;
        let (cols, rows) = (config.cols, config.rows);

        let phase_offsets = linspace(0.0, (n as f64 - 1.0) * PI, n);
        let xs = linspace(0.0, (cols as f64 - 1.0) * 2.0 * r + cols as f64 * r / 5.0, cols);
        let ys = linspace(0.0, (rows as f64 - 1.0) * 2.0 * r + rows as f64 * r / 5.0, rows);

        // Particle k sits in column k % cols, row k / cols.
        let particles = (0..n)
            .map(|k| {
                let center = (xs[k % cols], ys[k / cols]);
                let phase_offset = phase_offsets[k];
                Particle {
                    phase_offset,
                    center,
                    position: circle(0.0, phase_offset, center, r),
                }
            })
            .collect();

        let span = config.rotations as f64 * 2.0 * PI;
        let phases = (0..n_frames)
            .map(|i| span * i as f64 / n_frames as f64)
            .collect();

        log::debug!("{n} particles, {n_frames} phase steps");
        Ok(Self {
            radius: r,
            cols,
            particles,
            phases,
        })
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle(&self, col: usize, row: usize) -> Option<&Particle> {
        if col >= self.cols {
            return None;
        }
        self.particles.get(col + row * self.cols)
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn phases(&self) -> &[f64] {
        &self.phases
    }

    /// Move every particle to global phase `phi`.
    pub fn update(&mut self, phi: f64) {
        let r = self.radius;
        for p in &mut self.particles {
            p.position = circle(phi, p.phase_offset, p.center, r);
        }
    }

    fn bounds(&self) -> Bounds {
        let r = self.radius;
        let (mut x_max, mut y_max) = (0.0f64, 0.0f64);
        for p in &self.particles {
            x_max = x_max.max(p.center.0);
            y_max = y_max.max(p.center.1);
        }
        // Same margins as the 8x4 default layout: axis [-4, 51, -6, 25].
        Bounds::new(-r - 1.0, x_max + r + 1.2, -r - 3.0, y_max + r + 1.6)
    }
}

impl Animation for Gyration {
    fn title(&self) -> &str {
        "Coherent gyration"
    }

    fn frame_count(&self) -> usize {
        self.phases.len()
    }

    fn interval(&self) -> Duration {
        Duration::from_millis(2)
    }

    fn tick(&mut self, frame: usize) {
        if let Some(&phi) = self.phases.get(frame) {
            self.update(phi);
        }
    }

    fn scene(&self) -> Scene {
        let mut scene = Scene::new(self.bounds(), Aspect::Equal);
        for p in &self.particles {
            scene.push(Primitive::Circle {
                center: p.center,
                radius: self.radius,
                color: Color::RED,
            });
        }
        for p in &self.particles {
            scene.push(Primitive::Marker {
                center: p.position,
                radius: MARKER_RADIUS,
                color: Color::BLACK,
            });
        }
        scene
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn default_layout_matches_reference_axes() {
        let gyration = Gyration::new(&GyrationConfig::default()).unwrap();
        let b = gyration.bounds();
        assert!((b.x_min + 4.0).abs() < EPS);
        assert!((b.x_max - 51.0).abs() < EPS);
        assert!((b.y_min + 6.0).abs() < EPS);
        assert!((b.y_max - 25.0).abs() < EPS);
    }

    #[test]
    fn default_frames_cover_four_rotations_in_two_degree_steps() {
        let gyration = Gyration::new(&GyrationConfig::default()).unwrap();
        assert_eq!(gyration.frame_count(), 720);
        let step = gyration.phases()[1] - gyration.phases()[0];
        assert!((step - 2.0f64.to_radians()).abs() < EPS);
        let last = *gyration.phases().last().unwrap();
        assert!(last < 4.0 * 2.0 * PI);
    }

    #[test]
    fn particles_stay_on_their_circles() {
        let mut gyration = Gyration::new(&GyrationConfig::default()).unwrap();
        for phi in [0.0, 0.1, 1.0, PI, 17.3] {
            gyration.update(phi);
            for p in gyration.particles() {
                let (dx, dy) = (p.position.0 - p.center.0, p.position.1 - p.center.1);
                assert!(((dx * dx + dy * dy).sqrt() - 3.0).abs() < EPS);
            }
        }
    }

    #[test]
    fn position_follows_closed_form() {
        let config = GyrationConfig::default();
        let mut gyration = Gyration::new(&config).unwrap();
        let phi = 0.7;
        gyration.update(phi);
        for col in 0..config.cols {
            for row in 0..config.rows {
                let p = gyration.particle(col, row).unwrap();
                let expected = (
                    p.center.0 + 3.0 * (phi + p.phase_offset).cos(),
                    p.center.1 + 3.0 * (phi + p.phase_offset).sin(),
                );
                assert!((p.position.0 - expected.0).abs() < EPS);
                assert!((p.position.1 - expected.1).abs() < EPS);
            }
        }
    }

    #[test]
    fn offsets_are_evenly_spaced() {
        let gyration = Gyration::new(&GyrationConfig::default()).unwrap();
        let p = gyration.particles();
        assert_eq!(p.len(), 32);
        assert!((p[1].phase_offset - PI).abs() < EPS);
        assert!((p[31].phase_offset - 31.0 * PI).abs() < EPS);
        assert_eq!(gyration.particle(1, 0).unwrap().center.1, 0.0);
        assert!((gyration.particle(7, 0).unwrap().center.0 - 46.8).abs() < EPS);
        assert!((gyration.particle(0, 3).unwrap().center.1 - 20.4).abs() < EPS);
        assert!(gyration.particle(8, 0).is_none());
    }

    #[test]
    fn scene_draws_circles_then_markers() {
        let gyration = Gyration::new(&GyrationConfig::default()).unwrap();
        let scene = gyration.scene();
        assert_eq!(scene.primitives.len(), 64);
        assert!(matches!(scene.primitives[0], Primitive::Circle { .. }));
        assert!(matches!(scene.primitives[63], Primitive::Marker { .. }));
    }

    #[test]
    fn rejects_degenerate_configs() {
        let cases = [
            GyrationConfig {
                cols: 0,
                ..Default::default()
            },
            GyrationConfig {
                radius: -1.0,
                ..Default::default()
            },
            GyrationConfig {
                rotations: 0,
                ..Default::default()
            },
            GyrationConfig {
                rows: usize::MAX / 4,
                ..Default::default()
            },
            GyrationConfig {
                rotations: usize::MAX / 2,
                ..Default::default()
            },
            GyrationConfig {
                cols: 1_000_000,
                rows: 1_000_000,
                ..Default::default()
            },
            GyrationConfig {
                rotations: 1_000_000,
                steps_per_rotation: 1_000_000,
                ..Default::default()
            },
        ];
        for config in cases {
            assert!(matches!(
                Gyration::new(&config),
                Err(Error::Configuration(_))
            ));
        }
    }

    #[test]
    fn largest_grid_is_accepted() {
        let config = GyrationConfig {
            cols: 100,
            rows: 100,
            rotations: 1,
            steps_per_rotation: 4,
            ..Default::default()
        };
        assert_eq!(config.counts().unwrap(), (MAX_PARTICLES, 4));
        assert_eq!(Gyration::new(&config).unwrap().particles().len(), MAX_PARTICLES);
    }
}

//! Travelling waves: `f(x) -> f(x - ct)` for a handful of textbook cases.

use std::f64::consts::PI;
use std::fmt;
use std::time::Duration;

use crate::animation::{linspace, Animation};
use crate::error::{Error, Result};
use crate::output::OutputConfig;
use crate::scene::{Anchor, Aspect, Bounds, Color, Margins, Primitive, Scene};

/// Full oscillation periods shown before the animation repeats.
const PERIODS: f64 = 4.0;
const Y_LIMIT: f64 = 1.1;
// Sizes in points.
const LINE_WIDTH: f32 = 2.0;
const GRID_WIDTH: f32 = 0.8;
const FRAME_WIDTH: f32 = 0.8;
const TITLE_SIZE: f32 = 20.0;
const TITLE_PAD: f32 = 6.0;
const LABEL_SIZE: f32 = 18.0;
const LABEL_PAD: f32 = 3.5;

const X_TICKS: [(f64, &str); 5] = [
    (-PI, "-π"),
    (-PI / 2.0, "-π/2"),
    (0.0, "0"),
    (PI / 2.0, "π/2"),
    (PI, "π"),
];
const Y_TICKS: [(f64, &str); 3] = [(-1.0, "-1"), (0.0, "0"), (1.0, "1")];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Signal with a single frequency.
    SingleFrequency,
    /// Two frequencies, phase velocity equal to group velocity.
    EqualVelocities,
    /// Two frequencies, phase velocity twice the group velocity.
    PhaseTwiceGroup,
    /// Two frequencies, phase velocity minus twice the group velocity.
    PhaseOppositeGroup,
    /// Gaussian pulse on a carrier.
    Pulse,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::SingleFrequency,
        Scenario::EqualVelocities,
        Scenario::PhaseTwiceGroup,
        Scenario::PhaseOppositeGroup,
        Scenario::Pulse,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Scenario::SingleFrequency => "Signal with single frequency",
            Scenario::EqualVelocities => "v_group = v_phase",
            Scenario::PhaseTwiceGroup => "v_phase = 2 v_group",
            Scenario::PhaseOppositeGroup => "v_phase = -2 v_group",
            Scenario::Pulse => "Gaussian pulse",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Scenario::SingleFrequency => "waves_singleFreq.mp4",
            Scenario::EqualVelocities => "wave_vph_vgr.mp4",
            Scenario::PhaseTwiceGroup => "wave_vph_2vgr.mp4",
            Scenario::PhaseOppositeGroup => "wave_vph_m2vgr.mp4",
            Scenario::Pulse => "wave_pulse.mp4",
        }
    }

    /// Time step between two frames.
    pub fn dt(self) -> f64 {
        match self {
            Scenario::SingleFrequency => PI / 100.0,
            _ => PI / 200.0,
        }
    }

    pub fn n_points(self) -> usize {
        match self {
            Scenario::SingleFrequency => 100 * 4,
            _ => 100 * 4 * 2,
        }
    }

    pub fn frame_count(self) -> usize {
        (2.0 * PI / self.dt() * PERIODS).round() as usize
    }

    /// The waveform at `t = 0`.
    pub fn base(self, x: f64) -> f64 {
        self.shifted(x, 0.0)
    }

    /// The waveform at time `t`, each component moving at its own speed.
    pub fn shifted(self, x: f64, t: f64) -> f64 {
        let envelope = |x: f64| x.sin();
        let carrier = |x: f64| (20.0 * x).sin();
        match self {
            Scenario::SingleFrequency => (x - t).sin(),
            Scenario::EqualVelocities => envelope(x - t) * carrier(x - t),
            Scenario::PhaseTwiceGroup => envelope(x - t) * carrier(x - 2.0 * t),
            Scenario::PhaseOppositeGroup => envelope(x - t) * carrier(x + 2.0 * t),
            Scenario::Pulse => {
                let u = x - t;
                (-u * u / 2.0).exp() * (10.0 * u).cos()
            }
        }
    }
}

impl TryFrom<u8> for Scenario {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Scenario::SingleFrequency),
            2 => Ok(Scenario::EqualVelocities),
            3 => Ok(Scenario::PhaseTwiceGroup),
            4 => Ok(Scenario::PhaseOppositeGroup),
            5 => Ok(Scenario::Pulse),
            other => Err(Error::config(format!(
                "unknown wave scenario {other}, expected 1 to 5"
            ))),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

#[derive(Debug, Clone)]
pub struct WaveConfig {
    pub scenario: Scenario,
    pub output: OutputConfig,
}

pub struct WaveAnimator {
    scenario: Scenario,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl WaveAnimator {
    pub fn new(scenario: Scenario) -> Self {
        let x = linspace(-PI, PI, scenario.n_points());
        let y = x.iter().map(|&x| scenario.base(x)).collect();
        Self { scenario, x, y }
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Recompute the whole signal buffer at time `t`.
    pub fn shift(&mut self, t: f64) -> &[f64] {
        let scenario = self.scenario;
        for (y, &x) in self.y.iter_mut().zip(&self.x) {
            *y = scenario.shifted(x, t);
        }
        &self.y
    }
}

impl Animation for WaveAnimator {
    fn title(&self) -> &str {
        self.scenario.title()
    }

    fn frame_count(&self) -> usize {
        self.scenario.frame_count()
    }

    fn interval(&self) -> Duration {
        Duration::from_millis(30)
    }

    fn tick(&mut self, frame: usize) {
        self.shift(frame as f64 * self.scenario.dt());
    }

    fn scene(&self) -> Scene {
        let bounds = Bounds::new(-PI, PI, -Y_LIMIT, Y_LIMIT);
        let mut scene = Scene::new(bounds, Aspect::Fill);
        scene.margins = Margins::PLOT;
        for (x, _) in X_TICKS {
            scene.push(Primitive::Polyline {
                points: vec![(x, -Y_LIMIT), (x, Y_LIMIT)],
                color: Color::GRID,
                width: GRID_WIDTH,
            });
        }
        for (y, _) in Y_TICKS {
            scene.push(Primitive::Polyline {
                points: vec![(-PI, y), (PI, y)],
                color: Color::GRID,
                width: GRID_WIDTH,
            });
        }
        scene.push(Primitive::Polyline {
            points: vec![
                (-PI, -Y_LIMIT),
                (PI, -Y_LIMIT),
                (PI, Y_LIMIT),
                (-PI, Y_LIMIT),
                (-PI, -Y_LIMIT),
            ],
            color: Color::BLACK,
            width: FRAME_WIDTH,
        });
        for (x, label) in X_TICKS {
            scene.push(label_at((x, -Y_LIMIT), (0.0, -LABEL_PAD), label, Anchor::TopCenter));
        }
        for (y, label) in Y_TICKS {
            scene.push(label_at((-PI, y), (-LABEL_PAD, 0.0), label, Anchor::CenterRight));
        }
        scene.push(Primitive::Text {
            position: (0.0, Y_LIMIT),
            offset: (0.0, TITLE_PAD),
            text: self.scenario.title().to_string(),
            size: TITLE_SIZE,
            color: Color::BLACK,
            anchor: Anchor::BottomCenter,
        });
        scene.push(Primitive::Polyline {
            points: self.x.iter().copied().zip(self.y.iter().copied()).collect(),
            color: Color::XKCD_BLUE,
            width: LINE_WIDTH,
        });
        scene
    }
}

fn label_at(position: (f64, f64), offset: (f32, f32), text: &str, anchor: Anchor) -> Primitive {
    Primitive::Text {
        position,
        offset,
        text: text.to_string(),
        size: LABEL_SIZE,
        color: Color::BLACK,
        anchor,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn unknown_scenario_is_a_configuration_error() {
        for bad in [0u8, 6, 255] {
            let err = Scenario::try_from(bad).unwrap_err();
            assert!(matches!(err, Error::Configuration(_)));
        }
        assert_eq!(Scenario::try_from(4).unwrap(), Scenario::PhaseOppositeGroup);
    }

    #[test]
    fn single_frequency_travels_as_sine() {
        let mut wave = WaveAnimator::new(Scenario::SingleFrequency);
        for t in [0.0, 0.3, 1.0, 7.5] {
            let x = wave.x().to_vec();
            let y = wave.shift(t);
            for (x, y) in x.iter().zip(y) {
                assert!((y - (x - t).sin()).abs() < EPS);
            }
        }
    }

    #[test]
    fn opposite_group_velocity_formula() {
        let mut wave = WaveAnimator::new(Scenario::PhaseOppositeGroup);
        for t in [0.0, 0.05, 2.0] {
            let x = wave.x().to_vec();
            let y = wave.shift(t);
            for (x, y) in x.iter().zip(y) {
                let expected = (x - t).sin() * (20.0 * (x + 2.0 * t)).sin();
                assert!((y - expected).abs() < EPS);
            }
        }
    }

    #[test]
    fn frame_counts_are_positive() {
        for scenario in Scenario::ALL {
            let expected = (2.0 * PI / scenario.dt() * 4.0).round() as usize;
            assert_eq!(scenario.frame_count(), expected);
            assert!(scenario.frame_count() > 0);
        }
        assert_eq!(Scenario::SingleFrequency.frame_count(), 800);
        assert_eq!(Scenario::Pulse.frame_count(), 1600);
    }

    #[test]
    fn buffers_keep_matching_lengths() {
        for scenario in Scenario::ALL {
            let mut wave = WaveAnimator::new(scenario);
            wave.tick(17);
            assert_eq!(wave.x().len(), scenario.n_points());
            assert_eq!(wave.x().len(), wave.y().len());
            assert_eq!(wave.x()[0], -PI);
            assert!((wave.x()[scenario.n_points() - 1] - PI).abs() < EPS);
        }
    }

    #[test]
    fn tick_advances_time_by_dt() {
        let mut wave = WaveAnimator::new(Scenario::PhaseTwiceGroup);
        wave.tick(10);
        let t = 10.0 * Scenario::PhaseTwiceGroup.dt();
        let x = wave.x()[123];
        let expected = (x - t).sin() * (20.0 * (x - 2.0 * t)).sin();
        assert!((wave.y()[123] - expected).abs() < EPS);
    }

    #[test]
    fn scene_ends_with_the_signal() {
        let wave = WaveAnimator::new(Scenario::Pulse);
        let scene = wave.scene();
        match scene.primitives.last() {
            Some(Primitive::Polyline { points, color, .. }) => {
                assert_eq!(points.len(), Scenario::Pulse.n_points());
                assert_eq!(*color, Color::XKCD_BLUE);
            }
            other => panic!("unexpected primitive {other:?}"),
        }
    }

    #[test]
    fn scene_has_title_and_tick_labels() {
        let wave = WaveAnimator::new(Scenario::PhaseOppositeGroup);
        let scene = wave.scene();
        let labels: Vec<&str> = scene
            .primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            labels,
            ["-π", "-π/2", "0", "π/2", "π", "-1", "0", "1", "v_phase = -2 v_group"]
        );
        assert_eq!(scene.margins, Margins::PLOT);
    }

    #[test]
    fn rendered_frame_shows_the_title() {
        let wave = WaveAnimator::new(Scenario::SingleFrequency);
        let font = crate::text::font().unwrap();
        let image = crate::raster::rasterize(&wave.scene(), 1500, 900, 150.0, &font);
        // The strip above the axes box holds only the title.
        let inked = (0..90)
            .flat_map(|y| (0..1500).map(move |x| (x, y)))
            .filter(|&(x, y)| image.get_pixel(x, y).0 != Color::WHITE.to_rgba())
            .count();
        assert!(inked > 200, "{inked}");
    }
}

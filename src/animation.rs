use std::time::Duration;

use crate::scene::Scene;

/// A timer-driven animation.
///
/// The event loop calls [`Animation::tick`] exactly once per interval with
/// the index of the frame to show, then draws [`Animation::scene`]. Frame
/// indices run from `0` to `frame_count() - 1` and start over afterwards.
pub trait Animation {
    fn title(&self) -> &str;

    fn frame_count(&self) -> usize;

    /// Delay between two ticks in the interactive window.
    fn interval(&self) -> Duration;

    fn tick(&mut self, frame: usize);

    fn scene(&self) -> Scene;
}

/// Figure geometry, `size` in inches like a plotting figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Figure {
    pub size: (f32, f32),
    pub dpi: u32,
}

impl Figure {
    pub const FPS: u32 = 30;

    pub fn pixels(&self) -> (u32, u32) {
        // Video encoders want even dimensions.
        let even = |v: f32| ((v * self.dpi as f32).round() as u32) & !1;
        (even(self.size.0), even(self.size.1))
    }
}

impl Default for Figure {
    fn default() -> Self {
        Self {
            size: (10.0, 6.0),
            dpi: 150,
        }
    }
}

/// `n` evenly spaced samples over `[start, stop]`.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_figure_is_1500_by_900() {
        assert_eq!(Figure::default().pixels(), (1500, 900));
    }

    #[test]
    fn linspace_includes_both_ends() {
        let v = linspace(-1.0, 1.0, 5);
        assert_eq!(v, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(3.0, 7.0, 1), vec![3.0]);
    }
}

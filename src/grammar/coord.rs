//! Coordinate systems for Grammar of Graphics.
//!
//! Only Cartesian coordinates are supported. Limits set here zoom the
//! view without touching the data, unlike scale limits which drop or
//! squish out-of-range values.

/// Cartesian coordinate system with optional zoom limits.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coord {
    xlim: Option<(f32, f32)>,
    ylim: Option<(f32, f32)>,
}

impl Coord {
    /// Create a Cartesian coordinate system.
    #[must_use]
    pub fn cartesian() -> Self {
        Self::default()
    }

    /// Set x axis limits.
    #[must_use]
    pub fn xlim(mut self, min: f32, max: f32) -> Self {
        self.xlim = Some((min.min(max), min.max(max)));
        self
    }

    /// Set y axis limits.
    #[must_use]
    pub fn ylim(mut self, min: f32, max: f32) -> Self {
        self.ylim = Some((min.min(max), min.max(max)));
        self
    }

    /// Visible x range given the trained scale's coordinate range.
    #[must_use]
    pub fn x_range(&self, scale_range: (f32, f32)) -> (f32, f32) {
        self.xlim.unwrap_or(scale_range)
    }

    /// Visible y range given the trained scale's coordinate range.
    #[must_use]
    pub fn y_range(&self, scale_range: (f32, f32)) -> (f32, f32) {
        self.ylim.unwrap_or(scale_range)
    }

    /// Explicit x limits, if any.
    #[must_use]
    pub fn x_limits(&self) -> Option<(f32, f32)> {
        self.xlim
    }

    /// Explicit y limits, if any.
    #[must_use]
    pub fn y_limits(&self) -> Option<(f32, f32)> {
        self.ylim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cartesian_passes_scale_range() {
        let c = Coord::cartesian();
        assert_eq!(c.x_range((0.0, 1.0)), (0.0, 1.0));
        assert_eq!(c.x_limits(), None);
    }

    #[test]
    fn test_limits_zoom() {
        let c = Coord::cartesian().xlim(10.0, 0.0).ylim(-1.0, 1.0);
        assert_eq!(c.x_range((0.0, 100.0)), (0.0, 10.0));
        assert_eq!(c.y_range((5.0, 6.0)), (-1.0, 1.0));
    }
}

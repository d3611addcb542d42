//! Theme system for Grammar of Graphics.
//!
//! Controls the non-data appearance of plots and the fallback style of
//! geoms whose color, size or opacity is neither mapped nor set.

use crate::color::Rgba;
use crate::render::LineStyle;

/// Theme specification.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Background color.
    pub background: Rgba,
    /// Panel background color.
    pub panel_background: Rgba,
    /// Default stroke color for geoms.
    pub geom_color: Rgba,
    /// Default fill color for geoms.
    pub geom_fill: Rgba,
    /// Default line width.
    pub line_width: f32,
    /// Default line pattern.
    pub line_style: LineStyle,
    /// Default point diameter.
    pub point_size: f32,
    /// Default opacity.
    pub alpha: f32,
    /// Margin around the plot.
    pub margin: u32,
    /// Gap between facet panels.
    pub panel_spacing: u32,
}

impl Default for Theme {
    fn default() -> Self {
        Self::grey()
    }
}

impl Theme {
    /// Grey theme (ggplot2 default-like).
    #[must_use]
    pub fn grey() -> Self {
        Self {
            background: Rgba::WHITE,
            panel_background: Rgba::rgb(235, 235, 235),
            geom_color: Rgba::BLACK,
            geom_fill: Rgba::rgb(89, 89, 89),
            line_width: 1.0,
            line_style: LineStyle::Solid,
            point_size: 3.0,
            alpha: 1.0,
            margin: 40,
            panel_spacing: 8,
        }
    }

    /// Minimal theme with white background.
    #[must_use]
    pub fn minimal() -> Self {
        Self { panel_background: Rgba::WHITE, ..Self::grey() }
    }

    /// Black and white theme.
    #[must_use]
    pub fn bw() -> Self {
        Self {
            panel_background: Rgba::WHITE,
            geom_fill: Rgba::rgb(169, 169, 169),
            ..Self::grey()
        }
    }

    /// Dark theme.
    #[must_use]
    pub fn dark() -> Self {
        Self {
            background: Rgba::rgb(30, 30, 30),
            panel_background: Rgba::rgb(50, 50, 50),
            geom_color: Rgba::rgb(220, 220, 220),
            geom_fill: Rgba::rgb(180, 180, 180),
            ..Self::grey()
        }
    }

    /// Set background color.
    #[must_use]
    pub fn background(mut self, color: Rgba) -> Self {
        self.background = color;
        self
    }

    /// Set panel background color.
    #[must_use]
    pub fn panel_background(mut self, color: Rgba) -> Self {
        self.panel_background = color;
        self
    }

    /// Set the default geom stroke color.
    #[must_use]
    pub fn geom_color(mut self, color: Rgba) -> Self {
        self.geom_color = color;
        self
    }

    /// Set the default geom fill color.
    #[must_use]
    pub fn geom_fill(mut self, color: Rgba) -> Self {
        self.geom_fill = color;
        self
    }

    /// Set the default point size.
    #[must_use]
    pub fn point_size(mut self, size: f32) -> Self {
        self.point_size = size;
        self
    }

    /// Set margin.
    #[must_use]
    pub fn margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    /// Set the gap between panels.
    #[must_use]
    pub fn panel_spacing(mut self, spacing: u32) -> Self {
        self.panel_spacing = spacing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_grey() {
        let t = Theme::grey();
        assert_eq!(t.geom_color, Rgba::BLACK);
        assert_eq!(t.line_style, LineStyle::Solid);
    }

    #[test]
    fn test_theme_dark() {
        let t = Theme::dark();
        assert_eq!(t.background.r, 30);
        assert_eq!(t.margin, Theme::grey().margin);
    }

    #[test]
    fn test_theme_customization() {
        let t = Theme::minimal().background(Rgba::rgb(250, 250, 250)).margin(50).panel_spacing(0);
        assert_eq!(t.margin, 50);
        assert_eq!(t.panel_spacing, 0);
        assert_eq!(t.panel_background, Rgba::WHITE);
    }

    #[test]
    fn test_theme_default_is_grey() {
        assert_eq!(Theme::default(), Theme::grey());
    }

    #[test]
    fn test_all_themes_valid() {
        for t in [Theme::grey(), Theme::minimal(), Theme::bw(), Theme::dark()] {
            assert!(t.point_size > 0.0);
            assert!(t.line_width > 0.0);
            assert!((0.0..=1.0).contains(&t.alpha));
        }
    }
}

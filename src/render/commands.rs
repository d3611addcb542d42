//! Draw commands emitted by geoms, in data coordinates.

use crate::color::Rgba;
use crate::geometry::Point;
use crate::grammar::PointShape;

/// Stroke pattern of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    /// Continuous stroke.
    #[default]
    Solid,
    /// Long dashes.
    Dashed,
    /// Dots.
    Dotted,
    /// Alternating dash and dot.
    DashDot,
    /// Extra long dashes.
    LongDash,
}

impl LineStyle {
    /// Parse a linetype name as produced by the linetype scale.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "solid" => Some(LineStyle::Solid),
            "dashed" => Some(LineStyle::Dashed),
            "dotted" => Some(LineStyle::Dotted),
            "dashdot" => Some(LineStyle::DashDot),
            "longdash" => Some(LineStyle::LongDash),
            _ => None,
        }
    }

    /// On/off dash lengths in pixels; empty for a solid stroke.
    #[must_use]
    pub fn dash_pattern(self) -> &'static [f32] {
        match self {
            LineStyle::Solid => &[],
            LineStyle::Dashed => &[6.0, 4.0],
            LineStyle::Dotted => &[1.0, 3.0],
            LineStyle::DashDot => &[6.0, 3.0, 1.0, 3.0],
            LineStyle::LongDash => &[12.0, 4.0],
        }
    }
}

/// Resolved visual style of one command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    /// Stroke color.
    pub color: Rgba,
    /// Fill color.
    pub fill: Rgba,
    /// Stroke width in pixels.
    pub line_width: f32,
    /// Stroke pattern.
    pub line_style: LineStyle,
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: Rgba::BLACK,
            fill: Rgba::rgb(89, 89, 89),
            line_width: 1.0,
            line_style: LineStyle::Solid,
            alpha: 1.0,
        }
    }
}

impl Style {
    /// Stroke color with the opacity applied.
    #[must_use]
    pub fn stroke(&self) -> Rgba {
        self.color.with_opacity(self.alpha)
    }

    /// Fill color with the opacity applied.
    #[must_use]
    pub fn fill(&self) -> Rgba {
        self.fill.with_opacity(self.alpha)
    }
}

/// One drawing instruction for a renderer.
///
/// Coordinates are in the panel's data space; see
/// [`PanelFrame::to_pixel`](super::PanelFrame::to_pixel).
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// A single marker.
    Point {
        /// Marker center.
        at: Point,
        /// Marker diameter in pixels.
        size: f32,
        /// Marker shape.
        shape: PointShape,
        /// Style.
        style: Style,
    },
    /// Connected line segments.
    Polyline {
        /// Vertices in drawing order.
        points: Vec<Point>,
        /// Style.
        style: Style,
    },
    /// A horizontal line across `x0..x1` at `y`.
    HorizontalSpan {
        /// Height of the line.
        y: f32,
        /// Left end.
        x0: f32,
        /// Right end.
        x1: f32,
        /// Style.
        style: Style,
    },
    /// A closed, filled polygon.
    FilledRegion {
        /// Outline vertices; the last connects back to the first.
        outline: Vec<Point>,
        /// Style.
        style: Style,
    },
}

impl DrawCommand {
    /// Style of the command.
    #[must_use]
    pub fn style(&self) -> &Style {
        match self {
            DrawCommand::Point { style, .. }
            | DrawCommand::Polyline { style, .. }
            | DrawCommand::HorizontalSpan { style, .. }
            | DrawCommand::FilledRegion { style, .. } => style,
        }
    }
}

//! Geometry types for Grammar of Graphics.
//!
//! A geom knows which aesthetics it needs, how to complete its position
//! columns before adjustment (`reparameterise`), and how to turn a panel's
//! rows into [`DrawCommand`]s.

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::render::{DrawCommand, LineStyle, Style};

use super::aes::{Aes, AesValue};
use super::data::{Column, DataValue, Table};
use super::position::{resolution, Position};
use super::stat::Stat;
use super::theme::Theme;
use super::warnings::WarningLog;

/// Shape types for point geometries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointShape {
    /// Filled circle.
    #[default]
    Circle,
    /// Filled square.
    Square,
    /// Filled triangle.
    Triangle,
    /// Diamond shape.
    Diamond,
    /// Cross (+).
    Cross,
    /// X shape.
    X,
}

impl PointShape {
    /// Parse a shape name as produced by the shape scale.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "circle" => Some(PointShape::Circle),
            "square" => Some(PointShape::Square),
            "triangle" => Some(PointShape::Triangle),
            "diamond" => Some(PointShape::Diamond),
            "cross" => Some(PointShape::Cross),
            "x" => Some(PointShape::X),
            _ => None,
        }
    }
}

/// Geometry type specification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeomType {
    /// Points.
    Point {
        /// Point shape.
        shape: PointShape,
    },
    /// Lines connecting points in x order.
    Line,
    /// Lines connecting points in data order.
    Path,
    /// Filled area between `ymin` and `ymax`.
    Area,
    /// Bars.
    Bar {
        /// Bar width in data units; defaults to 90% of the x resolution.
        width: Option<f32>,
    },
    /// Horizontal reference line.
    Hline {
        /// Fixed intercept; `None` reads the `yintercept` aesthetic.
        yintercept: Option<f32>,
    },
    /// Vertical reference line.
    Vline {
        /// Fixed intercept; `None` reads the `xintercept` aesthetic.
        xintercept: Option<f32>,
    },
}

/// Everything a geom needs to draw one panel.
#[derive(Debug, Clone, Copy)]
pub struct DrawContext<'a> {
    /// Visible x range of the panel.
    pub x_range: (f32, f32),
    /// Visible y range of the panel.
    pub y_range: (f32, f32),
    /// Fallback style.
    pub theme: &'a Theme,
    /// Deduplicating warning sink.
    pub warnings: &'a WarningLog,
}

/// A geometry layer.
#[derive(Debug, Clone)]
pub struct Geom {
    /// The geometry type.
    pub geom_type: GeomType,
    /// Layer-specific aesthetics.
    pub aes: Option<Aes>,
    /// Statistical transformation; `None` uses the geom's default.
    pub stat: Option<Stat>,
    /// Position adjustment; `None` uses the geom's default.
    pub position: Option<Position>,
    /// Aesthetics set to fixed values. These bypass scales entirely.
    pub params: Aes,
}

impl Geom {
    fn of(geom_type: GeomType) -> Self {
        Self { geom_type, aes: None, stat: None, position: None, params: Aes::new() }
    }

    /// Create a point geometry.
    #[must_use]
    pub fn point() -> Self {
        Self::of(GeomType::Point { shape: PointShape::Circle })
    }

    /// Create a line geometry.
    #[must_use]
    pub fn line() -> Self {
        Self::of(GeomType::Line)
    }

    /// Create a path geometry.
    #[must_use]
    pub fn path() -> Self {
        Self::of(GeomType::Path)
    }

    /// Create an area geometry.
    #[must_use]
    pub fn area() -> Self {
        Self::of(GeomType::Area)
    }

    /// Create a bar geometry that counts rows at each x.
    #[must_use]
    pub fn bar() -> Self {
        Self::of(GeomType::Bar { width: None })
    }

    /// Create a bar geometry that draws `y` as given.
    #[must_use]
    pub fn col() -> Self {
        Self::bar().stat(Stat::identity())
    }

    /// Create a histogram: bars over `bins` equal-width bins of x.
    #[must_use]
    pub fn histogram(bins: usize) -> Self {
        Self::bar().stat(Stat::bin(bins))
    }

    /// Create a horizontal line at a fixed height.
    #[must_use]
    pub fn hline(yintercept: f32) -> Self {
        Self::of(GeomType::Hline { yintercept: Some(yintercept) })
    }

    /// Create horizontal lines at the mapped `yintercept` values.
    #[must_use]
    pub fn hlines() -> Self {
        Self::of(GeomType::Hline { yintercept: None })
    }

    /// Create a vertical line at a fixed position.
    #[must_use]
    pub fn vline(xintercept: f32) -> Self {
        Self::of(GeomType::Vline { xintercept: Some(xintercept) })
    }

    /// Create vertical lines at the mapped `xintercept` values.
    #[must_use]
    pub fn vlines() -> Self {
        Self::of(GeomType::Vline { xintercept: None })
    }

    /// Set layer aesthetics.
    #[must_use]
    pub fn aes(mut self, aes: Aes) -> Self {
        self.aes = Some(aes);
        self
    }

    /// Set the statistical transformation.
    #[must_use]
    pub fn stat(mut self, stat: Stat) -> Self {
        self.stat = Some(stat);
        self
    }

    /// Set the position adjustment.
    #[must_use]
    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Fix an aesthetic to a value for every row, bypassing scales.
    #[must_use]
    pub fn set(mut self, aesthetic: &str, value: impl Into<DataValue>) -> Self {
        self.params = self.params.set(aesthetic, value);
        self
    }

    /// Fix the color.
    #[must_use]
    pub fn color(self, color: Rgba) -> Self {
        self.set("color", color.to_hex())
    }

    /// Fix the fill color.
    #[must_use]
    pub fn fill(self, color: Rgba) -> Self {
        self.set("fill", color.to_hex())
    }

    /// Fix the size (point diameter or line width).
    #[must_use]
    pub fn size(self, size: f32) -> Self {
        self.set("size", size)
    }

    /// Fix the opacity.
    #[must_use]
    pub fn alpha(self, alpha: f32) -> Self {
        self.set("alpha", alpha.clamp(0.0, 1.0))
    }

    /// Set the point shape.
    #[must_use]
    pub fn shape(mut self, shape: PointShape) -> Self {
        if let GeomType::Point { shape: ref mut s } = self.geom_type {
            *s = shape;
        }
        self
    }

    /// Set the bar width.
    #[must_use]
    pub fn width(mut self, width: f32) -> Self {
        if let GeomType::Bar { width: ref mut w } = self.geom_type {
            *w = Some(width);
        }
        self
    }

    /// Name used in errors and warnings.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self.geom_type {
            GeomType::Point { .. } => "geom_point",
            GeomType::Line => "geom_line",
            GeomType::Path => "geom_path",
            GeomType::Area => "geom_area",
            GeomType::Bar { .. } => "geom_bar",
            GeomType::Hline { .. } => "geom_hline",
            GeomType::Vline { .. } => "geom_vline",
        }
    }

    /// Aesthetics the geom needs once the stat has run.
    #[must_use]
    pub fn required_aes(&self) -> &'static [&'static str] {
        match self.geom_type {
            GeomType::Point { .. } | GeomType::Line | GeomType::Path | GeomType::Area => &["x", "y"],
            GeomType::Bar { .. } => &["x"],
            GeomType::Hline { .. } => &["yintercept"],
            GeomType::Vline { .. } => &["xintercept"],
        }
    }

    /// Stat used when none is given.
    #[must_use]
    pub fn default_stat(&self) -> Stat {
        match self.geom_type {
            GeomType::Bar { .. } => Stat::count(),
            GeomType::Hline { .. } => Stat::Hline { yintercept: None },
            GeomType::Vline { .. } => Stat::Vline { xintercept: None },
            _ => Stat::identity(),
        }
    }

    /// Position adjustment used when none is given.
    #[must_use]
    pub fn default_position(&self) -> Position {
        match self.geom_type {
            GeomType::Bar { .. } | GeomType::Area => Position::stack(),
            _ => Position::identity(),
        }
    }

    /// Names of the aesthetics fixed with [`Geom::set`].
    pub fn manual_aes(&self) -> impl Iterator<Item = &str> {
        self.params.names()
    }

    /// The intercept fixed at construction, as `(aesthetic, value)`.
    #[must_use]
    pub fn fixed_intercept(&self) -> Option<(&'static str, f32)> {
        match self.geom_type {
            GeomType::Hline { yintercept: Some(v) } => Some(("yintercept", v)),
            GeomType::Vline { xintercept: Some(v) } => Some(("xintercept", v)),
            _ => None,
        }
    }

    /// Fail with [`Error::MissingAesthetic`] unless every required
    /// aesthetic is a column of `data`.
    pub fn check_required_aesthetics(&self, data: &Table) -> Result<()> {
        let missing: Vec<String> = self
            .required_aes()
            .iter()
            .filter(|aes| !data.has_column(aes))
            .map(ToString::to_string)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::MissingAesthetic { stat: self.name().to_string(), missing })
        }
    }

    /// Fill in the extent columns position adjustments work on.
    ///
    /// Bars get `xmin`/`xmax` from their width and `ymin`/`ymax` spanning
    /// zero to `y`; areas get `ymin = 0` and `ymax = y`.
    pub fn reparameterise(&self, mut data: Table) -> Result<Table> {
        if data.is_empty() {
            return Ok(data);
        }
        match self.geom_type {
            GeomType::Bar { width } => {
                let Some(x) = data.numbers("x") else { return Ok(data) };
                if !(data.has_column("xmin") && data.has_column("xmax")) {
                    let widths: Vec<Option<f32>> = match (width, data.numbers("width")) {
                        (Some(w), _) => vec![Some(w); x.len()],
                        (None, Some(column)) => column,
                        (None, None) => {
                            let finite: Vec<f32> = x.iter().flatten().copied().collect();
                            vec![Some(0.9 * resolution(&finite)); x.len()]
                        }
                    };
                    let edge = |sign: f32| -> Column {
                        Column::continuous_opt(
                            x.iter().zip(&widths).map(|(x, w)| Some(x.as_ref()? + sign * w.as_ref()? / 2.0)),
                        )
                    };
                    data.insert("xmin", edge(-1.0))?;
                    data.insert("xmax", edge(1.0))?;
                }
                if let Some(y) = data.numbers("y") {
                    data.insert("ymin", Column::continuous_opt(y.iter().map(|v| v.map(|v| v.min(0.0)))))?;
                    data.insert("ymax", Column::continuous_opt(y.iter().map(|v| v.map(|v| v.max(0.0)))))?;
                }
            }
            GeomType::Area => {
                if let Some(y) = data.numbers("y") {
                    data.insert("ymin", Column::continuous(vec![0.0; y.len()]))?;
                    data.insert("ymax", Column::continuous_opt(y))?;
                }
            }
            _ => {}
        }
        Ok(data)
    }

    fn position_columns(&self) -> &'static [&'static str] {
        match self.geom_type {
            GeomType::Point { .. } | GeomType::Line | GeomType::Path => &["x", "y"],
            GeomType::Area => &["x", "ymin", "ymax"],
            GeomType::Bar { .. } => &["xmin", "xmax", "ymin", "ymax"],
            GeomType::Hline { .. } => &["yintercept"],
            GeomType::Vline { .. } => &["xintercept"],
        }
    }

    /// Turn one panel's rows into draw commands. Rows missing any
    /// position value are dropped with a one-time warning.
    pub fn draw(&self, data: &Table, ctx: &DrawContext<'_>) -> Result<Vec<DrawCommand>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let positions: Vec<Vec<Option<f32>>> = self
            .position_columns()
            .iter()
            .map(|name| data.numbers(name).unwrap_or_else(|| vec![None; data.nrow()]))
            .collect();
        let complete: Vec<usize> = (0..data.nrow())
            .filter(|&row| positions.iter().all(|col| col[row].is_some_and(f32::is_finite)))
            .collect();
        if complete.len() < data.nrow() {
            ctx.warnings.warn_once(format!("{}: removed rows containing missing values", self.name()));
        }
        let data = data.take(&complete);
        let at = |name: &str, row: usize| -> f32 {
            data.get(name).and_then(|c| c.get(row)).and_then(DataValue::as_f32).unwrap_or(f32::NAN)
        };

        let mut commands = Vec::new();
        match self.geom_type {
            GeomType::Point { shape } => {
                for row in 0..data.nrow() {
                    let shape = self
                        .lookup(&data, "shape", row)
                        .and_then(DataValue::as_str)
                        .and_then(PointShape::from_name)
                        .unwrap_or(shape);
                    let size = self
                        .lookup(&data, "size", row)
                        .and_then(DataValue::as_f32)
                        .unwrap_or(ctx.theme.point_size);
                    commands.push(DrawCommand::Point {
                        at: Point::new(at("x", row), at("y", row)),
                        size,
                        shape,
                        style: self.style(&data, row, ctx.theme)?,
                    });
                }
            }
            GeomType::Line | GeomType::Path => {
                for mut rows in data.partition(&["group"]) {
                    if rows.len() < 2 {
                        continue;
                    }
                    if self.geom_type == GeomType::Line {
                        rows.sort_by(|&a, &b| at("x", a).total_cmp(&at("x", b)));
                    }
                    let points = rows.iter().map(|&r| Point::new(at("x", r), at("y", r))).collect();
                    commands.push(DrawCommand::Polyline { points, style: self.style(&data, rows[0], ctx.theme)? });
                }
            }
            GeomType::Area => {
                for mut rows in data.partition(&["group"]) {
                    rows.sort_by(|&a, &b| at("x", a).total_cmp(&at("x", b)));
                    let mut outline: Vec<Point> = rows.iter().map(|&r| Point::new(at("x", r), at("ymax", r))).collect();
                    outline.extend(rows.iter().rev().map(|&r| Point::new(at("x", r), at("ymin", r))));
                    commands.push(DrawCommand::FilledRegion { outline, style: self.style(&data, rows[0], ctx.theme)? });
                }
            }
            GeomType::Bar { .. } => {
                for row in 0..data.nrow() {
                    let (x0, x1, y0, y1) = (at("xmin", row), at("xmax", row), at("ymin", row), at("ymax", row));
                    commands.push(DrawCommand::FilledRegion {
                        outline: vec![Point::new(x0, y0), Point::new(x1, y0), Point::new(x1, y1), Point::new(x0, y1)],
                        style: self.style(&data, row, ctx.theme)?,
                    });
                }
            }
            GeomType::Hline { .. } => {
                for row in 0..data.nrow() {
                    let x0 = data.get("xmin").and_then(|c| c.get(row)?.as_f32()).unwrap_or(ctx.x_range.0);
                    let x1 = data.get("xmax").and_then(|c| c.get(row)?.as_f32()).unwrap_or(ctx.x_range.1);
                    commands.push(DrawCommand::HorizontalSpan {
                        y: at("yintercept", row),
                        x0,
                        x1,
                        style: self.style(&data, row, ctx.theme)?,
                    });
                }
            }
            GeomType::Vline { .. } => {
                for row in 0..data.nrow() {
                    let x = at("xintercept", row);
                    let (y0, y1) = ctx.y_range;
                    commands.push(DrawCommand::Polyline {
                        points: vec![Point::new(x, y0), Point::new(x, y1)],
                        style: self.style(&data, row, ctx.theme)?,
                    });
                }
            }
        }
        Ok(commands)
    }

    /// Row value of an aesthetic, falling back to the fixed parameter.
    fn lookup<'d>(&'d self, data: &'d Table, aesthetic: &str, row: usize) -> Option<&'d DataValue> {
        data.get(aesthetic)
            .and_then(|c| c.get(row))
            .filter(|v| !v.is_null())
            .or_else(|| match self.params.get(aesthetic)? {
                AesValue::Constant(values) => values.get(0),
                _ => None,
            })
    }

    fn resolve_color(&self, data: &Table, aesthetic: &str, row: usize, fallback: Rgba) -> Result<Rgba> {
        match self.lookup(data, aesthetic, row).and_then(DataValue::as_str) {
            Some(text) => Rgba::parse(text),
            None => Ok(fallback),
        }
    }

    fn style(&self, data: &Table, row: usize, theme: &Theme) -> Result<Style> {
        let is_point = matches!(self.geom_type, GeomType::Point { .. });
        let line_width = if is_point {
            theme.line_width
        } else {
            self.lookup(data, "size", row).and_then(DataValue::as_f32).unwrap_or(theme.line_width)
        };
        Ok(Style {
            color: self.resolve_color(data, "color", row, theme.geom_color)?,
            fill: self.resolve_color(data, "fill", row, theme.geom_fill)?,
            line_width,
            line_style: self
                .lookup(data, "linetype", row)
                .and_then(DataValue::as_str)
                .and_then(LineStyle::from_name)
                .unwrap_or(theme.line_style),
            alpha: self
                .lookup(data, "alpha", row)
                .and_then(DataValue::as_f32)
                .map_or(theme.alpha, |a| a.clamp(0.0, 1.0)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ctx<'a>(theme: &'a Theme, warnings: &'a WarningLog) -> DrawContext<'a> {
        DrawContext { x_range: (0.0, 10.0), y_range: (-1.0, 1.0), theme, warnings }
    }

    #[test]
    fn test_defaults_per_geom() {
        assert_eq!(Geom::bar().default_stat().name(), "stat_count");
        assert_eq!(Geom::histogram(10).stat.unwrap().name(), "stat_bin");
        assert_eq!(Geom::point().default_position(), Position::Identity);
        assert_eq!(Geom::bar().default_position(), Position::Stack);
        assert_eq!(Geom::hline(1.0).default_stat().name(), "stat_hline");
    }

    #[test]
    fn test_point_shape_names() {
        assert_eq!(PointShape::from_name("diamond"), Some(PointShape::Diamond));
        assert_eq!(PointShape::from_name("star"), None);
        assert_eq!(Geom::point().shape(PointShape::X).geom_type, GeomType::Point { shape: PointShape::X });
    }

    #[test]
    fn test_required_aesthetics() {
        let data = Table::from_xy(&[1.0], &[2.0]);
        assert!(Geom::point().check_required_aesthetics(&data).is_ok());
        let err = Geom::hline(1.0).check_required_aesthetics(&data).unwrap_err();
        assert!(matches!(err, Error::MissingAesthetic { ref missing, .. } if missing == &["yintercept"]));
    }

    #[test]
    fn test_bar_reparameterise_uses_resolution() {
        let data = Table::from_xy(&[1.0, 2.0], &[3.0, -1.0]);
        let out = Geom::bar().reparameterise(data).unwrap();
        let xmin = out.numbers("xmin").unwrap();
        assert_relative_eq!(xmin[0].unwrap(), 0.55, epsilon = 1e-5);
        assert_eq!(out.numbers("ymin").unwrap(), vec![Some(0.0), Some(-1.0)]);
        assert_eq!(out.numbers("ymax").unwrap(), vec![Some(3.0), Some(0.0)]);
    }

    #[test]
    fn test_bar_keeps_existing_extent() {
        let data = Table::from_xy(&[1.0], &[3.0])
            .with_column("xmin", Column::continuous([0.0]))
            .unwrap()
            .with_column("xmax", Column::continuous([2.0]))
            .unwrap();
        let out = Geom::bar().width(0.5).reparameterise(data).unwrap();
        assert_eq!(out.numbers("xmax").unwrap(), vec![Some(2.0)]);
    }

    #[test]
    fn test_area_reparameterise() {
        let out = Geom::area().reparameterise(Table::from_xy(&[1.0, 2.0], &[3.0, 4.0])).unwrap();
        assert_eq!(out.numbers("ymin").unwrap(), vec![Some(0.0), Some(0.0)]);
        assert_eq!(out.numbers("ymax").unwrap(), vec![Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_draw_points_drop_missing() {
        let data = Table::new()
            .with_column("x", Column::continuous_opt([Some(1.0), None]))
            .unwrap()
            .with_column("y", Column::continuous([1.0, 2.0]))
            .unwrap();
        let theme = Theme::grey();
        let warnings = WarningLog::new();
        let cmds = Geom::point().draw(&data, &ctx(&theme, &warnings)).unwrap();
        assert_eq!(cmds.len(), 1);
        assert!(warnings.contains("geom_point: removed rows containing missing values"));
    }

    #[test]
    fn test_draw_line_sorts_by_x() {
        let data = Table::from_xy(&[3.0, 1.0, 2.0], &[0.0, 1.0, 2.0]);
        let theme = Theme::grey();
        let warnings = WarningLog::new();
        let cmds = Geom::line().draw(&data, &ctx(&theme, &warnings)).unwrap();
        let DrawCommand::Polyline { points, .. } = &cmds[0] else { panic!("expected polyline") };
        let xs: Vec<f32> = points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_draw_hline_spans_range() {
        let data = Table::new().with_column("yintercept", Column::continuous([0.5])).unwrap();
        let theme = Theme::grey();
        let warnings = WarningLog::new();
        let cmds = Geom::hline(0.5).color(Rgba::RED).draw(&data, &ctx(&theme, &warnings)).unwrap();
        assert_eq!(cmds.len(), 1);
        match &cmds[0] {
            DrawCommand::HorizontalSpan { y, x0, x1, style } => {
                assert_relative_eq!(*y, 0.5);
                assert_relative_eq!(*x0, 0.0);
                assert_relative_eq!(*x1, 10.0);
                assert_eq!(style.color, Rgba::RED);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_style_falls_back_to_theme() {
        let data = Table::from_xy(&[1.0], &[1.0]).with_column("color", Column::discrete(["#0000ff"])).unwrap();
        let theme = Theme::grey();
        let warnings = WarningLog::new();
        let cmds = Geom::point().draw(&data, &ctx(&theme, &warnings)).unwrap();
        let style = cmds[0].style();
        assert_eq!(style.color, Rgba::BLUE);
        assert_eq!(style.fill, theme.geom_fill);
        assert_relative_eq!(style.alpha, 1.0);
    }

    #[test]
    fn test_invalid_color_is_an_error() {
        let data = Table::from_xy(&[1.0], &[1.0]);
        let theme = Theme::grey();
        let warnings = WarningLog::new();
        let result = Geom::point().set("color", "not-a-color").draw(&data, &ctx(&theme, &warnings));
        assert!(matches!(result, Err(Error::InvalidColor(_))));
    }

    #[test]
    fn test_color_setting_used_when_column_absent() {
        let data = Table::from_xy(&[1.0, 2.0], &[1.0, 2.0]);
        let theme = Theme::grey();
        let warnings = WarningLog::new();
        let cmds = Geom::point().color(Rgba::RED).fill(Rgba::BLUE).draw(&data, &ctx(&theme, &warnings)).unwrap();
        assert_eq!(cmds.len(), 2);
        for cmd in &cmds {
            assert_eq!(cmd.style().color, Rgba::RED);
            assert_eq!(cmd.style().fill, Rgba::BLUE);
        }
    }
}

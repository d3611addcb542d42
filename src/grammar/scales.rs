//! Trained scales.
//!
//! A [`Scale`] tracks the domain an aesthetic has seen (continuous min/max
//! or discrete levels) and maps data values into drawable values. Its
//! [`ScaleKind`] is one of four closed variants; position scales differ in
//! that they pass positions through instead of applying a palette.
//!
//! Training only ever widens a scale. A build trains every layer and every
//! panel before anything is mapped.

use crate::color::{hue_palette, Rgba};
use crate::error::{Error, Result};
use crate::scale::{ColorScale, ContinuousMap};

use super::data::{Column, ColumnKind, DataValue, OrdValue, Table};
use super::warnings::WarningLog;

/// Aesthetics served by an x position scale.
pub const X_AESTHETICS: &[&str] = &["x", "xmin", "xmax", "xend", "xintercept"];

/// Aesthetics served by a y position scale.
pub const Y_AESTHETICS: &[&str] = &["y", "ymin", "ymax", "yend", "yintercept"];

/// Non-position aesthetics that get a scale.
pub const NON_POSITION_SCALED: &[&str] = &["color", "fill", "size", "shape", "alpha", "linetype"];

/// Point shapes cycled through by discrete shape scales.
pub const SHAPES: &[&str] = &["circle", "triangle", "square", "diamond", "cross", "x"];

/// Line styles cycled through by discrete linetype scales.
pub const LINETYPES: &[&str] = &["solid", "dashed", "dotted", "dashdot", "longdash"];

/// Whether `aesthetic` is an x or y position aesthetic.
#[must_use]
pub fn is_position_aesthetic(aesthetic: &str) -> bool {
    X_AESTHETICS.contains(&aesthetic) || Y_AESTHETICS.contains(&aesthetic)
}

/// Whether `aesthetic` is mapped through a scale at all.
#[must_use]
pub fn is_scaled_aesthetic(aesthetic: &str) -> bool {
    is_position_aesthetic(aesthetic) || NON_POSITION_SCALED.contains(&aesthetic)
}

/// Min and max of the finite values, or `None` when there are none.
pub(crate) fn extent(values: Vec<f32>) -> Option<(f32, f32)> {
    if values.is_empty() {
        return None;
    }
    let vec = trueno::Vector::from_vec(values);
    match (vec.min(), vec.max()) {
        (Ok(lo), Ok(hi)) => Some((lo, hi)),
        _ => None,
    }
}

fn union(a: Option<(f32, f32)>, b: Option<(f32, f32)>) -> Option<(f32, f32)> {
    match (a, b) {
        (Some((a0, a1)), Some((b0, b1))) => Some((a0.min(b0), a1.max(b1))),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Position of `v` in `[lo, hi]` as a fraction; the middle for a
/// zero-width domain.
fn rescale(v: f32, lo: f32, hi: f32) -> f32 {
    if (hi - lo).abs() < f32::EPSILON {
        0.5
    } else {
        (v - lo) / (hi - lo)
    }
}

/// Continuous transformation applied before training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trans {
    /// No transformation.
    #[default]
    Identity,
    /// Base-10 logarithm (positive values only).
    Log10,
    /// Square root (non-negative values only).
    Sqrt,
    /// Negation.
    Reverse,
}

impl Trans {
    /// Transform one value; `None` outside the domain.
    #[must_use]
    pub fn apply(self, v: f32) -> Option<f32> {
        match self {
            Trans::Identity => Some(v),
            Trans::Log10 => (v > 0.0).then(|| v.log10()),
            Trans::Sqrt => (v >= 0.0).then(|| v.sqrt()),
            Trans::Reverse => Some(-v),
        }
    }

    /// Inverse of [`Trans::apply`].
    #[must_use]
    pub fn inverse(self, v: f32) -> f32 {
        match self {
            Trans::Identity => v,
            Trans::Log10 => 10f32.powf(v),
            Trans::Sqrt => v * v,
            Trans::Reverse => -v,
        }
    }

    /// Name used in warnings.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Trans::Identity => "identity",
            Trans::Log10 => "log10",
            Trans::Sqrt => "sqrt",
            Trans::Reverse => "reverse",
        }
    }
}

/// What happens to values outside explicit limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Oob {
    /// Replace with a missing value.
    #[default]
    Censor,
    /// Clamp to the nearest limit.
    Squish,
}

/// Padding added around a trained range: `lo - width * mult.0 - add.0`
/// to `hi + width * mult.1 + add.1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Expansion {
    /// Multiplicative padding (low side, high side).
    pub mult: (f32, f32),
    /// Additive padding in data units (low side, high side).
    pub add: (f32, f32),
}

impl Expansion {
    /// Symmetric expansion.
    #[must_use]
    pub const fn new(mult: f32, add: f32) -> Self {
        Self { mult: (mult, mult), add: (add, add) }
    }

    /// Default for continuous scales: 5% of the range on each side.
    #[must_use]
    pub const fn continuous() -> Self {
        Self::new(0.05, 0.0)
    }

    /// Default for discrete scales: 0.6 units on each side.
    #[must_use]
    pub const fn discrete() -> Self {
        Self::new(0.0, 0.6)
    }

    /// No expansion.
    #[must_use]
    pub const fn none() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Expand `(lo, hi)`. A zero-width range is first widened to width
    /// one around its value.
    #[must_use]
    pub fn expand(&self, (lo, hi): (f32, f32)) -> (f32, f32) {
        let (lo, hi) = if (hi - lo).abs() < f32::EPSILON { (lo - 0.5, hi + 0.5) } else { (lo, hi) };
        let width = hi - lo;
        (lo - width * self.mult.0 - self.add.0, hi + width * self.mult.1 + self.add.1)
    }
}

/// Explicit or trained limits.
#[derive(Debug, Clone, PartialEq)]
pub enum Limits {
    /// Continuous `(min, max)`.
    Continuous(f32, f32),
    /// Ordered discrete levels.
    Discrete(Vec<DataValue>),
}

/// The four scale variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleKind {
    /// Non-position continuous scale (gradient, size range, ...).
    Continuous,
    /// Non-position discrete scale (hue palette, shape cycle, ...).
    Discrete,
    /// Continuous x or y axis.
    PositionContinuous,
    /// Categorical x or y axis; can also hold a continuous range.
    PositionDiscrete,
}

impl ScaleKind {
    /// Whether the scale is an axis.
    #[must_use]
    pub fn is_position(self) -> bool {
        matches!(self, ScaleKind::PositionContinuous | ScaleKind::PositionDiscrete)
    }

    /// Whether the primary range is a set of levels.
    #[must_use]
    pub fn is_discrete(self) -> bool {
        matches!(self, ScaleKind::Discrete | ScaleKind::PositionDiscrete)
    }
}

/// Output palette of a non-position scale.
#[derive(Debug, Clone, PartialEq)]
pub enum Palette {
    /// Evenly spaced hues, one per level.
    Hue,
    /// Two-color gradient for continuous data.
    Gradient {
        /// Color at the low end.
        low: Rgba,
        /// Color at the high end.
        high: Rgba,
    },
    /// Numeric output range.
    Range(f32, f32),
    /// Names cycled through level by level.
    Cycle(Vec<String>),
    /// Explicit values, one per level (cycled if short).
    Manual(Vec<DataValue>),
}

impl Palette {
    /// Default palette for an aesthetic and scale kind.
    #[must_use]
    pub fn default_for(aesthetic: &str, kind: ScaleKind) -> Option<Self> {
        let discrete = kind.is_discrete();
        match aesthetic {
            "color" | "fill" if discrete => Some(Palette::Hue),
            "color" | "fill" => Some(Palette::Gradient {
                low: Rgba::rgb(0x13, 0x2B, 0x43),
                high: Rgba::rgb(0x56, 0xB1, 0xF7),
            }),
            "size" => Some(Palette::Range(1.0, 6.0)),
            "alpha" => Some(Palette::Range(0.1, 1.0)),
            "shape" => Some(Palette::Cycle(SHAPES.iter().map(ToString::to_string).collect())),
            "linetype" => Some(Palette::Cycle(LINETYPES.iter().map(ToString::to_string).collect())),
            _ => None,
        }
    }
}

/// A trained scale for one aesthetic (or one family of position
/// aesthetics).
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    aesthetics: Vec<String>,
    kind: ScaleKind,
    range: Option<(f32, f32)>,
    levels: Vec<DataValue>,
    range_c: Option<(f32, f32)>,
    limits: Option<Limits>,
    expand: Option<Expansion>,
    trans: Trans,
    oob: Oob,
    palette: Option<Palette>,
}

impl Scale {
    fn with_kind(aesthetics: &[&str], kind: ScaleKind) -> Self {
        let primary = aesthetics.first().copied().unwrap_or_default();
        Self {
            aesthetics: aesthetics.iter().map(ToString::to_string).collect(),
            kind,
            range: None,
            levels: Vec::new(),
            range_c: None,
            limits: None,
            expand: None,
            trans: Trans::Identity,
            oob: Oob::Censor,
            palette: Palette::default_for(primary, kind),
        }
    }

    /// Continuous x axis.
    #[must_use]
    pub fn x_continuous() -> Self {
        Self::with_kind(X_AESTHETICS, ScaleKind::PositionContinuous)
    }

    /// Continuous y axis.
    #[must_use]
    pub fn y_continuous() -> Self {
        Self::with_kind(Y_AESTHETICS, ScaleKind::PositionContinuous)
    }

    /// Categorical x axis.
    #[must_use]
    pub fn x_discrete() -> Self {
        Self::with_kind(X_AESTHETICS, ScaleKind::PositionDiscrete)
    }

    /// Categorical y axis.
    #[must_use]
    pub fn y_discrete() -> Self {
        Self::with_kind(Y_AESTHETICS, ScaleKind::PositionDiscrete)
    }

    /// Continuous non-position scale for `aesthetic`.
    #[must_use]
    pub fn continuous(aesthetic: &str) -> Self {
        Self::with_kind(&[aesthetic], ScaleKind::Continuous)
    }

    /// Discrete non-position scale for `aesthetic`.
    #[must_use]
    pub fn discrete(aesthetic: &str) -> Self {
        Self::with_kind(&[aesthetic], ScaleKind::Discrete)
    }

    /// Continuous color (or fill) gradient between two colors.
    #[must_use]
    pub fn gradient(aesthetic: &str, low: Rgba, high: Rgba) -> Self {
        Self::continuous(aesthetic).palette(Palette::Gradient { low, high })
    }

    /// Discrete scale with explicit output values.
    #[must_use]
    pub fn manual(aesthetic: &str, values: Vec<DataValue>) -> Self {
        Self::discrete(aesthetic).palette(Palette::Manual(values))
    }

    /// Default scale for `aesthetic` when first trained on `column`:
    /// discrete for discrete columns, continuous otherwise.
    #[must_use]
    pub fn default_for(aesthetic: &str, column: &Column) -> Self {
        let discrete = column.kind().is_discrete();
        if X_AESTHETICS.contains(&aesthetic) {
            if discrete { Self::x_discrete() } else { Self::x_continuous() }
        } else if Y_AESTHETICS.contains(&aesthetic) {
            if discrete { Self::y_discrete() } else { Self::y_continuous() }
        } else if discrete {
            Self::discrete(aesthetic)
        } else {
            Self::continuous(aesthetic)
        }
    }

    /// Set explicit continuous limits.
    #[must_use]
    pub fn limits(mut self, min: f32, max: f32) -> Self {
        self.limits = Some(Limits::Continuous(min.min(max), min.max(max)));
        self
    }

    /// Set explicit discrete limits (level order).
    #[must_use]
    pub fn limits_discrete<V: Into<DataValue>>(mut self, levels: impl IntoIterator<Item = V>) -> Self {
        self.limits = Some(Limits::Discrete(levels.into_iter().map(Into::into).collect()));
        self
    }

    /// Set the expansion used by [`Scale::coord_range`].
    #[must_use]
    pub fn expand(mut self, expand: Expansion) -> Self {
        self.expand = Some(expand);
        self
    }

    /// Set the continuous transformation.
    #[must_use]
    pub fn trans(mut self, trans: Trans) -> Self {
        self.trans = trans;
        self
    }

    /// Set the out-of-bounds policy.
    #[must_use]
    pub fn oob(mut self, oob: Oob) -> Self {
        self.oob = oob;
        self
    }

    /// Set the output palette.
    #[must_use]
    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    /// Aesthetics this scale serves.
    #[must_use]
    pub fn aesthetics(&self) -> &[String] {
        &self.aesthetics
    }

    /// First served aesthetic (`x`, `y`, `color`, ...).
    #[must_use]
    pub fn primary(&self) -> &str {
        self.aesthetics.first().map_or("", String::as_str)
    }

    /// Whether this scale serves `aesthetic`.
    #[must_use]
    pub fn serves(&self, aesthetic: &str) -> bool {
        self.aesthetics.iter().any(|a| a == aesthetic)
    }

    /// Scale variant.
    #[must_use]
    pub fn kind(&self) -> ScaleKind {
        self.kind
    }

    /// Continuous transformation.
    #[must_use]
    pub fn transformation(&self) -> Trans {
        self.trans
    }

    /// Trained continuous range (for discrete position scales, `range_c`).
    #[must_use]
    pub fn continuous_range(&self) -> Option<(f32, f32)> {
        match self.kind {
            ScaleKind::PositionDiscrete => self.range_c,
            _ => self.range,
        }
    }

    /// Trained discrete levels.
    #[must_use]
    pub fn levels(&self) -> &[DataValue] {
        &self.levels
    }

    /// Whether nothing has been trained and no limits are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range.is_none() && self.levels.is_empty() && self.range_c.is_none() && self.limits.is_none()
    }

    /// A copy with the same configuration and no trained range.
    #[must_use]
    pub fn clone_untrained(&self) -> Self {
        Self { range: None, levels: Vec::new(), range_c: None, ..self.clone() }
    }

    /// Widen the trained range with `column`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScaleDomain`] for discrete data on a continuous
    /// scale, or continuous data on a non-position discrete scale.
    pub fn train(&mut self, column: &Column) -> Result<()> {
        let discrete = column.kind().is_discrete();
        match (self.kind, discrete) {
            (ScaleKind::Continuous | ScaleKind::PositionContinuous, true) => {
                Err(Error::ScaleDomain(format!(
                    "Discrete value supplied to continuous scale `{}`",
                    self.primary()
                )))
            }
            (ScaleKind::Discrete, false) => Err(Error::ScaleDomain(format!(
                "Continuous value supplied to discrete scale `{}`",
                self.primary()
            ))),
            (ScaleKind::PositionDiscrete, false) => {
                self.range_c = union(self.range_c, extent(column.finite_numbers()));
                Ok(())
            }
            (ScaleKind::Continuous | ScaleKind::PositionContinuous, false) => {
                self.range = union(self.range, extent(column.finite_numbers()));
                Ok(())
            }
            (ScaleKind::Discrete | ScaleKind::PositionDiscrete, true) => {
                self.train_levels(column);
                Ok(())
            }
        }
    }

    fn train_levels(&mut self, column: &Column) {
        for level in column.levels() {
            if !self.levels.contains(&level) {
                self.levels.push(level);
            }
        }
        if column.kind() != ColumnKind::Ordinal {
            self.levels.sort_by(DataValue::total_cmp);
        }
    }

    /// Effective limits: explicit ones, else the trained range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvedScale`] when nothing was trained and no
    /// limits were set.
    pub fn get_limits(&self) -> Result<Limits> {
        if let Some(limits) = &self.limits {
            return Ok(limits.clone());
        }
        let unresolved = || Error::UnresolvedScale { aesthetic: self.primary().to_string() };
        match self.kind {
            ScaleKind::Continuous | ScaleKind::PositionContinuous => {
                self.range.map(|(lo, hi)| Limits::Continuous(lo, hi)).ok_or_else(unresolved)
            }
            ScaleKind::Discrete => {
                if self.levels.is_empty() {
                    Err(unresolved())
                } else {
                    Ok(Limits::Discrete(self.levels.clone()))
                }
            }
            ScaleKind::PositionDiscrete => {
                if !self.levels.is_empty() {
                    Ok(Limits::Discrete(self.levels.clone()))
                } else if let Some((lo, hi)) = self.range_c {
                    let lo = lo.floor() as i32;
                    let hi = hi.ceil() as i32;
                    Ok(Limits::Discrete((lo..=hi).map(DataValue::from).collect()))
                } else {
                    Err(unresolved())
                }
            }
        }
    }

    /// Continuous extent of the scale in data units: the limits for
    /// continuous scales, `1..=n` (merged with `range_c`) for discrete
    /// position scales.
    pub fn dimension(&self) -> Result<(f32, f32)> {
        match self.get_limits()? {
            Limits::Continuous(lo, hi) => Ok((lo, hi)),
            Limits::Discrete(levels) => {
                let codes = (!self.levels.is_empty() || matches!(self.limits, Some(Limits::Discrete(_))))
                    .then_some((1.0, levels.len().max(1) as f32));
                union(codes, self.range_c).ok_or_else(|| Error::UnresolvedScale {
                    aesthetic: self.primary().to_string(),
                })
            }
        }
    }

    /// Axis extent for drawing: explicit continuous limits as given,
    /// otherwise the expanded dimension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvedScale`] before training without limits.
    pub fn coord_range(&self) -> Result<(f32, f32)> {
        if let Some(Limits::Continuous(lo, hi)) = self.limits {
            return Ok((lo, hi));
        }
        let expand = self.expand.unwrap_or(if self.kind.is_discrete() {
            Expansion::discrete()
        } else {
            Expansion::continuous()
        });
        Ok(expand.expand(self.dimension()?))
    }

    /// Apply the scale transformation to a continuous column. Values
    /// outside the transformation's domain become missing.
    pub fn transform(&self, column: &Column, warnings: &WarningLog) -> Column {
        if self.trans == Trans::Identity || column.kind().is_discrete() {
            return column.clone();
        }
        let mut dropped = false;
        let values = column
            .values()
            .iter()
            .map(|v| match v.as_f32() {
                Some(n) => self.trans.apply(n).map_or_else(
                    || {
                        dropped = true;
                        DataValue::Null
                    },
                    DataValue::Number,
                ),
                None => DataValue::Null,
            })
            .collect();
        if dropped {
            warnings.warn_once(format!(
                "{} transformation introduced missing values in `{}`",
                self.trans.name(),
                self.primary()
            ));
        }
        Column::with_kind(ColumnKind::Continuous, values)
    }

    /// Map a column through the scale.
    ///
    /// Position scales return numbers: discrete values become 1-based codes
    /// and continuous values get the out-of-bounds policy. Other scales
    /// return palette output (hex colors, sizes, shape names).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvedScale`] when the scale has no limits, and
    /// [`Error::ScaleDomain`] for continuous data on a cycle palette.
    pub fn map(&self, column: &Column, warnings: &WarningLog) -> Result<Column> {
        if column.is_empty() {
            return Ok(column.clone());
        }
        match self.kind {
            ScaleKind::PositionContinuous => Ok(self.censor(column)),
            ScaleKind::PositionDiscrete => {
                if !column.kind().is_discrete() {
                    return Ok(column.clone());
                }
                let limits = self.discrete_limits()?;
                Ok(Column::continuous_opt(
                    self.codes(column, &limits, warnings).into_iter().map(|c| c.map(|c| c as f32 + 1.0)),
                ))
            }
            ScaleKind::Discrete => self.map_discrete(column, warnings),
            ScaleKind::Continuous => self.map_continuous(column),
        }
    }

    fn discrete_limits(&self) -> Result<Vec<DataValue>> {
        match self.get_limits()? {
            Limits::Discrete(levels) => Ok(levels),
            Limits::Continuous(..) => Err(Error::ScaleDomain(format!(
                "Continuous limits on discrete scale `{}`",
                self.primary()
            ))),
        }
    }

    /// 0-based index of each value in `limits`.
    fn codes(&self, column: &Column, limits: &[DataValue], warnings: &WarningLog) -> Vec<Option<usize>> {
        let index: std::collections::BTreeMap<OrdValue, usize> =
            limits.iter().enumerate().map(|(i, v)| (OrdValue(v.clone()), i)).collect();
        column
            .values()
            .iter()
            .map(|v| {
                if v.is_null() {
                    return None;
                }
                let code = index.get(&OrdValue(v.clone())).copied();
                if code.is_none() {
                    warnings.warn_once(format!(
                        "Value `{v}` is not in the limits of scale `{}` and was removed",
                        self.primary()
                    ));
                }
                code
            })
            .collect()
    }

    fn censor(&self, column: &Column) -> Column {
        let Some(Limits::Continuous(lo, hi)) = self.limits else {
            return column.clone();
        };
        let values = column.values().iter().map(|v| match v.as_f32() {
            Some(n) if n < lo || n > hi => match self.oob {
                Oob::Censor => DataValue::Null,
                Oob::Squish => DataValue::Number(n.clamp(lo, hi)),
            },
            Some(n) => DataValue::Number(n),
            None => DataValue::Null,
        });
        Column::with_kind(ColumnKind::Continuous, values.collect())
    }

    fn map_discrete(&self, column: &Column, warnings: &WarningLog) -> Result<Column> {
        let limits = self.discrete_limits()?;
        let codes = self.codes(column, &limits, warnings);
        let n = limits.len();
        let outputs: Vec<DataValue> = match &self.palette {
            Some(Palette::Hue) => hue_palette(n).into_iter().map(|c| c.to_hex().into()).collect(),
            Some(Palette::Range(lo, hi)) => (0..n)
                .map(|i| {
                    let t = if n > 1 { i as f32 / (n - 1) as f32 } else { 0.5 };
                    DataValue::Number(lo + t * (hi - lo))
                })
                .collect(),
            Some(Palette::Cycle(names)) if !names.is_empty() => {
                (0..n).map(|i| DataValue::Text(names[i % names.len()].clone())).collect()
            }
            Some(Palette::Manual(values)) if !values.is_empty() => {
                (0..n).map(|i| values[i % values.len()].clone()).collect()
            }
            Some(Palette::Gradient { low, high }) => (0..n)
                .map(|i| {
                    let t = if n > 1 { i as f32 / (n - 1) as f32 } else { 0.5 };
                    low.lerp(*high, t).to_hex().into()
                })
                .collect(),
            _ => limits.clone(),
        };
        let values = codes.into_iter().map(|c| c.and_then(|c| outputs.get(c).cloned()).unwrap_or(DataValue::Null));
        Ok(Column::from_values(values.collect()))
    }

    fn map_continuous(&self, column: &Column) -> Result<Column> {
        let Limits::Continuous(lo, hi) = self.get_limits()? else {
            return Err(Error::ScaleDomain(format!(
                "Discrete limits on continuous scale `{}`",
                self.primary()
            )));
        };
        let censored = self.censor(column);
        let values: Vec<DataValue> = match &self.palette {
            Some(Palette::Gradient { low, high }) => {
                let gradient = ColorScale::gradient(*low, *high, (0.0, 1.0))?;
                censored
                    .values()
                    .iter()
                    .map(|v| v.as_f32().map_or(DataValue::Null, |n| gradient.map(rescale(n, lo, hi)).to_hex().into()))
                    .collect()
            }
            Some(Palette::Range(out_lo, out_hi)) => censored
                .values()
                .iter()
                .map(|v| {
                    v.as_f32().map_or(DataValue::Null, |n| {
                        DataValue::Number(out_lo + rescale(n, lo, hi) * (out_hi - out_lo))
                    })
                })
                .collect(),
            Some(Palette::Cycle(_) | Palette::Manual(_)) => {
                return Err(Error::ScaleDomain(format!(
                    "A continuous variable can not be mapped to `{}`",
                    self.primary()
                )));
            }
            Some(Palette::Hue) | None => censored.values().to_vec(),
        };
        Ok(Column::from_values(values))
    }
}

/// The scales of one plot, looked up by aesthetic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScaleSet {
    scales: Vec<Scale>,
}

impl ScaleSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scale, replacing any scale that serves the same primary
    /// aesthetic.
    pub fn add(&mut self, scale: Scale) {
        match self.scales.iter_mut().find(|s| s.serves(scale.primary())) {
            Some(slot) => *slot = scale,
            None => self.scales.push(scale),
        }
    }

    /// Scale serving `aesthetic`.
    #[must_use]
    pub fn get(&self, aesthetic: &str) -> Option<&Scale> {
        self.scales.iter().find(|s| s.serves(aesthetic))
    }

    /// Mutable scale serving `aesthetic`.
    pub fn get_mut(&mut self, aesthetic: &str) -> Option<&mut Scale> {
        self.scales.iter_mut().find(|s| s.serves(aesthetic))
    }

    /// Whether some scale serves `aesthetic`.
    #[must_use]
    pub fn has(&self, aesthetic: &str) -> bool {
        self.get(aesthetic).is_some()
    }

    /// The x scale.
    #[must_use]
    pub fn x(&self) -> Option<&Scale> {
        self.get("x")
    }

    /// The y scale.
    #[must_use]
    pub fn y(&self) -> Option<&Scale> {
        self.get("y")
    }

    /// All scales in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Scale> {
        self.scales.iter()
    }

    /// Number of scales.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scales.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }

    /// Create default scales for scaled aesthetics in `data` that have
    /// none, choosing discrete or continuous from the column kind.
    pub fn add_defaults(&mut self, data: &Table) {
        for (name, column) in data.iter() {
            if is_scaled_aesthetic(name) && !self.has(name) {
                tracing::trace!(aesthetic = name, kind = ?column.kind(), "adding default scale");
                self.add(Scale::default_for(name, column));
            }
        }
    }

    /// Create continuous position scales for any of `aesthetics` that has
    /// none.
    pub fn add_missing(&mut self, aesthetics: &[&str]) {
        for &aesthetic in aesthetics {
            if self.has(aesthetic) {
                continue;
            }
            if X_AESTHETICS.contains(&aesthetic) {
                self.add(Scale::x_continuous());
            } else if Y_AESTHETICS.contains(&aesthetic) {
                self.add(Scale::y_continuous());
            }
        }
    }

    /// Apply each continuous scale's transformation to its columns.
    pub fn transform_df(&self, mut data: Table, warnings: &WarningLog) -> Result<Table> {
        let names: Vec<String> = data.column_names().map(ToString::to_string).collect();
        for name in names {
            let (Some(scale), Some(column)) = (self.get(&name), data.get(&name)) else {
                continue;
            };
            let transformed = scale.transform(column, warnings);
            data.insert(&name, transformed)?;
        }
        Ok(data)
    }

    /// Train the non-position scales on `data`.
    pub fn train_non_position(&mut self, data: &Table) -> Result<()> {
        for (name, column) in data.iter() {
            if is_position_aesthetic(name) {
                continue;
            }
            if let Some(scale) = self.get_mut(name) {
                scale.train(column)?;
            }
        }
        Ok(())
    }

    /// Replace every non-position scaled column with its palette output.
    pub fn map_non_position(&self, mut data: Table, warnings: &WarningLog) -> Result<Table> {
        let names: Vec<String> = data
            .column_names()
            .filter(|n| !is_position_aesthetic(n))
            .map(ToString::to_string)
            .collect();
        for name in names {
            let (Some(scale), Some(column)) = (self.get(&name), data.get(&name)) else {
                continue;
            };
            let mapped = scale.map(column, warnings)?;
            data.insert(&name, mapped)?;
        }
        Ok(data)
    }
}

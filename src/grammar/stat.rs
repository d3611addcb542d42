//! Statistical transformations for Grammar of Graphics.
//!
//! A stat runs once per (PANEL, group) partition of a layer's data. The
//! built-in stats are variants of [`Stat`]; anything else plugs in through
//! [`StatTransform`].

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

use super::aes::Aes;
use super::data::{Column, Table};
use super::panel::Panel;
use super::scales::{Scale, ScaleKind};
use super::warnings::WarningLog;

/// Default number of bins when neither `bins` nor `binwidth` is given.
pub const DEFAULT_BINS: usize = 30;

/// Largest number of bins a single bin stat will allocate.
pub const MAX_BINS: usize = 100_000;

/// What a stat can see besides its partition of the data.
#[derive(Debug, Clone, Copy)]
pub struct StatContext<'a> {
    /// Trained x scale of the partition's panel.
    pub x: Option<&'a Scale>,
    /// Trained y scale of the partition's panel.
    pub y: Option<&'a Scale>,
    /// Warning sink.
    pub warnings: &'a WarningLog,
}

/// A user-defined statistical transformation.
pub trait StatTransform: Send + Sync + fmt::Debug {
    /// Name used in errors (e.g. `stat_summary`).
    fn name(&self) -> &str;

    /// Aesthetics that must be present as columns or parameters.
    fn required_aes(&self) -> Vec<String> {
        Vec::new()
    }

    /// Parameters the stat was configured with.
    fn params(&self) -> Vec<String> {
        Vec::new()
    }

    /// Mappings applied unless the layer maps the aesthetic itself.
    fn default_aes(&self) -> Aes {
        Aes::new()
    }

    /// Whether computed aesthetics go back through their scale's
    /// transformation.
    fn retransform(&self) -> bool {
        true
    }

    /// Transform one non-empty (PANEL, group) partition.
    fn compute_group(&self, data: &Table, ctx: &StatContext<'_>) -> Result<Table>;
}

/// Statistical transformation type.
#[derive(Debug, Clone, Default)]
pub enum Stat {
    /// No transformation (identity).
    #[default]
    Identity,
    /// Count rows (or sum `weight`) at each distinct x.
    Count,
    /// Bin continuous x.
    Bin {
        /// Number of bins.
        bins: Option<usize>,
        /// Width of each bin; wins over `bins`.
        binwidth: Option<f32>,
    },
    /// Sum y at each distinct x.
    Sum,
    /// Mean of y at each distinct x.
    Mean,
    /// Weighted mean of y at each distinct x.
    WeightedMean,
    /// Horizontal reference line.
    Hline {
        /// Intercept parameter; overrides any mapped `yintercept`.
        yintercept: Option<f32>,
    },
    /// Vertical reference line.
    Vline {
        /// Intercept parameter; overrides any mapped `xintercept`.
        xintercept: Option<f32>,
    },
    /// User-defined stat.
    Custom(Arc<dyn StatTransform>),
}

impl Stat {
    /// Create an identity stat (no transformation).
    #[must_use]
    pub fn identity() -> Self {
        Stat::Identity
    }

    /// Create a count stat.
    #[must_use]
    pub fn count() -> Self {
        Stat::Count
    }

    /// Create a binning stat with a number of bins.
    #[must_use]
    pub fn bin(bins: usize) -> Self {
        Stat::Bin { bins: Some(bins.max(1)), binwidth: None }
    }

    /// Create a binning stat with a fixed bin width.
    #[must_use]
    pub fn bin_width(binwidth: f32) -> Self {
        Stat::Bin { bins: None, binwidth: Some(binwidth) }
    }

    /// Create a sum stat.
    #[must_use]
    pub fn sum() -> Self {
        Stat::Sum
    }

    /// Create a mean stat.
    #[must_use]
    pub fn mean() -> Self {
        Stat::Mean
    }

    /// Create a weighted mean stat.
    #[must_use]
    pub fn weighted_mean() -> Self {
        Stat::WeightedMean
    }

    /// Wrap a user-defined transformation.
    pub fn custom(transform: impl StatTransform + 'static) -> Self {
        Stat::Custom(Arc::new(transform))
    }

    /// Name used in errors and warnings.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Stat::Identity => "stat_identity",
            Stat::Count => "stat_count",
            Stat::Bin { .. } => "stat_bin",
            Stat::Sum => "stat_sum",
            Stat::Mean => "stat_mean",
            Stat::WeightedMean => "stat_weighted_mean",
            Stat::Hline { .. } => "stat_hline",
            Stat::Vline { .. } => "stat_vline",
            Stat::Custom(t) => t.name(),
        }
    }

    /// Aesthetics the stat needs.
    #[must_use]
    pub fn required_aes(&self) -> Vec<String> {
        let names: &[&str] = match self {
            Stat::Identity => &[],
            Stat::Count | Stat::Bin { .. } => &["x"],
            Stat::Sum | Stat::Mean => &["x", "y"],
            Stat::WeightedMean => &["x", "y", "weight"],
            Stat::Hline { .. } => &["yintercept"],
            Stat::Vline { .. } => &["xintercept"],
            Stat::Custom(t) => return t.required_aes(),
        };
        names.iter().map(ToString::to_string).collect()
    }

    /// Names of the parameters that are set.
    #[must_use]
    pub fn params(&self) -> Vec<String> {
        match self {
            Stat::Hline { yintercept: Some(_) } => vec!["yintercept".into()],
            Stat::Vline { xintercept: Some(_) } => vec!["xintercept".into()],
            Stat::Bin { bins, binwidth } => {
                let mut out = Vec::new();
                if bins.is_some() {
                    out.push("bins".into());
                }
                if binwidth.is_some() {
                    out.push("binwidth".into());
                }
                out
            }
            Stat::Custom(t) => t.params(),
            _ => Vec::new(),
        }
    }

    /// Computed mappings the stat contributes by default.
    #[must_use]
    pub fn default_aes(&self) -> Aes {
        match self {
            Stat::Count | Stat::Bin { .. } => Aes::new().computed("y", "count"),
            Stat::Custom(t) => t.default_aes(),
            _ => Aes::new(),
        }
    }

    /// Whether computed aesthetics are re-passed through scale
    /// transformations.
    #[must_use]
    pub fn retransform(&self) -> bool {
        match self {
            Stat::Custom(t) => t.retransform(),
            _ => true,
        }
    }

    /// Fail with [`Error::MissingAesthetic`] unless every required
    /// aesthetic is a column of `data` or a parameter.
    pub fn check_required_aesthetics(&self, data: &Table) -> Result<()> {
        let params = self.params();
        let mut missing: Vec<String> = self
            .required_aes()
            .into_iter()
            .filter(|aes| !data.has_column(aes) && !params.contains(aes))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort();
        Err(Error::MissingAesthetic { stat: self.name().to_string(), missing })
    }

    /// Run the stat over a whole layer: check requirements, then compute
    /// each (PANEL, group) partition and stack the results.
    ///
    /// Empty input returns an empty table without checking or computing
    /// anything.
    pub fn compute_layer(&self, data: &Table, panel: &Panel, warnings: &WarningLog) -> Result<Table> {
        if data.is_empty() {
            return Ok(Table::new());
        }
        self.check_required_aesthetics(data)?;
        if matches!(self, Stat::Identity) {
            return Ok(data.clone());
        }

        let mut parts = Vec::new();
        for rows in data.partition(&["PANEL", "group"]) {
            let part = data.take(&rows);
            let (x, y) = part
                .get("PANEL")
                .and_then(|c| c.get(0))
                .map_or((None, None), |id| panel.scales_for(id));
            let ctx = StatContext { x, y, warnings };
            let computed = self.compute_group(&part, &ctx)?;
            parts.push(carry_constant_columns(&part, computed)?);
        }
        Ok(Table::concat(&parts))
    }

    /// Transform one (PANEL, group) partition.
    pub fn compute_group(&self, data: &Table, ctx: &StatContext<'_>) -> Result<Table> {
        match self {
            Stat::Identity => Ok(data.clone()),
            Stat::Count => count(data),
            Stat::Bin { bins, binwidth } => self.bin_group(data, *bins, *binwidth, ctx),
            Stat::Sum => summarise(data, |ys| ys.iter().sum()),
            Stat::Mean => summarise(data, mean),
            Stat::WeightedMean => weighted_mean(data),
            Stat::Hline { yintercept } => intercept(data, "yintercept", *yintercept),
            Stat::Vline { xintercept } => intercept(data, "xintercept", *xintercept),
            Stat::Custom(t) => t.compute_group(data, ctx),
        }
    }

    fn bin_group(
        &self,
        data: &Table,
        bins: Option<usize>,
        binwidth: Option<f32>,
        ctx: &StatContext<'_>,
    ) -> Result<Table> {
        let x = data.column("x")?;
        let discrete_axis = ctx.x.is_some_and(|s| s.kind() == ScaleKind::PositionDiscrete);
        if x.kind().is_discrete() || discrete_axis {
            return Err(Error::Stat {
                stat: self.name().to_string(),
                message: "requires a continuous x variable".to_string(),
            });
        }

        let values = x.finite_numbers();
        let range = ctx
            .x
            .and_then(Scale::continuous_range)
            .or_else(|| super::scales::extent(values.clone()));
        let Some((lo, hi)) = range else {
            return Ok(Table::new());
        };

        let binwidth = binwidth.filter(|w| w.is_finite() && *w > 0.0);
        let (start, width, n) = if hi - lo < f32::EPSILON {
            let w = binwidth.unwrap_or(1.0);
            (lo - w / 2.0, w, 1)
        } else if let Some(w) = binwidth {
            let n = ((hi - lo) / w).ceil().max(1.0);
            if n > MAX_BINS as f32 {
                return Err(self.too_many_bins(n));
            }
            (lo, w, n as usize)
        } else {
            let n = bins
                .unwrap_or_else(|| {
                    ctx.warnings.warn_once("stat_bin: binwidth defaulted to range/30");
                    DEFAULT_BINS
                })
                .max(1);
            if n > MAX_BINS {
                return Err(self.too_many_bins(n as f32));
            }
            (lo, (hi - lo) / n as f32, n)
        };

        let weights = weights(data);
        let mut counts = vec![0.0f32; n];
        for (v, w) in x.numbers().into_iter().zip(weights) {
            let Some(v) = v else { continue };
            let idx = (((v - start) / width).floor().max(0.0) as usize).min(n - 1);
            counts[idx] += w;
        }

        let total: f32 = counts.iter().sum();
        let max = counts.iter().copied().fold(0.0f32, f32::max);
        let xmin: Vec<f32> = (0..n).map(|i| start + i as f32 * width).collect();
        Table::new()
            .with_column("x", Column::continuous(xmin.iter().map(|m| m + width / 2.0)))?
            .with_column("xmin", Column::continuous(xmin.iter().copied()))?
            .with_column("xmax", Column::continuous(xmin.iter().map(|m| m + width)))?
            .with_column("count", Column::continuous(counts.iter().copied()))?
            .with_column(
                "density",
                Column::continuous(counts.iter().map(|c| if total > 0.0 { c / (total * width) } else { 0.0 })),
            )?
            .with_column(
                "ncount",
                Column::continuous(counts.iter().map(|c| if max > 0.0 { c / max } else { 0.0 })),
            )?
            .with_column("width", Column::continuous(std::iter::repeat(width).take(n)))
    }

    fn too_many_bins(&self, n: f32) -> Error {
        Error::Stat {
            stat: self.name().to_string(),
            message: format!("{n} bins requested, at most {MAX_BINS} are supported"),
        }
    }
}

/// Per-row weights: the `weight` column, or 1.
fn weights(data: &Table) -> Vec<f32> {
    data.numbers("weight")
        .map_or_else(|| vec![1.0; data.nrow()], |w| w.into_iter().map(|v| v.unwrap_or(0.0)).collect())
}

fn mean(values: &[f32]) -> f32 {
    trueno::Vector::from_slice(values).mean().unwrap_or(f32::NAN)
}

/// Row indices for each distinct x, in x order, plus the x column of the
/// output.
fn by_x(data: &Table) -> Result<(Vec<Vec<usize>>, Column)> {
    let x = data.column("x")?;
    let groups = data.partition(&["x"]);
    let firsts: Vec<usize> = groups.iter().filter_map(|rows| rows.first().copied()).collect();
    Ok((groups, x.take(&firsts)))
}

fn count(data: &Table) -> Result<Table> {
    let (groups, x) = by_x(data)?;
    let weights = weights(data);
    let counts: Vec<f32> = groups.iter().map(|rows| rows.iter().map(|&r| weights[r]).sum()).collect();
    let total: f32 = counts.iter().sum();
    let prop = counts.iter().map(|c| if total > 0.0 { c / total } else { 0.0 });
    let prop: Vec<f32> = prop.collect();
    Table::new()
        .with_column("x", x)?
        .with_column("count", Column::continuous(counts))?
        .with_column("prop", Column::continuous(prop))
}

fn summarise(data: &Table, reduce: impl Fn(&[f32]) -> f32) -> Result<Table> {
    let (groups, x) = by_x(data)?;
    let y = data.column("y")?;
    let mut out_y = Vec::with_capacity(groups.len());
    let mut out_n = Vec::with_capacity(groups.len());
    for rows in &groups {
        let ys: Vec<f32> = y.take(rows).finite_numbers();
        out_n.push(ys.len() as f32);
        out_y.push(if ys.is_empty() { None } else { Some(reduce(&ys)).filter(|v| v.is_finite()) });
    }
    Table::new()
        .with_column("x", x)?
        .with_column("y", Column::continuous_opt(out_y))?
        .with_column("n", Column::continuous(out_n))
}

fn weighted_mean(data: &Table) -> Result<Table> {
    let (groups, x) = by_x(data)?;
    let y = data.column("y")?.numbers();
    let w = data.column("weight")?.numbers();
    let mut out_y = Vec::with_capacity(groups.len());
    let mut out_w = Vec::with_capacity(groups.len());
    for rows in &groups {
        let (mut sum, mut total) = (0.0f32, 0.0f32);
        for &r in rows {
            if let (Some(y), Some(w)) = (y[r], w[r]) {
                sum += y * w;
                total += w;
            }
        }
        out_y.push((total != 0.0).then(|| sum / total));
        out_w.push(total);
    }
    Table::new()
        .with_column("x", x)?
        .with_column("y", Column::continuous_opt(out_y))?
        .with_column("weight", Column::continuous(out_w))
}

fn intercept(data: &Table, aesthetic: &str, param: Option<f32>) -> Result<Table> {
    let column = match param {
        Some(v) => Column::continuous([v]),
        None => data.column(aesthetic)?.clone(),
    };
    Table::new().with_column(aesthetic, column)
}

/// Copy onto `computed` the input columns that are constant across the
/// partition and that the stat did not produce.
fn carry_constant_columns(part: &Table, mut computed: Table) -> Result<Table> {
    let n = computed.nrow();
    if n == 0 {
        return Ok(computed);
    }
    for (name, column) in part.iter() {
        if computed.has_column(name) || !column.is_constant() {
            continue;
        }
        if let Some(first) = column.get(0) {
            computed.insert(name, Column::repeat(column.kind(), first, n))?;
        }
    }
    Ok(computed)
}

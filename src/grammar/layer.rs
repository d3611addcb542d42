//! Layers: one geom with its stat, position adjustment, data and mapping.
//!
//! A layer does not own a plot's data; it either shares the plot's table
//! or holds its own behind an [`Arc`], so snapshotting a layer for a build
//! never copies rows.

use std::sync::Arc;

use crate::error::{Error, Result};

use super::aes::{Aes, AesValue};
use super::data::{Column, Table};
use super::geom::Geom;
use super::panel::Panel;
use super::position::Position;
use super::scales::ScaleSet;
use super::stat::Stat;
use super::warnings::WarningLog;

/// A layer in the plot.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Geometry.
    pub geom: Geom,
    /// Statistical transformation.
    pub stat: Stat,
    /// Position adjustment.
    pub position: Position,
    /// Layer-specific data; `None` uses the plot data.
    pub data: Option<Arc<Table>>,
    /// Layer-specific aesthetics.
    pub mapping: Aes,
    /// Whether plot-level aesthetics apply to this layer.
    pub inherit_aes: bool,
    /// Column that defines groups, overriding the derived grouping.
    pub group: Option<String>,
}

impl Layer {
    /// Create a layer from a geom, taking its aesthetics, stat and
    /// position (or the geom's defaults).
    ///
    /// A reference line built with a fixed intercept gets a one-row table
    /// of its own holding the intercept and does not inherit plot
    /// aesthetics, so it draws once per panel regardless of the plot data.
    #[must_use]
    pub fn new(geom: Geom) -> Self {
        let mut mapping = geom.aes.clone().unwrap_or_default();
        let (data, inherit_aes) = match geom.fixed_intercept() {
            Some((aesthetic, value)) => {
                mapping = mapping.map(aesthetic, aesthetic);
                (Some(Arc::new(Table::from_column(aesthetic, Column::continuous([value])))), false)
            }
            None => (None, true),
        };
        let stat = geom.stat.clone().unwrap_or_else(|| geom.default_stat());
        let position = geom.position.unwrap_or_else(|| geom.default_position());
        Self { geom, stat, position, data, mapping, inherit_aes, group: None }
    }

    /// Set layer-specific data.
    #[must_use]
    pub fn data(mut self, data: Table) -> Self {
        self.data = Some(Arc::new(data));
        self
    }

    /// Share an existing table as layer data.
    #[must_use]
    pub fn data_shared(mut self, data: Arc<Table>) -> Self {
        self.data = Some(data);
        self
    }

    /// Set layer-specific aesthetics, on top of the geom's.
    #[must_use]
    pub fn aes(mut self, aes: Aes) -> Self {
        self.mapping = self.mapping.merge(&aes);
        self
    }

    /// Replace the stat.
    #[must_use]
    pub fn stat(mut self, stat: Stat) -> Self {
        self.stat = stat;
        self
    }

    /// Replace the position adjustment.
    #[must_use]
    pub fn position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Whether plot aesthetics apply to this layer.
    #[must_use]
    pub fn inherit_aes(mut self, inherit: bool) -> Self {
        self.inherit_aes = inherit;
        self
    }

    /// Group rows by `column` instead of by the discrete columns.
    #[must_use]
    pub fn group(mut self, column: &str) -> Self {
        self.group = Some(column.to_string());
        self
    }

    /// A copy for one build. Data is shared, everything else is cloned.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// The layer's data, falling back to the plot data.
    #[must_use]
    pub fn layer_data(&self, plot_data: &Arc<Table>) -> Arc<Table> {
        self.data.clone().unwrap_or_else(|| Arc::clone(plot_data))
    }

    /// Layer mapping over the plot mapping (when inherited), plus the
    /// group override.
    #[must_use]
    pub fn full_mapping(&self, plot_mapping: &Aes) -> Aes {
        let mut aes = if self.inherit_aes { self.mapping.with_defaults(plot_mapping) } else { self.mapping.clone() };
        if let Some(column) = &self.group {
            aes.insert("group", AesValue::Column(column.clone()));
        }
        aes
    }

    /// The aesthetics evaluated before the stat: [`Layer::full_mapping`]
    /// without computed references and without aesthetics the geom fixes
    /// as parameters.
    #[must_use]
    pub fn layer_mapping(&self, plot_mapping: &Aes) -> Aes {
        let mut aes = self.full_mapping(plot_mapping);
        let drop: Vec<String> = aes
            .iter()
            .filter(|(name, value)| value.is_computed() || self.geom.params.contains(name))
            .map(|(name, _)| name.to_string())
            .collect();
        for name in drop {
            aes.remove(&name);
        }
        aes
    }

    /// Evaluate the mapping against `data`, producing a table whose
    /// columns are aesthetic names, plus `PANEL`.
    ///
    /// Constants must have one value or one per row; single values are
    /// repeated. When `data` has no rows and every aesthetic is constant,
    /// the constants define the rows and all of them land in panel 1.
    pub fn compute_aesthetics(&self, data: &Table, plot_mapping: &Aes) -> Result<Table> {
        self.full_mapping(plot_mapping).validate()?;
        let mapping = self.layer_mapping(plot_mapping);

        let mut evaluated: Vec<(&str, Column)> = Vec::with_capacity(mapping.len());
        let mut any_column = false;
        for (aesthetic, value) in mapping.iter() {
            let column = match value {
                AesValue::Column(name) => {
                    any_column = true;
                    data.column(name)?.clone()
                }
                AesValue::Constant(values) => values.clone(),
                AesValue::Computed(_) => continue,
            };
            evaluated.push((aesthetic, column));
        }

        let constants_only = data.is_empty() && !any_column;
        let n = if constants_only { evaluated.iter().map(|(_, c)| c.len()).max().unwrap_or(0) } else { data.nrow() };

        let mut out = Table::new();
        for (aesthetic, column) in evaluated {
            let column = match column.len() {
                len if len == n => column,
                1 => column.broadcast(n),
                len => return Err(Error::DataLength { aesthetic: aesthetic.to_string(), len, rows: n }),
            };
            out.insert(aesthetic, column)?;
        }

        let panel = match data.get("PANEL") {
            Some(panel) if !constants_only => panel.clone(),
            _ => Column::ordinal(vec![1; n]),
        };
        out.insert("PANEL", panel)?;
        Ok(out)
    }

    /// Run the layer's stat.
    pub fn calc_statistic(&self, data: &Table, panel: &Panel, warnings: &WarningLog) -> Result<Table> {
        self.stat.compute_layer(data, panel, warnings)
    }

    /// Resolve computed aesthetics (`..count..` and the stat's defaults)
    /// from the stat output, adding default scales for them and applying
    /// scale transformations when the stat asks for it.
    pub fn map_statistic(
        &self,
        mut data: Table,
        plot_mapping: &Aes,
        scales: &mut ScaleSet,
        warnings: &WarningLog,
    ) -> Result<Table> {
        if data.is_empty() {
            return Ok(Table::new());
        }
        let aesthetics = self.full_mapping(plot_mapping).with_defaults(&self.stat.default_aes());

        let mut computed = Table::new();
        for (aesthetic, column) in aesthetics.computed_aesthetics() {
            let values = data.get(column).ok_or_else(|| Error::UnknownAesthetic {
                aesthetic: aesthetic.to_string(),
                reason: format!("`{column}` is not computed by {}", self.stat.name()),
            })?;
            computed.insert(aesthetic, values.clone())?;
        }
        if computed.ncol() == 0 {
            return Ok(data);
        }

        scales.add_defaults(&computed);
        if self.stat.retransform() {
            computed = scales.transform_df(computed, warnings)?;
        }
        for (name, column) in computed.iter() {
            data.insert(name, column.clone())?;
        }
        Ok(data)
    }

    /// Complete the geom's extent columns.
    pub fn reparameterise(&self, data: Table) -> Result<Table> {
        self.geom.reparameterise(data)
    }

    /// Apply the position adjustment.
    pub fn adjust_position(&self, data: Table) -> Result<Table> {
        self.position.adjust(data)
    }
}

//! Faceting for Grammar of Graphics.
//!
//! Creates small multiples by splitting data on one or more variables. A
//! [`Layout`] lists the panels; [`Facet::map_layout`] assigns every row of
//! a table to exactly one of them.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

use super::data::{Column, ColumnKind, DataValue, OrdValue, Table};

/// Which position scales vary between panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacetScales {
    /// One x and one y scale shared by all panels.
    #[default]
    Fixed,
    /// x scales vary by column (grid) or panel (wrap).
    FreeX,
    /// y scales vary by row (grid) or panel (wrap).
    FreeY,
    /// Both vary.
    Free,
}

impl FacetScales {
    fn free_x(self) -> bool {
        matches!(self, FacetScales::FreeX | FacetScales::Free)
    }

    fn free_y(self) -> bool {
        matches!(self, FacetScales::FreeY | FacetScales::Free)
    }
}

/// Faceting specification.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Facet {
    /// No faceting: a single panel.
    #[default]
    None,
    /// Panels crossed by a row and/or a column variable.
    Grid {
        /// Row variable.
        row: Option<String>,
        /// Column variable.
        col: Option<String>,
        /// Scale sharing.
        scales: FacetScales,
    },
    /// Panels for each value of one variable, wrapped into rows.
    Wrap {
        /// Variable to facet by.
        var: String,
        /// Number of columns; defaults to `ceil(sqrt(panels))`.
        ncol: Option<usize>,
        /// Scale sharing.
        scales: FacetScales,
    },
}

impl Facet {
    /// No faceting.
    #[must_use]
    pub fn none() -> Self {
        Facet::None
    }

    /// Facet into a column of panels, one row per value.
    #[must_use]
    pub fn row(var: &str) -> Self {
        Facet::Grid { row: Some(var.to_string()), col: None, scales: FacetScales::Fixed }
    }

    /// Facet into a row of panels, one column per value.
    #[must_use]
    pub fn col(var: &str) -> Self {
        Facet::Grid { row: None, col: Some(var.to_string()), scales: FacetScales::Fixed }
    }

    /// Facet into a grid.
    #[must_use]
    pub fn grid(row: &str, col: &str) -> Self {
        Facet::Grid { row: Some(row.to_string()), col: Some(col.to_string()), scales: FacetScales::Fixed }
    }

    /// Facet with wrapping.
    #[must_use]
    pub fn wrap(var: &str, ncol: usize) -> Self {
        Facet::Wrap { var: var.to_string(), ncol: Some(ncol.max(1)), scales: FacetScales::Fixed }
    }

    /// Set scale sharing.
    #[must_use]
    pub fn scales(mut self, free: FacetScales) -> Self {
        match &mut self {
            Facet::None => {}
            Facet::Grid { scales, .. } | Facet::Wrap { scales, .. } => *scales = free,
        }
        self
    }

    /// Facet variables, row variable first.
    #[must_use]
    pub fn vars(&self) -> Vec<&str> {
        match self {
            Facet::None => Vec::new(),
            Facet::Grid { row, col, .. } => row.iter().chain(col.iter()).map(String::as_str).collect(),
            Facet::Wrap { var, .. } => vec![var.as_str()],
        }
    }

    /// Compute the panels from the distinct facet values in `tables`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingFacetVariable`] when a facet variable is in
    /// none of the tables.
    pub fn train_layout(&self, tables: &[&Table]) -> Result<Layout> {
        let vars = self.vars();
        for var in &vars {
            if !tables.iter().any(|t| t.has_column(var)) {
                return Err(Error::MissingFacetVariable { variable: (*var).to_string() });
            }
        }

        let panels = match self {
            Facet::None => vec![LayoutPanel::single()],
            Facet::Grid { row, col, scales } => {
                let rows = row.as_deref().map_or_else(|| vec![None], |v| some_levels(tables, v));
                let cols = col.as_deref().map_or_else(|| vec![None], |v| some_levels(tables, v));
                let mut panels = Vec::with_capacity(rows.len() * cols.len());
                for (r, row_value) in rows.iter().enumerate() {
                    for (c, col_value) in cols.iter().enumerate() {
                        let mut values = Vec::new();
                        if let (Some(var), Some(v)) = (row, row_value) {
                            values.push((var.clone(), v.clone()));
                        }
                        if let (Some(var), Some(v)) = (col, col_value) {
                            values.push((var.clone(), v.clone()));
                        }
                        panels.push(LayoutPanel {
                            panel: panels.len() as u32 + 1,
                            row: r + 1,
                            col: c + 1,
                            scale_x: if scales.free_x() { c + 1 } else { 1 },
                            scale_y: if scales.free_y() { r + 1 } else { 1 },
                            values,
                        });
                    }
                }
                panels
            }
            Facet::Wrap { var, ncol, scales } => {
                let levels = facet_levels(tables, var);
                let n = levels.len().max(1);
                let ncol = ncol.unwrap_or_else(|| (n as f32).sqrt().ceil() as usize).max(1);
                levels
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| LayoutPanel {
                        panel: i as u32 + 1,
                        row: i / ncol + 1,
                        col: i % ncol + 1,
                        scale_x: if scales.free_x() { i + 1 } else { 1 },
                        scale_y: if scales.free_y() { i + 1 } else { 1 },
                        values: vec![(var.clone(), v)],
                    })
                    .collect()
            }
        };

        tracing::debug!(panels = panels.len(), "trained facet layout");
        Ok(Layout { vars: vars.iter().map(ToString::to_string).collect(), panels })
    }

    /// Add a `PANEL` column assigning every row of `data` to a panel.
    ///
    /// Rows of a table without some facet variable are repeated once for
    /// every value that variable takes in the layout.
    pub fn map_layout(&self, layout: &Layout, data: &Table) -> Result<Table> {
        if layout.vars.is_empty() {
            let mut data = data.clone();
            data.insert("PANEL", Column::ordinal(std::iter::repeat(1).take(data.nrow())))?;
            return Ok(data);
        }

        let missing: Vec<&str> =
            layout.vars.iter().map(String::as_str).filter(|v| !data.has_column(v)).collect();
        let data = if missing.is_empty() || data.is_empty() {
            data.clone()
        } else {
            repeat_for_missing(layout, data, &missing)?
        };

        let index: BTreeMap<Vec<OrdValue>, u32> =
            layout.panels.iter().map(|p| (p.key(&layout.vars), p.panel)).collect();
        let columns: Vec<Option<&Column>> = layout.vars.iter().map(|v| data.get(v)).collect();
        let mut ids = Vec::with_capacity(data.nrow());
        for row in 0..data.nrow() {
            let key: Vec<OrdValue> = columns
                .iter()
                .map(|c| OrdValue(c.and_then(|c| c.get(row)).cloned().unwrap_or(DataValue::Null)))
                .collect();
            // The layout was trained on these tables, so every key is present.
            ids.push(index.get(&key).copied().unwrap_or(1));
        }

        let mut data = data;
        data.insert("PANEL", Column::ordinal(ids.into_iter().map(|id| id as i32)))?;
        Ok(data)
    }
}

/// Distinct values of `var` over every table that has it, including
/// missing values: sorted, or in first-appearance order for ordinal
/// columns.
fn facet_levels(tables: &[&Table], var: &str) -> Vec<DataValue> {
    let mut kind = ColumnKind::Discrete;
    let mut seen: Vec<DataValue> = Vec::new();
    for column in tables.iter().filter_map(|t| t.get(var)) {
        if column.kind() == ColumnKind::Ordinal {
            kind = ColumnKind::Ordinal;
        }
        for v in column.values() {
            let v = if v.is_null() { DataValue::Null } else { v.clone() };
            if !seen.contains(&v) {
                seen.push(v);
            }
        }
    }
    if kind != ColumnKind::Ordinal {
        seen.sort_by(DataValue::total_cmp);
    }
    seen
}

fn some_levels(tables: &[&Table], var: &str) -> Vec<Option<DataValue>> {
    facet_levels(tables, var).into_iter().map(Some).collect()
}

/// One copy of `data` per distinct combination of the `missing` facet
/// variables in the layout, with those variables filled in.
fn repeat_for_missing(layout: &Layout, data: &Table, missing: &[&str]) -> Result<Table> {
    let mut combos: Vec<Vec<DataValue>> = Vec::new();
    for panel in &layout.panels {
        let combo: Vec<DataValue> =
            missing.iter().map(|v| panel.value(v).cloned().unwrap_or(DataValue::Null)).collect();
        if !combos.contains(&combo) {
            combos.push(combo);
        }
    }

    let mut copies = Vec::with_capacity(combos.len());
    for combo in combos {
        let mut copy = data.clone();
        for (var, value) in missing.iter().zip(&combo) {
            copy.insert(var, Column::repeat(ColumnKind::Discrete, value, data.nrow()))?;
        }
        copies.push(copy);
    }
    Ok(Table::concat(&copies))
}

/// One panel of a layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPanel {
    /// 1-based panel id.
    pub panel: u32,
    /// 1-based grid row.
    pub row: usize,
    /// 1-based grid column.
    pub col: usize,
    /// 1-based index of the panel's x scale.
    pub scale_x: usize,
    /// 1-based index of the panel's y scale.
    pub scale_y: usize,
    /// Facet variable values of the panel.
    pub values: Vec<(String, DataValue)>,
}

impl LayoutPanel {
    fn single() -> Self {
        Self { panel: 1, row: 1, col: 1, scale_x: 1, scale_y: 1, values: Vec::new() }
    }

    /// Value of a facet variable in this panel.
    #[must_use]
    pub fn value(&self, var: &str) -> Option<&DataValue> {
        self.values.iter().find(|(n, _)| n == var).map(|(_, v)| v)
    }

    fn key(&self, vars: &[String]) -> Vec<OrdValue> {
        vars.iter().map(|v| OrdValue(self.value(v).cloned().unwrap_or(DataValue::Null))).collect()
    }
}

/// The panels of a plot.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    vars: Vec<String>,
    panels: Vec<LayoutPanel>,
}

impl Default for Layout {
    fn default() -> Self {
        Self { vars: Vec::new(), panels: vec![LayoutPanel::single()] }
    }
}

impl Layout {
    /// Panels in id order.
    #[must_use]
    pub fn panels(&self) -> &[LayoutPanel] {
        &self.panels
    }

    /// Panel by id.
    #[must_use]
    pub fn get(&self, panel: u32) -> Option<&LayoutPanel> {
        self.panels.iter().find(|p| p.panel == panel)
    }

    /// Number of panels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    /// Whether there are no panels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Facet variables.
    #[must_use]
    pub fn vars(&self) -> &[String] {
        &self.vars
    }

    /// Number of grid rows.
    #[must_use]
    pub fn nrow(&self) -> usize {
        self.panels.iter().map(|p| p.row).max().unwrap_or(1)
    }

    /// Number of grid columns.
    #[must_use]
    pub fn ncol(&self) -> usize {
        self.panels.iter().map(|p| p.col).max().unwrap_or(1)
    }

    /// Number of distinct x scales.
    #[must_use]
    pub fn n_scale_x(&self) -> usize {
        self.panels.iter().map(|p| p.scale_x).max().unwrap_or(1)
    }

    /// Number of distinct y scales.
    #[must_use]
    pub fn n_scale_y(&self) -> usize {
        self.panels.iter().map(|p| p.scale_y).max().unwrap_or(1)
    }

    /// The layout as a table: PANEL, ROW, COL, SCALE_X, SCALE_Y and one
    /// column per facet variable.
    pub fn to_table(&self) -> Result<Table> {
        let mut table = Table::new()
            .with_column("PANEL", Column::ordinal(self.panels.iter().map(|p| p.panel as i32)))?
            .with_column("ROW", Column::continuous(self.panels.iter().map(|p| p.row as f32)))?
            .with_column("COL", Column::continuous(self.panels.iter().map(|p| p.col as f32)))?
            .with_column("SCALE_X", Column::continuous(self.panels.iter().map(|p| p.scale_x as f32)))?
            .with_column("SCALE_Y", Column::continuous(self.panels.iter().map(|p| p.scale_y as f32)))?;
        for var in &self.vars {
            let values = self.panels.iter().map(|p| p.value(var).cloned().unwrap_or(DataValue::Null));
            table.insert(var, Column::from_values(values.collect()))?;
        }
        Ok(table)
    }
}

//! Panels: the facet layout plus the position scales of every panel.

use crate::error::Result;

use super::data::{Column, DataValue, Table};
use super::facet::{Layout, LayoutPanel};
use super::layer::Layer;
use super::scales::{Scale, X_AESTHETICS, Y_AESTHETICS};
use super::warnings::WarningLog;

/// Facet layout and trained per-panel position scales.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Panel {
    layout: Layout,
    x_scales: Vec<Scale>,
    y_scales: Vec<Scale>,
}

fn panel_id(value: &DataValue) -> Option<u32> {
    value.as_f32().map(|v| v as u32)
}

impl Panel {
    /// Panel with a layout and no trained scales.
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self { layout, x_scales: Vec::new(), y_scales: Vec::new() }
    }

    /// The facet layout.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// x scales, one per `SCALE_X` index.
    #[must_use]
    pub fn x_scales(&self) -> &[Scale] {
        &self.x_scales
    }

    /// y scales, one per `SCALE_Y` index.
    #[must_use]
    pub fn y_scales(&self) -> &[Scale] {
        &self.y_scales
    }

    fn layout_panel(&self, panel: u32) -> Option<&LayoutPanel> {
        self.layout.get(panel)
    }

    /// x scale of a panel.
    #[must_use]
    pub fn x_scale(&self, panel: u32) -> Option<&Scale> {
        let index = self.layout_panel(panel)?.scale_x;
        self.x_scales.get(index.checked_sub(1)?)
    }

    /// y scale of a panel.
    #[must_use]
    pub fn y_scale(&self, panel: u32) -> Option<&Scale> {
        let index = self.layout_panel(panel)?.scale_y;
        self.y_scales.get(index.checked_sub(1)?)
    }

    /// x and y scales of the panel whose `PANEL` value is `panel`.
    #[must_use]
    pub fn scales_for(&self, panel: &DataValue) -> (Option<&Scale>, Option<&Scale>) {
        match panel_id(panel) {
            Some(id) => (self.x_scale(id), self.y_scale(id)),
            None => (None, None),
        }
    }

    /// Train the position scales on every table, panel by panel. Scales are
    /// cloned from the templates the first time they are needed.
    pub fn train_position(
        &mut self,
        data: &[Table],
        x_template: Option<&Scale>,
        y_template: Option<&Scale>,
    ) -> Result<()> {
        if self.x_scales.is_empty() {
            if let Some(template) = x_template {
                self.x_scales = vec![template.clone_untrained(); self.layout.n_scale_x()];
            }
        }
        if self.y_scales.is_empty() {
            if let Some(template) = y_template {
                self.y_scales = vec![template.clone_untrained(); self.layout.n_scale_y()];
            }
        }

        for table in data {
            for rows in table.partition(&["PANEL"]) {
                let Some(layout_panel) = rows
                    .first()
                    .and_then(|&r| table.get("PANEL")?.get(r))
                    .and_then(panel_id)
                    .and_then(|id| self.layout.get(id))
                else {
                    continue;
                };
                let (sx, sy) = (layout_panel.scale_x, layout_panel.scale_y);
                let part = table.take(&rows);
                if let Some(scale) = sx.checked_sub(1).and_then(|i| self.x_scales.get_mut(i)) {
                    train_family(scale, &part, X_AESTHETICS)?;
                }
                if let Some(scale) = sy.checked_sub(1).and_then(|i| self.y_scales.get_mut(i)) {
                    train_family(scale, &part, Y_AESTHETICS)?;
                }
            }
        }
        Ok(())
    }

    /// Map every position column through its panel's scale.
    pub fn map_position(&self, mut data: Table, warnings: &WarningLog) -> Result<Table> {
        if data.is_empty() {
            return Ok(data);
        }
        let parts = data.partition(&["PANEL"]);
        let names: Vec<String> = data
            .column_names()
            .filter(|n| X_AESTHETICS.contains(n) || Y_AESTHETICS.contains(n))
            .map(ToString::to_string)
            .collect();

        for name in names {
            let Some(column) = data.get(&name) else { continue };
            let mut values = vec![DataValue::Null; data.nrow()];
            let mut changed = false;
            for rows in &parts {
                let part = column.take(rows);
                let panel = rows.first().and_then(|&r| data.get("PANEL")?.get(r)).cloned();
                let (x, y) = panel.as_ref().map_or((None, None), |p| self.scales_for(p));
                let scale = if X_AESTHETICS.contains(&name.as_str()) { x } else { y };
                let mapped = match scale {
                    Some(scale) => {
                        changed = true;
                        scale.map(&part, warnings)?
                    }
                    None => part,
                };
                for (&row, v) in rows.iter().zip(mapped.values()) {
                    values[row] = v.clone();
                }
            }
            if changed {
                data.insert(&name, Column::from_values(values))?;
            }
        }
        Ok(data)
    }

    /// Run each layer's stat on its data.
    pub fn calculate_stats(&self, layers: &[Layer], data: Vec<Table>, warnings: &WarningLog) -> Result<Vec<Table>> {
        layers.iter().zip(data).map(|(layer, table)| layer.calc_statistic(&table, self, warnings)).collect()
    }
}

fn train_family(scale: &mut Scale, data: &Table, family: &[&str]) -> Result<()> {
    for (name, column) in data.iter() {
        if family.contains(&name) {
            scale.train(column)?;
        }
    }
    Ok(())
}

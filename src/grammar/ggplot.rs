//! Main GGPlot builder and build pipeline.
//!
//! [`GGPlot::build`] runs the fixed stage sequence that turns a plot
//! specification into per-layer tables of render-ready values:
//!
//! 1. require at least one layer
//! 2. snapshot layers and scales
//! 3. train the facet layout and assign every row a `PANEL`
//! 4. evaluate aesthetics and derive `group`; 4b. apply scale transformations
//! 5. train and map position scales per panel
//! 6. run stats and resolve computed aesthetics
//! 7. add x/y scales nobody asked for yet
//! 8. reparameterise geoms
//! 9. adjust positions; 9b. retrain and remap positions; 9c. map the
//!    non-position aesthetics
//!
//! Stages never look ahead: each consumes exactly what the previous one
//! produced.

use std::sync::Arc;

use batuta_common::display::WithDimensions;

use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::render::{PanelFrame, Renderer};

use super::aes::Aes;
use super::coord::Coord;
use super::data::{DataValue, Table};
use super::facet::{Facet, Layout};
use super::geom::{DrawContext, Geom};
use super::group::add_group;
use super::layer::Layer;
use super::panel::Panel;
use super::scales::{Scale, ScaleSet};
use super::theme::Theme;
use super::warnings::WarningLog;

/// Grammar of Graphics plot builder.
#[derive(Debug, Clone)]
pub struct GGPlot {
    /// Plot data.
    data: Arc<Table>,
    /// Global aesthetic mappings.
    aes: Aes,
    /// Layers.
    layers: Vec<Layer>,
    /// User-supplied scales.
    scales: ScaleSet,
    /// Coordinate system.
    coord: Coord,
    /// Faceting.
    facet: Facet,
    /// Theme.
    theme: Theme,
    /// Width in pixels.
    width: u32,
    /// Height in pixels.
    height: u32,
}

impl Default for GGPlot {
    fn default() -> Self {
        Self::new()
    }
}

impl GGPlot {
    /// Create a new plot builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Arc::new(Table::new()),
            aes: Aes::new(),
            layers: Vec::new(),
            scales: ScaleSet::new(),
            coord: Coord::cartesian(),
            facet: Facet::None,
            theme: Theme::grey(),
            width: 800,
            height: 600,
        }
    }

    /// Set the data.
    #[must_use]
    pub fn data(mut self, data: Table) -> Self {
        self.data = Arc::new(data);
        self
    }

    /// Share an existing table as plot data.
    #[must_use]
    pub fn data_shared(mut self, data: Arc<Table>) -> Self {
        self.data = data;
        self
    }

    /// Convenience: set x and y data directly and map them.
    #[must_use]
    pub fn data_xy(mut self, x: &[f32], y: &[f32]) -> Self {
        self.data = Arc::new(Table::from_xy(x, y));
        self.aes = self.aes.x("x").y("y");
        self
    }

    /// Set global aesthetics.
    #[must_use]
    pub fn aes(mut self, aes: Aes) -> Self {
        self.aes = aes;
        self
    }

    /// Add a geometry layer.
    #[must_use]
    pub fn geom(mut self, geom: Geom) -> Self {
        self.layers.push(Layer::new(geom));
        self
    }

    /// Add a layer.
    #[must_use]
    pub fn layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Add a scale, replacing any scale for the same aesthetic.
    #[must_use]
    pub fn scale(mut self, scale: Scale) -> Self {
        self.scales.add(scale);
        self
    }

    /// Set coordinate system.
    #[must_use]
    pub fn coord(mut self, coord: Coord) -> Self {
        self.coord = coord;
        self
    }

    /// Set faceting.
    #[must_use]
    pub fn facet(mut self, facet: Facet) -> Self {
        self.facet = facet;
        self
    }

    /// Set theme.
    #[must_use]
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Set dimensions.
    #[must_use]
    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Layers added so far.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Scales added so far.
    #[must_use]
    pub fn scales(&self) -> &ScaleSet {
        &self.scales
    }

    /// Build the plot, reporting warnings to the process-wide log.
    ///
    /// # Errors
    ///
    /// Returns the first error any stage raises; see [`Error`].
    pub fn build(&self) -> Result<BuiltGGPlot> {
        self.build_with_warnings(WarningLog::global())
    }

    /// Build the plot, reporting warnings to `warnings`.
    ///
    /// The plot itself is left untouched: layers and scales are
    /// snapshotted and data tables are only read.
    ///
    /// # Errors
    ///
    /// Returns the first error any stage raises; see [`Error`].
    #[tracing::instrument(level = "debug", skip_all, fields(layers = self.layers.len()))]
    pub fn build_with_warnings(&self, warnings: &WarningLog) -> Result<BuiltGGPlot> {
        if self.layers.is_empty() {
            return Err(Error::NoLayers);
        }

        let layers: Vec<Layer> = self.layers.iter().map(Layer::snapshot).collect();
        let mut scales = self.scales.clone();

        // Layout
        let sources: Vec<Arc<Table>> = layers.iter().map(|l| l.layer_data(&self.data)).collect();
        let mut tables: Vec<&Table> = vec![&*self.data];
        tables.extend(sources.iter().map(|t| &**t));
        let layout = self.facet.train_layout(&tables)?;
        let mut data =
            sources.iter().map(|t| self.facet.map_layout(&layout, t)).collect::<Result<Vec<Table>>>()?;
        tracing::debug!(panels = layout.len(), "layout trained");

        // Aesthetics and grouping
        for (layer, table) in layers.iter().zip(data.iter_mut()) {
            let resolved = layer.compute_aesthetics(table, &self.aes)?;
            scales.add_defaults(&resolved);
            *table = add_group(resolved)?;
        }
        data = data.into_iter().map(|t| scales.transform_df(t, warnings)).collect::<Result<_>>()?;
        tracing::debug!(rows = total_rows(&data), scales = scales.len(), "aesthetics resolved");

        // Position scales
        let mut panel = Panel::new(layout);
        panel.train_position(&data, scales.x(), scales.y())?;
        data = data.into_iter().map(|t| panel.map_position(t, warnings)).collect::<Result<_>>()?;

        // Stats
        data = panel.calculate_stats(&layers, data, warnings)?;
        for (layer, table) in layers.iter().zip(data.iter_mut()) {
            let mapped = layer.map_statistic(std::mem::take(table), &self.aes, &mut scales, warnings)?;
            if !mapped.is_empty() {
                layer.geom.check_required_aesthetics(&mapped)?;
            }
            *table = mapped;
        }
        tracing::debug!(rows = total_rows(&data), "stats computed");

        scales.add_missing(&["x", "y"]);

        // Geometry
        data = layers
            .iter()
            .zip(data)
            .map(|(layer, t)| layer.reparameterise(t).and_then(|t| layer.adjust_position(t)))
            .collect::<Result<_>>()?;

        panel.train_position(&data, scales.x(), scales.y())?;
        data = data.into_iter().map(|t| panel.map_position(t, warnings)).collect::<Result<_>>()?;

        for table in &data {
            scales.train_non_position(table)?;
        }
        data = data.into_iter().map(|t| scales.map_non_position(t, warnings)).collect::<Result<_>>()?;
        tracing::debug!(rows = total_rows(&data), "build finished");

        Ok(BuiltGGPlot {
            panel,
            data,
            layers,
            scales,
            coord: self.coord,
            theme: self.theme.clone(),
            width: self.width,
            height: self.height,
        })
    }
}

impl WithDimensions for GGPlot {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

fn total_rows(data: &[Table]) -> usize {
    data.iter().map(Table::nrow).sum()
}

/// A built plot: the panel layout with trained scales and every layer's
/// final table.
#[derive(Debug, Clone)]
pub struct BuiltGGPlot {
    panel: Panel,
    data: Vec<Table>,
    layers: Vec<Layer>,
    scales: ScaleSet,
    coord: Coord,
    theme: Theme,
    width: u32,
    height: u32,
}

impl BuiltGGPlot {
    /// The panel layout and its position scales.
    #[must_use]
    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    /// The facet layout.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        self.panel.layout()
    }

    /// Final tables, one per layer.
    #[must_use]
    pub fn data(&self) -> &[Table] {
        &self.data
    }

    /// Final table of one layer.
    #[must_use]
    pub fn layer_data(&self, layer: usize) -> Option<&Table> {
        self.data.get(layer)
    }

    /// The layers as they were built.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Plot-level scales after the build.
    #[must_use]
    pub fn scales(&self) -> &ScaleSet {
        &self.scales
    }

    /// Coordinate system.
    #[must_use]
    pub fn coord(&self) -> &Coord {
        &self.coord
    }

    /// Theme.
    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Width and height in pixels.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Draw every panel, reporting warnings to the process-wide log.
    ///
    /// # Errors
    ///
    /// Returns an error if a panel's ranges cannot be resolved, a color
    /// does not parse, or the renderer fails.
    pub fn render(&self, renderer: &mut dyn Renderer) -> Result<()> {
        self.render_with_warnings(renderer, WarningLog::global())
    }

    /// Draw every panel, reporting warnings to `warnings`.
    ///
    /// # Errors
    ///
    /// See [`BuiltGGPlot::render`].
    pub fn render_with_warnings(&self, renderer: &mut dyn Renderer, warnings: &WarningLog) -> Result<()> {
        let layout = self.panel.layout();
        let plot_area =
            Rect::new(0.0, 0.0, self.width as f32, self.height as f32).inset(self.theme.margin as f32);

        for layout_panel in layout.panels() {
            let id = layout_panel.panel;
            let frame = PanelFrame {
                panel: id,
                row: layout_panel.row,
                col: layout_panel.col,
                area: plot_area.grid_cell(
                    layout.nrow(),
                    layout.ncol(),
                    layout_panel.row,
                    layout_panel.col,
                    self.theme.panel_spacing as f32,
                ),
                x_range: panel_range(self.coord.x_limits(), self.panel.x_scale(id), "x")?,
                y_range: panel_range(self.coord.y_limits(), self.panel.y_scale(id), "y")?,
                background: self.theme.panel_background,
            };
            renderer.begin_panel(&frame)?;

            let ctx = DrawContext { x_range: frame.x_range, y_range: frame.y_range, theme: &self.theme, warnings };
            let key = DataValue::from(id as i32);
            for (index, (layer, table)) in self.layers.iter().zip(&self.data).enumerate() {
                let rows = table.filter_eq("PANEL", &key);
                for command in layer.geom.draw(&rows, &ctx)? {
                    renderer.draw(id, index, &command)?;
                }
            }
        }
        Ok(())
    }
}

/// Coordinate limits win over the panel scale's expanded range.
fn panel_range(limits: Option<(f32, f32)>, scale: Option<&Scale>, aesthetic: &str) -> Result<(f32, f32)> {
    match (limits, scale) {
        (Some(limits), _) => Ok(limits),
        (None, Some(scale)) => scale.coord_range(),
        (None, None) => Err(Error::UnresolvedScale { aesthetic: aesthetic.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::data::Column;
    use crate::grammar::scales::Limits;
    use crate::render::{CommandRecorder, DrawCommand};

    fn plot() -> GGPlot {
        GGPlot::new().data_xy(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0])
    }

    #[test]
    fn test_ggplot_error_no_layers() {
        assert_eq!(plot().build_with_warnings(&WarningLog::new()).unwrap_err(), Error::NoLayers);
    }

    #[test]
    fn test_ggplot_basic() {
        let built = plot().geom(Geom::point()).build_with_warnings(&WarningLog::new()).unwrap();
        assert_eq!(built.data().len(), 1);
        let table = built.layer_data(0).unwrap();
        assert_eq!(table.numbers("x").unwrap(), vec![Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(table.numbers("group").unwrap(), vec![Some(1.0); 3]);
        assert_eq!(built.layout().len(), 1);
        assert_eq!(built.panel().y_scale(1).unwrap().get_limits().unwrap(), Limits::Continuous(4.0, 6.0));
    }

    #[test]
    fn test_build_leaves_plot_untouched() {
        let p = GGPlot::new()
            .data(Table::from_xy(&[1.0, 2.0, 3.0], &[0.0, 0.0, 0.0]))
            .aes(Aes::new().x("x"))
            .geom(Geom::histogram(3));
        let before = p.scales().len();
        let built = p.build_with_warnings(&WarningLog::new()).unwrap();
        assert!(built.scales().has("y"));
        assert_eq!(p.scales().len(), before);
        assert_eq!(p.layers().len(), 1);
    }

    #[test]
    fn test_ggplot_dimensions_trait() {
        let mut p = plot();
        p.set_dimensions(320, 240);
        let built = p.geom(Geom::point()).build_with_warnings(&WarningLog::new()).unwrap();
        assert_eq!(built.dimensions(), (320, 240));
    }

    #[test]
    fn test_render_points() {
        let built = plot().geom(Geom::point()).build_with_warnings(&WarningLog::new()).unwrap();
        let mut rec = CommandRecorder::new();
        built.render_with_warnings(&mut rec, &WarningLog::new()).unwrap();
        assert_eq!(rec.frames().len(), 1);
        assert_eq!(rec.commands().len(), 3);
        assert!(matches!(rec.commands()[0].command, DrawCommand::Point { .. }));
    }

    #[test]
    fn test_coord_limits_set_frame_range() {
        let built = plot()
            .geom(Geom::line())
            .coord(Coord::cartesian().xlim(0.0, 10.0))
            .build_with_warnings(&WarningLog::new())
            .unwrap();
        let mut rec = CommandRecorder::new();
        built.render_with_warnings(&mut rec, &WarningLog::new()).unwrap();
        assert_eq!(rec.frames()[0].x_range, (0.0, 10.0));
        assert_eq!(rec.layer(0).count(), 1);
    }

    #[test]
    fn test_stacked_bars_train_y() {
        let data = Table::new()
            .with_column("x", Column::discrete(["a", "a", "b"]))
            .unwrap()
            .with_column("g", Column::discrete(["u", "v", "u"]))
            .unwrap();
        let built = GGPlot::new()
            .data(data)
            .aes(Aes::new().x("x").fill("g"))
            .geom(Geom::bar())
            .build_with_warnings(&WarningLog::new())
            .unwrap();
        let y = built.panel().y_scale(1).unwrap();
        assert_eq!(y.get_limits().unwrap(), Limits::Continuous(0.0, 2.0));
        let table = built.layer_data(0).unwrap();
        assert!(table.get("fill").unwrap().values().iter().all(|v| v.as_str().is_some_and(|s| s.starts_with('#'))));
    }
}

//! Rendering collaborators.
//!
//! A built plot is drawn by walking its panels and handing each layer's
//! [`DrawCommand`]s to a [`Renderer`]. Rasterizers, vector writers and test
//! recorders all sit behind the same trait; [`CommandRecorder`] keeps
//! everything it is given, which is what the tests use.

mod commands;

pub use commands::{DrawCommand, LineStyle, Style};

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};
use crate::scale::{ContinuousMap, LinearScale};

/// Where a panel is drawn and which data ranges its edges represent.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelFrame {
    /// Panel id (the `PANEL` value of its rows).
    pub panel: u32,
    /// Layout row, 1-based.
    pub row: usize,
    /// Layout column, 1-based.
    pub col: usize,
    /// Pixel area of the panel.
    pub area: Rect,
    /// Data range spanning the panel horizontally.
    pub x_range: (f32, f32),
    /// Data range spanning the panel vertically.
    pub y_range: (f32, f32),
    /// Panel background.
    pub background: Rgba,
}

impl PanelFrame {
    /// Convert a data-space point to pixels. The y axis grows downwards.
    ///
    /// # Errors
    ///
    /// Returns an error if either range has zero width.
    pub fn to_pixel(&self, point: Point) -> Result<Point> {
        let sx = LinearScale::new(self.x_range, (self.area.x, self.area.right()))?;
        let sy = LinearScale::new(self.y_range, (self.area.bottom(), self.area.y))?;
        Ok(Point::new(sx.map(point.x), sy.map(point.y)))
    }
}

impl DrawCommand {
    /// The same command with every coordinate moved into `frame`'s pixel
    /// area. Marker sizes, widths and styles are already in pixels.
    ///
    /// # Errors
    ///
    /// Returns an error if either of the frame's ranges has zero width.
    pub fn to_pixel(&self, frame: &PanelFrame) -> Result<DrawCommand> {
        let points = |points: &[Point]| points.iter().map(|p| frame.to_pixel(*p)).collect::<Result<Vec<_>>>();
        Ok(match self {
            DrawCommand::Point { at, size, shape, style } => {
                DrawCommand::Point { at: frame.to_pixel(*at)?, size: *size, shape: *shape, style: *style }
            }
            DrawCommand::Polyline { points: line, style } => {
                DrawCommand::Polyline { points: points(line)?, style: *style }
            }
            DrawCommand::HorizontalSpan { y, x0, x1, style } => {
                let start = frame.to_pixel(Point::new(*x0, *y))?;
                let end = frame.to_pixel(Point::new(*x1, *y))?;
                DrawCommand::HorizontalSpan { y: start.y, x0: start.x, x1: end.x, style: *style }
            }
            DrawCommand::FilledRegion { outline, style } => {
                DrawCommand::FilledRegion { outline: points(outline)?, style: *style }
            }
        })
    }
}

/// Consumer of draw commands.
pub trait Renderer {
    /// Called once per panel, before any of its commands.
    fn begin_panel(&mut self, frame: &PanelFrame) -> Result<()>;

    /// Draw one command of layer `layer` (0-based) in panel `panel`.
    fn draw(&mut self, panel: u32, layer: usize, command: &DrawCommand) -> Result<()>;
}

/// A command together with where it was drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCommand {
    /// Panel id.
    pub panel: u32,
    /// Layer index.
    pub layer: usize,
    /// The command.
    pub command: DrawCommand,
}

/// Renderer that records frames and commands in order, in data
/// coordinates or, with [`CommandRecorder::in_pixels`], in pixels.
#[derive(Debug, Clone, Default)]
pub struct CommandRecorder {
    frames: Vec<PanelFrame>,
    commands: Vec<RecordedCommand>,
    pixels: bool,
}

impl CommandRecorder {
    /// Empty recorder keeping data coordinates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty recorder converting every command to pixels with its
    /// panel's frame.
    #[must_use]
    pub fn in_pixels() -> Self {
        Self { pixels: true, ..Self::default() }
    }

    /// Panel frames in the order they were begun.
    #[must_use]
    pub fn frames(&self) -> &[PanelFrame] {
        &self.frames
    }

    /// Every recorded command.
    #[must_use]
    pub fn commands(&self) -> &[RecordedCommand] {
        &self.commands
    }

    /// Commands of one layer.
    pub fn layer(&self, layer: usize) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(move |c| c.layer == layer).map(|c| &c.command)
    }

    /// Commands drawn in one panel.
    pub fn panel(&self, panel: u32) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(move |c| c.panel == panel).map(|c| &c.command)
    }
}

impl Renderer for CommandRecorder {
    fn begin_panel(&mut self, frame: &PanelFrame) -> Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn draw(&mut self, panel: u32, layer: usize, command: &DrawCommand) -> Result<()> {
        let command = if self.pixels {
            let frame = self
                .frames
                .iter()
                .rev()
                .find(|f| f.panel == panel)
                .ok_or_else(|| Error::Rendering(format!("panel {panel} drawn before it was begun")))?;
            command.to_pixel(frame)?
        } else {
            command.clone()
        };
        self.commands.push(RecordedCommand { panel, layer, command });
        Ok(())
    }
}

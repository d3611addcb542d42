//! Grammar of Graphics implementation.
//!
//! Provides declarative visualization specification based on Wilkinson's
//! Grammar of Graphics [Wilkinson 2005], built the layered way [Wickham
//! 2010]: a plot is data plus a default mapping plus layers, and a build
//! resolves every layer into a table of positions and styles per panel.
//!
//! # Components
//!
//! - **Data**: [`Table`] of typed [`Column`]s (continuous, discrete, ordinal)
//! - **Aesthetics**: [`Aes`] maps aesthetics to columns, constants or stat outputs
//! - **Geometries**: [`Geom`] (point, line, path, area, bar, hline, vline)
//! - **Statistics**: [`Stat`] (identity, count, bin, sum, mean, weighted mean, custom)
//! - **Positions**: [`Position`] (identity, stack, dodge, jitter)
//! - **Scales**: [`Scale`] and [`ScaleSet`], trained across layers
//! - **Facets**: [`Facet`] grid and wrap layouts, with per-panel scales
//!
//! # Example
//!
//! ```rust
//! use trueno_gg::grammar::*;
//!
//! let built = GGPlot::new()
//!     .data_xy(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0])
//!     .geom(Geom::point())
//!     .geom(Geom::hline(5.0))
//!     .build()
//!     .unwrap();
//! assert_eq!(built.data().len(), 2);
//! ```
//!
//! # References
//!
//! - Wilkinson, L. (2005). *The Grammar of Graphics*. Springer.
//! - Wickham, H. (2010). "A Layered Grammar of Graphics." Journal of Computational
//!   and Graphical Statistics.

mod aes;
mod coord;
mod data;
mod facet;
mod geom;
mod ggplot;
mod group;
mod layer;
mod panel;
mod position;
mod scales;
mod stat;
mod theme;
mod warnings;

pub use aes::{normalize_aesthetic, Aes, AesValue, KNOWN_AESTHETICS};
pub use coord::Coord;
pub use data::{Column, ColumnKind, DataValue, Table};
pub use facet::{Facet, FacetScales, Layout, LayoutPanel};
pub use geom::{DrawContext, Geom, GeomType, PointShape};
pub use ggplot::{BuiltGGPlot, GGPlot};
pub use group::{add_group, discrete_columns, group_column, ninteraction};
pub use layer::Layer;
pub use panel::Panel;
pub use position::{resolution, Position, DEFAULT_JITTER_SEED};
pub use scales::{
    is_position_aesthetic, is_scaled_aesthetic, Expansion, Limits, Oob, Palette, Scale, ScaleKind, ScaleSet, Trans,
    LINETYPES, NON_POSITION_SCALED, SHAPES, X_AESTHETICS, Y_AESTHETICS,
};
pub use stat::{Stat, StatContext, StatTransform, DEFAULT_BINS, MAX_BINS};
pub use theme::Theme;
pub use warnings::WarningLog;

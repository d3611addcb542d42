//! # Trueno-GG
//!
//! Layered grammar-of-graphics build pipeline for data science.
//!
//! Built on the [trueno](https://crates.io/crates/trueno) core library,
//! trueno-gg turns a declarative plot specification (data, aesthetic
//! mappings, layers, scales, facets) into per-panel, per-layer tables of
//! resolved positions and styles, and hands them to a [`render::Renderer`]
//! as draw commands.
//!
//! ## Features
//!
//! - **Pure Rust**: No JavaScript, HTML, or browser dependencies
//! - **Layered grammar**: Geoms, stats, position adjustments and scales compose per layer
//! - **Faceting**: Grid and wrap layouts with fixed or free scales
//! - **Renderer-agnostic**: Output is a stream of data-space draw commands
//!
//! ## Quick Start
//!
//! ```rust
//! use trueno_gg::prelude::*;
//!
//! let plot = GGPlot::new()
//!     .data_xy(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 1.0, 5.0, 3.0])
//!     .geom(Geom::point().color(Rgba::BLUE));
//!
//! let built = plot.build()?;
//! let mut recorder = CommandRecorder::new();
//! built.render(&mut recorder)?;
//! assert_eq!(recorder.commands().len(), 5);
//! # Ok::<(), trueno_gg::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `gpu`: Enable GPU compute acceleration in trueno
//! - `parallel`: Enable parallel processing in trueno
//!
//! ## Academic References
//!
//! - Wilkinson, L. (2005). *The Grammar of Graphics*. Springer.
//! - Wickham, H. (2010). "A Layered Grammar of Graphics." Journal of Computational
//!   and Graphical Statistics.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code (Cloudflare incident 2025-11-18)
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in graphics/visualization code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Color types, parsing and palettes.
pub mod color;

/// Geometric primitives (points, rectangles).
pub mod geometry;

/// Scale functions for data-to-visual mappings.
pub mod scale;

// ============================================================================
// Grammar of Graphics
// ============================================================================

/// Grammar of Graphics implementation.
pub mod grammar;

// ============================================================================
// Rendering
// ============================================================================

/// Renderer collaborators and draw commands.
pub mod render;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for trueno-gg operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use trueno_gg::prelude::*;
/// ```
pub mod prelude {
    pub use batuta_common::display::WithDimensions;
    pub use crate::color::{Hsla, Rgba};
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{Point, Rect};
    pub use crate::grammar::{
        Aes, BuiltGGPlot, Column, Coord, DataValue, Facet, FacetScales, GGPlot, Geom, Layer, PointShape, Position,
        Scale, Stat, Table, Theme, WarningLog,
    };
    pub use crate::render::{CommandRecorder, DrawCommand, LineStyle, PanelFrame, Renderer, Style};
    pub use crate::scale::{ColorScale, ContinuousMap, LinearScale};
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno for direct access to SIMD operations.
pub use trueno;

//! Error types for trueno-gg operations.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or rendering a plot.
///
/// Every variant terminates the current build; nothing is retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A build was requested for a plot without layers.
    #[error("No layers in plot")]
    NoLayers,

    /// A constant aesthetic is neither length one nor the data length.
    #[error(
        "Aesthetics must be length one or the same length as the data: \
         `{aesthetic}` has {len} values, data has {rows} rows"
    )]
    DataLength {
        /// Aesthetic (or column) name.
        aesthetic: String,
        /// Number of values supplied.
        len: usize,
        /// Number of rows in the data.
        rows: usize,
    },

    /// A stat's required aesthetics are absent from the data and parameters.
    #[error("{stat} requires the following missing aesthetics: {}", missing.join(", "))]
    MissingAesthetic {
        /// Stat name.
        stat: String,
        /// Missing aesthetic names, sorted.
        missing: Vec<String>,
    },

    /// A scale's limits or coordinate range cannot be determined yet.
    #[error("Scale for `{aesthetic}` has no trained range and no limits")]
    UnresolvedScale {
        /// Primary aesthetic of the scale.
        aesthetic: String,
    },

    /// An aesthetic name or value the pipeline does not understand.
    #[error("Do not know how to deal with aesthetic `{aesthetic}`: {reason}")]
    UnknownAesthetic {
        /// Aesthetic name.
        aesthetic: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A mapping refers to a column the data does not have.
    #[error("Column `{column}` not found in data")]
    MissingColumn {
        /// Column name.
        column: String,
    },

    /// A facet variable is absent from the plot data and every layer.
    #[error("At least one layer must contain the facet variable `{variable}`")]
    MissingFacetVariable {
        /// Facet variable name.
        variable: String,
    },

    /// Scale domain error (e.g. continuous data on a discrete scale).
    #[error("Scale domain error: {0}")]
    ScaleDomain(String),

    /// A stat could not compute its output.
    #[error("{stat}: {message}")]
    Stat {
        /// Stat name.
        stat: String,
        /// Description of the failure.
        message: String,
    },

    /// Color parsing error.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Rendering error reported by a renderer collaborator.
    #[error("Rendering error: {0}")]
    Rendering(String),
}

//! Aesthetic mappings for Grammar of Graphics.
//!
//! An [`Aes`] maps aesthetic names to an [`AesValue`]: a data column, a
//! constant, or a column computed later by a stat. The `..name..` dot
//! notation is recognised once, when the mapping is built.

use std::collections::BTreeMap;

use crate::color::Rgba;
use crate::error::{Error, Result};

use super::data::{Column, DataValue};

/// Every aesthetic the pipeline understands.
pub const KNOWN_AESTHETICS: &[&str] = &[
    "x",
    "y",
    "xmin",
    "xmax",
    "ymin",
    "ymax",
    "xend",
    "yend",
    "xintercept",
    "yintercept",
    "color",
    "fill",
    "size",
    "shape",
    "alpha",
    "linetype",
    "group",
    "label",
    "weight",
    "width",
];

/// Canonical spelling of an aesthetic name (`colour` becomes `color`).
#[must_use]
pub fn normalize_aesthetic(name: &str) -> String {
    match name {
        "colour" => "color".to_string(),
        other => other.to_string(),
    }
}

/// What an aesthetic is mapped to.
#[derive(Debug, Clone, PartialEq)]
pub enum AesValue {
    /// A column of the layer data.
    Column(String),
    /// Constant values: length one, or one per row.
    Constant(Column),
    /// A column produced by the layer's stat (`..name..`).
    Computed(String),
}

impl AesValue {
    /// Interpret a mapping string: `..count..` is a computed reference to
    /// `count`, anything else names a data column.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        match text.strip_prefix("..").and_then(|rest| rest.strip_suffix("..")) {
            Some(name) if !name.is_empty() => AesValue::Computed(name.to_string()),
            _ => AesValue::Column(text.to_string()),
        }
    }

    /// Whether this value is deferred until the stat runs.
    #[must_use]
    pub fn is_computed(&self) -> bool {
        matches!(self, AesValue::Computed(_))
    }
}

/// Aesthetic mapping specification.
///
/// Iteration order is by aesthetic name, so every stage that walks a
/// mapping does so deterministically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aes {
    mappings: BTreeMap<String, AesValue>,
}

impl Aes {
    /// Create a new aesthetic mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map an aesthetic to a column, or to a stat output with `..name..`.
    #[must_use]
    pub fn map(mut self, aesthetic: &str, column: &str) -> Self {
        self.mappings.insert(normalize_aesthetic(aesthetic), AesValue::parse(column));
        self
    }

    /// Map an aesthetic to a stat-computed column.
    #[must_use]
    pub fn computed(mut self, aesthetic: &str, stat_column: &str) -> Self {
        self.mappings
            .insert(normalize_aesthetic(aesthetic), AesValue::Computed(stat_column.to_string()));
        self
    }

    /// Set an aesthetic to a single constant.
    #[must_use]
    pub fn set(self, aesthetic: &str, value: impl Into<DataValue>) -> Self {
        self.set_values(aesthetic, Column::from_values(vec![value.into()]))
    }

    /// Set an aesthetic to constant values (length one or one per row).
    #[must_use]
    pub fn set_values(mut self, aesthetic: &str, values: Column) -> Self {
        self.mappings.insert(normalize_aesthetic(aesthetic), AesValue::Constant(values));
        self
    }

    /// Map x position to a column.
    #[must_use]
    pub fn x(self, column: &str) -> Self {
        self.map("x", column)
    }

    /// Map y position to a column.
    #[must_use]
    pub fn y(self, column: &str) -> Self {
        self.map("y", column)
    }

    /// Map color to a column.
    #[must_use]
    pub fn color(self, column: &str) -> Self {
        self.map("color", column)
    }

    /// Map fill color to a column.
    #[must_use]
    pub fn fill(self, column: &str) -> Self {
        self.map("fill", column)
    }

    /// Map size to a column.
    #[must_use]
    pub fn size(self, column: &str) -> Self {
        self.map("size", column)
    }

    /// Map shape to a column.
    #[must_use]
    pub fn shape(self, column: &str) -> Self {
        self.map("shape", column)
    }

    /// Map alpha/opacity to a column.
    #[must_use]
    pub fn alpha(self, column: &str) -> Self {
        self.map("alpha", column)
    }

    /// Map group to a column.
    #[must_use]
    pub fn group(self, column: &str) -> Self {
        self.map("group", column)
    }

    /// Map weight to a column.
    #[must_use]
    pub fn weight(self, column: &str) -> Self {
        self.map("weight", column)
    }

    /// Set a fixed color value.
    #[must_use]
    pub fn color_value(self, color: Rgba) -> Self {
        self.set("color", color.to_hex())
    }

    /// Set a fixed size value.
    #[must_use]
    pub fn size_value(self, size: f32) -> Self {
        self.set("size", size)
    }

    /// Set a fixed alpha value.
    #[must_use]
    pub fn alpha_value(self, alpha: f32) -> Self {
        self.set("alpha", alpha.clamp(0.0, 1.0))
    }

    /// Value mapped to an aesthetic.
    #[must_use]
    pub fn get(&self, aesthetic: &str) -> Option<&AesValue> {
        self.mappings.get(aesthetic)
    }

    /// Whether an aesthetic is mapped.
    #[must_use]
    pub fn contains(&self, aesthetic: &str) -> bool {
        self.mappings.contains_key(aesthetic)
    }

    /// Insert or replace a mapping.
    pub fn insert(&mut self, aesthetic: &str, value: AesValue) {
        self.mappings.insert(normalize_aesthetic(aesthetic), value);
    }

    /// Remove a mapping.
    pub fn remove(&mut self, aesthetic: &str) -> Option<AesValue> {
        self.mappings.remove(aesthetic)
    }

    /// `(aesthetic, value)` pairs ordered by aesthetic name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AesValue)> {
        self.mappings.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Aesthetic names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.mappings.keys().map(String::as_str)
    }

    /// Number of mapped aesthetics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Whether nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Computed aesthetics as `(aesthetic, stat column)` pairs.
    pub fn computed_aesthetics(&self) -> impl Iterator<Item = (&str, &str)> {
        self.mappings.iter().filter_map(|(k, v)| match v {
            AesValue::Computed(col) => Some((k.as_str(), col.as_str())),
            _ => None,
        })
    }

    /// Merge another Aes, with other taking precedence.
    #[must_use]
    pub fn merge(&self, other: &Aes) -> Aes {
        let mut mappings = self.mappings.clone();
        mappings.extend(other.mappings.iter().map(|(k, v)| (k.clone(), v.clone())));
        Aes { mappings }
    }

    /// Fill in mappings this Aes lacks from `fallback`.
    #[must_use]
    pub fn with_defaults(&self, fallback: &Aes) -> Aes {
        fallback.merge(self)
    }

    /// Fail with [`Error::UnknownAesthetic`] on names outside
    /// [`KNOWN_AESTHETICS`].
    pub fn validate(&self) -> Result<()> {
        match self.names().find(|name| !KNOWN_AESTHETICS.contains(name)) {
            Some(name) => Err(Error::UnknownAesthetic {
                aesthetic: name.to_string(),
                reason: "not a known aesthetic".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aes_builder() {
        let aes = Aes::new().x("xvar").y("yvar").color("category").size_value(5.0);

        assert_eq!(aes.get("x"), Some(&AesValue::Column("xvar".into())));
        assert_eq!(aes.get("color"), Some(&AesValue::Column("category".into())));
        assert_eq!(aes.get("size"), Some(&AesValue::Constant(Column::continuous([5.0]))));
        assert_eq!(aes.len(), 4);
    }

    #[test]
    fn test_dot_notation_is_computed() {
        assert_eq!(AesValue::parse("..count.."), AesValue::Computed("count".into()));
        assert_eq!(AesValue::parse("count"), AesValue::Column("count".into()));
        assert_eq!(AesValue::parse("...."), AesValue::Column("....".into()));
        let aes = Aes::new().x("a").map("y", "..density..");
        assert_eq!(aes.computed_aesthetics().collect::<Vec<_>>(), vec![("y", "density")]);
    }

    #[test]
    fn test_colour_is_normalized() {
        let aes = Aes::new().map("colour", "c");
        assert!(aes.contains("color"));
        assert!(!aes.contains("colour"));
    }

    #[test]
    fn test_aes_merge() {
        let base = Aes::new().x("x").y("y").color_value(Rgba::RED);
        let override_aes = Aes::new().y("y2").size_value(3.0);

        let merged = base.merge(&override_aes);
        assert_eq!(merged.get("x"), Some(&AesValue::Column("x".into())));
        assert_eq!(merged.get("y"), Some(&AesValue::Column("y2".into())));
        assert_eq!(merged.get("color"), Some(&AesValue::Constant(Column::discrete(["#ff0000"]))));
        assert!(merged.contains("size"));
    }

    #[test]
    fn test_with_defaults_prefers_self() {
        let layer = Aes::new().y("layer_y");
        let plot = Aes::new().x("plot_x").y("plot_y");
        let effective = layer.with_defaults(&plot);
        assert_eq!(effective.get("y"), Some(&AesValue::Column("layer_y".into())));
        assert_eq!(effective.get("x"), Some(&AesValue::Column("plot_x".into())));
    }

    #[test]
    fn test_alpha_value_clamp() {
        let aes = Aes::new().alpha_value(1.5);
        assert_eq!(aes.get("alpha"), Some(&AesValue::Constant(Column::continuous([1.0]))));
    }

    #[test]
    fn test_validate_unknown_name() {
        assert!(Aes::new().x("a").weight("w").validate().is_ok());
        let err = Aes::new().map("sparkle", "a").validate().unwrap_err();
        assert!(matches!(err, Error::UnknownAesthetic { aesthetic, .. } if aesthetic == "sparkle"));
    }
}

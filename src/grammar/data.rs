//! Tabular data for the build pipeline.
//!
//! A [`Table`] is an ordered set of named [`Column`]s of equal length. Each
//! column carries a [`ColumnKind`] decided once, when it is constructed;
//! scales, grouping and stats dispatch on that tag instead of inspecting
//! values.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};

/// A single cell value.
#[derive(Debug, Clone)]
pub enum DataValue {
    /// A numeric value.
    Number(f32),
    /// A text value.
    Text(String),
    /// A boolean value.
    Bool(bool),
    /// A missing value.
    Null,
}

impl DataValue {
    /// Get as f32, or None if not a finite number.
    #[must_use]
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            DataValue::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    /// Get as string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Whether this is a missing value (`Null` or a non-finite number).
    #[must_use]
    pub fn is_null(&self) -> bool {
        match self {
            DataValue::Null => true,
            DataValue::Number(n) => !n.is_finite(),
            _ => false,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            DataValue::Null => 0,
            DataValue::Bool(_) => 1,
            DataValue::Number(_) => 2,
            DataValue::Text(_) => 3,
        }
    }

    /// Total order: `Null < Bool < Number < Text`, numbers by value.
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (DataValue::Number(a), DataValue::Number(b)) => a.total_cmp(b),
            (DataValue::Text(a), DataValue::Text(b)) => a.cmp(b),
            (DataValue::Bool(a), DataValue::Bool(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialEq for DataValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DataValue::Number(a), DataValue::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (DataValue::Text(a), DataValue::Text(b)) => a == b,
            (DataValue::Bool(a), DataValue::Bool(b)) => a == b,
            (DataValue::Null, DataValue::Null) => true,
            _ => false,
        }
    }
}

impl Eq for DataValue {}

impl Hash for DataValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            // -0.0 == 0.0, so both must hash alike.
            DataValue::Number(n) if *n == 0.0 => 0u32.hash(state),
            DataValue::Number(n) if n.is_nan() => f32::NAN.to_bits().hash(state),
            DataValue::Number(n) => n.to_bits().hash(state),
            DataValue::Text(s) => s.hash(state),
            DataValue::Bool(b) => b.hash(state),
            DataValue::Null => {}
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Number(n) => write!(f, "{n}"),
            DataValue::Text(s) => f.write_str(s),
            DataValue::Bool(b) => write!(f, "{b}"),
            DataValue::Null => f.write_str("NA"),
        }
    }
}

impl From<f32> for DataValue {
    fn from(v: f32) -> Self {
        DataValue::Number(v)
    }
}

impl From<i32> for DataValue {
    fn from(v: i32) -> Self {
        DataValue::Number(v as f32)
    }
}

impl From<bool> for DataValue {
    fn from(v: bool) -> Self {
        DataValue::Bool(v)
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        DataValue::Text(s.to_string())
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        DataValue::Text(s)
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(DataValue::Null, Into::into)
    }
}

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Numeric measurements.
    Continuous,
    /// Unordered categories; levels sort naturally.
    Discrete,
    /// Ordered categories; levels keep first-appearance order.
    Ordinal,
}

impl ColumnKind {
    /// Discrete or ordinal.
    #[must_use]
    pub fn is_discrete(self) -> bool {
        !matches!(self, ColumnKind::Continuous)
    }
}

/// A homogeneous, tagged column of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    kind: ColumnKind,
    values: Vec<DataValue>,
}

impl Column {
    /// Numeric column.
    pub fn continuous(values: impl IntoIterator<Item = f32>) -> Self {
        Self::with_kind(ColumnKind::Continuous, values.into_iter().map(DataValue::Number).collect())
    }

    /// Numeric column with missing values.
    pub fn continuous_opt(values: impl IntoIterator<Item = Option<f32>>) -> Self {
        Self::with_kind(ColumnKind::Continuous, values.into_iter().map(DataValue::from).collect())
    }

    /// Unordered categorical column.
    pub fn discrete<V: Into<DataValue>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::with_kind(ColumnKind::Discrete, values.into_iter().map(Into::into).collect())
    }

    /// Ordered categorical column.
    pub fn ordinal<V: Into<DataValue>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::with_kind(ColumnKind::Ordinal, values.into_iter().map(Into::into).collect())
    }

    /// Infer the kind: numbers and nulls only make a continuous column,
    /// anything else a discrete one.
    #[must_use]
    pub fn from_values(values: Vec<DataValue>) -> Self {
        let numeric = values.iter().all(|v| matches!(v, DataValue::Number(_) | DataValue::Null));
        let kind = if numeric { ColumnKind::Continuous } else { ColumnKind::Discrete };
        Self::with_kind(kind, values)
    }

    /// A column of `n` copies of `value`.
    #[must_use]
    pub fn repeat(kind: ColumnKind, value: &DataValue, n: usize) -> Self {
        Self::with_kind(kind, vec![value.clone(); n])
    }

    /// Build with an explicit kind.
    #[must_use]
    pub fn with_kind(kind: ColumnKind, values: Vec<DataValue>) -> Self {
        Self { kind, values }
    }

    /// Semantic kind.
    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the column has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values.
    #[must_use]
    pub fn values(&self) -> &[DataValue] {
        &self.values
    }

    /// Value at `row`.
    #[must_use]
    pub fn get(&self, row: usize) -> Option<&DataValue> {
        self.values.get(row)
    }

    /// Values as optional numbers (non-numbers become `None`).
    #[must_use]
    pub fn numbers(&self) -> Vec<Option<f32>> {
        self.values.iter().map(DataValue::as_f32).collect()
    }

    /// The finite numeric values, skipping missing ones.
    #[must_use]
    pub fn finite_numbers(&self) -> Vec<f32> {
        self.values.iter().filter_map(DataValue::as_f32).collect()
    }

    /// Rows `rows`, in that order.
    #[must_use]
    pub fn take(&self, rows: &[usize]) -> Self {
        let values = rows.iter().map(|&i| self.values.get(i).cloned().unwrap_or(DataValue::Null));
        Self::with_kind(self.kind, values.collect())
    }

    /// Repeat a length-one column to `n` rows; other lengths are returned
    /// unchanged.
    #[must_use]
    pub fn broadcast(&self, n: usize) -> Self {
        match self.values.as_slice() {
            [only] => Self::repeat(self.kind, only, n),
            _ => self.clone(),
        }
    }

    /// Whether every value equals the first.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.values.windows(2).all(|w| w[0] == w[1])
    }

    /// Distinct non-missing values: sorted for continuous and discrete
    /// columns, in first-appearance order for ordinal ones.
    #[must_use]
    pub fn levels(&self) -> Vec<DataValue> {
        let mut seen = HashSet::new();
        let mut out: Vec<DataValue> = self
            .values
            .iter()
            .filter(|v| !v.is_null() && seen.insert((*v).clone()))
            .cloned()
            .collect();
        if self.kind != ColumnKind::Ordinal {
            out.sort_by(DataValue::total_cmp);
        }
        out
    }
}

/// An ordered collection of named, equal-length columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<(String, Column)>,
    n_rows: usize,
}

impl Table {
    /// Create a new empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from x and y arrays, truncated to the shorter one.
    #[must_use]
    pub fn from_xy(x: &[f32], y: &[f32]) -> Self {
        let n = x.len().min(y.len());
        let mut table = Self::new();
        table.columns.push(("x".into(), Column::continuous(x[..n].iter().copied())));
        table.columns.push(("y".into(), Column::continuous(y[..n].iter().copied())));
        table.n_rows = n;
        table
    }

    /// A table holding a single column.
    #[must_use]
    pub fn from_column(name: &str, column: Column) -> Self {
        Self { n_rows: column.len(), columns: vec![(name.to_string(), column)] }
    }

    /// Builder form of [`Table::insert`].
    pub fn with_column(mut self, name: &str, column: Column) -> Result<Self> {
        self.insert(name, column)?;
        Ok(self)
    }

    /// Add or replace a column. Replacing keeps the column's position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataLength`] when the length differs from the
    /// table's row count (the first column of an empty table sets it).
    pub fn insert(&mut self, name: &str, column: Column) -> Result<()> {
        let replaces_only = self.columns.len() == 1 && self.columns[0].0 == name;
        if !self.columns.is_empty() && !replaces_only && column.len() != self.n_rows {
            return Err(Error::DataLength {
                aesthetic: name.to_string(),
                len: column.len(),
                rows: self.n_rows,
            });
        }
        self.n_rows = column.len();
        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = column,
            None => self.columns.push((name.to_string(), column)),
        }
        Ok(())
    }

    /// Remove a column.
    pub fn remove(&mut self, name: &str) -> Option<Column> {
        let idx = self.columns.iter().position(|(n, _)| n == name)?;
        let (_, column) = self.columns.remove(idx);
        if self.columns.is_empty() {
            self.n_rows = 0;
        }
        Some(column)
    }

    /// Get a column.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    /// Get a column or fail with [`Error::MissingColumn`].
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.get(name).ok_or_else(|| Error::MissingColumn { column: name.to_string() })
    }

    /// Numeric view of a column.
    #[must_use]
    pub fn numbers(&self, name: &str) -> Option<Vec<Option<f32>>> {
        self.get(name).map(Column::numbers)
    }

    /// Get number of rows.
    #[must_use]
    pub fn nrow(&self) -> usize {
        self.n_rows
    }

    /// Get number of columns.
    #[must_use]
    pub fn ncol(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Check if a column exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// `(name, column)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(n, c)| (n.as_str(), c))
    }

    /// Rows `rows`, in that order, across every column.
    #[must_use]
    pub fn take(&self, rows: &[usize]) -> Self {
        Self {
            columns: self.columns.iter().map(|(n, c)| (n.clone(), c.take(rows))).collect(),
            n_rows: rows.len(),
        }
    }

    /// Row indices where `column == value`.
    #[must_use]
    pub fn rows_where(&self, column: &str, value: &DataValue) -> Vec<usize> {
        self.get(column).map_or_else(Vec::new, |c| {
            c.values().iter().enumerate().filter(|(_, v)| *v == value).map(|(i, _)| i).collect()
        })
    }

    /// The rows where `column == value`, as a new table.
    #[must_use]
    pub fn filter_eq(&self, column: &str, value: &DataValue) -> Self {
        self.take(&self.rows_where(column, value))
    }

    /// Partition row indices by the combined values of `keys`, ordered by
    /// key. Rows keep their relative order inside a partition. Absent key
    /// columns count as `Null`.
    #[must_use]
    pub fn partition(&self, keys: &[&str]) -> Vec<Vec<usize>> {
        let cols: Vec<Option<&Column>> = keys.iter().map(|k| self.get(k)).collect();
        let mut parts: BTreeMap<Vec<OrdValue>, Vec<usize>> = BTreeMap::new();
        for row in 0..self.n_rows {
            let key = cols
                .iter()
                .map(|c| OrdValue(c.and_then(|c| c.get(row)).cloned().unwrap_or(DataValue::Null)))
                .collect();
            parts.entry(key).or_default().push(row);
        }
        parts.into_values().collect()
    }

    /// Stack tables vertically. Columns are the union in first-seen order;
    /// cells missing from a table are `Null`. A column that is discrete in
    /// any input is discrete in the output.
    #[must_use]
    pub fn concat(tables: &[Table]) -> Self {
        let mut names: Vec<(String, ColumnKind)> = Vec::new();
        for table in tables {
            for (name, column) in table.iter() {
                match names.iter_mut().find(|(n, _)| n == name) {
                    Some((_, kind)) => {
                        if !kind.is_discrete() && column.kind().is_discrete() {
                            *kind = column.kind();
                        }
                    }
                    None => names.push((name.to_string(), column.kind())),
                }
            }
        }

        let n_rows = tables.iter().map(Table::nrow).sum();
        let columns = names
            .into_iter()
            .map(|(name, kind)| {
                let mut values = Vec::with_capacity(n_rows);
                for table in tables {
                    match table.get(&name) {
                        Some(c) => values.extend(c.values().iter().cloned()),
                        None => values.extend(std::iter::repeat(DataValue::Null).take(table.nrow())),
                    }
                }
                (name, Column::with_kind(kind, values))
            })
            .collect();
        Self { columns, n_rows }
    }
}

/// Wrapper giving [`DataValue`] a total `Ord` for use as a map key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OrdValue(pub(crate) DataValue);

impl PartialOrd for OrdValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

//! Position adjustments.
//!
//! Adjustments run after stats and reparameterisation. They only rewrite
//! position columns; row count and row order are preserved, and rows are
//! only ever moved relative to rows of the same panel.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;

use super::data::{Column, DataValue, Table};

/// Seed used by [`Position::jitter`].
pub const DEFAULT_JITTER_SEED: u64 = 0x6767;

/// Smallest gap between distinct finite values, or 1 when there is none.
#[must_use]
pub fn resolution(values: &[f32]) -> f32 {
    let mut sorted: Vec<f32> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f32::total_cmp);
    sorted.dedup();
    sorted
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| *d > f32::EPSILON)
        .fold(None, |acc: Option<f32>, d| Some(acc.map_or(d, |a| a.min(d))))
        .unwrap_or(1.0)
}

/// Position adjustment type.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Position {
    /// Leave positions alone.
    #[default]
    Identity,
    /// Stack y values at the same x, in group order.
    Stack,
    /// Place groups at the same x side by side.
    Dodge {
        /// Total width of the dodged slot; defaults to each row's extent.
        width: Option<f32>,
    },
    /// Add seeded uniform noise.
    Jitter {
        /// Maximum horizontal offset; defaults to 40% of the x resolution.
        width: Option<f32>,
        /// Maximum vertical offset; defaults to 40% of the y resolution.
        height: Option<f32>,
        /// Random seed.
        seed: u64,
    },
}

impl Position {
    /// No adjustment.
    #[must_use]
    pub fn identity() -> Self {
        Position::Identity
    }

    /// Stack overlapping rows.
    #[must_use]
    pub fn stack() -> Self {
        Position::Stack
    }

    /// Dodge overlapping rows.
    #[must_use]
    pub fn dodge() -> Self {
        Position::Dodge { width: None }
    }

    /// Jitter with default amounts and seed.
    #[must_use]
    pub fn jitter() -> Self {
        Position::Jitter { width: None, height: None, seed: DEFAULT_JITTER_SEED }
    }

    /// Name of the adjustment.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Position::Identity => "position_identity",
            Position::Stack => "position_stack",
            Position::Dodge { .. } => "position_dodge",
            Position::Jitter { .. } => "position_jitter",
        }
    }

    /// Apply the adjustment to a layer's data.
    pub fn adjust(&self, data: Table) -> Result<Table> {
        if data.is_empty() {
            return Ok(data);
        }
        match *self {
            Position::Identity => Ok(data),
            Position::Stack => stack(data),
            Position::Dodge { width } => dodge(data, width),
            Position::Jitter { width, height, seed } => jitter(data, width, height, seed),
        }
    }
}

fn numbers(data: &Table, name: &str) -> Vec<Option<f32>> {
    data.numbers(name).unwrap_or_else(|| vec![None; data.nrow()])
}

fn group_order(data: &Table, rows: &mut [usize]) {
    if let Some(group) = data.get("group") {
        rows.sort_by(|&a, &b| {
            let ga = group.get(a).cloned().unwrap_or(DataValue::Null);
            let gb = group.get(b).cloned().unwrap_or(DataValue::Null);
            ga.total_cmp(&gb)
        });
    }
}

fn stack(mut data: Table) -> Result<Table> {
    if !data.has_column("x") || !data.has_column("y") {
        return Ok(data);
    }
    let y = numbers(&data, "y");
    let mut ymin = vec![None; data.nrow()];
    let mut ymax = vec![None; data.nrow()];
    let mut out_y = y.clone();

    for mut rows in data.partition(&["PANEL", "x"]) {
        group_order(&data, &mut rows);
        let (mut up, mut down) = (0.0f32, 0.0f32);
        for row in rows {
            let Some(h) = y[row] else { continue };
            if h >= 0.0 {
                ymin[row] = Some(up);
                up += h;
                ymax[row] = Some(up);
                out_y[row] = Some(up);
            } else {
                ymax[row] = Some(down);
                down += h;
                ymin[row] = Some(down);
                out_y[row] = Some(down);
            }
        }
    }

    data.insert("ymin", Column::continuous_opt(ymin))?;
    data.insert("ymax", Column::continuous_opt(ymax))?;
    data.insert("y", Column::continuous_opt(out_y))?;
    Ok(data)
}

fn dodge(mut data: Table, width: Option<f32>) -> Result<Table> {
    if !data.has_column("x") {
        return Ok(data);
    }
    let x = numbers(&data, "x");
    let default_half = width.unwrap_or_else(|| 0.9 * resolution(&x.iter().flatten().copied().collect::<Vec<_>>())) / 2.0;
    let mut xmin: Vec<Option<f32>> = if width.is_none() && data.has_column("xmin") {
        numbers(&data, "xmin")
    } else {
        x.iter().map(|v| v.map(|v| v - default_half)).collect()
    };
    let mut xmax: Vec<Option<f32>> = if width.is_none() && data.has_column("xmax") {
        numbers(&data, "xmax")
    } else {
        x.iter().map(|v| v.map(|v| v + default_half)).collect()
    };
    let mut out_x = x.clone();

    for rows in data.partition(&["PANEL", "x"]) {
        let mut groups: Vec<DataValue> = rows
            .iter()
            .map(|&r| data.get("group").and_then(|g| g.get(r)).cloned().unwrap_or(DataValue::Null))
            .collect();
        let row_groups = groups.clone();
        groups.sort_by(DataValue::total_cmp);
        groups.dedup();
        let n = groups.len().max(1) as f32;

        for (&row, g) in rows.iter().zip(&row_groups) {
            let (Some(lo), Some(hi)) = (xmin[row], xmax[row]) else { continue };
            let slot = (hi - lo) / n;
            let i = groups.iter().position(|v| v == g).unwrap_or(0) as f32;
            let new_lo = lo + i * slot;
            xmin[row] = Some(new_lo);
            xmax[row] = Some(new_lo + slot);
            out_x[row] = Some(new_lo + slot / 2.0);
        }
    }

    data.insert("xmin", Column::continuous_opt(xmin))?;
    data.insert("xmax", Column::continuous_opt(xmax))?;
    data.insert("x", Column::continuous_opt(out_x))?;
    Ok(data)
}

fn jitter(mut data: Table, width: Option<f32>, height: Option<f32>, seed: u64) -> Result<Table> {
    let mut rng = StdRng::seed_from_u64(seed);
    for (axis, amount) in [("x", width), ("y", height)] {
        if !data.has_column(axis) {
            continue;
        }
        let values = numbers(&data, axis);
        let amount = amount
            .unwrap_or_else(|| 0.4 * resolution(&values.iter().flatten().copied().collect::<Vec<_>>()))
            .abs();
        if amount <= 0.0 {
            continue;
        }
        let jittered: Vec<Option<f32>> =
            values.iter().map(|v| v.map(|v| v + rng.random_range(-amount..=amount))).collect();
        data.insert(axis, Column::continuous_opt(jittered))?;
    }
    Ok(data)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn adjustments_preserve_row_count(
            ys in prop::collection::vec(-10.0f32..10.0, 1..30),
            which in 0usize..4,
        ) {
            let n = ys.len();
            let xs: Vec<f32> = (0..n).map(|i| (i % 3) as f32).collect();
            let data = Table::from_xy(&xs, &ys)
                .with_column("group", Column::ordinal((0..n).map(|i| (i % 2) as i32)))
                .unwrap();
            let position = [Position::identity(), Position::stack(), Position::dodge(), Position::jitter()][which];
            let out = position.adjust(data).unwrap();
            prop_assert_eq!(out.nrow(), n);
        }
    }
}

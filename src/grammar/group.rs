//! Group assignment.
//!
//! Rows that share the values of every discrete column form a group. Group
//! ids are dense, 1-based, and ordered by the sorted key combinations.

use crate::error::Result;

use super::data::{Column, DataValue, Table};

/// Columns never used to derive groups.
const IGNORED: &[&str] = &["label", "PANEL"];

/// Discrete (or ordinal) columns that define groups.
#[must_use]
pub fn discrete_columns(data: &Table) -> Vec<String> {
    data.iter()
        .filter(|(name, column)| column.kind().is_discrete() && !IGNORED.contains(name))
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Dense 1-based id of each row's combination of `columns` values. Unused
/// combinations get no id.
#[must_use]
pub fn ninteraction(data: &Table, columns: &[&str]) -> Vec<u32> {
    let mut ids = vec![0u32; data.nrow()];
    for (i, rows) in data.partition(columns).into_iter().enumerate() {
        for row in rows {
            ids[row] = i as u32 + 1;
        }
    }
    ids
}

/// Ensure `data` has a dense `group` column.
///
/// An existing `group` is re-enumerated; otherwise groups come from the
/// discrete columns (except `label` and `PANEL`), or every row is group 1.
pub fn add_group(mut data: Table) -> Result<Table> {
    if data.is_empty() {
        return Ok(data);
    }

    let ids = if data.has_column("group") {
        ninteraction(&data, &["group"])
    } else {
        let discrete = discrete_columns(&data);
        if discrete.is_empty() {
            vec![1; data.nrow()]
        } else {
            let keys: Vec<&str> = discrete.iter().map(String::as_str).collect();
            ninteraction(&data, &keys)
        }
    };

    data.insert("group", group_column(ids))?;
    Ok(data)
}

/// Ordinal column of group ids.
#[must_use]
pub fn group_column(ids: Vec<u32>) -> Column {
    Column::ordinal(ids.into_iter().map(|id| DataValue::Number(id as f32)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colored() -> Table {
        Table::from_xy(&[1.0, 2.0, 3.0, 4.0], &[1.0, 1.0, 2.0, 2.0])
            .with_column("color", Column::discrete(["red", "blue", "red", "green"]))
            .unwrap()
    }

    fn groups(t: &Table) -> Vec<Option<f32>> {
        t.numbers("group").unwrap()
    }

    #[test]
    fn test_no_discrete_columns_single_group() {
        let t = add_group(Table::from_xy(&[1.0, 2.0], &[2.0, 3.0])).unwrap();
        assert_eq!(groups(&t), vec![Some(1.0), Some(1.0)]);
    }

    #[test]
    fn test_groups_follow_discrete_values() {
        let t = add_group(colored()).unwrap();
        // blue=1, green=2, red=3
        assert_eq!(groups(&t), vec![Some(3.0), Some(1.0), Some(3.0), Some(2.0)]);
    }

    #[test]
    fn test_label_is_ignored() {
        let t = Table::from_xy(&[1.0, 2.0], &[1.0, 2.0])
            .with_column("label", Column::discrete(["a", "b"]))
            .unwrap();
        assert_eq!(groups(&add_group(t).unwrap()), vec![Some(1.0), Some(1.0)]);
    }

    #[test]
    fn test_existing_group_is_compacted() {
        let t = Table::from_xy(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0])
            .with_column("group", Column::continuous([10.0, 40.0, 10.0]))
            .unwrap();
        assert_eq!(groups(&add_group(t).unwrap()), vec![Some(1.0), Some(2.0), Some(1.0)]);
    }

    #[test]
    fn test_empty_unchanged() {
        let t = add_group(Table::new()).unwrap();
        assert!(!t.has_column("group"));
    }

    #[test]
    fn test_ninteraction_multiple_columns() {
        let t = colored().with_column("shape", Column::discrete(["a", "a", "b", "a"])).unwrap();
        let ids = ninteraction(&t, &["color", "shape"]);
        // (blue,a)=1 (green,a)=2 (red,a)=3 (red,b)=4
        assert_eq!(ids, vec![3, 1, 4, 2]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn add_group_is_idempotent(labels in prop::collection::vec(0u8..5, 1..40)) {
            let n = labels.len();
            let xs: Vec<f32> = (0..n).map(|i| i as f32).collect();
            let t = Table::from_xy(&xs, &xs)
                .with_column("c", Column::discrete(labels.iter().map(|l| format!("k{l}"))))
                .unwrap();
            let once = add_group(t).unwrap();
            let twice = add_group(once.clone()).unwrap();
            prop_assert_eq!(once.get("group"), twice.get("group"));
        }

        #[test]
        fn equal_keys_share_a_group(labels in prop::collection::vec(0u8..4, 1..40)) {
            let n = labels.len();
            let xs: Vec<f32> = (0..n).map(|i| i as f32).collect();
            let t = add_group(
                Table::from_xy(&xs, &xs)
                    .with_column("c", Column::discrete(labels.iter().map(|l| format!("k{l}"))))
                    .unwrap(),
            )
            .unwrap();
            let g = t.numbers("group").unwrap();
            for i in 0..n {
                for j in 0..n {
                    prop_assert_eq!(labels[i] == labels[j], g[i] == g[j]);
                }
            }
        }
    }
}

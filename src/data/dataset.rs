use std::collections::{HashMap, HashSet};

use polars::prelude::*;

use crate::error::LoadError;

/// A loaded datafile: named `f64` columns of equal length.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
}

impl Dataset {
    /// Build from column-major data. Every column must have the same length.
    /// Repeated names get `.1`, `.2`, ... suffixes in order of appearance.
    pub fn from_columns(names: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self, LoadError> {
        let columns: Vec<Column> = unique_names(names)
            .into_iter()
            .zip(columns)
            .map(|(name, values)| Column::new(name.as_str().into(), values))
            .collect();
        let frame = DataFrame::new(columns)?;
        Ok(Self { frame })
    }

    pub fn row_count(&self) -> usize {
        self.frame.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Values of one column, with nulls as NaN.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let column = self.frame.column(name).ok()?;
        let values = column.as_materialized_series().f64().ok()?;
        Some(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}

fn unique_names(names: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut unique = Vec::with_capacity(names.len());
    for name in names {
        let mut candidate = name.clone();
        while seen.contains(&candidate) {
            let n = counts.entry(name.clone()).or_insert(0);
            *n += 1;
            candidate = format!("{name}.{n}");
        }
        seen.insert(candidate.clone());
        unique.push(candidate);
    }
    unique
}

/// Every loaded datafile, keyed by the path string used in the configuration.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    sets: HashMap<String, Dataset>,
    /// Creation date shown in page footers: today, unless a MAT file carries one.
    pub date_created: String,
}

impl Default for DatasetStore {
    fn default() -> Self {
        Self {
            sets: HashMap::new(),
            date_created: chrono::Local::now().date_naive().to_string(),
        }
    }
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, dataset: Dataset) {
        self.sets.insert(key.into(), dataset);
    }

    pub fn get(&self, key: &str) -> Option<&Dataset> {
        self.sets.get(key)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_round_trip_through_frame() {
        let ds = Dataset::from_columns(
            vec!["Time".into(), "x".into()],
            vec![vec![0.0, 0.5, 1.0], vec![1.0, f64::NAN, 3.0]],
        )
        .unwrap();
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.column_names(), vec!["Time", "x"]);
        assert_eq!(ds.column("Time"), Some(vec![0.0, 0.5, 1.0]));
        assert!(ds.column("x").unwrap()[1].is_nan());
        assert!(ds.column("missing").is_none());
    }

    #[test]
    fn repeated_names_are_suffixed() {
        let ds = Dataset::from_columns(
            vec!["Time".into(), "alt".into(), "alt".into(), "alt.1".into(), "alt".into()],
            vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0], vec![4.0]],
        )
        .unwrap();
        assert_eq!(
            ds.column_names(),
            vec!["Time", "alt", "alt.1", "alt.1.1", "alt.2"]
        );
        assert_eq!(ds.column("alt.1"), Some(vec![2.0]));
        assert_eq!(ds.column("alt.2"), Some(vec![4.0]));
    }

    #[test]
    fn mismatched_lengths_fail() {
        let result = Dataset::from_columns(
            vec!["a".into(), "b".into()],
            vec![vec![1.0, 2.0], vec![1.0]],
        );
        assert!(result.is_err());
    }
}

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::Result;

const CONSUMPTION_SUFFIX: &str = " (consumption)";

/// A time-indexed table of numeric columns.
///
/// Rows are keyed by UTC instants; the timezone only decides how timestamps
/// are presented. Missing cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    tz: Tz,
    columns: Vec<String>,
    rows: BTreeMap<DateTime<Utc>, Vec<Option<f64>>>,
}

/// One row of [`Table::to_records`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub timestamp: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, Option<f64>>,
}

impl Table {
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            columns: Vec::new(),
            rows: BTreeMap::new(),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row timestamps in ascending order, in the table's timezone.
    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Tz>> + '_ {
        self.rows.keys().map(move |t| t.with_timezone(&self.tz))
    }

    pub fn first(&self) -> Option<DateTime<Tz>> {
        self.rows.keys().next().map(|t| t.with_timezone(&self.tz))
    }

    pub fn last(&self) -> Option<DateTime<Tz>> {
        self.rows.keys().next_back().map(|t| t.with_timezone(&self.tz))
    }

    fn column_index(&mut self, name: &str) -> usize {
        if let Some(i) = self.columns.iter().position(|c| c == name) {
            return i;
        }
        self.columns.push(name.to_string());
        for row in self.rows.values_mut() {
            row.push(None);
        }
        self.columns.len() - 1
    }

    pub fn set(&mut self, at: DateTime<Utc>, column: &str, value: f64) {
        let idx = self.column_index(column);
        let width = self.columns.len();
        let row = self.rows.entry(at).or_insert_with(|| vec![None; width]);
        row[idx] = Some(value);
    }

    pub fn get(&self, at: DateTime<Utc>, column: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(&at).and_then(|row| row[idx])
    }

    /// All cells of one column in timestamp order.
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.values().map(|row| row[idx]).collect())
    }

    /// Fold `other` into `self`; where both hold a value, `other` wins.
    pub fn merge(&mut self, other: Table) {
        let indices: Vec<usize> = other
            .columns
            .iter()
            .map(|c| self.column_index(c))
            .collect();
        let width = self.columns.len();
        for (at, cells) in other.rows {
            let row = self.rows.entry(at).or_insert_with(|| vec![None; width]);
            for (&idx, cell) in indices.iter().zip(cells) {
                if cell.is_some() {
                    row[idx] = cell;
                }
            }
        }
    }

    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }

    /// Keep rows with `start <= t <= end`.
    pub fn truncate(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.rows.retain(|t, _| *t >= start && *t <= end);
        self
    }

    pub fn rename_column(&mut self, from: &str, to: &str) {
        if let Some(c) = self.columns.iter_mut().find(|c| *c == from) {
            *c = to.to_string();
        }
    }

    pub fn prefix_columns(mut self, prefix: &str) -> Self {
        for c in &mut self.columns {
            *c = format!("{prefix}{c}");
        }
        self
    }

    /// Drop columns whose every cell is exactly zero.
    pub fn drop_zero_columns(mut self) -> Self {
        let keep: Vec<bool> = (0..self.columns.len())
            .map(|i| self.rows.values().any(|row| row[i] != Some(0.0)))
            .collect();
        if keep.iter().all(|k| *k) {
            return self;
        }
        let mut it = keep.iter();
        self.columns.retain(|_| *it.next().unwrap_or(&true));
        for row in self.rows.values_mut() {
            let mut it = keep.iter();
            row.retain(|_| *it.next().unwrap_or(&true));
        }
        self
    }

    /// Collapse every `X` / `X (consumption)` pair into one signed `X` column.
    pub fn nett(self) -> Self {
        let mut out = Table::new(self.tz);
        let mut bases: Vec<&str> = Vec::new();
        for c in &self.columns {
            let base = c.strip_suffix(CONSUMPTION_SUFFIX).unwrap_or(c);
            if !bases.contains(&base) {
                bases.push(base);
            }
        }
        let index = |name: &str| self.columns.iter().position(|c| c == name);
        for base in bases {
            let produced = index(base);
            let consumed = index(&format!("{base}{CONSUMPTION_SUFFIX}"));
            for (at, row) in &self.rows {
                let p = produced.and_then(|i| row[i]);
                let c = consumed.and_then(|i| row[i]);
                let value = match (p, c) {
                    (None, None) => continue,
                    (p, c) => p.unwrap_or(0.0) - c.unwrap_or(0.0),
                };
                out.set(*at, base, value);
            }
        }
        out
    }

    /// Rows present in both tables, columns of `self` then `other`.
    pub fn inner_join(self, other: Table) -> Self {
        let mut out = Table::new(self.tz);
        out.columns = self.columns.iter().chain(&other.columns).cloned().collect();
        for (at, mut row) in self.rows {
            if let Some(right) = other.rows.get(&at) {
                row.extend_from_slice(right);
                out.rows.insert(at, row);
            }
        }
        out
    }

    /// Union of both row sets with every column forward-filled.
    pub fn outer_join_ffill(self, other: Table) -> Self {
        let mut out = Table::new(self.tz);
        out.columns = self.columns.iter().chain(&other.columns).cloned().collect();
        let (lw, rw) = (self.columns.len(), other.columns.len());
        let mut stamps: Vec<DateTime<Utc>> = self.rows.keys().chain(other.rows.keys()).copied().collect();
        stamps.sort();
        stamps.dedup();

        let mut last: Vec<Option<f64>> = vec![None; lw + rw];
        for at in stamps {
            let left = self.rows.get(&at);
            let right = other.rows.get(&at);
            for i in 0..lw {
                if let Some(v) = left.and_then(|r| r[i]) {
                    last[i] = Some(v);
                }
            }
            for i in 0..rw {
                if let Some(v) = right.and_then(|r| r[i]) {
                    last[lw + i] = Some(v);
                }
            }
            out.rows.insert(at, last.clone());
        }
        out
    }

    pub fn to_records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|(at, row)| Record {
                timestamp: at.with_timezone(&self.tz).to_rfc3339(),
                values: self.columns.iter().cloned().zip(row.iter().copied()).collect(),
            })
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_records())?)
    }
}

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

/// A single cell of a loaded ticket export.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Number(f64),
    Null,
}

impl CellValue {
    /// Builds a cell from a raw CSV field. Empty fields become `Null`.
    pub fn from_field(field: &str) -> Self {
        if field.is_empty() {
            CellValue::Null
        } else {
            CellValue::Text(field.to_string())
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

/// Ordered rows sharing one ordered header list.
///
/// Rows are always exactly as wide as the header list; `push_row` pads
/// short rows with `Null` and truncates long ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<CellValue>>,
}

impl RecordSet {
    pub fn new(headers: Vec<String>) -> Self {
        let mut index = HashMap::new();
        for (i, h) in headers.iter().enumerate() {
            index.entry(h.clone()).or_insert(i);
        }
        RecordSet {
            headers,
            index,
            rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn has_column(&self, col: &str) -> bool {
        self.index.contains_key(col)
    }

    pub fn column_index(&self, col: &str) -> Option<usize> {
        self.index.get(col).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.headers.len(), CellValue::Null);
        self.rows.push(row);
    }

    /// Cell of `col` in row `row`, `None` if either is out of range.
    pub fn get(&self, row: usize, col: &str) -> Option<&CellValue> {
        let idx = self.column_index(col)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// An empty set with the same headers.
    pub fn empty_like(&self) -> Self {
        RecordSet {
            headers: self.headers.clone(),
            index: self.index.clone(),
            rows: Vec::new(),
        }
    }

    /// Stable filter: keeps the headers and the relative order of kept rows.
    pub fn filter<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&[CellValue]) -> bool,
    {
        let mut out = self.empty_like();
        out.rows = self
            .rows
            .iter()
            .filter(|r| keep(r.as_slice()))
            .cloned()
            .collect();
        out
    }

    /// Drops the named columns that exist; returns the names that were absent.
    pub fn drop_columns(&mut self, columns: &[String]) -> Vec<String> {
        let to_drop: HashSet<&str> = columns.iter().map(String::as_str).collect();
        let missing: Vec<String> = columns
            .iter()
            .filter(|c| !self.has_column(c))
            .cloned()
            .collect();

        let keep: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !to_drop.contains(h.as_str()))
            .map(|(i, _)| i)
            .collect();
        if keep.len() == self.headers.len() {
            return missing;
        }

        let headers: Vec<String> = keep.iter().map(|&i| self.headers[i].clone()).collect();
        let rows: Vec<Vec<CellValue>> = std::mem::take(&mut self.rows)
            .into_iter()
            .map(|mut row| keep.iter().map(|&i| std::mem::replace(&mut row[i], CellValue::Null)).collect())
            .collect();

        *self = RecordSet::new(headers);
        self.rows = rows;
        missing
    }

    /// Appends a column, or replaces it in place if it already exists.
    /// `values` must hold one cell per row.
    pub fn set_column(&mut self, name: &str, values: Vec<CellValue>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.index.insert(name.to_string(), self.headers.len());
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    /// Mutable access to every cell of one column.
    pub fn column_cells_mut(&mut self, col: &str) -> Option<impl Iterator<Item = &mut CellValue>> {
        let idx = self.column_index(col)?;
        Some(self.rows.iter_mut().map(move |r| &mut r[idx]))
    }

    /// Distinct text values of a column in first-seen order. Nulls are skipped.
    pub fn distinct_text(&self, col: &str) -> Vec<String> {
        let Some(idx) = self.column_index(col) else {
            return Vec::new();
        };
        let mut seen: HashSet<&str> = HashSet::new();
        let mut out = Vec::new();
        for row in &self.rows {
            if let Some(s) = row[idx].as_text() {
                if seen.insert(s) {
                    out.push(s.to_string());
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseWarning {
    pub line: usize,
    pub message: String,
}

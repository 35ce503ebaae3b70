//! Numeric encoding and validation of tabular input
//!
//! Every cell is mapped into the message domain `0..=MESSAGE_DOMAIN_MAX` before
//! any cryptographic work starts. A single bad cell rejects the whole table.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CellPosition, PrepError, PrepResult};

/// Largest plaintext value a cell may carry
///
/// Tied to the 3-bit shortint parameter set. Changing it is a breaking change
/// for every consumer of submitted ciphertexts.
pub const MESSAGE_DOMAIN_MAX: u8 = 7;

/// A scalar cell as delivered by the upload collaborator
///
/// `Bool` and `Null` are accepted on input so they fail per cell, with a
/// position, instead of failing deserialization of the whole table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Null,
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// One input row: column name to value, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, CellValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(column, value);
        self
    }

    /// Insert or replace a cell, keeping the column's original position
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Column names in insertion order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = Row;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of column names to scalar values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Row, A::Error> {
                let mut row = Row::new();
                while let Some((column, value)) = access.next_entry::<String, CellValue>()? {
                    row.insert(column, value);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

/// Ordered rows of a table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabularInput {
    rows: Vec<Row>,
}

impl TabularInput {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<Vec<Row>> for TabularInput {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}

/// Row-major matrix of validated cell values plus the header order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMatrix {
    headers: Vec<String>,
    rows: Vec<Vec<u8>>,
}

impl EncodedMatrix {
    /// Build a matrix from already-encoded values, enforcing shape and domain
    pub fn new(headers: Vec<String>, rows: Vec<Vec<u8>>) -> PrepResult<Self> {
        if rows.is_empty() {
            return Err(PrepError::EmptyInput("no rows"));
        }
        if headers.is_empty() {
            return Err(PrepError::EmptyInput("no columns"));
        }

        for (r, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(PrepError::ShapeMismatch { row: r });
            }
            if let Some(c) = row.iter().position(|&v| v > MESSAGE_DOMAIN_MAX) {
                return Err(PrepError::OutOfDomain {
                    position: CellPosition::new(r, c, &headers[c]),
                    max: MESSAGE_DOMAIN_MAX,
                });
            }
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn get(&self, row: usize, column: usize) -> Option<u8> {
        self.rows.get(row).and_then(|r| r.get(column)).copied()
    }

    pub fn position(&self, row: usize, column: usize) -> CellPosition {
        CellPosition::new(row, column, &self.headers[column])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellFault {
    OutOfDomain,
    Unparseable,
}

fn in_domain(value: f64) -> bool {
    (0.0..=f64::from(MESSAGE_DOMAIN_MAX)).contains(&value)
}

/// Longest leading decimal literal of `text`, read the way JavaScript's
/// `parseFloat` reads it
///
/// Leading whitespace is skipped and trailing garbage ignored: `"5 kg"` is 5,
/// `"0x3"` is 0. `None` when the text does not start with a number.
fn parse_leading_float(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let digits = |from: usize| {
        bytes
            .get(from..)
            .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if s[end..].starts_with("Infinity") {
        return Some(if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_digits = digits(end);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits(end + 1);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    // An exponent only counts when it has digits: "1e" reads as 1
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    s[..end].parse().ok()
}

/// Map one cell into the message domain
///
/// Integers pass through. Text is read as a leading float and truncated
/// toward zero, after the untruncated value passed the range check.
/// Non-integral numbers are not integer-compatible and are rejected.
fn encode_cell(value: &CellValue) -> Result<u8, CellFault> {
    match value {
        CellValue::Integer(v) => u8::try_from(*v)
            .ok()
            .filter(|v| *v <= MESSAGE_DOMAIN_MAX)
            .ok_or(CellFault::OutOfDomain),
        CellValue::Float(v) => {
            if v.is_nan() || (v.is_finite() && v.fract() != 0.0) {
                return Err(CellFault::Unparseable);
            }
            if !in_domain(*v) {
                return Err(CellFault::OutOfDomain);
            }
            Ok(*v as u8)
        }
        CellValue::Text(s) => {
            let v = parse_leading_float(s).ok_or(CellFault::Unparseable)?;
            if !in_domain(v) {
                return Err(CellFault::OutOfDomain);
            }
            Ok(v.trunc() as u8)
        }
        CellValue::Bool(_) | CellValue::Null => Err(CellFault::Unparseable),
    }
}

fn headers_of(input: &TabularInput) -> PrepResult<Vec<String>> {
    let first = input
        .rows()
        .first()
        .ok_or(PrepError::EmptyInput("no rows"))?;
    if first.is_empty() {
        return Err(PrepError::EmptyInput("no columns"));
    }
    Ok(first.columns().map(str::to_owned).collect())
}

fn same_columns(row: &Row, headers: &[String]) -> bool {
    row.len() == headers.len() && headers.iter().all(|h| row.get(h).is_some())
}

/// Convert a table into an [`EncodedMatrix`]
///
/// Pure and deterministic. Headers come from the first row, in order.
pub fn encode(input: &TabularInput) -> PrepResult<EncodedMatrix> {
    let headers = headers_of(input)?;

    let rows = input
        .rows()
        .iter()
        .enumerate()
        .map(|(r, row)| {
            if !same_columns(row, &headers) {
                return Err(PrepError::ShapeMismatch { row: r });
            }

            headers
                .iter()
                .enumerate()
                .map(|(c, header)| {
                    let value = row.get(header).ok_or(PrepError::ShapeMismatch { row: r })?;
                    encode_cell(value).map_err(|fault| {
                        let position = CellPosition::new(r, c, header);
                        match fault {
                            CellFault::OutOfDomain => PrepError::OutOfDomain {
                                position,
                                max: MESSAGE_DOMAIN_MAX,
                            },
                            CellFault::Unparseable => PrepError::UnparseableValue { position },
                        }
                    })
                })
                .collect::<PrepResult<Vec<u8>>>()
        })
        .collect::<PrepResult<Vec<Vec<u8>>>>()?;

    Ok(EncodedMatrix { headers, rows })
}

/// Pre-flight check: same columns everywhere and every value encodable
///
/// Never fails; `validate(t)` is true exactly when `encode(t)` succeeds.
pub fn validate(input: &TabularInput) -> bool {
    let Ok(headers) = headers_of(input) else {
        return false;
    };

    input.rows().iter().all(|row| {
        same_columns(row, &headers)
            && headers
                .iter()
                .filter_map(|h| row.get(h))
                .all(|value| encode_cell(value).is_ok())
    })
}

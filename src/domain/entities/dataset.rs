use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(pub i64);

impl From<i64> for DatasetId {
    fn from(value: i64) -> Self {
        DatasetId(value)
    }
}

impl From<DatasetId> for i64 {
    fn from(value: DatasetId) -> Self {
        value.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identifier of a row for the lifetime of one edit session.
///
/// Kept as a string because the server hands out both numeric and textual ids
/// and the change-request payload carries them as strings either way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub String);

impl RowId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn from_position(position: i64) -> Self {
        RowId(position.to_string())
    }
}

impl From<&str> for RowId {
    fn from(value: &str) -> Self {
        RowId(value.to_string())
    }
}

impl From<i64> for RowId {
    fn from(value: i64) -> Self {
        RowId(value.to_string())
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A scalar cell value (string, number, bool) or null.
pub type CellValue = serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub row_id: RowId,
    pub values: BTreeMap<String, CellValue>,
}

impl Row {
    pub fn value(&self, column: &str) -> &CellValue {
        self.values.get(column).unwrap_or(&CellValue::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatasetSummary {
    pub id: DatasetId,
    pub name: String,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub row_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub dataset_id: DatasetId,
    pub limit: i64,
    pub offset: i64,
}

impl PageQuery {
    pub fn first_page(dataset_id: DatasetId, limit: i64) -> Self {
        Self {
            dataset_id,
            limit,
            offset: 0,
        }
    }

    /// The following page, if `total` rows reach past this one.
    pub fn next(&self, total: i64) -> Option<Self> {
        let offset = self.offset + self.limit;
        (self.limit > 0 && offset < total).then(|| Self {
            offset,
            ..self.clone()
        })
    }

    pub fn previous(&self) -> Option<Self> {
        (self.offset > 0).then(|| Self {
            offset: (self.offset - self.limit).max(0),
            ..self.clone()
        })
    }

    /// One-based row range shown by this page, e.g. `501-1000`.
    pub fn range_label(&self, shown: usize) -> String {
        if shown == 0 {
            return "0".to_string();
        }
        format!("{}-{}", self.offset + 1, self.offset + shown as i64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub total: i64,
}

/// A plain grid of text read from an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn display_value(value: &CellValue) -> String {
    match value {
        CellValue::Null => String::new(),
        CellValue::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Interprets text typed into a grid cell, keeping the column's original kind
/// where the text still parses as it.
pub fn parse_input(text: &str, original: &CellValue) -> CellValue {
    match original {
        CellValue::Number(_) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return CellValue::Null;
            }
            if let Ok(int) = trimmed.parse::<i64>() {
                return CellValue::from(int);
            }
            match trimmed.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                Some(number) => CellValue::Number(number),
                None => CellValue::String(text.to_string()),
            }
        }
        CellValue::Bool(_) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => CellValue::Bool(true),
            "false" => CellValue::Bool(false),
            _ => CellValue::String(text.to_string()),
        },
        CellValue::Null if text.is_empty() => CellValue::Null,
        _ => CellValue::String(text.to_string()),
    }
}

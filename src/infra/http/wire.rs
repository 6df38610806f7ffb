//! JSON shapes exchanged with the governance API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::entities::change_request::{ChangeRequestId, ChangeRequestSummary, Reviewer};
use crate::domain::entities::dataset::{CellValue, DatasetSummary, Row, RowId};
use crate::domain::entities::rule::Rule;
use crate::domain::entities::validation::Violation;

/// Some endpoints answer with a bare array, others wrap it in an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(alias = "datasets", alias = "reviewers", alias = "change_requests", alias = "items")]
        data: Vec<T>,
    },
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(items) => items,
            Listing::Wrapped { data } => data,
        }
    }
}

pub type DatasetListing = Listing<DatasetSummary>;
pub type ReviewerListing = Listing<Reviewer>;
pub type ChangeRequestListing = Listing<ChangeRequestSummary>;

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginUser {
    #[serde(default, alias = "full_name")]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "token")]
    pub access_token: String,
    #[serde(default)]
    pub user: Option<LoginUser>,
}

#[derive(Debug, Deserialize)]
pub struct RowsResponse {
    #[serde(default)]
    pub data: Vec<BTreeMap<String, CellValue>>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub total: i64,
}

impl RowsResponse {
    /// Splits the synthetic `row_id` out of each row, or derives it from the
    /// row's absolute position when the server did not send one.
    pub fn into_rows(self, offset: i64) -> (Vec<String>, Vec<Row>, i64) {
        let keep_row_id_column = self.columns.iter().any(|c| c == "row_id");
        let rows = self
            .data
            .into_iter()
            .enumerate()
            .map(|(idx, mut values)| {
                let server_id = if keep_row_id_column {
                    values.get("row_id").cloned()
                } else {
                    values.remove("row_id")
                };
                let row_id = match server_id {
                    Some(CellValue::String(id)) => RowId(id),
                    Some(CellValue::Number(id)) => RowId(id.to_string()),
                    _ => RowId::from_position(offset + idx as i64),
                };
                Row { row_id, values }
            })
            .collect();
        (self.columns, rows, self.total)
    }
}

#[derive(Debug, Serialize)]
pub struct CheckCellRequest<'a> {
    pub column: &'a str,
    pub value: &'a CellValue,
    pub rules: &'a [Rule],
    pub row_id: &'a str,
    pub row_context: &'a BTreeMap<String, CellValue>,
}

#[derive(Debug, Deserialize)]
pub struct CheckCellResponse {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<Violation>,
}

impl CheckCellResponse {
    pub fn into_violations(self) -> Vec<Violation> {
        if self.valid {
            Vec::new()
        } else {
            self.errors
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default, alias = "id")]
    pub change_request_id: Option<serde_json::Value>,
    #[serde(default, alias = "error")]
    pub message: Option<String>,
}

fn default_success() -> bool {
    true
}

impl SubmitResponse {
    pub fn change_request_id(&self) -> Option<ChangeRequestId> {
        match self.change_request_id.as_ref()? {
            serde_json::Value::String(id) => Some(ChangeRequestId(id.clone())),
            serde_json::Value::Number(id) => Some(ChangeRequestId(id.to_string())),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentRequest<'a> {
    pub body: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            Some(serde_json::Value::String(detail)) => return Some(detail.clone()),
            Some(other) if !other.is_null() => return Some(other.to_string()),
            _ => {}
        }
        self.error.clone().or_else(|| self.message.clone())
    }
}

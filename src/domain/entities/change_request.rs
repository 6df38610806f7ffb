use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::dataset::{CellValue, DatasetId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeRequestId(pub String);

impl fmt::Display for ChangeRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Pending,
    Approved,
    Rejected,
}

impl ChangeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeStatus::Pending => "pending",
            ChangeStatus::Approved => "approved",
            ChangeStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Reviewer {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Comment {
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangeRequestSummary {
    pub id: ChangeRequestId,
    pub dataset_id: DatasetId,
    #[serde(default)]
    pub dataset_name: Option<String>,
    pub title: String,
    pub status: ChangeStatus,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditedCell {
    pub row_id: String,
    pub column: String,
    pub old_value: CellValue,
    pub new_value: CellValue,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChangeRequestDetail {
    #[serde(flatten)]
    pub summary: ChangeRequestSummary,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub reviewers: Vec<Reviewer>,
    #[serde(default)]
    pub edited_cells: Vec<EditedCell>,
    #[serde(default)]
    pub deleted_rows: Vec<String>,
    #[serde(default)]
    pub appended_rows: i64,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// What the user fills in next to the submit button.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitForm {
    pub title: String,
    pub comment: String,
    pub reviewer_ids: Vec<i64>,
}

/// Body of the change-submission call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeSubmission {
    pub session_id: String,
    pub dataset_id: DatasetId,
    pub title: String,
    pub comment: String,
    pub reviewer_ids: Vec<i64>,
    pub edited_cells: Vec<EditedCell>,
    pub deleted_rows: Vec<String>,
}

/// Body of the append-rows call: rows parsed from an uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppendSubmission {
    pub dataset_id: DatasetId,
    pub title: String,
    pub comment: String,
    pub reviewer_ids: Vec<i64>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn default_change_title(now: DateTime<Utc>) -> String {
    format!("Live edit {}", now.format("%m/%d %H:%M"))
}

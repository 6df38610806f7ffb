use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::domain::entities::change_request::{AppendSubmission, ChangeRequestId, SubmitForm};
use crate::domain::entities::dataset::{DatasetId, TabularData};
use crate::infra::import::csv::read_csv_table;
use crate::infra::import::xlsx::read_xlsx_table;
use crate::usecase::ports::api::GovernanceApi;

/// Appending rows from a local CSV/XLSX file through a change request.
pub struct ImportService {
    api: Arc<dyn GovernanceApi>,
}

impl ImportService {
    pub fn new(api: Arc<dyn GovernanceApi>) -> Self {
        Self { api }
    }

    pub fn read_table(&self, path: &Path) -> Result<TabularData> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => read_csv_table(path),
            "xlsx" | "xls" => read_xlsx_table(path, None),
            other => anyhow::bail!("unsupported file type: .{other}"),
        }
    }

    pub async fn submit_append(
        &self,
        dataset_id: DatasetId,
        dataset_columns: &[String],
        table: TabularData,
        form: &SubmitForm,
    ) -> Result<ChangeRequestId> {
        check_columns(dataset_columns, &table)?;
        if table.rows.is_empty() {
            anyhow::bail!("file has no data rows");
        }
        let submission = AppendSubmission {
            dataset_id,
            title: form.title.trim().to_string(),
            comment: form.comment.clone(),
            reviewer_ids: form.reviewer_ids.clone(),
            columns: table.columns,
            rows: table.rows,
        };
        tracing::info!(
            dataset_id = %dataset_id,
            rows = submission.rows.len(),
            "submitting append request"
        );
        self.api
            .submit_append(&submission)
            .await
            .map_err(|err| anyhow!(err))
    }
}

/// Every file column must exist in the dataset.
pub fn check_columns(dataset_columns: &[String], table: &TabularData) -> Result<()> {
    let unknown: Vec<&str> = table
        .columns
        .iter()
        .filter(|column| !dataset_columns.contains(column))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        anyhow::bail!("columns not in dataset: {}", unknown.join(", "));
    }
    Ok(())
}

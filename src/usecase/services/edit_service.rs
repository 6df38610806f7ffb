use std::sync::Arc;

use crate::domain::entities::change_request::{ChangeRequestId, ChangeSubmission, SubmitForm};
use crate::domain::entities::dataset::{CellValue, RowId};
use crate::domain::entities::rule::RuleSet;
use crate::domain::entities::validation::{CacheUpdate, ValidationTicket, Violation};
use crate::domain::live_edit::{LiveEditSession, SubmitBlocked};
use crate::usecase::ports::api::{ApiError, GovernanceApi};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("cannot submit: {0}")]
    Blocked(#[from] SubmitBlocked),
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct EditService {
    api: Arc<dyn GovernanceApi>,
}

impl EditService {
    pub fn new(api: Arc<dyn GovernanceApi>) -> Self {
        Self { api }
    }

    /// Asks the server to evaluate the rule set against one edited cell.
    pub async fn revalidate(
        &self,
        rules: &RuleSet,
        ticket: &ValidationTicket,
    ) -> Result<Vec<Violation>, ApiError> {
        tracing::debug!(
            row_id = %ticket.key.row_id,
            column = %ticket.key.column,
            seq = ticket.seq,
            "checking cell"
        );
        self.api.check_cell(rules, ticket).await
    }

    /// Records an edit and, when it is a net change, validates it right away.
    pub async fn record_and_validate(
        &self,
        session: &mut LiveEditSession,
        row_id: &RowId,
        column: &str,
        value: CellValue,
    ) -> Option<CacheUpdate> {
        let ticket = session.record_edit(row_id, column, value)?;
        let result = self.revalidate(session.rules(), &ticket).await;
        Some(session.apply_validation(&ticket, result))
    }

    pub async fn send_submission(
        &self,
        submission: &ChangeSubmission,
    ) -> Result<ChangeRequestId, ApiError> {
        tracing::info!(
            dataset_id = %submission.dataset_id,
            edited_cells = submission.edited_cells.len(),
            deleted_rows = submission.deleted_rows.len(),
            reviewers = submission.reviewer_ids.len(),
            "submitting change request"
        );
        self.api.submit_change(submission).await
    }

    pub async fn submit(
        &self,
        session: &mut LiveEditSession,
        form: &SubmitForm,
    ) -> Result<ChangeRequestId, SubmitError> {
        let submission = session.begin_submit(form)?;
        let result = self.send_submission(&submission).await;
        session.finish_submit(result.clone());
        Ok(result?)
    }
}

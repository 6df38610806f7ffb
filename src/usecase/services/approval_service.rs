use std::sync::Arc;

use crate::domain::entities::change_request::{
    ChangeRequestDetail, ChangeRequestId, ChangeRequestSummary, ChangeStatus,
};
use crate::usecase::ports::api::{ApiError, GovernanceApi};

pub struct ApprovalService {
    api: Arc<dyn GovernanceApi>,
}

impl ApprovalService {
    pub fn new(api: Arc<dyn GovernanceApi>) -> Self {
        Self { api }
    }

    /// Newest first.
    pub async fn list(
        &self,
        status: Option<ChangeStatus>,
    ) -> Result<Vec<ChangeRequestSummary>, ApiError> {
        let mut changes = self.api.list_change_requests(status).await?;
        changes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(changes)
    }

    pub async fn detail(&self, id: &ChangeRequestId) -> Result<ChangeRequestDetail, ApiError> {
        self.api.get_change_request(id).await
    }

    pub async fn approve(&self, id: &ChangeRequestId) -> Result<(), ApiError> {
        self.api.approve_change(id).await?;
        tracing::info!(change_request = %id, "change request approved");
        Ok(())
    }

    pub async fn reject(&self, id: &ChangeRequestId) -> Result<(), ApiError> {
        self.api.reject_change(id).await?;
        tracing::info!(change_request = %id, "change request rejected");
        Ok(())
    }

    pub async fn comment(&self, id: &ChangeRequestId, body: &str) -> Result<(), ApiError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(ApiError::Rejected {
                status: 400,
                message: "comment is empty".to_string(),
            });
        }
        self.api.add_comment(id, body).await
    }
}

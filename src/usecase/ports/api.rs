use async_trait::async_trait;

use crate::domain::entities::change_request::{
    AppendSubmission, ChangeRequestDetail, ChangeRequestId, ChangeRequestSummary,
    ChangeStatus, ChangeSubmission, Reviewer,
};
use crate::domain::entities::dataset::{DatasetId, DatasetSummary, PageQuery, PageResult};
use crate::domain::entities::rule::RuleSet;
use crate::domain::entities::validation::{ValidationTicket, Violation};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Connection, DNS, TLS or timeout failure; the server never answered.
    #[error("network error: {0}")]
    Transport(String),

    #[error("not signed in: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub display_name: String,
}

/// The remote data-governance API. All persistence and rule evaluation lives
/// behind it.
#[async_trait]
pub trait GovernanceApi: Send + Sync {
    /// Replaces the bearer token sent with every subsequent call.
    fn set_token(&self, token: Option<String>);

    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, ApiError>;

    async fn list_datasets(&self) -> Result<Vec<DatasetSummary>, ApiError>;
    async fn fetch_rows(&self, query: &PageQuery) -> Result<PageResult, ApiError>;
    async fn fetch_rules(&self, dataset_id: DatasetId) -> Result<RuleSet, ApiError>;
    async fn check_cell(
        &self,
        rules: &RuleSet,
        ticket: &ValidationTicket,
    ) -> Result<Vec<Violation>, ApiError>;

    async fn list_reviewers(&self) -> Result<Vec<Reviewer>, ApiError>;
    async fn submit_change(
        &self,
        submission: &ChangeSubmission,
    ) -> Result<ChangeRequestId, ApiError>;
    async fn submit_append(
        &self,
        submission: &AppendSubmission,
    ) -> Result<ChangeRequestId, ApiError>;

    async fn list_change_requests(
        &self,
        status: Option<ChangeStatus>,
    ) -> Result<Vec<ChangeRequestSummary>, ApiError>;
    async fn get_change_request(
        &self,
        id: &ChangeRequestId,
    ) -> Result<ChangeRequestDetail, ApiError>;
    async fn approve_change(&self, id: &ChangeRequestId) -> Result<(), ApiError>;
    async fn reject_change(&self, id: &ChangeRequestId) -> Result<(), ApiError>;
    async fn add_comment(&self, id: &ChangeRequestId, body: &str) -> Result<(), ApiError>;
}

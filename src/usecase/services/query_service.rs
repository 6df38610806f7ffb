use std::sync::Arc;

use crate::domain::entities::change_request::Reviewer;
use crate::domain::entities::dataset::{DatasetId, DatasetSummary, PageQuery};
use crate::domain::live_edit::LiveEditSession;
use crate::usecase::ports::api::{ApiError, GovernanceApi};

pub struct QueryService {
    api: Arc<dyn GovernanceApi>,
}

impl QueryService {
    pub fn new(api: Arc<dyn GovernanceApi>) -> Self {
        Self { api }
    }

    pub async fn list_datasets(&self) -> Result<Vec<DatasetSummary>, ApiError> {
        self.api.list_datasets().await
    }

    /// Fetches the first page of rows and the dataset's rules and starts a
    /// fresh edit session over them.
    pub async fn open_session(
        &self,
        dataset_id: DatasetId,
        page_size: i64,
    ) -> Result<LiveEditSession, ApiError> {
        self.open_page(&PageQuery::first_page(dataset_id, page_size)).await
    }

    /// Starts an edit session over one page of rows.
    pub async fn open_page(&self, query: &PageQuery) -> Result<LiveEditSession, ApiError> {
        let page = self.api.fetch_rows(query).await?;
        let rules = self.api.fetch_rules(query.dataset_id).await?;
        tracing::info!(
            dataset_id = %query.dataset_id,
            offset = query.offset,
            rows = page.rows.len(),
            total = page.total,
            rules = rules.rules.len(),
            "opened live edit session"
        );
        Ok(LiveEditSession::load(query.dataset_id, page, rules))
    }

    pub async fn list_reviewers(&self) -> Result<Vec<Reviewer>, ApiError> {
        self.api.list_reviewers().await
    }
}

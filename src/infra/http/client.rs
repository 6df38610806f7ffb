//! reqwest-backed implementation of the governance API port.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::entities::change_request::{
    AppendSubmission, ChangeRequestDetail, ChangeRequestId, ChangeRequestSummary,
    ChangeStatus, ChangeSubmission, Reviewer,
};
use crate::domain::entities::dataset::{DatasetId, DatasetSummary, PageQuery, PageResult};
use crate::domain::entities::rule::RuleSet;
use crate::domain::entities::validation::{ValidationTicket, Violation};
use crate::infra::http::wire::{
    ChangeRequestListing, CheckCellRequest, CheckCellResponse, CommentRequest, DatasetListing,
    ErrorBody, LoginRequest, LoginResponse, ReviewerListing, RowsResponse, SubmitResponse,
};
use crate::usecase::ports::api::{ApiError, AuthSession, Credentials, GovernanceApi};

/// No automatic retries: a failed call is surfaced and the user re-triggers it.
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("steward/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn bearer(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let bytes = self.send(Method::GET, path, Option::<&()>::None).await?;
        decode(&bytes)
    }

    async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let bytes = self.send(Method::POST, path, Some(body)).await?;
        decode(&bytes)
    }

    /// POST whose response body carries nothing the client needs.
    async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::POST, path, Option::<&()>::None).await?;
        Ok(())
    }

    async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Vec<u8>, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let start = Instant::now();

        tracing::debug!(method = %method, path = %path, "sending request");

        let mut request = self.http.request(method.clone(), &url);
        if let Some(token) = self.bearer() {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(transport_error)?;

        tracing::debug!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "received response"
        );

        if status.is_success() {
            return Ok(bytes.to_vec());
        }

        let message = serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(|body| body.message())
            .unwrap_or_else(|| {
                let text = String::from_utf8_lossy(&bytes).trim().to_string();
                if text.is_empty() {
                    status.to_string()
                } else {
                    text
                }
            });

        tracing::warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            error = %message,
            "request failed"
        );

        Err(status_to_error(status, message))
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|err| {
        ApiError::InvalidResponse(format!(
            "failed to parse response: {err} (body: {})",
            String::from_utf8_lossy(bytes)
        ))
    })
}

fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_decode() {
        ApiError::InvalidResponse(err.to_string())
    } else {
        ApiError::Transport(err.to_string())
    }
}

pub(crate) fn status_to_error(status: StatusCode, message: String) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
        StatusCode::FORBIDDEN => ApiError::Forbidden(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        other => ApiError::Rejected {
            status: other.as_u16(),
            message,
        },
    }
}

fn submitted_id(response: SubmitResponse) -> Result<ChangeRequestId, ApiError> {
    if !response.success {
        return Err(ApiError::Rejected {
            status: 200,
            message: response
                .message
                .unwrap_or_else(|| "submission was not accepted".to_string()),
        });
    }
    response.change_request_id().ok_or_else(|| {
        ApiError::InvalidResponse("submission response carried no change request id".to_string())
    })
}

#[async_trait]
impl GovernanceApi for HttpApi {
    fn set_token(&self, token: Option<String>) {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = token;
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, ApiError> {
        let response: LoginResponse = self
            .post(
                "/api/auth/login",
                &LoginRequest {
                    email: credentials.email.trim(),
                    password: &credentials.password,
                },
            )
            .await?;
        let display_name = response
            .user
            .and_then(|user| user.name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| credentials.email.trim().to_string());
        Ok(AuthSession {
            token: response.access_token,
            display_name,
        })
    }

    async fn list_datasets(&self) -> Result<Vec<DatasetSummary>, ApiError> {
        let listing: DatasetListing = self.get("/api/datasets").await?;
        Ok(listing.into_vec())
    }

    async fn fetch_rows(&self, query: &PageQuery) -> Result<PageResult, ApiError> {
        let path = format!(
            "/api/datasets/{}/rows?limit={}&offset={}",
            query.dataset_id, query.limit, query.offset
        );
        let response: RowsResponse = self.get(&path).await?;
        let (columns, rows, total) = response.into_rows(query.offset);
        Ok(PageResult {
            columns,
            rows,
            total,
        })
    }

    async fn fetch_rules(&self, dataset_id: DatasetId) -> Result<RuleSet, ApiError> {
        self.get(&format!("/api/datasets/{dataset_id}/rules")).await
    }

    async fn check_cell(
        &self,
        rules: &RuleSet,
        ticket: &ValidationTicket,
    ) -> Result<Vec<Violation>, ApiError> {
        let response: CheckCellResponse = self
            .post(
                "/api/rules/check-cell",
                &CheckCellRequest {
                    column: &ticket.key.column,
                    value: &ticket.value,
                    rules: &rules.rules,
                    row_id: ticket.key.row_id.as_str(),
                    row_context: &ticket.row_context,
                },
            )
            .await?;
        Ok(response.into_violations())
    }

    async fn list_reviewers(&self) -> Result<Vec<Reviewer>, ApiError> {
        let listing: ReviewerListing = self.get("/api/reviewers").await?;
        Ok(listing.into_vec())
    }

    async fn submit_change(
        &self,
        submission: &ChangeSubmission,
    ) -> Result<ChangeRequestId, ApiError> {
        let response: SubmitResponse = self.post("/api/change-requests", submission).await?;
        submitted_id(response)
    }

    async fn submit_append(
        &self,
        submission: &AppendSubmission,
    ) -> Result<ChangeRequestId, ApiError> {
        let path = format!("/api/datasets/{}/append", submission.dataset_id);
        let response: SubmitResponse = self.post(&path, submission).await?;
        submitted_id(response)
    }

    async fn list_change_requests(
        &self,
        status: Option<ChangeStatus>,
    ) -> Result<Vec<ChangeRequestSummary>, ApiError> {
        let path = match status {
            Some(status) => format!("/api/change-requests?status={}", status.as_str()),
            None => "/api/change-requests".to_string(),
        };
        let listing: ChangeRequestListing = self.get(&path).await?;
        Ok(listing.into_vec())
    }

    async fn get_change_request(
        &self,
        id: &ChangeRequestId,
    ) -> Result<ChangeRequestDetail, ApiError> {
        self.get(&format!("/api/change-requests/{id}")).await
    }

    async fn approve_change(&self, id: &ChangeRequestId) -> Result<(), ApiError> {
        self.post_empty(&format!("/api/change-requests/{id}/approve"))
            .await
    }

    async fn reject_change(&self, id: &ChangeRequestId) -> Result<(), ApiError> {
        self.post_empty(&format!("/api/change-requests/{id}/reject"))
            .await
    }

    async fn add_comment(&self, id: &ChangeRequestId, body: &str) -> Result<(), ApiError> {
        let path = format!("/api/change-requests/{id}/comments");
        self.send(Method::POST, &path, Some(&CommentRequest { body }))
            .await?;
        Ok(())
    }
}

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rusqlite::Connection;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::app::AppServices;
use crate::config::{ensure_webview_data_dir, load_config_from, ENV_API_URL, ENV_DATA_DIR};
use crate::domain::entities::change_request::{
    AppendSubmission, ChangeRequestDetail, ChangeRequestId, ChangeRequestSummary, ChangeStatus,
    ChangeSubmission, EditedCell, Reviewer, SubmitForm,
};
use crate::domain::entities::dataset::{
    CellValue, DatasetId, DatasetSummary, PageQuery, PageResult, Row, RowId, TabularData,
};
use crate::domain::entities::rule::{RuleSet, RuleType, Severity};
use crate::domain::entities::validation::{CacheUpdate, ValidationTicket, Violation};
use crate::domain::live_edit::{SubmitBlocked, SubmitPhase, SubmitState};
use crate::infra::http::client::HttpApi;
use crate::infra::import::csv::read_csv_table;
use crate::infra::import::xlsx::{cell_to_string, read_xlsx_table};
use crate::infra::sqlite::schema::init_db;
use crate::infra::sqlite::store::SqliteStore;
use crate::ui::styles::{cell_style, row_style, table_container_style};
use crate::usecase::ports::api::{ApiError, AuthSession, Credentials, GovernanceApi};
use crate::usecase::ports::store::{
    LocalStore, API_BASE_URL_KEY, AUTH_TOKEN_KEY, DISPLAY_NAME_KEY,
};
use crate::usecase::services::edit_service::SubmitError;
use crate::usecase::services::import_service::check_columns;

fn unique_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("steward-{prefix}-{nanos}"))
}

fn sample_rules() -> RuleSet {
    serde_json::from_value(json!({
        "schema": {"type": "object"},
        "rules": [
            {"id": 1, "type": "readonly", "columns": ["id"]},
            {"id": 2, "type": "required", "column": "name", "severity": "error"},
            {"id": 3, "type": "range", "column": "score", "severity": "warning", "max": 100}
        ]
    }))
    .expect("sample rules should parse")
}

fn sample_page() -> PageResult {
    let rows = [(1, "Alice", 90), (2, "Bob", 82), (3, "Cara", 77)]
        .into_iter()
        .map(|(id, name, score)| Row {
            row_id: RowId::from(id as i64),
            values: BTreeMap::from([
                ("id".to_string(), json!(id)),
                ("name".to_string(), json!(name)),
                ("score".to_string(), json!(score)),
            ]),
        })
        .collect();
    PageResult {
        columns: vec!["id".to_string(), "name".to_string(), "score".to_string()],
        rows,
        total: 3,
    }
}

fn summary(id: &str, title: &str, day: u32) -> ChangeRequestSummary {
    ChangeRequestSummary {
        id: ChangeRequestId(id.to_string()),
        dataset_id: DatasetId(7),
        dataset_name: Some("scores".to_string()),
        title: title.to_string(),
        status: ChangeStatus::Pending,
        author: "dana".to_string(),
        created_at: Utc
            .with_ymd_and_hms(2026, 10, day, 9, 0, 0)
            .single()
            .expect("timestamp should be valid"),
    }
}

fn form() -> SubmitForm {
    SubmitForm {
        title: "Fix scores".to_string(),
        comment: "typo fixes".to_string(),
        reviewer_ids: vec![3],
    }
}

#[derive(Default)]
struct FakeState {
    token: Option<String>,
    check_calls: usize,
    submissions: Vec<ChangeSubmission>,
    appends: Vec<AppendSubmission>,
    submit_failure: Option<ApiError>,
    comments: Vec<(ChangeRequestId, String)>,
    approved: Vec<ChangeRequestId>,
}

/// In-memory governance API. Evaluates `required` and `range` rules the way
/// the server does so session scenarios can run end to end.
#[derive(Default)]
struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    fn failing_submissions(err: ApiError) -> Self {
        let api = FakeApi::default();
        api.lock().submit_failure = Some(err);
        api
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake api lock should not be poisoned")
    }

    fn submissions(&self) -> Vec<ChangeSubmission> {
        self.lock().submissions.clone()
    }
}

#[async_trait]
impl GovernanceApi for FakeApi {
    fn set_token(&self, token: Option<String>) {
        self.lock().token = token;
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, ApiError> {
        if credentials.password != "secret" {
            return Err(ApiError::Unauthorized("invalid credentials".to_string()));
        }
        Ok(AuthSession {
            token: "tok-123".to_string(),
            display_name: "Dana".to_string(),
        })
    }

    async fn list_datasets(&self) -> Result<Vec<DatasetSummary>, ApiError> {
        Ok(vec![DatasetSummary {
            id: DatasetId(7),
            name: "scores".to_string(),
            project: None,
            row_count: 3,
        }])
    }

    async fn fetch_rows(&self, query: &PageQuery) -> Result<PageResult, ApiError> {
        if query.dataset_id != DatasetId(7) {
            return Err(ApiError::NotFound("dataset".to_string()));
        }
        Ok(sample_page())
    }

    async fn fetch_rules(&self, _dataset_id: DatasetId) -> Result<RuleSet, ApiError> {
        Ok(sample_rules())
    }

    async fn check_cell(
        &self,
        rules: &RuleSet,
        ticket: &ValidationTicket,
    ) -> Result<Vec<Violation>, ApiError> {
        self.lock().check_calls += 1;
        let column = &ticket.key.column;
        let violations = rules
            .rules
            .iter()
            .filter(|rule| rule.columns.contains(column))
            .filter_map(|rule| match rule.rule_type {
                RuleType::Required => {
                    let blank = match &ticket.value {
                        CellValue::Null => true,
                        CellValue::String(text) => text.trim().is_empty(),
                        _ => false,
                    };
                    blank.then(|| Violation {
                        severity: rule.severity,
                        message: format!("{column} is required"),
                        rule_type: "required".to_string(),
                    })
                }
                RuleType::Range => {
                    let max = rule.param("max").and_then(|v| v.as_f64())?;
                    let value = ticket.value.as_f64()?;
                    (value > max).then(|| Violation {
                        severity: rule.severity,
                        message: format!("{column} must be at most {max}"),
                        rule_type: "range".to_string(),
                    })
                }
                _ => None,
            })
            .collect();
        Ok(violations)
    }

    async fn list_reviewers(&self) -> Result<Vec<Reviewer>, ApiError> {
        Ok(vec![Reviewer {
            id: 3,
            name: "Rui".to_string(),
            email: None,
        }])
    }

    async fn submit_change(
        &self,
        submission: &ChangeSubmission,
    ) -> Result<ChangeRequestId, ApiError> {
        let mut state = self.lock();
        if let Some(err) = state.submit_failure.clone() {
            return Err(err);
        }
        state.submissions.push(submission.clone());
        Ok(ChangeRequestId(format!("cr-{}", state.submissions.len())))
    }

    async fn submit_append(
        &self,
        submission: &AppendSubmission,
    ) -> Result<ChangeRequestId, ApiError> {
        let mut state = self.lock();
        state.appends.push(submission.clone());
        Ok(ChangeRequestId(format!("append-{}", state.appends.len())))
    }

    async fn list_change_requests(
        &self,
        status: Option<ChangeStatus>,
    ) -> Result<Vec<ChangeRequestSummary>, ApiError> {
        let all = vec![
            summary("cr-1", "older", 1),
            summary("cr-3", "newest", 18),
            summary("cr-2", "middle", 9),
        ];
        Ok(all
            .into_iter()
            .filter(|change| status.map_or(true, |s| change.status == s))
            .collect())
    }

    async fn get_change_request(
        &self,
        id: &ChangeRequestId,
    ) -> Result<ChangeRequestDetail, ApiError> {
        Err(ApiError::NotFound(format!("change request {id}")))
    }

    async fn approve_change(&self, id: &ChangeRequestId) -> Result<(), ApiError> {
        self.lock().approved.push(id.clone());
        Ok(())
    }

    async fn reject_change(&self, _id: &ChangeRequestId) -> Result<(), ApiError> {
        Ok(())
    }

    async fn add_comment(&self, id: &ChangeRequestId, body: &str) -> Result<(), ApiError> {
        self.lock().comments.push((id.clone(), body.to_string()));
        Ok(())
    }
}

fn services_with(api: Arc<FakeApi>, db_path: &Path) -> AppServices {
    AppServices::new(
        api,
        Arc::new(SqliteStore {
            db_path: db_path.to_path_buf(),
        }),
    )
}

#[test]
fn init_db_creates_setting_table() {
    let temp_dir = unique_test_dir("init-db");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("steward.sqlite");

    let result = init_db(&db_path);

    assert!(result.is_ok(), "init_db should succeed: {result:?}");

    let conn = Connection::open(&db_path).expect("should open sqlite db");
    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'local_setting'",
            [],
            |row| row.get(0),
        )
        .expect("table count query should succeed");

    assert_eq!(table_count, 1, "local_setting table should exist");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn sqlite_store_overwrites_and_deletes_settings() {
    let temp_dir = unique_test_dir("settings");
    let store = SqliteStore {
        db_path: temp_dir.join("nested").join("steward.sqlite"),
    };

    store.init().expect("init should create parent dirs");
    assert_eq!(store.load_setting("missing").expect("load should succeed"), None);

    store
        .save_setting(AUTH_TOKEN_KEY, "first")
        .expect("save should succeed");
    store
        .save_setting(AUTH_TOKEN_KEY, "second")
        .expect("second save should overwrite");
    assert_eq!(
        store.load_setting(AUTH_TOKEN_KEY).expect("load should succeed"),
        Some("second".to_string())
    );

    store
        .delete_setting(AUTH_TOKEN_KEY)
        .expect("delete should succeed");
    assert_eq!(store.load_setting(AUTH_TOKEN_KEY).expect("load should succeed"), None);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn read_csv_table_pads_ragged_rows_and_skips_blank_lines() {
    let temp_dir = unique_test_dir("csv");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let csv_path = temp_dir.join("people.csv");
    fs::write(&csv_path, " name ,score\nAlice,90\n,\nBob\n").expect("should write csv fixture");

    let table = read_csv_table(&csv_path).expect("csv should parse");

    assert_eq!(table.columns, vec!["name", "score"]);
    assert_eq!(
        table.rows,
        vec![
            vec!["Alice".to_string(), "90".to_string()],
            vec!["Bob".to_string(), String::new()],
        ]
    );

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn read_csv_table_rejects_blank_header_cell() {
    let temp_dir = unique_test_dir("csv-blank-header");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let csv_path = temp_dir.join("bad.csv");
    fs::write(&csv_path, "name,,score\nAlice,x,90\n").expect("should write csv fixture");

    let err = read_csv_table(&csv_path).expect_err("blank header should fail");
    assert!(err.to_string().contains("blank column"), "{err}");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn read_xlsx_table_reports_missing_workbook() {
    let missing = unique_test_dir("xlsx").join("absent.xlsx");
    let err = read_xlsx_table(&missing, None).expect_err("missing workbook should fail");
    assert!(err.to_string().contains("failed to open workbook"), "{err}");
}

#[test]
fn cell_to_string_renders_scalars() {
    assert_eq!(cell_to_string(&calamine::Data::Int(42)), "42");
    assert_eq!(cell_to_string(&calamine::Data::Bool(true)), "true");
    assert_eq!(cell_to_string(&calamine::Data::Empty), "");
}

#[test]
fn import_rejects_unknown_columns_and_extensions() {
    let dataset_columns = vec!["name".to_string(), "score".to_string()];
    let table = TabularData {
        columns: vec!["name".to_string(), "grade".to_string()],
        rows: vec![vec!["Alice".to_string(), "A".to_string()]],
    };

    let err = check_columns(&dataset_columns, &table).expect_err("unknown column should fail");
    assert!(err.to_string().contains("grade"), "{err}");

    let temp_dir = unique_test_dir("import-ext");
    let services = services_with(Arc::new(FakeApi::default()), &temp_dir.join("s.sqlite"));
    let err = services
        .import
        .read_table(Path::new("data.json"))
        .expect_err("json should be unsupported");
    assert!(err.to_string().contains("unsupported file type"), "{err}");
}

#[test]
fn style_helpers_mark_scroll_deleted_and_errors() {
    assert!(table_container_style().contains("overflow: auto"));
    assert!(row_style(true, false).contains("line-through"));
    assert!(!row_style(false, false).contains("line-through"));

    let mut session = crate::domain::live_edit::LiveEditSession::load(
        DatasetId(7),
        sample_page(),
        sample_rules(),
    );
    let row = RowId::from("1");
    let ticket = session
        .record_edit(&row, "name", json!(""))
        .expect("ticket expected");
    session.apply_validation(
        &ticket,
        Ok::<_, ApiError>(vec![Violation {
            severity: Severity::Fatal,
            message: "name is required".to_string(),
            rule_type: "required".to_string(),
        }]),
    );

    let style = cell_style(&session.cell_status(&row, "name"));
    assert!(style.contains("#8b0000"), "fatal cells use the fatal color: {style}");
    let edited_only = cell_style(&session.cell_status(&row, "score"));
    assert!(!edited_only.contains("outline"));
}

#[test]
fn restored_rows_render_without_strikethrough() {
    let mut session = crate::domain::live_edit::LiveEditSession::load(
        DatasetId(7),
        sample_page(),
        sample_rules(),
    );
    let targets = [RowId::from("1"), RowId::from("2")];

    assert_eq!(session.mark_deleted(&targets), 2);
    assert!(row_style(session.is_deleted(&targets[0]), false).contains("line-through"));
    assert!(row_style(session.is_deleted(&targets[1]), false).contains("line-through"));
    assert_eq!(session.restore(&targets), 2);

    assert!(session.deleted().is_empty());
    for row in session.display_rows() {
        let style = row_style(session.is_deleted(&row.row_id), false);
        assert!(!style.contains("line-through"), "row {} still struck: {style}", row.row_id);
    }
}

#[test]
fn api_url_in_use_is_remembered_for_next_start() {
    let temp_dir = unique_test_dir("config-restart");
    let data_dir = temp_dir.to_string_lossy().to_string();
    let no_default = || -> anyhow::Result<PathBuf> {
        anyhow::bail!("data dir comes from the environment")
    };

    let first_env = |key: &str| match key {
        ENV_API_URL => Some("https://gov.example.com/".to_string()),
        ENV_DATA_DIR => Some(data_dir.clone()),
        _ => None,
    };
    let first = load_config_from(first_env, no_default).expect("first start should load");
    assert_eq!(first.api_base_url, "https://gov.example.com");

    let store = SqliteStore {
        db_path: first.db_path(),
    };
    assert_eq!(
        store
            .load_setting(API_BASE_URL_KEY)
            .expect("setting should load")
            .as_deref(),
        Some("https://gov.example.com")
    );

    let restart_env = |key: &str| (key == ENV_DATA_DIR).then(|| data_dir.clone());
    let restarted = load_config_from(restart_env, no_default).expect("restart should load");
    assert_eq!(restarted.api_base_url, "https://gov.example.com");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn ensure_webview_data_dir_creates_subdirectory() {
    let temp_dir = unique_test_dir("webview");

    let webview_dir = ensure_webview_data_dir(&temp_dir).expect("should create webview dir");

    assert_eq!(webview_dir, temp_dir.join("webview2"));
    assert!(webview_dir.is_dir());

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn blocking_error_prevents_submit_until_fixed() {
    let api = Arc::new(FakeApi::default());
    let temp_dir = unique_test_dir("blocking");
    let services = services_with(api.clone(), &temp_dir.join("s.sqlite"));
    let mut session = services
        .query
        .open_session(DatasetId(7), 500)
        .await
        .expect("session should open");
    let row = RowId::from("2");

    let update = services
        .edit
        .record_and_validate(&mut session, &row, "name", json!(""))
        .await;
    assert_eq!(update, Some(CacheUpdate::Stored));
    assert_eq!(session.submit_state(), SubmitState::Blocked { blocking: 1 });

    let err = services
        .edit
        .submit(&mut session, &form())
        .await
        .expect_err("blocked submit should fail");
    assert_eq!(err, SubmitError::Blocked(SubmitBlocked::BlockingErrors(1)));
    assert!(api.submissions().is_empty(), "no request should be sent");

    let update = services
        .edit
        .record_and_validate(&mut session, &row, "name", json!("Bobby"))
        .await;
    assert_eq!(update, Some(CacheUpdate::Cleared));
    assert_eq!(session.submit_state(), SubmitState::Ready);

    let id = services
        .edit
        .submit(&mut session, &form())
        .await
        .expect("submit should succeed");

    assert_eq!(id, ChangeRequestId("cr-1".to_string()));
    let submissions = api.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(
        submissions[0].edited_cells,
        vec![EditedCell {
            row_id: "2".to_string(),
            column: "name".to_string(),
            old_value: json!("Bob"),
            new_value: json!("Bobby"),
        }]
    );
    assert_eq!(submissions[0].session_id, session.session_id());
    assert!(!session.is_dirty());
    assert_eq!(session.phase(), &SubmitPhase::Submitted(id));
}

#[tokio::test]
async fn warnings_are_reported_but_do_not_block() {
    let api = Arc::new(FakeApi::default());
    let temp_dir = unique_test_dir("warnings");
    let services = services_with(api.clone(), &temp_dir.join("s.sqlite"));
    let mut session = services
        .query
        .open_session(DatasetId(7), 500)
        .await
        .expect("session should open");

    services
        .edit
        .record_and_validate(&mut session, &RowId::from("1"), "score", json!(150))
        .await;

    let counts = session.severity_counts();
    assert_eq!(counts.warning, 1);
    assert_eq!(counts.blocking(), 0);
    assert!(session.can_submit());
    services
        .edit
        .submit(&mut session, &form())
        .await
        .expect("warnings should not block submit");
}

#[tokio::test]
async fn out_of_order_validation_keeps_latest_result() {
    let api = Arc::new(FakeApi::default());
    let temp_dir = unique_test_dir("stale");
    let services = services_with(api.clone(), &temp_dir.join("s.sqlite"));
    let mut session = services
        .query
        .open_session(DatasetId(7), 500)
        .await
        .expect("session should open");
    let row = RowId::from("3");

    let first = session
        .record_edit(&row, "score", json!(150))
        .expect("first edit should need a check");
    let second = session
        .record_edit(&row, "score", json!(95))
        .expect("second edit should need a check");
    let first_result = services.edit.revalidate(session.rules(), &first).await;
    let second_result = services.edit.revalidate(session.rules(), &second).await;

    assert_eq!(
        session.apply_validation(&second, second_result),
        CacheUpdate::Cleared
    );
    assert_eq!(
        session.apply_validation(&first, first_result),
        CacheUpdate::Stale
    );
    assert!(session.validation().is_empty());
    assert_eq!(api.lock().check_calls, 2);
}

#[tokio::test]
async fn failed_submit_keeps_edits_and_allows_retry() {
    let api = Arc::new(FakeApi::failing_submissions(ApiError::Transport(
        "connection refused".to_string(),
    )));
    let temp_dir = unique_test_dir("submit-failure");
    let services = services_with(api.clone(), &temp_dir.join("s.sqlite"));
    let mut session = services
        .query
        .open_session(DatasetId(7), 500)
        .await
        .expect("session should open");
    services
        .edit
        .record_and_validate(&mut session, &RowId::from("1"), "name", json!("Alicia"))
        .await;
    session.mark_deleted(&[RowId::from("3")]);

    let err = services
        .edit
        .submit(&mut session, &form())
        .await
        .expect_err("submit should fail");

    assert!(matches!(err, SubmitError::Api(ref api_err) if api_err.is_transport()));
    assert_eq!(session.ledger().len(), 1);
    assert_eq!(session.deleted().len(), 1);
    assert!(matches!(session.submit_state(), SubmitState::Failed(_)));
    assert!(session.can_submit(), "the user may click submit again");
}

#[tokio::test]
async fn edits_on_deleted_rows_are_still_submitted() {
    let api = Arc::new(FakeApi::default());
    let temp_dir = unique_test_dir("deleted-edits");
    let services = services_with(api.clone(), &temp_dir.join("s.sqlite"));
    let mut session = services
        .query
        .open_session(DatasetId(7), 500)
        .await
        .expect("session should open");
    let row = RowId::from("2");

    services
        .edit
        .record_and_validate(&mut session, &row, "score", json!(99))
        .await;
    assert_eq!(session.mark_deleted(&[row.clone()]), 1);
    assert!(!session.can_edit(&row, "score"));

    services
        .edit
        .submit(&mut session, &form())
        .await
        .expect("submit should succeed");

    let submission = &api.submissions()[0];
    assert_eq!(submission.deleted_rows, vec!["2".to_string()]);
    assert_eq!(submission.edited_cells.len(), 1);
    assert_eq!(submission.edited_cells[0].row_id, "2");
}

#[tokio::test]
async fn undo_all_restores_the_loaded_snapshot() {
    let api = Arc::new(FakeApi::default());
    let temp_dir = unique_test_dir("undo");
    let services = services_with(api, &temp_dir.join("s.sqlite"));
    let mut session = services
        .query
        .open_session(DatasetId(7), 500)
        .await
        .expect("session should open");

    services
        .edit
        .record_and_validate(&mut session, &RowId::from("1"), "name", json!(""))
        .await;
    session.mark_deleted(&[RowId::from("2")]);
    assert!(session.is_dirty());

    session.undo_all();

    assert_eq!(session.display_rows(), sample_page().rows);
    assert!(session.validation().is_empty());
    assert_eq!(session.submit_state(), SubmitState::Idle);
}

#[tokio::test]
async fn opening_unknown_dataset_surfaces_not_found() {
    let temp_dir = unique_test_dir("unknown-dataset");
    let services = services_with(Arc::new(FakeApi::default()), &temp_dir.join("s.sqlite"));

    let err = services
        .query
        .open_session(DatasetId(99), 500)
        .await
        .expect_err("unknown dataset should fail");

    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn approvals_are_listed_newest_first_and_empty_comments_rejected() {
    let api = Arc::new(FakeApi::default());
    let temp_dir = unique_test_dir("approvals");
    let services = services_with(api.clone(), &temp_dir.join("s.sqlite"));

    let changes = services
        .approval
        .list(Some(ChangeStatus::Pending))
        .await
        .expect("list should succeed");
    let titles: Vec<&str> = changes.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["newest", "middle", "older"]);

    let id = ChangeRequestId("cr-3".to_string());
    let err = services
        .approval
        .comment(&id, "   ")
        .await
        .expect_err("blank comment should be rejected");
    assert!(matches!(err, ApiError::Rejected { status: 400, .. }));

    services
        .approval
        .comment(&id, " looks good ")
        .await
        .expect("comment should be posted");
    services.approval.approve(&id).await.expect("approve should succeed");

    let state = api.lock();
    assert_eq!(state.comments, vec![(id.clone(), "looks good".to_string())]);
    assert_eq!(state.approved, vec![id]);
}

#[tokio::test]
async fn append_submission_carries_file_rows() {
    let api = Arc::new(FakeApi::default());
    let temp_dir = unique_test_dir("append");
    let services = services_with(api.clone(), &temp_dir.join("s.sqlite"));
    let dataset_columns = vec!["id".to_string(), "name".to_string(), "score".to_string()];
    let table = TabularData {
        columns: vec!["name".to_string(), "score".to_string()],
        rows: vec![vec!["Dee".to_string(), "70".to_string()]],
    };

    let id = services
        .import
        .submit_append(DatasetId(7), &dataset_columns, table, &form())
        .await
        .expect("append should succeed");

    assert_eq!(id, ChangeRequestId("append-1".to_string()));
    let state = api.lock();
    assert_eq!(state.appends.len(), 1);
    assert_eq!(state.appends[0].rows, vec![vec!["Dee", "70"]]);
    assert_eq!(state.appends[0].reviewer_ids, vec![3]);
}

#[tokio::test]
async fn sign_in_persists_token_and_restore_reuses_it() {
    let api = Arc::new(FakeApi::default());
    let temp_dir = unique_test_dir("sign-in");
    let db_path = temp_dir.join("steward.sqlite");
    let services = services_with(api.clone(), &db_path);

    assert_eq!(
        services.session.restore().expect("restore should succeed"),
        None
    );
    services
        .session
        .sign_in(&Credentials {
            email: "".to_string(),
            password: "secret".to_string(),
        })
        .await
        .expect_err("empty email should be rejected");

    let auth = services
        .session
        .sign_in(&Credentials {
            email: "dana@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .expect("sign in should succeed");
    assert_eq!(auth.display_name, "Dana");
    assert_eq!(api.lock().token.as_deref(), Some("tok-123"));

    let fresh_api = Arc::new(FakeApi::default());
    let restarted = services_with(fresh_api.clone(), &db_path);
    assert_eq!(
        restarted.session.restore().expect("restore should succeed"),
        Some("Dana".to_string())
    );
    assert_eq!(fresh_api.lock().token.as_deref(), Some("tok-123"));

    restarted.session.sign_out().expect("sign out should succeed");
    let store = SqliteStore { db_path };
    assert_eq!(store.load_setting(AUTH_TOKEN_KEY).expect("load"), None);
    assert_eq!(store.load_setting(DISPLAY_NAME_KEY).expect("load"), None);
    assert_eq!(fresh_api.lock().token, None);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

fn http_api(server: &MockServer) -> HttpApi {
    HttpApi::new(&server.uri(), None).expect("client should build")
}

fn ticket(row_id: &str, column: &str, value: CellValue) -> ValidationTicket {
    ValidationTicket {
        session_id: "session-1".to_string(),
        key: crate::domain::entities::edit::CellKey::new(RowId::from(row_id), column),
        seq: 1,
        value,
        row_context: BTreeMap::new(),
    }
}

#[tokio::test]
async fn http_fetch_rows_splits_out_row_ids() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/datasets/7/rows"))
        .and(query_param("limit", "500"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "columns": ["name", "score"],
            "data": [
                {"row_id": 11, "name": "Alice", "score": 90},
                {"name": "Bob", "score": 82}
            ],
            "total": 40
        })))
        .mount(&server)
        .await;

    let api = http_api(&server);
    let page = api
        .fetch_rows(&PageQuery::first_page(DatasetId(7), 500))
        .await
        .expect("rows should load");

    assert_eq!(page.total, 40);
    assert_eq!(page.rows[0].row_id, RowId::from("11"));
    assert!(!page.rows[0].values.contains_key("row_id"));
    assert_eq!(page.rows[1].row_id, RowId::from("1"));
}

#[tokio::test]
async fn http_check_cell_posts_value_and_rules() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/rules/check-cell"))
        .and(body_partial_json(json!({
            "column": "name",
            "value": "",
            "row_id": "2",
            "rules": [{"type": "required", "column": "name", "severity": "error"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "valid": false,
            "errors": [
                {"severity": "error", "message": "name is required", "rule_type": "required"},
                {"severity": "warning", "message": "second", "rule_type": "regex"}
            ]
        })))
        .mount(&server)
        .await;

    let rules: RuleSet = serde_json::from_value(json!({
        "rules": [{"type": "required", "column": "name", "severity": "error"}]
    }))
    .expect("rules should parse");

    let violations = http_api(&server)
        .check_cell(&rules, &ticket("2", "name", json!("")))
        .await
        .expect("check should succeed");

    assert_eq!(violations.len(), 2);
    assert_eq!(violations[0].severity, Severity::Error);
}

#[tokio::test]
async fn http_submit_sends_bearer_token_and_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/change-requests"))
        .and(header("authorization", "Bearer tok-123"))
        .and(body_partial_json(json!({
            "dataset_id": 7,
            "title": "Fix scores",
            "reviewer_ids": [3],
            "deleted_rows": ["4"],
            "edited_cells": [
                {"row_id": "2", "column": "name", "old_value": "Bob", "new_value": "Bobby"}
            ]
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"success": true, "change_request_id": 58})),
        )
        .mount(&server)
        .await;

    let api = http_api(&server);
    api.set_token(Some("tok-123".to_string()));
    let submission = ChangeSubmission {
        session_id: "s-1".to_string(),
        dataset_id: DatasetId(7),
        title: "Fix scores".to_string(),
        comment: String::new(),
        reviewer_ids: vec![3],
        edited_cells: vec![EditedCell {
            row_id: "2".to_string(),
            column: "name".to_string(),
            old_value: json!("Bob"),
            new_value: json!("Bobby"),
        }],
        deleted_rows: vec!["4".to_string()],
    };

    let id = api
        .submit_change(&submission)
        .await
        .expect("submit should succeed");

    assert_eq!(id, ChangeRequestId("58".to_string()));
}

#[tokio::test]
async fn http_error_statuses_map_to_api_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/datasets"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "token expired"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/change-requests"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"error": "reviewers required"})),
        )
        .mount(&server)
        .await;

    let api = http_api(&server);

    let err = api.list_datasets().await.expect_err("401 should fail");
    assert_eq!(err, ApiError::Unauthorized("token expired".to_string()));

    let err = api
        .submit_change(&ChangeSubmission {
            session_id: "s-1".to_string(),
            dataset_id: DatasetId(7),
            title: "t".to_string(),
            comment: String::new(),
            reviewer_ids: Vec::new(),
            edited_cells: Vec::new(),
            deleted_rows: vec!["1".to_string()],
        })
        .await
        .expect_err("422 should fail");
    assert_eq!(
        err,
        ApiError::Rejected {
            status: 422,
            message: "reviewers required".to_string()
        }
    );
}

#[tokio::test]
async fn http_unreachable_server_is_a_transport_error() {
    let api = HttpApi::new("http://127.0.0.1:9", None).expect("client should build");

    let err = api.list_reviewers().await.expect_err("nothing listens on port 9");

    assert!(err.is_transport(), "{err:?}");
}

#[tokio::test]
async fn http_change_request_listing_accepts_wrapped_payload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/change-requests"))
        .and(query_param("status", "pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "change_requests": [{
                "id": "cr-9",
                "dataset_id": 7,
                "title": "Fix scores",
                "status": "pending",
                "author": "dana",
                "created_at": "2026-10-18T09:00:00Z"
            }]
        })))
        .mount(&server)
        .await;

    let changes = http_api(&server)
        .list_change_requests(Some(ChangeStatus::Pending))
        .await
        .expect("listing should succeed");

    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].id, ChangeRequestId("cr-9".to_string()));
    assert_eq!(changes[0].dataset_name, None);
}

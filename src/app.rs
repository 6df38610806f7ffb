use std::sync::Arc;
use std::time::Duration;

use dioxus::prelude::*;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

use crate::config::{AppConfig, PAGE_SIZE};
use crate::domain::entities::change_request::{ChangeRequestId, ChangeStatus};
use crate::domain::entities::dataset::{display_value, PageQuery};
use crate::infra::http::client::HttpApi;
use crate::infra::sqlite::store::SqliteStore;
use crate::ui::live_edit::LiveEditView;
use crate::ui::state::app_state::{AppState, View};
use crate::ui::styles::{
    button_style, root_container_style, table_container_style, table_header_cell_style,
    toolbar_style,
};
use crate::usecase::ports::api::{ApiError, Credentials, GovernanceApi};
use crate::usecase::ports::store::LocalStore;
use crate::usecase::services::approval_service::ApprovalService;
use crate::usecase::services::edit_service::EditService;
use crate::usecase::services::import_service::{check_columns, ImportService};
use crate::usecase::services::query_service::QueryService;
use crate::usecase::services::session_service::SessionService;

pub const REDIRECT_DELAY: Duration = Duration::from_millis(1500);

#[derive(Clone)]
pub struct AppServices {
    pub session: Arc<SessionService>,
    pub query: Arc<QueryService>,
    pub edit: Arc<EditService>,
    pub approval: Arc<ApprovalService>,
    pub import: Arc<ImportService>,
}

impl AppServices {
    pub fn new(api: Arc<dyn GovernanceApi>, store: Arc<dyn LocalStore>) -> Self {
        Self {
            session: Arc::new(SessionService::new(api.clone(), store)),
            query: Arc::new(QueryService::new(api.clone())),
            edit: Arc::new(EditService::new(api.clone())),
            approval: Arc::new(ApprovalService::new(api.clone())),
            import: Arc::new(ImportService::new(api)),
        }
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let api = HttpApi::new(&config.api_base_url, config.http_timeout)?;
        let store = SqliteStore {
            db_path: config.db_path(),
        };
        Ok(Self::new(Arc::new(api), Arc::new(store)))
    }
}

pub(crate) fn confirm(title: &str, description: &str) -> bool {
    MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title(title)
        .set_description(description)
        .set_buttons(MessageButtons::YesNo)
        .show()
        == MessageDialogResult::Yes
}

/// Network failures get a generic banner; an expired token sends the user
/// back to the login view.
pub(crate) fn report_api_error(state: AppState, action: &str, err: &ApiError) {
    let AppState {
        mut status,
        mut view,
        mut user_name,
        ..
    } = state;
    match err {
        ApiError::Transport(_) => {
            status.set(format!("{action} failed: cannot reach the server"));
        }
        ApiError::Unauthorized(_) => {
            user_name.set(None);
            view.set(View::Login);
            status.set("Session expired, please sign in again".to_string());
        }
        other => status.set(format!("{action} failed: {other}")),
    }
}

/// Leaving the grid drops the session; pending edits need a confirmation.
pub(crate) fn navigate(state: AppState, target: View) {
    let AppState {
        mut view,
        mut session,
        mut page,
        mut editing_cell,
        mut selected_rows,
        mut append_table,
        ..
    } = state;
    let current = view();
    if current == target {
        return;
    }

    let in_grid = |v: &View| matches!(v, View::LiveEdit | View::Append);
    if in_grid(&current) && !in_grid(&target) {
        let dirty = session.read().as_ref().is_some_and(|s| s.is_dirty());
        if dirty && !confirm("Discard changes", "Pending edits will be lost. Leave the grid?") {
            return;
        }
        session.set(None);
        page.set(None);
        editing_cell.set(None);
        selected_rows.write().clear();
        append_table.set(None);
    }
    view.set(target);
}

pub(crate) fn redirect_to_approvals(state: AppState) {
    spawn(async move {
        tokio::time::sleep(REDIRECT_DELAY).await;
        // The user may already have moved on.
        if matches!(*state.view.peek(), View::LiveEdit | View::Append) {
            navigate(state, View::Approvals);
        }
    });
}

fn load_datasets(state: AppState, services: AppServices) {
    let AppState {
        mut datasets,
        mut busy,
        mut status,
        ..
    } = state;
    spawn(async move {
        busy.set(true);
        match services.query.list_datasets().await {
            Ok(available) => {
                status.set(format!("{} dataset(s) available", available.len()));
                datasets.set(available);
            }
            Err(err) => report_api_error(state, "Loading datasets", &err),
        }
        busy.set(false);
    });
}

/// Loads one page of a dataset into a fresh edit session.
pub(crate) fn open_live_edit(state: AppState, services: AppServices, query: PageQuery) {
    let AppState {
        mut session,
        mut page,
        mut editing_cell,
        mut selected_rows,
        mut reviewers,
        mut view,
        mut busy,
        mut status,
        ..
    } = state;
    spawn(async move {
        busy.set(true);
        status.set(format!("Loading dataset {}...", query.dataset_id));
        match services.query.open_page(&query).await {
            Ok(loaded) => {
                let range = query.range_label(loaded.snapshot().len());
                let total = loaded.total();
                session.set(Some(loaded));
                page.set(Some(query));
                editing_cell.set(None);
                selected_rows.write().clear();
                state.reset_submit_form();
                view.set(View::LiveEdit);
                status.set(format!("Loaded rows {range} of {total}"));

                if reviewers.peek().is_empty() {
                    match services.query.list_reviewers().await {
                        Ok(list) => reviewers.set(list),
                        Err(err) => tracing::warn!(error = %err, "failed to load reviewers"),
                    }
                }
            }
            Err(err) => report_api_error(state, "Opening dataset", &err),
        }
        busy.set(false);
    });
}

fn load_changes(state: AppState, services: AppServices, filter: Option<ChangeStatus>) {
    let AppState {
        mut changes,
        mut busy,
        mut status,
        ..
    } = state;
    spawn(async move {
        busy.set(true);
        match services.approval.list(filter).await {
            Ok(list) => {
                status.set(format!("{} change request(s)", list.len()));
                changes.set(list);
            }
            Err(err) => report_api_error(state, "Loading change requests", &err),
        }
        busy.set(false);
    });
}

fn load_detail(state: AppState, services: AppServices, id: ChangeRequestId) {
    let AppState {
        mut change_detail,
        mut busy,
        ..
    } = state;
    spawn(async move {
        busy.set(true);
        match services.approval.detail(&id).await {
            Ok(detail) => change_detail.set(Some(detail)),
            Err(err) => report_api_error(state, "Loading change request", &err),
        }
        busy.set(false);
    });
}

#[component]
pub fn App() -> Element {
    let state = AppState::new();
    use_context_provider(|| state);
    let services = use_context::<AppServices>();

    use_effect(move || {
        let AppState {
            mut user_name,
            mut view,
            mut status,
            ..
        } = state;
        match services.session.restore() {
            Ok(Some(name)) => {
                user_name.set(Some(name));
                view.set(View::Datasets);
                load_datasets(state, services.clone());
            }
            Ok(None) => status.set("Please sign in".to_string()),
            Err(err) => status.set(format!("Local storage unavailable: {err}")),
        }
    });

    let current_view = (state.view)();
    let signed_in = (state.user_name)().is_some();

    rsx! {
        div { style: "{root_container_style()}",
            TopBar { signed_in }
            match current_view {
                View::Login => rsx! { LoginView {} },
                View::Datasets => rsx! { DatasetsView {} },
                View::LiveEdit => rsx! { LiveEditView {} },
                View::Append => rsx! { AppendView {} },
                View::Approvals => rsx! { ApprovalsView {} },
                View::ChangeDetail(id) => rsx! { ChangeDetailView { id } },
            }
        }
    }
}

#[component]
fn TopBar(signed_in: bool) -> Element {
    let state = use_context::<AppState>();
    let services = use_context::<AppServices>();
    let AppState {
        mut user_name,
        busy,
        status,
        ..
    } = state;
    let name = user_name().unwrap_or_default();
    let services_for_datasets = services.clone();

    rsx! {
        div { style: "{toolbar_style()} border-bottom: 1px solid #ddd;",
            strong { "Steward" }
            if signed_in {
                button {
                    style: "{button_style(true)}",
                    onclick: move |_| {
                        navigate(state, View::Datasets);
                        if (state.view)() == View::Datasets {
                            load_datasets(state, services_for_datasets.clone());
                        }
                    },
                    "Datasets"
                }
                button {
                    style: "{button_style(true)}",
                    onclick: move |_| navigate(state, View::Approvals),
                    "Approvals"
                }
                span { style: "margin-left: auto;", "{name}" }
                button {
                    style: "{button_style(true)}",
                    onclick: move |_| {
                        navigate(state, View::Login);
                        if (state.view)() != View::Login {
                            return;
                        }
                        if let Err(err) = services.session.sign_out() {
                            tracing::warn!(error = %err, "failed to clear stored session");
                        }
                        user_name.set(None);
                    },
                    "Sign out"
                }
            }
        }
        div { style: "min-height: 20px; color: #444;",
            if busy() { "Working... " }
            "{status}"
        }
    }
}

#[component]
fn LoginView() -> Element {
    let state = use_context::<AppState>();
    let services = use_context::<AppServices>();
    let AppState {
        mut login_email,
        mut login_password,
        mut user_name,
        mut view,
        mut busy,
        mut status,
        ..
    } = state;

    rsx! {
        div { style: "max-width: 360px; margin: 48px auto; display: flex; flex-direction: column; gap: 8px;",
            h2 { "Sign in" }
            input {
                placeholder: "Email",
                value: "{login_email}",
                oninput: move |event| login_email.set(event.value()),
            }
            input {
                r#type: "password",
                placeholder: "Password",
                value: "{login_password}",
                oninput: move |event| login_password.set(event.value()),
            }
            button {
                style: "{button_style(!busy())}",
                disabled: busy(),
                onclick: move |_| {
                    let services = services.clone();
                    let credentials = Credentials {
                        email: login_email(),
                        password: login_password(),
                    };
                    spawn(async move {
                        busy.set(true);
                        match services.session.sign_in(&credentials).await {
                            Ok(auth) => {
                                user_name.set(Some(auth.display_name));
                                login_password.set(String::new());
                                view.set(View::Datasets);
                                status.set("Signed in".to_string());
                                load_datasets(state, services.clone());
                            }
                            Err(err) => status.set(format!("Sign-in failed: {err}")),
                        }
                        busy.set(false);
                    });
                },
                "Sign in"
            }
        }
    }
}

#[component]
fn DatasetsView() -> Element {
    let state = use_context::<AppState>();
    let services = use_context::<AppServices>();
    let datasets = (state.datasets)();
    let busy = (state.busy)();

    rsx! {
        div { style: "{table_container_style()}",
            table { style: "border-collapse: collapse; width: 100%; background: #fff;",
                thead {
                    tr {
                        th { style: "{table_header_cell_style()}", "Dataset" }
                        th { style: "{table_header_cell_style()}", "Project" }
                        th { style: "{table_header_cell_style()}", "Rows" }
                        th { style: "{table_header_cell_style()}", "" }
                    }
                }
                tbody {
                    {datasets.iter().map(|dataset| {
                        let dataset_id = dataset.id;
                        let services = services.clone();
                        let project = dataset.project.clone().unwrap_or_default();
                        rsx!(
                            tr { key: "{dataset_id}",
                                td { style: "border: 1px solid #bbb; padding: 6px;", "{dataset.name}" }
                                td { style: "border: 1px solid #bbb; padding: 6px;", "{project}" }
                                td { style: "border: 1px solid #bbb; padding: 6px; text-align: right;", "{dataset.row_count}" }
                                td { style: "border: 1px solid #bbb; padding: 6px;",
                                    button {
                                        style: "{button_style(!busy)}",
                                        disabled: busy,
                                        onclick: move |_| open_live_edit(
                                            state,
                                            services.clone(),
                                            PageQuery::first_page(dataset_id, PAGE_SIZE),
                                        ),
                                        "Live edit"
                                    }
                                }
                            }
                        )
                    })}
                }
            }
        }
    }
}

/// Title, comment and reviewer picks shared by both submit paths.
#[component]
pub fn SubmitFormFields() -> Element {
    let state = use_context::<AppState>();
    let AppState {
        reviewers,
        mut submit_title,
        mut submit_comment,
        mut submit_reviewers,
        ..
    } = state;
    let chosen = submit_reviewers();

    rsx! {
        div { style: "display: flex; flex-direction: column; gap: 6px; padding: 8px; border: 1px solid #ddd; border-radius: 6px;",
            label { "Title" }
            input {
                value: "{submit_title}",
                oninput: move |event| submit_title.set(event.value()),
            }
            label { "Comment" }
            textarea {
                rows: "3",
                value: "{submit_comment}",
                oninput: move |event| submit_comment.set(event.value()),
            }
            label { "Reviewers" }
            div { style: "display: flex; flex-wrap: wrap; gap: 12px;",
                {reviewers().into_iter().map(|reviewer| {
                    let reviewer_id = reviewer.id;
                    let checked = chosen.contains(&reviewer_id);
                    rsx!(
                        label { key: "{reviewer_id}",
                            style: "display: flex; align-items: center; gap: 4px; cursor: pointer;",
                            input {
                                r#type: "checkbox",
                                checked: checked,
                                onclick: move |_| {
                                    let mut next = submit_reviewers.write();
                                    if !next.remove(&reviewer_id) {
                                        next.insert(reviewer_id);
                                    }
                                }
                            }
                            span { "{reviewer.name}" }
                        }
                    )
                })}
            }
        }
    }
}

#[component]
fn AppendView() -> Element {
    let state = use_context::<AppState>();
    let services = use_context::<AppServices>();
    let AppState {
        session,
        mut append_table,
        mut busy,
        mut status,
        ..
    } = state;

    let Some((dataset_id, columns)) = session
        .read()
        .as_ref()
        .map(|current| (current.dataset_id(), current.columns().to_vec()))
    else {
        return rsx! { p { "Open a dataset first." } };
    };

    let table = append_table();
    let can_submit = !busy() && table.as_ref().is_some_and(|t| !t.rows.is_empty());
    let has_table = table.is_some();
    let preview_columns = table
        .as_ref()
        .map(|t| t.columns.clone())
        .unwrap_or_default();
    let preview_rows: Vec<Vec<String>> = table
        .map(|t| t.rows.into_iter().take(50).collect())
        .unwrap_or_default();
    let services_for_pick = services.clone();
    let columns_for_pick = columns.clone();

    rsx! {
        div { style: "{toolbar_style()}",
            button {
                style: "{button_style(true)}",
                onclick: move |_| navigate(state, View::LiveEdit),
                "Back to grid"
            }
            button {
                style: "{button_style(!busy())}",
                disabled: busy(),
                onclick: move |_| {
                    let Some(path) = FileDialog::new()
                        .add_filter("Tables", &["csv", "xlsx", "xls"])
                        .pick_file()
                    else {
                        return;
                    };
                    let parsed = services_for_pick.import.read_table(&path).and_then(|table| {
                        check_columns(&columns_for_pick, &table)?;
                        Ok(table)
                    });
                    match parsed {
                        Ok(table) => {
                            status.set(format!("Read {} row(s) from {}", table.rows.len(), path.display()));
                            append_table.set(Some(table));
                        }
                        Err(err) => {
                            append_table.set(None);
                            status.set(format!("Cannot use file: {err}"));
                        }
                    }
                },
                "Choose file..."
            }
            span { "Dataset {dataset_id}: {columns.len()} column(s)" }
        }

        if has_table {
            SubmitFormFields {}
            div { style: "{toolbar_style()}",
                button {
                    style: "{button_style(can_submit)}",
                    disabled: !can_submit,
                    onclick: move |_| {
                        let form = state.submit_form();
                        if form.title.trim().is_empty() {
                            status.set("A title is required".to_string());
                            return;
                        }
                        let Some(table) = append_table() else {
                            return;
                        };
                        let services = services.clone();
                        let columns = columns.clone();
                        spawn(async move {
                            busy.set(true);
                            match services.import.submit_append(dataset_id, &columns, table, &form).await {
                                Ok(id) => {
                                    status.set(format!("Submitted change request {id}"));
                                    append_table.set(None);
                                    state.reset_submit_form();
                                    redirect_to_approvals(state);
                                }
                                Err(err) => status.set(format!("Append failed: {err}")),
                            }
                            busy.set(false);
                        });
                    },
                    "Submit append request"
                }
            }
            div { style: "{table_container_style()}",
                table { style: "border-collapse: collapse; width: 100%; border: 1px solid #bbb;",
                    thead {
                        tr {
                            for header in preview_columns.iter() {
                                th { style: "{table_header_cell_style()}", "{header}" }
                            }
                        }
                    }
                    tbody {
                        for row in preview_rows.iter() {
                            tr {
                                for cell in row.iter() {
                                    td { style: "border: 1px solid #bbb; padding: 6px;", "{cell}" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn status_label(status: Option<ChangeStatus>) -> &'static str {
    match status {
        None => "All",
        Some(status) => match status {
            ChangeStatus::Pending => "Pending",
            ChangeStatus::Approved => "Approved",
            ChangeStatus::Rejected => "Rejected",
        },
    }
}

fn parse_status_filter(value: &str) -> Option<ChangeStatus> {
    match value {
        "pending" => Some(ChangeStatus::Pending),
        "approved" => Some(ChangeStatus::Approved),
        "rejected" => Some(ChangeStatus::Rejected),
        _ => None,
    }
}

#[component]
fn ApprovalsView() -> Element {
    let state = use_context::<AppState>();
    let services = use_context::<AppServices>();
    let AppState {
        mut status_filter,
        changes,
        ..
    } = state;

    use_effect(move || {
        let filter = status_filter();
        load_changes(state, services.clone(), filter);
    });

    let selected = status_filter();
    let filters = [
        None,
        Some(ChangeStatus::Pending),
        Some(ChangeStatus::Approved),
        Some(ChangeStatus::Rejected),
    ];

    rsx! {
        div { style: "{toolbar_style()}",
            span { "Status" }
            select {
                onchange: move |event| status_filter.set(parse_status_filter(&event.value())),
                for filter in filters {
                    option {
                        value: filter.map(ChangeStatus::as_str).unwrap_or("all"),
                        selected: filter == selected,
                        "{status_label(filter)}"
                    }
                }
            }
        }
        div { style: "{table_container_style()}",
            table { style: "border-collapse: collapse; width: 100%; background: #fff;",
                thead {
                    tr {
                        th { style: "{table_header_cell_style()}", "Title" }
                        th { style: "{table_header_cell_style()}", "Dataset" }
                        th { style: "{table_header_cell_style()}", "Author" }
                        th { style: "{table_header_cell_style()}", "Status" }
                        th { style: "{table_header_cell_style()}", "Created" }
                    }
                }
                tbody {
                    {changes().into_iter().map(|change| {
                        let id = change.id.clone();
                        let dataset = change
                            .dataset_name
                            .clone()
                            .unwrap_or_else(|| change.dataset_id.to_string());
                        let created = change.created_at.format("%Y-%m-%d %H:%M").to_string();
                        let label = status_label(Some(change.status));
                        rsx!(
                            tr { key: "{change.id}",
                                style: "cursor: pointer;",
                                onclick: move |_| navigate(state, View::ChangeDetail(id.clone())),
                                td { style: "border: 1px solid #bbb; padding: 6px;", "{change.title}" }
                                td { style: "border: 1px solid #bbb; padding: 6px;", "{dataset}" }
                                td { style: "border: 1px solid #bbb; padding: 6px;", "{change.author}" }
                                td { style: "border: 1px solid #bbb; padding: 6px;", "{label}" }
                                td { style: "border: 1px solid #bbb; padding: 6px;", "{created}" }
                            }
                        )
                    })}
                }
            }
        }
    }
}

#[component]
fn ChangeDetailView(id: ChangeRequestId) -> Element {
    let state = use_context::<AppState>();
    let services = use_context::<AppServices>();
    let AppState {
        change_detail,
        mut comment_draft,
        mut busy,
        mut status,
        ..
    } = state;

    let id_for_load = id.clone();
    let services_for_load = services.clone();
    use_effect(move || {
        load_detail(state, services_for_load.clone(), id_for_load.clone());
    });

    let Some(detail) = change_detail().filter(|detail| detail.summary.id == id) else {
        return rsx! { p { "Loading change request {id}..." } };
    };

    let pending = detail.summary.status == ChangeStatus::Pending;
    let reviewers = detail
        .reviewers
        .iter()
        .map(|reviewer| reviewer.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let deleted_rows = detail.deleted_rows.join(", ");
    let label = status_label(Some(detail.summary.status));

    let services_for_approve = services.clone();
    let id_for_approve = id.clone();
    let services_for_reject = services.clone();
    let id_for_reject = id.clone();
    let services_for_comment = services.clone();
    let id_for_comment = id.clone();

    rsx! {
        div { style: "display: flex; flex-direction: column; gap: 8px; overflow: auto;",
            div { style: "{toolbar_style()}",
                button {
                    style: "{button_style(true)}",
                    onclick: move |_| navigate(state, View::Approvals),
                    "Back"
                }
                h3 { style: "margin: 0;", "{detail.summary.title}" }
                span { "{label}" }
                if pending {
                    button {
                        style: "{button_style(!busy())}",
                        disabled: busy(),
                        onclick: move |_| {
                            let services = services_for_approve.clone();
                            let id = id_for_approve.clone();
                            spawn(async move {
                                busy.set(true);
                                match services.approval.approve(&id).await {
                                    Ok(()) => {
                                        status.set(format!("Approved {id}"));
                                        load_detail(state, services.clone(), id);
                                    }
                                    Err(err) => report_api_error(state, "Approving", &err),
                                }
                                busy.set(false);
                            });
                        },
                        "Approve"
                    }
                    button {
                        style: "{button_style(!busy())}",
                        disabled: busy(),
                        onclick: move |_| {
                            if !confirm("Reject change request", "Reject this change request?") {
                                return;
                            }
                            let services = services_for_reject.clone();
                            let id = id_for_reject.clone();
                            spawn(async move {
                                busy.set(true);
                                match services.approval.reject(&id).await {
                                    Ok(()) => {
                                        status.set(format!("Rejected {id}"));
                                        load_detail(state, services.clone(), id);
                                    }
                                    Err(err) => report_api_error(state, "Rejecting", &err),
                                }
                                busy.set(false);
                            });
                        },
                        "Reject"
                    }
                }
            }
            p { "Author: {detail.summary.author} | Reviewers: {reviewers}" }
            if !detail.comment.is_empty() {
                p { "{detail.comment}" }
            }

            if !detail.edited_cells.is_empty() {
                h4 { "Edited cells ({detail.edited_cells.len()})" }
                table { style: "border-collapse: collapse; border: 1px solid #bbb;",
                    thead {
                        tr {
                            th { style: "{table_header_cell_style()}", "Row" }
                            th { style: "{table_header_cell_style()}", "Column" }
                            th { style: "{table_header_cell_style()}", "Before" }
                            th { style: "{table_header_cell_style()}", "After" }
                        }
                    }
                    tbody {
                        for cell in detail.edited_cells.iter() {
                            tr {
                                td { style: "border: 1px solid #bbb; padding: 6px;", "{cell.row_id}" }
                                td { style: "border: 1px solid #bbb; padding: 6px;", "{cell.column}" }
                                td { style: "border: 1px solid #bbb; padding: 6px; color: #a33;", "{display_value(&cell.old_value)}" }
                                td { style: "border: 1px solid #bbb; padding: 6px; color: #262;", "{display_value(&cell.new_value)}" }
                            }
                        }
                    }
                }
            }
            if !detail.deleted_rows.is_empty() {
                p { "Deleted rows: {deleted_rows}" }
            }
            if detail.appended_rows > 0 {
                p { "Appended rows: {detail.appended_rows}" }
            }

            h4 { "Comments" }
            {detail.comments.iter().map(|comment| {
                let posted = comment.created_at.format("%Y-%m-%d %H:%M").to_string();
                rsx!(
                    div { style: "border-left: 3px solid #ddd; padding-left: 8px;",
                        strong { "{comment.author}" }
                        span { style: "color: #888; margin-left: 8px;", "{posted}" }
                        p { style: "margin: 4px 0;", "{comment.body}" }
                    }
                )
            })}
            textarea {
                rows: "3",
                value: "{comment_draft}",
                oninput: move |event| comment_draft.set(event.value()),
            }
            div {
                button {
                    style: "{button_style(!busy())}",
                    disabled: busy(),
                    onclick: move |_| {
                        let services = services_for_comment.clone();
                        let id = id_for_comment.clone();
                        let body = comment_draft();
                        spawn(async move {
                            busy.set(true);
                            match services.approval.comment(&id, &body).await {
                                Ok(()) => {
                                    comment_draft.set(String::new());
                                    load_detail(state, services.clone(), id);
                                }
                                Err(err) => report_api_error(state, "Commenting", &err),
                            }
                            busy.set(false);
                        });
                    },
                    "Add comment"
                }
            }
        }
    }
}

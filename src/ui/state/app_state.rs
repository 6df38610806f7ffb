use std::collections::BTreeSet;

use dioxus::prelude::*;

use crate::domain::entities::change_request::{
    default_change_title, ChangeRequestDetail, ChangeRequestId, ChangeRequestSummary,
    ChangeStatus, Reviewer, SubmitForm,
};
use crate::domain::entities::dataset::{DatasetSummary, PageQuery, RowId, TabularData};
use crate::domain::entities::edit::CellKey;
use crate::domain::live_edit::LiveEditSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Login,
    Datasets,
    LiveEdit,
    Append,
    Approvals,
    ChangeDetail(ChangeRequestId),
}

#[derive(Clone, Copy)]
pub struct AppState {
    pub view: Signal<View>,
    pub user_name: Signal<Option<String>>,
    pub busy: Signal<bool>,
    pub status: Signal<String>,
    pub login_email: Signal<String>,
    pub login_password: Signal<String>,
    pub datasets: Signal<Vec<DatasetSummary>>,
    pub session: Signal<Option<LiveEditSession>>,
    pub page: Signal<Option<PageQuery>>,
    pub editing_cell: Signal<Option<CellKey>>,
    pub editing_value: Signal<String>,
    pub selected_rows: Signal<BTreeSet<RowId>>,
    pub reviewers: Signal<Vec<Reviewer>>,
    pub show_submit_form: Signal<bool>,
    pub submit_title: Signal<String>,
    pub submit_comment: Signal<String>,
    pub submit_reviewers: Signal<BTreeSet<i64>>,
    pub append_table: Signal<Option<TabularData>>,
    pub status_filter: Signal<Option<ChangeStatus>>,
    pub changes: Signal<Vec<ChangeRequestSummary>>,
    pub change_detail: Signal<Option<ChangeRequestDetail>>,
    pub comment_draft: Signal<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            view: use_signal(|| View::Login),
            user_name: use_signal(|| None::<String>),
            busy: use_signal(|| false),
            status: use_signal(|| "Ready".to_string()),
            login_email: use_signal(String::new),
            login_password: use_signal(String::new),
            datasets: use_signal(Vec::<DatasetSummary>::new),
            session: use_signal(|| None::<LiveEditSession>),
            page: use_signal(|| None::<PageQuery>),
            editing_cell: use_signal(|| None::<CellKey>),
            editing_value: use_signal(String::new),
            selected_rows: use_signal(BTreeSet::<RowId>::new),
            reviewers: use_signal(Vec::<Reviewer>::new),
            show_submit_form: use_signal(|| false),
            submit_title: use_signal(|| default_change_title(chrono::Utc::now())),
            submit_comment: use_signal(String::new),
            submit_reviewers: use_signal(BTreeSet::<i64>::new),
            append_table: use_signal(|| None::<TabularData>),
            status_filter: use_signal(|| Some(ChangeStatus::Pending)),
            changes: use_signal(Vec::<ChangeRequestSummary>::new),
            change_detail: use_signal(|| None::<ChangeRequestDetail>),
            comment_draft: use_signal(String::new),
        }
    }

    pub fn submit_form(&self) -> SubmitForm {
        SubmitForm {
            title: self.submit_title.read().clone(),
            comment: self.submit_comment.read().clone(),
            reviewer_ids: self.submit_reviewers.read().iter().copied().collect(),
        }
    }

    pub fn reset_submit_form(&self) {
        let AppState {
            mut submit_title,
            mut submit_comment,
            mut submit_reviewers,
            mut show_submit_form,
            ..
        } = *self;
        submit_title.set(default_change_title(chrono::Utc::now()));
        submit_comment.set(String::new());
        submit_reviewers.write().clear();
        show_submit_form.set(false);
    }
}

use dioxus::prelude::*;

use crate::app::{
    confirm, navigate, open_live_edit, redirect_to_approvals, AppServices, SubmitFormFields,
};
use crate::domain::entities::dataset::{display_value, PageQuery, RowId};
use crate::domain::entities::edit::CellKey;
use crate::domain::entities::rule::Severity;
use crate::domain::live_edit::SubmitState;
use crate::ui::state::app_state::{AppState, View};
use crate::ui::styles::{
    badge_style, button_style, cell_style, row_style, table_container_style,
    table_header_cell_style, toolbar_style,
};

#[derive(Debug, Clone, PartialEq)]
struct GridCell {
    key: CellKey,
    text: String,
    style: String,
    tooltip: String,
    editable: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct GridRow {
    row_id: RowId,
    deleted: bool,
    cells: Vec<GridCell>,
}

fn submit_state_label(state: &SubmitState) -> String {
    match state {
        SubmitState::Idle => "No pending changes".to_string(),
        SubmitState::Ready => "Ready to submit".to_string(),
        SubmitState::Blocked { blocking } => {
            format!("{blocking} blocking error(s) must be fixed before submitting")
        }
        SubmitState::Submitting => "Submitting...".to_string(),
        SubmitState::Submitted(id) => format!("Submitted as change request {id}"),
        SubmitState::Failed(message) => format!("Last submit failed: {message}"),
    }
}

/// Commits the in-progress cell edit and fires its rule check.
fn commit_edit(state: AppState, services: AppServices) {
    let AppState {
        mut session,
        mut editing_cell,
        mut editing_value,
        ..
    } = state;
    let Some(key) = editing_cell() else {
        return;
    };
    let text = editing_value();
    editing_cell.set(None);
    editing_value.set(String::new());

    let pending = session.write().as_mut().and_then(|current| {
        let ticket = current.record_text(&key.row_id, &key.column, &text)?;
        Some((current.rules().clone(), ticket))
    });
    let Some((rules, ticket)) = pending else {
        return;
    };

    spawn(async move {
        let result = services.edit.revalidate(&rules, &ticket).await;
        if let Some(current) = session.write().as_mut() {
            current.apply_validation(&ticket, result);
        }
    });
}

/// Moves the grid to another page; pending changes on this one need a confirmation.
fn change_page(state: AppState, services: AppServices, target: Option<PageQuery>) {
    let Some(target) = target else {
        return;
    };
    let dirty = state.session.read().as_ref().is_some_and(|s| s.is_dirty());
    if dirty && !confirm("Discard changes", "Pending edits on this page will be lost. Continue?") {
        return;
    }
    open_live_edit(state, services, target);
}

fn submit_changes(state: AppState, services: AppServices) {
    let AppState {
        mut session,
        mut status,
        mut editing_cell,
        ..
    } = state;
    let form = state.submit_form();
    if form.title.trim().is_empty() {
        status.set("A title is required".to_string());
        return;
    }
    if form.reviewer_ids.is_empty() {
        status.set("Pick at least one reviewer".to_string());
        return;
    }

    editing_cell.set(None);
    let begun = session
        .write()
        .as_mut()
        .map(|current| (current.session_id().to_string(), current.begin_submit(&form)));
    let (session_id, submission) = match begun {
        None => return,
        Some((_, Err(blocked))) => {
            status.set(format!("Cannot submit: {blocked}"));
            return;
        }
        Some((session_id, Ok(submission))) => (session_id, submission),
    };

    status.set("Submitting change request...".to_string());
    spawn(async move {
        let result = services.edit.send_submission(&submission).await;
        let message = match &result {
            Ok(id) => format!("Submitted change request {id}"),
            Err(err) if err.is_transport() => {
                "Submit failed: cannot reach the server. Your edits are kept.".to_string()
            }
            Err(err) => format!("Submit failed: {err}. Your edits are kept."),
        };
        let succeeded = result.is_ok();
        if let Some(current) = session.write().as_mut() {
            current.finish_submit_for(&session_id, result);
        }
        status.set(message);
        if succeeded {
            state.reset_submit_form();
            redirect_to_approvals(state);
        }
    });
}

#[component]
pub fn LiveEditView() -> Element {
    let state = use_context::<AppState>();
    let services = use_context::<AppServices>();
    let AppState {
        mut session,
        mut editing_cell,
        mut editing_value,
        mut selected_rows,
        mut show_submit_form,
        mut status,
        page,
        busy,
        ..
    } = state;

    let editing = editing_cell();
    let current_page = page();
    let selected = selected_rows();

    let guard = session.read();
    let Some(current) = guard.as_ref() else {
        return rsx! { p { "No dataset open." } };
    };
    let dataset_id = current.dataset_id();
    let columns = current.columns().to_vec();
    let total = current.total();
    let edited_count = current.ledger().len();
    let deleted_count = current.deleted().len();
    let counts = current.severity_counts();
    let submit_state = current.submit_state();
    let can_submit = current.can_submit() && !busy();
    let grid: Vec<GridRow> = current
        .display_rows()
        .into_iter()
        .map(|row| {
            let cells = columns
                .iter()
                .map(|column| {
                    let cell = current.cell_status(&row.row_id, column);
                    GridCell {
                        key: CellKey::new(row.row_id.clone(), column.as_str()),
                        text: display_value(row.value(column)),
                        style: cell_style(&cell),
                        tooltip: cell
                            .error
                            .map(|error| format!("{}: {}", error.severity, error.message))
                            .unwrap_or_default(),
                        editable: current.can_edit(&row.row_id, column),
                    }
                })
                .collect();
            GridRow {
                deleted: current.is_deleted(&row.row_id),
                row_id: row.row_id,
                cells,
            }
        })
        .collect();
    drop(guard);

    let shown = grid.len();
    let range = current_page
        .as_ref()
        .map(|query| query.range_label(shown))
        .unwrap_or_else(|| shown.to_string());
    let previous_page = current_page.as_ref().and_then(PageQuery::previous);
    let next_page = current_page.as_ref().and_then(|query| query.next(total));
    let has_previous = previous_page.is_some() && !busy();
    let has_next = next_page.is_some() && !busy();
    let services_for_previous = services.clone();
    let services_for_next = services.clone();
    let all_selected = shown > 0 && selected.len() == shown;
    let all_row_ids: Vec<RowId> = grid.iter().map(|row| row.row_id.clone()).collect();
    let state_label = submit_state_label(&submit_state);
    let has_selection = !selected.is_empty();
    let services_for_submit = services.clone();

    rsx! {
        div { style: "{toolbar_style()}",
            strong { "Dataset {dataset_id}" }
            span { "Rows {range} of {total} | {edited_count} edited | {deleted_count} deleted" }
            button {
                style: "{button_style(has_previous)}",
                disabled: !has_previous,
                onclick: move |_| {
                    change_page(state, services_for_previous.clone(), previous_page.clone())
                },
                "Previous page"
            }
            button {
                style: "{button_style(has_next)}",
                disabled: !has_next,
                onclick: move |_| change_page(state, services_for_next.clone(), next_page.clone()),
                "Next page"
            }
            for severity in Severity::ALL {
                if counts.get(severity) > 0 {
                    span { style: "{badge_style(severity)}", "{severity}: {counts.get(severity)}" }
                }
            }
        }
        div { style: "{toolbar_style()}",
            button {
                style: "{button_style(has_selection)}",
                disabled: !has_selection,
                onclick: move |_| {
                    let ids: Vec<RowId> = selected_rows.read().iter().cloned().collect();
                    let marked = session
                        .write()
                        .as_mut()
                        .map(|current| current.mark_deleted(&ids))
                        .unwrap_or(0);
                    if editing_cell().is_some_and(|key| ids.contains(&key.row_id)) {
                        editing_cell.set(None);
                    }
                    selected_rows.write().clear();
                    status.set(format!("{marked} row(s) marked for deletion"));
                },
                "Delete selected"
            }
            button {
                style: "{button_style(has_selection)}",
                disabled: !has_selection,
                onclick: move |_| {
                    let ids: Vec<RowId> = selected_rows.read().iter().cloned().collect();
                    let restored = session
                        .write()
                        .as_mut()
                        .map(|current| current.restore(&ids))
                        .unwrap_or(0);
                    selected_rows.write().clear();
                    status.set(format!("{restored} row(s) restored"));
                },
                "Restore selected"
            }
            button {
                style: "{button_style(edited_count + deleted_count > 0)}",
                disabled: edited_count + deleted_count == 0,
                onclick: move |_| {
                    if !confirm("Undo all", "Discard every pending edit and deletion?") {
                        return;
                    }
                    if let Some(current) = session.write().as_mut() {
                        current.undo_all();
                    }
                    editing_cell.set(None);
                    selected_rows.write().clear();
                    status.set("All changes undone".to_string());
                },
                "Undo all"
            }
            button {
                style: "{button_style(true)}",
                onclick: move |_| navigate(state, View::Append),
                "Append from file..."
            }
            button {
                style: "{button_style(true)}",
                onclick: move |_| show_submit_form.set(!show_submit_form()),
                if show_submit_form() { "Hide submit form" } else { "Submit..." }
            }
            span { "{state_label}" }
        }

        if show_submit_form() {
            SubmitFormFields {}
            div { style: "{toolbar_style()}",
                button {
                    style: "{button_style(can_submit)}",
                    disabled: !can_submit,
                    onclick: move |_| submit_changes(state, services_for_submit.clone()),
                    "Submit change request"
                }
            }
        }

        div { style: "{table_container_style()}",
            table { style: "border-collapse: collapse; width: 100%; background: #fff;",
                thead {
                    tr {
                        th { style: "{table_header_cell_style()}",
                            input {
                                r#type: "checkbox",
                                checked: all_selected,
                                onclick: move |_| {
                                    let mut next = selected_rows.write();
                                    if all_selected {
                                        next.clear();
                                    } else {
                                        next.extend(all_row_ids.iter().cloned());
                                    }
                                }
                            }
                        }
                        for column in columns.iter() {
                            th { style: "{table_header_cell_style()}", "{column}" }
                        }
                    }
                }
                tbody {
                    {grid.into_iter().map(|row| {
                        let row_id = row.row_id.clone();
                        let is_selected = selected.contains(&row.row_id);
                        rsx!(
                            tr { key: "{row.row_id}",
                                style: "{row_style(row.deleted, is_selected)}",
                                td { style: "border: 1px solid #bbb; padding: 4px; text-align: center;",
                                    input {
                                        r#type: "checkbox",
                                        checked: is_selected,
                                        onclick: move |_| {
                                            let mut next = selected_rows.write();
                                            if !next.remove(&row_id) {
                                                next.insert(row_id.clone());
                                            }
                                        }
                                    }
                                }
                                {row.cells.into_iter().map(|cell| {
                                    let services = services.clone();
                                    let GridCell { key, text, style, tooltip, editable } = cell;
                                    if editing.as_ref() == Some(&key) {
                                        rsx!(
                                            td { style: "{style}",
                                                input {
                                                    autofocus: true,
                                                    value: "{editing_value}",
                                                    oninput: move |event| editing_value.set(event.value()),
                                                    onkeydown: move |event| {
                                                        if event.key() == Key::Enter {
                                                            commit_edit(state, services.clone());
                                                        } else if event.key() == Key::Escape {
                                                            editing_cell.set(None);
                                                            editing_value.set(String::new());
                                                        }
                                                    }
                                                }
                                            }
                                        )
                                    } else {
                                        let label = text.clone();
                                        rsx!(
                                            td {
                                                style: "{style}",
                                                title: "{tooltip}",
                                                ondoubleclick: move |_| {
                                                    if !editable {
                                                        return;
                                                    }
                                                    editing_cell.set(Some(key.clone()));
                                                    editing_value.set(text.clone());
                                                },
                                                "{label}"
                                            }
                                        )
                                    }
                                })}
                            }
                        )
                    })}
                }
            }
        }
    }
}

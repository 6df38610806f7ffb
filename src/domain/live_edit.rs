use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::domain::entities::change_request::{
    ChangeRequestId, ChangeSubmission, EditedCell, SubmitForm,
};
use crate::domain::entities::dataset::{
    parse_input, CellValue, DatasetId, PageResult, Row, RowId,
};
use crate::domain::entities::edit::{CellEdit, CellKey, DeletionSet, EditLedger};
use crate::domain::entities::rule::RuleSet;
use crate::domain::entities::validation::{
    CacheUpdate, SeverityCounts, ValidationCache, ValidationError, ValidationTicket, Violation,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitPhase {
    Editing,
    Submitting,
    Submitted(ChangeRequestId),
    Failed(String),
}

/// Submit eligibility as seen by the grid's toolbar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Ready,
    Blocked { blocking: usize },
    Submitting,
    Submitted(ChangeRequestId),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitBlocked {
    NothingToSubmit,
    BlockingErrors(usize),
    AlreadySubmitting,
}

impl fmt::Display for SubmitBlocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitBlocked::NothingToSubmit => f.write_str("no pending changes"),
            SubmitBlocked::BlockingErrors(count) => {
                write!(f, "{count} blocking validation error(s)")
            }
            SubmitBlocked::AlreadySubmitting => f.write_str("a submission is already in flight"),
        }
    }
}

impl std::error::Error for SubmitBlocked {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellStatus<'a> {
    pub edited: bool,
    pub deleted: bool,
    pub error: Option<&'a ValidationError>,
}

/// Edit-tracking state of one live-edit page.
///
/// The original rows are never mutated; every change lives in the ledger or
/// the deletion set until it is submitted or undone.
#[derive(Debug, Clone)]
pub struct LiveEditSession {
    session_id: String,
    dataset_id: DatasetId,
    columns: Vec<String>,
    total: i64,
    snapshot: Vec<Row>,
    index: HashMap<RowId, usize>,
    rules: RuleSet,
    ledger: EditLedger,
    deleted: DeletionSet,
    validation: ValidationCache,
    phase: SubmitPhase,
}

impl LiveEditSession {
    pub fn load(dataset_id: DatasetId, page: PageResult, rules: RuleSet) -> Self {
        let mut index = HashMap::with_capacity(page.rows.len());
        for (position, row) in page.rows.iter().enumerate() {
            index.entry(row.row_id.clone()).or_insert(position);
        }
        Self {
            session_id: uuid::Uuid::now_v7().to_string(),
            dataset_id,
            columns: page.columns,
            total: page.total,
            snapshot: page.rows,
            index,
            rules,
            ledger: EditLedger::default(),
            deleted: DeletionSet::default(),
            validation: ValidationCache::default(),
            phase: SubmitPhase::Editing,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn dataset_id(&self) -> DatasetId {
        self.dataset_id
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn snapshot(&self) -> &[Row] {
        &self.snapshot
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn ledger(&self) -> &EditLedger {
        &self.ledger
    }

    pub fn deleted(&self) -> &DeletionSet {
        &self.deleted
    }

    pub fn validation(&self) -> &ValidationCache {
        &self.validation
    }

    pub fn phase(&self) -> &SubmitPhase {
        &self.phase
    }

    fn original(&self, row_id: &RowId) -> Option<&Row> {
        self.index.get(row_id).and_then(|&idx| self.snapshot.get(idx))
    }

    /// Records the value a cell now holds.
    ///
    /// Returns a ticket when the cell differs from the original and needs a
    /// rule check; a revert drops the edit and its cached error instead.
    pub fn record_edit(
        &mut self,
        row_id: &RowId,
        column: &str,
        new_value: CellValue,
    ) -> Option<ValidationTicket> {
        let Some(original) = self.original(row_id) else {
            tracing::debug!(row_id = %row_id, column, "ignoring edit for unknown row");
            return None;
        };
        let old_value = original.value(column).clone();
        let key = CellKey::new(row_id.clone(), column);

        if matches!(self.phase, SubmitPhase::Submitted(_)) {
            self.phase = SubmitPhase::Editing;
        }

        if new_value == old_value {
            self.ledger.remove(&key);
            self.validation.invalidate(&key);
            return None;
        }

        self.ledger.upsert(CellEdit {
            row_id: row_id.clone(),
            column: column.to_string(),
            old_value,
            new_value: new_value.clone(),
        });
        let seq = self.validation.issue(&key);
        let row_context = self.current_values(row_id);
        Some(ValidationTicket {
            session_id: self.session_id.clone(),
            key,
            seq,
            value: new_value,
            row_context,
        })
    }

    /// Records text typed into the grid, read as the original cell's kind.
    pub fn record_text(
        &mut self,
        row_id: &RowId,
        column: &str,
        text: &str,
    ) -> Option<ValidationTicket> {
        let original = self
            .original(row_id)
            .map(|row| row.value(column).clone())
            .unwrap_or(CellValue::Null);
        self.record_edit(row_id, column, parse_input(text, &original))
    }

    /// Folds the result of a rule check into the cache. Tickets issued by
    /// another session are stale.
    pub fn apply_validation<E: fmt::Display>(
        &mut self,
        ticket: &ValidationTicket,
        result: Result<Vec<Violation>, E>,
    ) -> CacheUpdate {
        if ticket.session_id != self.session_id {
            tracing::debug!(
                session_id = %self.session_id,
                ticket_session = %ticket.session_id,
                "discarding validation response for a replaced session"
            );
            return CacheUpdate::Stale;
        }
        match result {
            Ok(violations) => {
                let update = self.validation.apply(&ticket.key, ticket.seq, &violations);
                if update == CacheUpdate::Stale {
                    tracing::debug!(
                        row_id = %ticket.key.row_id,
                        column = %ticket.key.column,
                        seq = ticket.seq,
                        "discarding stale validation response"
                    );
                }
                update
            }
            Err(err) => {
                tracing::warn!(
                    row_id = %ticket.key.row_id,
                    column = %ticket.key.column,
                    error = %err,
                    "cell validation failed; keeping previous state"
                );
                CacheUpdate::Unchanged
            }
        }
    }

    pub fn mark_deleted(&mut self, row_ids: &[RowId]) -> usize {
        let rows: Vec<Row> = row_ids
            .iter()
            .filter_map(|id| self.original(id).cloned())
            .collect();
        let added = self.deleted.mark(&rows);
        if added > 0 && matches!(self.phase, SubmitPhase::Submitted(_)) {
            self.phase = SubmitPhase::Editing;
        }
        added
    }

    pub fn restore(&mut self, row_ids: &[RowId]) -> usize {
        self.deleted.restore(row_ids)
    }

    pub fn is_deleted(&self, row_id: &RowId) -> bool {
        self.deleted.contains(row_id)
    }

    /// Whether the grid should offer editing for this cell.
    pub fn can_edit(&self, row_id: &RowId, column: &str) -> bool {
        self.phase != SubmitPhase::Submitting
            && self.original(row_id).is_some()
            && !self.deleted.contains(row_id)
            && self.rules.is_editable(column)
    }

    pub fn undo_all(&mut self) {
        self.ledger.clear();
        self.deleted.clear();
        self.validation.clear();
        self.phase = SubmitPhase::Editing;
    }

    pub fn is_dirty(&self) -> bool {
        !self.ledger.is_empty() || !self.deleted.is_empty()
    }

    pub fn severity_counts(&self) -> SeverityCounts {
        self.validation.counts()
    }

    pub fn submit_state(&self) -> SubmitState {
        match &self.phase {
            SubmitPhase::Submitting => return SubmitState::Submitting,
            SubmitPhase::Submitted(id) => return SubmitState::Submitted(id.clone()),
            _ => {}
        }
        if !self.is_dirty() {
            return SubmitState::Idle;
        }
        let blocking = self.validation.counts().blocking();
        if blocking > 0 {
            return SubmitState::Blocked { blocking };
        }
        match &self.phase {
            SubmitPhase::Failed(message) => SubmitState::Failed(message.clone()),
            _ => SubmitState::Ready,
        }
    }

    pub fn can_submit(&self) -> bool {
        matches!(
            self.submit_state(),
            SubmitState::Ready | SubmitState::Failed(_)
        )
    }

    /// Builds the change-submission body from the ledger and deletion set.
    pub fn submission(&self, form: &SubmitForm) -> ChangeSubmission {
        ChangeSubmission {
            session_id: self.session_id.clone(),
            dataset_id: self.dataset_id,
            title: form.title.trim().to_string(),
            comment: form.comment.clone(),
            reviewer_ids: form.reviewer_ids.clone(),
            edited_cells: self
                .ledger
                .iter()
                .map(|edit| EditedCell {
                    row_id: edit.row_id.to_string(),
                    column: edit.column.clone(),
                    old_value: edit.old_value.clone(),
                    new_value: edit.new_value.clone(),
                })
                .collect(),
            deleted_rows: self
                .deleted
                .iter()
                .map(|deleted| deleted.row_id.to_string())
                .collect(),
        }
    }

    pub fn begin_submit(&mut self, form: &SubmitForm) -> Result<ChangeSubmission, SubmitBlocked> {
        match self.submit_state() {
            SubmitState::Submitting => return Err(SubmitBlocked::AlreadySubmitting),
            SubmitState::Idle | SubmitState::Submitted(_) => {
                return Err(SubmitBlocked::NothingToSubmit)
            }
            SubmitState::Blocked { blocking } => {
                return Err(SubmitBlocked::BlockingErrors(blocking))
            }
            SubmitState::Ready | SubmitState::Failed(_) => {}
        }
        self.phase = SubmitPhase::Submitting;
        Ok(self.submission(form))
    }

    pub fn finish_submit<E: fmt::Display>(&mut self, result: Result<ChangeRequestId, E>) {
        match result {
            Ok(id) => {
                tracing::info!(change_request = %id, dataset_id = %self.dataset_id, "change request submitted");
                self.ledger.clear();
                self.deleted.clear();
                self.validation.clear();
                self.phase = SubmitPhase::Submitted(id);
            }
            Err(err) => {
                tracing::warn!(dataset_id = %self.dataset_id, error = %err, "change submission failed");
                self.phase = SubmitPhase::Failed(err.to_string());
            }
        }
    }

    /// Finishes a submit begun by session `issued_by`. Returns false and leaves
    /// the session untouched when it was replaced while the request was out.
    pub fn finish_submit_for<E: fmt::Display>(
        &mut self,
        issued_by: &str,
        result: Result<ChangeRequestId, E>,
    ) -> bool {
        if issued_by != self.session_id {
            tracing::debug!(
                session_id = %self.session_id,
                issued_by,
                "ignoring submit result for a replaced session"
            );
            return false;
        }
        self.finish_submit(result);
        true
    }

    /// The current value of every column of a row, pending edits included.
    pub fn current_values(&self, row_id: &RowId) -> BTreeMap<String, CellValue> {
        let mut values = self
            .original(row_id)
            .map(|row| row.values.clone())
            .unwrap_or_default();
        for edit in self.ledger.edits_for_row(row_id) {
            values.insert(edit.column.clone(), edit.new_value.clone());
        }
        values
    }

    /// Rows as the grid shows them: the snapshot with pending edits overlaid.
    pub fn display_rows(&self) -> Vec<Row> {
        let mut rows = self.snapshot.clone();
        for edit in self.ledger.iter() {
            if let Some(&idx) = self.index.get(&edit.row_id) {
                rows[idx]
                    .values
                    .insert(edit.column.clone(), edit.new_value.clone());
            }
        }
        rows
    }

    pub fn cell_status(&self, row_id: &RowId, column: &str) -> CellStatus<'_> {
        let key = CellKey::new(row_id.clone(), column);
        CellStatus {
            edited: self.ledger.get(&key).is_some(),
            deleted: self.deleted.contains(row_id),
            error: self.validation.get(&key),
        }
    }
}

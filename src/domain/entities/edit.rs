use std::collections::BTreeMap;

use crate::domain::entities::dataset::{CellValue, Row, RowId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub row_id: RowId,
    pub column: String,
}

impl CellKey {
    pub fn new(row_id: RowId, column: impl Into<String>) -> Self {
        Self {
            row_id,
            column: column.into(),
        }
    }
}

/// A pending change to one cell. Only exists while `new_value != old_value`.
#[derive(Debug, Clone, PartialEq)]
pub struct CellEdit {
    pub row_id: RowId,
    pub column: String,
    pub old_value: CellValue,
    pub new_value: CellValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeletedRow {
    pub row_id: RowId,
    pub row_data: Row,
}

/// Per-cell deltas against the original snapshot, at most one per key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditLedger {
    edits: BTreeMap<CellKey, CellEdit>,
}

impl EditLedger {
    pub fn upsert(&mut self, edit: CellEdit) {
        let key = CellKey::new(edit.row_id.clone(), edit.column.clone());
        self.edits.insert(key, edit);
    }

    pub fn remove(&mut self, key: &CellKey) -> Option<CellEdit> {
        self.edits.remove(key)
    }

    pub fn get(&self, key: &CellKey) -> Option<&CellEdit> {
        self.edits.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CellEdit> {
        self.edits.values()
    }

    pub fn edits_for_row<'a>(&'a self, row_id: &'a RowId) -> impl Iterator<Item = &'a CellEdit> {
        self.edits.values().filter(move |edit| &edit.row_id == row_id)
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn clear(&mut self) {
        self.edits.clear();
    }
}

/// Rows slated for removal, in the order they were marked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeletionSet {
    rows: Vec<DeletedRow>,
}

impl DeletionSet {
    /// Adds rows that are not already marked. Returns how many were added.
    pub fn mark<'a>(&mut self, rows: impl IntoIterator<Item = &'a Row>) -> usize {
        let mut added = 0;
        for row in rows {
            if self.contains(&row.row_id) {
                continue;
            }
            self.rows.push(DeletedRow {
                row_id: row.row_id.clone(),
                row_data: row.clone(),
            });
            added += 1;
        }
        added
    }

    pub fn restore(&mut self, row_ids: &[RowId]) -> usize {
        let before = self.rows.len();
        self.rows.retain(|deleted| !row_ids.contains(&deleted.row_id));
        before - self.rows.len()
    }

    pub fn contains(&self, row_id: &RowId) -> bool {
        self.rows.iter().any(|deleted| &deleted.row_id == row_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeletedRow> {
        self.rows.iter()
    }

    pub fn row_ids(&self) -> Vec<RowId> {
        self.rows.iter().map(|deleted| deleted.row_id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

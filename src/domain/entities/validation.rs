use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::domain::entities::dataset::{CellValue, RowId};
use crate::domain::entities::edit::CellKey;
use crate::domain::entities::rule::Severity;

/// One violation as reported by the rule-check endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Violation {
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub rule_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub row_id: RowId,
    pub column: String,
    pub severity: Severity,
    pub message: String,
    pub rule_type: String,
}

/// A pending per-cell rule check. The sequence number identifies the edit that
/// issued it; only the latest ticket for a cell of the issuing session may
/// write into the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationTicket {
    pub session_id: String,
    pub key: CellKey,
    pub seq: u64,
    pub value: CellValue,
    pub row_context: BTreeMap<String, CellValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheUpdate {
    Stored,
    Cleared,
    Stale,
    /// The check itself failed; whatever was cached stays as it was.
    Unchanged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub fatal: usize,
    pub error: usize,
    pub warning: usize,
    pub info: usize,
}

impl SeverityCounts {
    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Fatal => self.fatal,
            Severity::Error => self.error,
            Severity::Warning => self.warning,
            Severity::Info => self.info,
        }
    }

    pub fn blocking(&self) -> usize {
        self.fatal + self.error
    }

    pub fn total(&self) -> usize {
        self.fatal + self.error + self.warning + self.info
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationCache {
    errors: BTreeMap<CellKey, ValidationError>,
    latest: HashMap<CellKey, u64>,
    next_seq: u64,
}

impl ValidationCache {
    /// Reserves a new sequence number for `key`, superseding any in-flight check.
    pub fn issue(&mut self, key: &CellKey) -> u64 {
        self.next_seq += 1;
        self.latest.insert(key.clone(), self.next_seq);
        self.next_seq
    }

    /// Drops the cached error and forgets `key`, so any in-flight check for it
    /// lands as stale. `latest` only holds cells with a live edit.
    pub fn invalidate(&mut self, key: &CellKey) {
        self.latest.remove(key);
        self.errors.remove(key);
    }

    pub fn is_current(&self, key: &CellKey, seq: u64) -> bool {
        self.latest.get(key) == Some(&seq)
    }

    /// Stores the first violation or clears the entry. Responses from a
    /// superseded ticket are ignored.
    pub fn apply(&mut self, key: &CellKey, seq: u64, violations: &[Violation]) -> CacheUpdate {
        if !self.is_current(key, seq) {
            return CacheUpdate::Stale;
        }
        match violations.first() {
            Some(first) => {
                self.errors.insert(
                    key.clone(),
                    ValidationError {
                        row_id: key.row_id.clone(),
                        column: key.column.clone(),
                        severity: first.severity,
                        message: first.message.clone(),
                        rule_type: first.rule_type.clone(),
                    },
                );
                CacheUpdate::Stored
            }
            None => {
                self.errors.remove(key);
                CacheUpdate::Cleared
            }
        }
    }

    pub fn get(&self, key: &CellKey) -> Option<&ValidationError> {
        self.errors.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.values()
    }

    pub fn has_blocking(&self) -> bool {
        self.errors.values().any(|error| error.severity.is_blocking())
    }

    pub fn counts(&self) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        for error in self.errors.values() {
            match error.severity {
                Severity::Fatal => counts.fatal += 1,
                Severity::Error => counts.error += 1,
                Severity::Warning => counts.warning += 1,
                Severity::Info => counts.info += 1,
            }
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Clears cached errors. Sequence numbers keep counting so that checks
    /// issued before the clear can never land afterwards.
    pub fn clear(&mut self) {
        self.errors.clear();
        self.latest.clear();
    }
}

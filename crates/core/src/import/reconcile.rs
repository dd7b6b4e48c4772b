//! Batch reconciliation: merge row outcomes, detect duplicates inside the
//! batch and against the store, decide whether the batch may be committed.
//!
//! Store lookups are not performed here. The caller collects
//! [`UniqueCandidates`], queries the store once per unique field, and hands
//! the hits back as [`ExistingValues`].

use std::collections::{HashMap, HashSet};

use super::catalog::{FieldCatalog, FieldSpec};
use super::row::{validate_row, RawCell, RawRow, ValidatedRow, WrongCell};

/// Prefix a message with its 1-indexed input line.
pub fn line_message(line: usize, message: &str) -> String {
    format!("Line {line}: {message}")
}

/// Aggregated result of validating and reconciling one upload.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub wrong_cells: Vec<WrongCell>,
    /// One entry per input row, in input order.
    pub rows: Vec<ValidatedRow>,
}

impl BatchOutcome {
    /// A batch commits only without errors, and without warnings unless the
    /// caller forces the upload.
    pub fn is_accepted(&self, force_upload: bool) -> bool {
        self.errors.is_empty() && (self.warnings.is_empty() || force_upload)
    }

    fn flag(&mut self, blocking: bool, line: usize, message: &str, cell: WrongCell) {
        let message = line_message(line, message);
        if blocking {
            self.errors.push(message);
        } else {
            self.warnings.push(message);
        }
        self.wrong_cells.push(cell);
    }
}

/// Deduplicated canonical values per unique field, to be looked up in the
/// store.
pub type UniqueCandidates = Vec<(&'static str, Vec<String>)>;

/// Canonical values already present in the store, per unique field key.
#[derive(Debug, Clone, Default)]
pub struct ExistingValues {
    by_field: HashMap<&'static str, HashSet<String>>,
}

impl ExistingValues {
    pub fn insert(&mut self, field: &'static str, values: impl IntoIterator<Item = String>) {
        self.by_field.entry(field).or_default().extend(values);
    }

    pub fn contains(&self, field: &str, value: &str) -> bool {
        self.by_field
            .get(field)
            .is_some_and(|values| values.contains(value))
    }

    pub fn is_empty(&self) -> bool {
        self.by_field.values().all(HashSet::is_empty)
    }
}

/// Trimmed, non-blank raw value of `field` in `row`, with its cell.
fn present<'r>(row: &'r RawRow, field: &str) -> Option<(&'r str, &'r RawCell)> {
    let cell = row.get(field)?;
    let value = cell.value.trim();
    (!value.is_empty()).then_some((value, cell))
}

/// Store-comparable form of a raw value: the validator's canonical output,
/// or the trimmed raw value when the validator rejects it.
fn canonical(spec: &FieldSpec, raw: &str) -> String {
    spec.validator
        .and_then(|v| v.validate(raw).ok())
        .map(|v| v.canonical())
        .unwrap_or_else(|| raw.to_string())
}

/// Validate every row and run the in-batch uniqueness pass.
///
/// Row findings come first (row order, then field declaration order), then
/// in-batch duplicates per unique field. For duplicates the first occurrence
/// wins: only the second and later occurrences are flagged.
pub fn validate_batch(catalog: &FieldCatalog, rows: &[RawRow]) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for (i, row) in rows.iter().enumerate() {
        let line = i + 1;
        let row_outcome = validate_row(catalog, row);
        outcome
            .errors
            .extend(row_outcome.errors.iter().map(|m| line_message(line, m)));
        outcome
            .warnings
            .extend(row_outcome.warnings.iter().map(|m| line_message(line, m)));
        outcome.wrong_cells.extend(row_outcome.wrong_cells);
        outcome.rows.push(row_outcome.validated);
    }

    for spec in catalog.unique_fields() {
        let message = format!(
            "{} should be unique but this value exists more than one time in the file",
            spec.display_name
        );
        let mut seen = HashSet::new();
        for (i, row) in rows.iter().enumerate() {
            let Some((value, cell)) = present(row, spec.key) else {
                continue;
            };
            if !seen.insert(value) {
                outcome.flag(
                    spec.is_mandatory_for(row),
                    i + 1,
                    &message,
                    WrongCell::at(cell, message.clone()),
                );
            }
        }
    }

    outcome
}

/// Deduplicated canonical values of every unique field, in first-seen order.
pub fn unique_candidates(catalog: &FieldCatalog, rows: &[RawRow]) -> UniqueCandidates {
    catalog
        .unique_fields()
        .map(|spec| {
            let mut seen = HashSet::new();
            let values = rows
                .iter()
                .filter_map(|row| present(row, spec.key))
                .map(|(value, _)| canonical(spec, value))
                .filter(|value| seen.insert(value.clone()))
                .collect();
            (spec.key, values)
        })
        .collect()
}

/// Store uniqueness pass: flag every row whose value already exists in the
/// store, once per offending row, on that row's own cell.
pub fn flag_existing(
    catalog: &FieldCatalog,
    rows: &[RawRow],
    existing: &ExistingValues,
    outcome: &mut BatchOutcome,
) {
    if existing.is_empty() {
        return;
    }
    for spec in catalog.unique_fields() {
        for (i, row) in rows.iter().enumerate() {
            let Some((value, cell)) = present(row, spec.key) else {
                continue;
            };
            let value = canonical(spec, value);
            if existing.contains(spec.key, &value) {
                let message = format!(
                    "{} should be unique. {value} already exist in database",
                    spec.display_name
                );
                outcome.flag(
                    spec.is_mandatory_for(row),
                    i + 1,
                    &message,
                    WrongCell::at(cell, message.clone()),
                );
            }
        }
    }
}

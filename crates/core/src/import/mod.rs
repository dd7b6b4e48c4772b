//! Bulk employee import: field catalog, validators, row validation and
//! batch reconciliation. Everything here is pure; persistence and
//! notification happen in the API layer.

pub mod catalog;
pub mod precheck;
pub mod reconcile;
pub mod row;
pub mod validators;

pub use catalog::{FieldCatalog, FieldSpec, ImportPossibleFields, EMPLOYEE_CATALOG};
pub use precheck::precheck_upload;
pub use reconcile::{
    flag_existing, unique_candidates, validate_batch, BatchOutcome, ExistingValues,
    UniqueCandidates,
};
pub use row::{validate_row, RawCell, RawRow, RowOutcome, ValidatedRow, WrongCell};
pub use validators::{FieldValidator, FieldValue};

//! Structural checks run before any row is validated.

use crate::error::CoreError;

use super::catalog::FieldCatalog;
use super::row::RawRow;

/// Reject an upload that is empty or whose column mapping lacks a field
/// that is mandatory for every row.
///
/// Columns are mapped once per sheet, so inspecting the first row is
/// enough. Missing fields are reported in catalog order.
pub fn precheck_upload(catalog: &FieldCatalog, lines: &[RawRow]) -> Result<(), CoreError> {
    let Some(first) = lines.first() else {
        return Err(CoreError::Validation("Empty file".to_string()));
    };

    let missing: Vec<&str> = catalog
        .fields()
        .iter()
        .filter(|spec| spec.is_always_mandatory() && !first.contains_key(spec.key))
        .map(|spec| spec.display_name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Missing mandatory fields : {}",
            missing.join(", ")
        )))
    }
}

//! Single-row validation: raw cells in, typed values plus annotations out.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::employee::NewEmployee;
use crate::enums::{ContractType, Gender, Role};

use super::catalog::{
    FieldCatalog, ADDRESS, BIRTH_DATE, CNSS_NUMBER, CONTRACT_TYPE, EMAIL, EMPLOYEE_ROLES,
    FIRST_NAME, GENDER, LAST_NAME, NUMBER, PHONE_NUMBER,
};
use super::validators::FieldValue;

/// One spreadsheet cell as sent by the import UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RawCell {
    pub row_index: i64,
    pub col_index: i64,
    pub value: String,
}

/// Field key to cell, one per imported record.
pub type RawRow = HashMap<String, RawCell>;

/// Locator for one offending input cell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WrongCell {
    pub message: String,
    pub row_index: i64,
    pub col_index: i64,
}

impl WrongCell {
    pub fn at(cell: &RawCell, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            row_index: cell.row_index,
            col_index: cell.col_index,
        }
    }
}

/// Normalized values of one row. Keys the row validator visited but could
/// not fill (blank, absent or rejected) map to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedRow {
    values: HashMap<&'static str, Option<FieldValue>>,
    /// Converted email, pulled out for cross-row keying.
    pub email: Option<String>,
    /// Converted role list, stripped before the employee is built.
    pub roles: Vec<Role>,
}

impl ValidatedRow {
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key).and_then(Option::as_ref)
    }

    fn text(&self, key: &str) -> Option<String> {
        match self.get(key) {
            Some(FieldValue::Text(s)) => Some(s.clone()),
            _ => None,
        }
    }

    fn integer(&self, key: &str) -> Option<i64> {
        match self.get(key) {
            Some(FieldValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    fn date(&self, key: &str) -> Option<NaiveDate> {
        match self.get(key) {
            Some(FieldValue::Date(d)) => Some(*d),
            _ => None,
        }
    }

    fn gender(&self) -> Option<Gender> {
        match self.get(GENDER) {
            Some(FieldValue::Gender(g)) => Some(*g),
            _ => None,
        }
    }

    fn contract_type(&self) -> Option<ContractType> {
        match self.get(CONTRACT_TYPE) {
            Some(FieldValue::ContractType(c)) => Some(*c),
            _ => None,
        }
    }

    /// Build the insertable employee. `None` when a mandatory value is
    /// missing, which only happens for rows that carried a blocking error.
    pub fn to_new_employee(&self) -> Option<NewEmployee> {
        if self.roles.is_empty() {
            return None;
        }
        Some(NewEmployee {
            first_name: self.text(FIRST_NAME)?,
            last_name: self.text(LAST_NAME)?,
            email: self.email.clone()?,
            number: self.integer(NUMBER)?,
            birth_date: self.date(BIRTH_DATE),
            address: self.text(ADDRESS),
            cnss_number: self.text(CNSS_NUMBER),
            contract_type: self.contract_type()?,
            gender: self.gender()?,
            phone_number: self.text(PHONE_NUMBER),
            roles: self.roles.clone(),
        })
    }
}

/// Everything the row validator found for one row.
#[derive(Debug, Clone, Default)]
pub struct RowOutcome {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub wrong_cells: Vec<WrongCell>,
    pub validated: ValidatedRow,
}

impl RowOutcome {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Validate one row against the catalog, walking fields in declaration order.
///
/// Rules per field:
/// 1. absent and mandatory: error, no wrong cell (there is no cell);
/// 2. blank after trimming: error plus wrong cell if mandatory, else `None`;
/// 3. validator rejects: error if mandatory for this row, warning otherwise,
///    always a wrong cell;
/// 4. otherwise the converted value is kept. Fields without a validator are
///    kept trimmed.
///
/// Input keys unknown to the catalog are ignored.
pub fn validate_row(catalog: &FieldCatalog, row: &RawRow) -> RowOutcome {
    let mut outcome = RowOutcome::default();

    for spec in catalog.fields() {
        let mandatory = spec.is_mandatory_for(row);

        let Some(cell) = row.get(spec.key) else {
            if mandatory {
                outcome.errors.push(spec.missing_message());
            }
            outcome.validated.values.insert(spec.key, None);
            continue;
        };

        let trimmed = cell.value.trim();
        if trimmed.is_empty() {
            if mandatory {
                let message = spec.missing_message();
                outcome.wrong_cells.push(WrongCell::at(cell, message.clone()));
                outcome.errors.push(message);
            }
            outcome.validated.values.insert(spec.key, None);
            continue;
        }

        let value = match spec.validator {
            None => Some(FieldValue::Text(trimmed.to_string())),
            Some(validator) => match validator.validate(trimmed) {
                Ok(value) => Some(value),
                Err(_) => {
                    let message = spec.failure_message.clone();
                    outcome
                        .wrong_cells
                        .push(WrongCell::at(cell, message.clone()));
                    if mandatory {
                        outcome.errors.push(message);
                    } else {
                        outcome.warnings.push(message);
                    }
                    None
                }
            },
        };
        outcome.validated.values.insert(spec.key, value);
    }

    outcome.validated.email = outcome.validated.text(EMAIL);
    if let Some(FieldValue::Roles(roles)) = outcome.validated.get(EMPLOYEE_ROLES) {
        outcome.validated.roles = roles.clone();
    }

    outcome
}

//! Declarative description of every importable employee field.
//!
//! The catalog is built once ([`EMPLOYEE_CATALOG`]) and only ever read. Field
//! order is declaration order; the row validator walks fields in this order
//! so error output is reproducible regardless of the column order of the
//! uploaded sheet.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;

use crate::enums::{Choice, ContractType, Gender, Role};

use super::row::RawRow;
use super::validators::FieldValidator;

pub const FIRST_NAME: &str = "first_name";
pub const LAST_NAME: &str = "last_name";
pub const EMAIL: &str = "email";
pub const NUMBER: &str = "number";
pub const BIRTH_DATE: &str = "birth_date";
pub const ADDRESS: &str = "address";
pub const CNSS_NUMBER: &str = "cnss_number";
pub const CONTRACT_TYPE: &str = "contract_type";
pub const GENDER: &str = "gender";
pub const EMPLOYEE_ROLES: &str = "employee_roles";
pub const PHONE_NUMBER: &str = "phone_number";

/// The employee field catalog, shared process-wide.
pub static EMPLOYEE_CATALOG: LazyLock<FieldCatalog> = LazyLock::new(employee_catalog);

/// Whether a field must be present for a given row.
#[derive(Debug, Clone, Copy)]
pub enum Mandatory {
    Always,
    Optional,
    /// Mandatory when the predicate holds for the row's raw (not yet
    /// validated) cells. This is the one place where a field's outcome
    /// depends on another field of the same row.
    When(fn(&RawRow) -> bool),
}

impl Mandatory {
    pub fn holds_for(&self, row: &RawRow) -> bool {
        match self {
            Self::Always => true,
            Self::Optional => false,
            Self::When(predicate) => predicate(row),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Integer,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConditionProperty {
    Regex,
    Value,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Comparer {
    #[serde(rename = "e")]
    Equal,
    #[serde(rename = "in")]
    In,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ConditionValue {
    Pattern(&'static str),
    Choices(Vec<&'static str>),
}

/// A constraint the import UI can check client-side.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldCondition {
    pub property: ConditionProperty,
    pub comparer: Comparer,
    pub value: ConditionValue,
}

/// One catalog entry.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub key: &'static str,
    pub display_name: &'static str,
    pub mandatory: Mandatory,
    pub value_type: ValueType,
    pub validator: Option<FieldValidator>,
    /// Message attached to a validator rejection.
    pub failure_message: String,
    /// Values must not repeat within a batch nor collide with stored rows.
    pub unique: bool,
}

impl FieldSpec {
    fn new(key: &'static str, display_name: &'static str, mandatory: Mandatory) -> Self {
        Self {
            key,
            display_name,
            mandatory,
            value_type: ValueType::String,
            validator: None,
            failure_message: String::new(),
            unique: false,
        }
    }

    fn validated_by(mut self, validator: FieldValidator, message: impl Into<String>) -> Self {
        self.validator = Some(validator);
        self.failure_message = message.into();
        self
    }

    fn integer(mut self) -> Self {
        self.value_type = ValueType::Integer;
        self
    }

    fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn is_mandatory_for(&self, row: &RawRow) -> bool {
        self.mandatory.holds_for(row)
    }

    /// Mandatory regardless of the row's content.
    pub fn is_always_mandatory(&self) -> bool {
        matches!(self.mandatory, Mandatory::Always)
    }

    pub fn missing_message(&self) -> String {
        format!("{} is mandatory but missing", self.display_name)
    }
}

/// Serializable view of a catalog entry for the import UI.
#[derive(Debug, Clone, Serialize)]
pub struct ImportOption {
    pub display_value: &'static str,
    pub value: &'static str,
    pub mandatory: bool,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub conditions: Vec<FieldCondition>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportPossibleFields {
    pub possible_fields: Vec<ImportOption>,
}

/// Ordered field list with O(1) lookup by key.
#[derive(Debug, Clone)]
pub struct FieldCatalog {
    fields: Vec<FieldSpec>,
    index: HashMap<&'static str, usize>,
}

impl FieldCatalog {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        let index = fields
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.key, i))
            .collect();
        Self { fields, index }
    }

    pub fn get(&self, key: &str) -> Option<&FieldSpec> {
        self.index.get(key).map(|&i| &self.fields[i])
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn unique_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|spec| spec.unique)
    }

    /// Unknown keys are never mandatory.
    pub fn is_mandatory(&self, key: &str, row: &RawRow) -> bool {
        self.get(key).is_some_and(|spec| spec.is_mandatory_for(row))
    }

    /// Catalog as advertised by the "possible import fields" endpoint.
    pub fn import_options(&self) -> ImportPossibleFields {
        let possible_fields = self
            .fields
            .iter()
            .map(|spec| ImportOption {
                display_value: spec.display_name,
                value: spec.key,
                mandatory: spec.is_always_mandatory(),
                value_type: spec.value_type,
                conditions: spec
                    .validator
                    .and_then(FieldValidator::condition)
                    .into_iter()
                    .collect(),
            })
            .collect();
        ImportPossibleFields { possible_fields }
    }
}

/// `cnss_number` is mandatory for permanent and fixed-term contracts. Reads
/// the raw contract type cell, so an unparseable contract type leaves the
/// CNSS number optional (the contract type itself is flagged separately).
fn requires_cnss(row: &RawRow) -> bool {
    row.get(CONTRACT_TYPE)
        .and_then(|cell| ContractType::parse_loose(&cell.value))
        .is_some_and(ContractType::requires_cnss)
}

fn possible_values_message<T: Choice>() -> String {
    format!("Possible values are : {}", T::possible_values().join(", "))
}

/// Build the employee field catalog.
pub fn employee_catalog() -> FieldCatalog {
    use Mandatory::{Always, Optional, When};

    FieldCatalog::new(vec![
        FieldSpec::new(FIRST_NAME, "First Name", Always),
        FieldSpec::new(LAST_NAME, "Last Name", Always),
        FieldSpec::new(EMAIL, "Email", Always)
            .validated_by(FieldValidator::Email, "Wrong email format")
            .unique(),
        FieldSpec::new(NUMBER, "Number", Always)
            .integer()
            .validated_by(FieldValidator::NonNegativeInteger, "It should be an integer >=0")
            .unique(),
        FieldSpec::new(BIRTH_DATE, "Birthdate", Optional)
            .validated_by(FieldValidator::IsoDate, "Dates format should be YYYY-MM-DD"),
        FieldSpec::new(ADDRESS, "Address", Optional),
        FieldSpec::new(CNSS_NUMBER, "Cnss Number", When(requires_cnss)).validated_by(
            FieldValidator::CnssNumber,
            "It should be {8 digits}-{2 digits} and it's mandatory for Cdi or Cdd",
        ),
        FieldSpec::new(CONTRACT_TYPE, "Contract Type", Always).validated_by(
            FieldValidator::ContractType,
            possible_values_message::<ContractType>(),
        ),
        FieldSpec::new(GENDER, "Gender", Always)
            .validated_by(FieldValidator::Gender, possible_values_message::<Gender>()),
        FieldSpec::new(EMPLOYEE_ROLES, "Roles", Always)
            .validated_by(FieldValidator::RoleList, possible_values_message::<Role>()),
        FieldSpec::new(PHONE_NUMBER, "Phone", Optional).validated_by(
            FieldValidator::PhoneNumber,
            "Phone number is not valid, it should be of 8 digits",
        ),
    ])
}

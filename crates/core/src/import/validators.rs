//! Per-kind field validators: pure, total, never panic.
//!
//! Each validator maps a trimmed raw cell to a typed [`FieldValue`] or to
//! [`Rejected`]. The human-readable failure text lives on the catalog entry,
//! not here.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::enums::{Choice, ContractType, Gender, Role};

use super::catalog::{Comparer, ConditionProperty, ConditionValue, FieldCondition};

/// `local@domain.tld` with a 2 to 7 letter TLD.
pub const EMAIL_PATTERN: &str = r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,7}$";

/// Eight digits, a dash, two digits.
pub const CNSS_PATTERN: &str = r"^[0-9]{8}-[0-9]{2}$";

/// Domestic numbering: exactly eight digits.
pub const PHONE_PATTERN: &str = r"^[0-9]{8}$";

/// Accepted calendar date layout.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("valid regex"));
static CNSS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(CNSS_PATTERN).expect("valid regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("valid regex"));

/// A raw cell converted to its typed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Date(NaiveDate),
    Gender(Gender),
    ContractType(ContractType),
    Roles(Vec<Role>),
}

impl FieldValue {
    /// Canonical string form. Feeding it back through the validator that
    /// produced the value yields the same value.
    pub fn canonical(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Integer(n) => n.to_string(),
            Self::Date(d) => d.format(DATE_FORMAT).to_string(),
            Self::Gender(g) => g.as_str().to_string(),
            Self::ContractType(c) => c.as_str().to_string(),
            Self::Roles(roles) => roles
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// Marker for a value the validator refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejected;

/// One validator per field kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValidator {
    Email,
    NonNegativeInteger,
    IsoDate,
    CnssNumber,
    PhoneNumber,
    Gender,
    ContractType,
    RoleList,
}

impl FieldValidator {
    /// Convert `raw` (surrounding whitespace is ignored) or reject it.
    pub fn validate(self, raw: &str) -> Result<FieldValue, Rejected> {
        let raw = raw.trim();
        match self {
            Self::Email => matched(&EMAIL_RE, raw),
            Self::CnssNumber => matched(&CNSS_RE, raw),
            Self::PhoneNumber => matched(&PHONE_RE, raw),
            Self::NonNegativeInteger => match raw.parse::<i64>() {
                Ok(n) if n >= 0 => Ok(FieldValue::Integer(n)),
                _ => Err(Rejected),
            },
            Self::IsoDate => NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map(FieldValue::Date)
                .map_err(|_| Rejected),
            Self::Gender => Gender::parse_loose(raw)
                .map(FieldValue::Gender)
                .ok_or(Rejected),
            Self::ContractType => ContractType::parse_loose(raw)
                .map(FieldValue::ContractType)
                .ok_or(Rejected),
            Self::RoleList => parse_roles(raw).map(FieldValue::Roles),
        }
    }

    /// Condition advertised to the import UI, if the validator has one.
    pub fn condition(self) -> Option<FieldCondition> {
        let regex = |pattern: &'static str| FieldCondition {
            property: ConditionProperty::Regex,
            comparer: Comparer::Equal,
            value: ConditionValue::Pattern(pattern),
        };
        let one_of = |values: Vec<&'static str>| FieldCondition {
            property: ConditionProperty::Value,
            comparer: Comparer::In,
            value: ConditionValue::Choices(values),
        };
        match self {
            Self::Email => Some(regex(EMAIL_PATTERN)),
            Self::CnssNumber => Some(regex(CNSS_PATTERN)),
            Self::PhoneNumber => Some(regex(PHONE_PATTERN)),
            Self::Gender => Some(one_of(Gender::possible_values())),
            Self::ContractType => Some(one_of(ContractType::possible_values())),
            Self::NonNegativeInteger | Self::IsoDate | Self::RoleList => None,
        }
    }
}

fn matched(re: &Regex, raw: &str) -> Result<FieldValue, Rejected> {
    if re.is_match(raw) {
        Ok(FieldValue::Text(raw.to_string()))
    } else {
        Err(Rejected)
    }
}

/// Every comma-separated token must name a role; one bad token rejects the
/// whole list. Repeated roles collapse to their first occurrence.
fn parse_roles(raw: &str) -> Result<Vec<Role>, Rejected> {
    let mut roles = Vec::new();
    for token in raw.split(',') {
        let role = Role::parse_loose(token).ok_or(Rejected)?;
        if !roles.contains(&role) {
            roles.push(role);
        }
    }
    Ok(roles)
}

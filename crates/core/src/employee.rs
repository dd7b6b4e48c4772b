//! Insertable employee record and the checks shared by single create,
//! update and bulk import.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::enums::{ContractType, Gender, Role};
use crate::error::CoreError;
use crate::import::catalog::{
    FieldSpec, CNSS_NUMBER, EMAIL, EMPLOYEE_CATALOG, EMPLOYEE_ROLES, FIRST_NAME, LAST_NAME,
    NUMBER, PHONE_NUMBER,
};

/// Everything needed to insert one employee and its role links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub number: i64,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub cnss_number: Option<String>,
    pub contract_type: ContractType,
    pub gender: Gender,
    pub phone_number: Option<String>,
    pub roles: Vec<Role>,
}

fn field(key: &str) -> &'static FieldSpec {
    EMPLOYEE_CATALOG
        .get(key)
        .unwrap_or_else(|| panic!("field {key} missing from employee catalog"))
}

/// Run the catalog validator of `key` over `raw`, if it has one.
fn check(key: &str, raw: &str, problems: &mut Vec<String>) {
    let spec = field(key);
    if let Some(validator) = spec.validator {
        if validator.validate(raw).is_err() {
            problems.push(spec.failure_message.clone());
        }
    }
}

fn blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

impl NewEmployee {
    /// Trim free-text fields and turn blank optionals into `None`.
    pub fn normalized(mut self) -> Self {
        let trim_opt = |v: Option<String>| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.email = self.email.trim().to_string();
        self.address = trim_opt(self.address);
        self.cnss_number = trim_opt(self.cnss_number);
        self.phone_number = trim_opt(self.phone_number);
        let mut roles = Vec::with_capacity(self.roles.len());
        for role in self.roles {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
        self.roles = roles;
        self
    }

    /// Apply the import rules to a typed record. All problems are reported
    /// at once, newline-separated.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut problems = Vec::new();

        for (key, value) in [(FIRST_NAME, &self.first_name), (LAST_NAME, &self.last_name)] {
            if value.trim().is_empty() {
                problems.push(field(key).missing_message());
            }
        }

        if self.email.trim().is_empty() {
            problems.push(field(EMAIL).missing_message());
        } else {
            check(EMAIL, &self.email, &mut problems);
        }

        check(NUMBER, &self.number.to_string(), &mut problems);

        if blank(self.cnss_number.as_deref()) {
            if self.contract_type.requires_cnss() {
                problems.push(field(CNSS_NUMBER).missing_message());
            }
        } else if let Some(cnss) = &self.cnss_number {
            check(CNSS_NUMBER, cnss, &mut problems);
        }

        if self.roles.is_empty() {
            problems.push(field(EMPLOYEE_ROLES).missing_message());
        }

        if let Some(phone) = self.phone_number.as_deref().filter(|p| !p.trim().is_empty()) {
            check(PHONE_NUMBER, phone, &mut problems);
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(problems.join("\n")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn ann() -> NewEmployee {
        NewEmployee {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "ann@x.com".to_string(),
            number: 5,
            birth_date: None,
            address: None,
            cnss_number: Some("12345678-90".to_string()),
            contract_type: ContractType::Cdi,
            gender: Gender::Female,
            phone_number: None,
            roles: vec![Role::Manager],
        }
    }

    #[test]
    fn valid_record_passes() {
        assert!(ann().validate().is_ok());
    }

    #[test]
    fn cdi_without_cnss_is_rejected() {
        let employee = NewEmployee {
            cnss_number: None,
            ..ann()
        };
        assert_matches!(
            employee.validate(),
            Err(CoreError::Validation(msg)) if msg == "Cnss Number is mandatory but missing"
        );
    }

    #[test]
    fn sivp_without_cnss_passes() {
        let employee = NewEmployee {
            cnss_number: None,
            contract_type: ContractType::Sivp,
            ..ann()
        };
        assert!(employee.validate().is_ok());
    }

    #[test]
    fn every_problem_is_reported() {
        let employee = NewEmployee {
            email: "nope".to_string(),
            number: -1,
            phone_number: Some("12".to_string()),
            roles: vec![],
            ..ann()
        };
        let Err(CoreError::Validation(msg)) = employee.validate() else {
            panic!("expected validation error");
        };
        let lines: Vec<_> = msg.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Wrong email format",
                "It should be an integer >=0",
                "Roles is mandatory but missing",
                "Phone number is not valid, it should be of 8 digits",
            ]
        );
    }

    #[test]
    fn normalized_trims_and_drops_blanks() {
        let employee = NewEmployee {
            first_name: "  Ann ".to_string(),
            address: Some("   ".to_string()),
            phone_number: Some(" 22123456 ".to_string()),
            roles: vec![Role::Manager, Role::Manager, Role::Admin],
            ..ann()
        }
        .normalized();
        assert_eq!(employee.first_name, "Ann");
        assert_eq!(employee.address, None);
        assert_eq!(employee.phone_number.as_deref(), Some("22123456"));
        assert_eq!(employee.roles, vec![Role::Manager, Role::Admin]);
    }
}

//! Employee entity model and DTOs.

use chrono::NaiveDate;
use hrm_core::employee::NewEmployee;
use hrm_core::enums::{AccountStatus, Choice, ContractType, Gender, Role};
use hrm_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full row from the `employees` table.
///
/// Carries the password hash. Use [`EmployeeResponse`] for API output.
#[derive(Debug, Clone, FromRow)]
pub struct Employee {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub number: i64,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub cnss_number: Option<String>,
    pub contract_type: String,
    pub gender: String,
    pub account_status: String,
    pub phone_number: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Employee {
    pub fn is_active(&self) -> bool {
        AccountStatus::from_db(&self.account_status) == Some(AccountStatus::Active)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Typed copy of the stored record, used to re-validate after a patch.
    /// `None` if a stored enum value is unknown.
    pub fn to_new_employee(&self, roles: Vec<Role>) -> Option<NewEmployee> {
        Some(NewEmployee {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            number: self.number,
            birth_date: self.birth_date,
            address: self.address.clone(),
            cnss_number: self.cnss_number.clone(),
            contract_type: ContractType::from_db(&self.contract_type)?,
            gender: Gender::from_db(&self.gender)?,
            phone_number: self.phone_number.clone(),
            roles,
        })
    }
}

/// Employee as returned by the API (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeResponse {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub number: i64,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub cnss_number: Option<String>,
    pub contract_type: String,
    pub gender: String,
    pub phone_number: Option<String>,
    pub roles: Vec<String>,
    pub account_status: String,
    pub created_at: Timestamp,
}

impl EmployeeResponse {
    pub fn new(employee: Employee, roles: Vec<String>) -> Self {
        Self {
            id: employee.id,
            first_name: employee.first_name,
            last_name: employee.last_name,
            email: employee.email,
            number: employee.number,
            birth_date: employee.birth_date,
            address: employee.address,
            cnss_number: employee.cnss_number,
            contract_type: employee.contract_type,
            gender: employee.gender,
            phone_number: employee.phone_number,
            roles,
            account_status: employee.account_status,
            created_at: employee.created_at,
        }
    }
}

/// One page of the employee listing.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeePage {
    pub employees: Vec<EmployeeResponse>,
    pub total_records: i64,
    pub total_pages: i64,
    pub page_number: i64,
    pub page_size: i64,
}

/// Result of inserting one employee with its role links and activation
/// token.
#[derive(Debug, Clone)]
pub struct CreatedEmployee {
    pub employee: Employee,
    pub roles: Vec<Role>,
    pub activation_token: String,
}

/// Patch applied by [`crate::repositories::EmployeeRepo::update`]. `None`
/// keeps the stored value; for nullable columns `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct UpdateEmployee {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub number: Option<i64>,
    pub birth_date: Option<Option<NaiveDate>>,
    pub address: Option<Option<String>>,
    pub cnss_number: Option<Option<String>>,
    pub contract_type: Option<ContractType>,
    pub gender: Option<Gender>,
    pub phone_number: Option<Option<String>>,
    pub password_hash: Option<String>,
    pub account_status: Option<AccountStatus>,
    /// Replaces the whole role set when present.
    pub roles: Option<Vec<Role>>,
}

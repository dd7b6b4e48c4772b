//! Handlers for the `/employees` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use hrm_core::employee::NewEmployee;
use hrm_core::enums::{AccountStatus, Choice, ContractType, Gender, Role};
use hrm_core::error::CoreError;
use hrm_core::types::DbId;
use hrm_db::models::employee::{EmployeePage, EmployeeResponse, UpdateEmployee};
use hrm_db::repositories::{EmployeeRepo, TokenKind};
use hrm_events::MailTemplate;
use serde::{Deserialize, Deserializer};

use crate::auth::password::{check_new_password, hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::handlers::auth::NewPasswordRequest;
use crate::handlers::redeem::{already_used, load_redeemable};
use crate::journal::record_failure;
use crate::middleware::auth::AuthEmployee;
use crate::notifications::schedule_token_mail;
use crate::query::{total_pages, CodeParam, PaginationParams};
use crate::response::MessageResponse;
use crate::state::AppState;

/// Body of `PUT /employees/{id}`. Absent fields keep their stored value;
/// nullable fields are cleared by `null` or a blank string.
#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub number: Option<i64>,
    #[serde(default, deserialize_with = "present")]
    pub birth_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "present")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub cnss_number: Option<Option<String>>,
    pub contract_type: Option<ContractType>,
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "present")]
    pub phone_number: Option<Option<String>>,
    pub roles: Option<Vec<Role>>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    /// Current password of the employee being updated.
    pub actual_password: String,
}

/// A field that is present in the body, even as `null`, deserializes to
/// `Some`; a missing one falls back to `None` through `#[serde(default)]`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl UpdateEmployeeRequest {
    fn merge_into(&self, mut current: NewEmployee) -> NewEmployee {
        fn take<T: Clone>(patch: &Option<T>, slot: &mut T) {
            if let Some(value) = patch {
                *slot = value.clone();
            }
        }
        take(&self.first_name, &mut current.first_name);
        take(&self.last_name, &mut current.last_name);
        take(&self.email, &mut current.email);
        take(&self.number, &mut current.number);
        take(&self.birth_date, &mut current.birth_date);
        take(&self.address, &mut current.address);
        take(&self.cnss_number, &mut current.cnss_number);
        take(&self.contract_type, &mut current.contract_type);
        take(&self.gender, &mut current.gender);
        take(&self.phone_number, &mut current.phone_number);
        take(&self.roles, &mut current.roles);
        current
    }
}

#[derive(Debug, Deserialize)]
pub struct ConfirmEmailRequest {
    pub code: String,
}

fn employee_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Employee",
        id,
    })
}

fn parse_roles(stored: &[String]) -> Vec<Role> {
    stored.iter().filter_map(|r| Role::from_db(r)).collect()
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// GET /api/v1/employees?name=&page=&limit=
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthEmployee,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<EmployeePage>> {
    let limit = params.limit();
    let (rows, total_records) =
        EmployeeRepo::list(&state.pool, params.name.as_deref(), limit, params.offset()).await?;

    let ids: Vec<DbId> = rows.iter().map(|e| e.id).collect();
    let mut roles = EmployeeRepo::roles_for_many(&state.pool, &ids).await?;

    let employees = rows
        .into_iter()
        .map(|e| {
            let employee_roles = roles.remove(&e.id).unwrap_or_default();
            EmployeeResponse::new(e, employee_roles)
        })
        .collect();

    Ok(Json(EmployeePage {
        employees,
        total_records,
        total_pages: total_pages(total_records, limit),
        page_number: params.page(),
        page_size: limit,
    }))
}

/// GET /api/v1/employees/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthEmployee,
    Path(id): Path<DbId>,
) -> AppResult<Json<EmployeeResponse>> {
    let employee = EmployeeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| employee_not_found(id))?;
    let roles = EmployeeRepo::roles_for(&state.pool, id).await?;
    Ok(Json(EmployeeResponse::new(employee, roles)))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// POST /api/v1/employees
///
/// Insert one employee with its roles and an activation token, then mail
/// the activation link.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewEmployee>,
) -> AppResult<(StatusCode, Json<EmployeeResponse>)> {
    let input = input.normalized();
    input.validate()?;

    let created = match EmployeeRepo::create(&state.pool, &input).await {
        Ok(created) => created,
        Err(e) => return Err(record_failure(&state, None, e).await),
    };

    schedule_token_mail(
        &state.notifier,
        MailTemplate::ConfirmAccount,
        &created.employee.email,
        &created.employee.full_name(),
        &created.activation_token,
    );

    tracing::info!(employee_id = created.employee.id, "Employee created");
    let roles = created.roles.iter().map(|r| r.as_str().to_string()).collect();
    Ok((
        StatusCode::CREATED,
        Json(EmployeeResponse::new(created.employee, roles)),
    ))
}

/// PUT /api/v1/employees/{id}
///
/// Requires the current password of the target employee. Changing the
/// email deactivates the account until the new address is confirmed.
pub async fn update(
    State(state): State<AppState>,
    _auth: AuthEmployee,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEmployeeRequest>,
) -> AppResult<Json<EmployeeResponse>> {
    let existing = EmployeeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| employee_not_found(id))?;

    let password_valid = match existing.password_hash.as_deref() {
        Some(hash) => verify_password(&input.actual_password, hash)
            .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?,
        None => false,
    };
    if !password_valid {
        return Err(CoreError::Validation("Wrong password".into()).into());
    }

    let password_hash = match &input.password {
        Some(password) => {
            check_new_password(
                password,
                input.confirm_password.as_deref().unwrap_or_default(),
                state.config.password_min_length,
            )
            .map_err(CoreError::Validation)?;
            Some(hash_password(password).map_err(|e| {
                AppError::InternalError(format!("Password hashing error: {e}"))
            })?)
        }
        None => None,
    };

    let stored_roles = parse_roles(&EmployeeRepo::roles_for(&state.pool, id).await?);
    let current = existing.to_new_employee(stored_roles).ok_or_else(|| {
        AppError::InternalError(format!("Employee {id} has an unknown stored enum value"))
    })?;
    let merged = input.merge_into(current).normalized();
    merged.validate()?;

    let email_changed = merged.email != existing.email;
    let patch = UpdateEmployee {
        first_name: Some(merged.first_name),
        last_name: Some(merged.last_name),
        email: Some(merged.email),
        number: Some(merged.number),
        birth_date: Some(merged.birth_date),
        address: Some(merged.address),
        cnss_number: Some(merged.cnss_number),
        contract_type: Some(merged.contract_type),
        gender: Some(merged.gender),
        phone_number: Some(merged.phone_number),
        password_hash,
        account_status: email_changed.then_some(AccountStatus::Inactive),
        roles: input.roles.is_some().then_some(merged.roles),
    };

    let (employee, token) = match EmployeeRepo::update(&state.pool, id, &patch, email_changed).await
    {
        Ok(Some(updated)) => updated,
        Ok(None) => return Err(employee_not_found(id)),
        Err(e) => return Err(record_failure(&state, Some(id), e).await),
    };

    if let Some(token) = token {
        schedule_token_mail(
            &state.notifier,
            MailTemplate::ConfirmEmail,
            &employee.email,
            &employee.full_name(),
            &token,
        );
    }

    tracing::info!(employee_id = id, email_changed, "Employee updated");
    let roles = EmployeeRepo::roles_for(&state.pool, id).await?;
    Ok(Json(EmployeeResponse::new(employee, roles)))
}

/// PATCH /api/v1/employees/activate?code=
///
/// Set the first password and activate the account.
pub async fn activate(
    State(state): State<AppState>,
    Query(params): Query<CodeParam>,
    Json(input): Json<NewPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    check_new_password(
        &input.password,
        &input.confirm_password,
        state.config.password_min_length,
    )
    .map_err(CoreError::Validation)?;

    let (token, employee) = load_redeemable(&state, TokenKind::Activation, &params.code).await?;

    let hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    match EmployeeRepo::activate(&state.pool, employee.id, token.id, Some(&hash)).await {
        Ok(true) => {}
        Ok(false) => return Err(already_used()),
        Err(e) => return Err(record_failure(&state, Some(employee.id), e).await),
    }

    tracing::info!(employee_id = employee.id, "Account activated");
    Ok(Json(MessageResponse::new("Activation account successfully")))
}

/// PATCH /api/v1/employees/confirm-email
pub async fn confirm_email(
    State(state): State<AppState>,
    Json(input): Json<ConfirmEmailRequest>,
) -> AppResult<Json<MessageResponse>> {
    let (token, employee) = load_redeemable(&state, TokenKind::Activation, &input.code).await?;

    match EmployeeRepo::activate(&state.pool, employee.id, token.id, None).await {
        Ok(true) => {}
        Ok(false) => return Err(already_used()),
        Err(e) => return Err(record_failure(&state, Some(employee.id), e).await),
    }

    tracing::info!(employee_id = employee.id, "Email confirmed");
    Ok(Json(MessageResponse::new("Email confirmed")))
}

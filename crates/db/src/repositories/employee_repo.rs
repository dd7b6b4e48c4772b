//! Repository for `employees` and `employee_roles`.

use std::collections::HashMap;

use hrm_core::employee::NewEmployee;
use hrm_core::enums::{AccountStatus, Choice, Role};
use hrm_core::import::catalog::{EMAIL, NUMBER};
use hrm_core::import::{ExistingValues, UniqueCandidates};
use hrm_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::employee::{CreatedEmployee, Employee, UpdateEmployee};
use crate::repositories::token_repo::{consume_token, insert_token, TokenKind};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, first_name, last_name, email, password_hash, number, birth_date, \
                       address, cnss_number, contract_type, gender, account_status, \
                       phone_number, created_at, updated_at";

async fn insert_employee(
    conn: &mut PgConnection,
    input: &NewEmployee,
) -> Result<Employee, sqlx::Error> {
    let query = format!(
        "INSERT INTO employees
            (first_name, last_name, email, number, birth_date, address,
             cnss_number, contract_type, gender, phone_number)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Employee>(&query)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(input.number)
        .bind(input.birth_date)
        .bind(input.address.as_deref())
        .bind(input.cnss_number.as_deref())
        .bind(input.contract_type.as_str())
        .bind(input.gender.as_str())
        .bind(input.phone_number.as_deref())
        .fetch_one(&mut *conn)
        .await
}

async fn insert_roles(
    conn: &mut PgConnection,
    employee_id: DbId,
    roles: &[Role],
) -> Result<(), sqlx::Error> {
    if roles.is_empty() {
        return Ok(());
    }
    let names: Vec<String> = roles.iter().map(|r| r.as_str().to_string()).collect();
    sqlx::query(
        "INSERT INTO employee_roles (employee_id, role)
         SELECT $1, UNNEST($2::text[])",
    )
    .bind(employee_id)
    .bind(&names)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Provides employee persistence, including the transactional bulk import.
pub struct EmployeeRepo;

impl EmployeeRepo {
    /// Insert one employee with its roles and a pending activation token,
    /// atomically.
    pub async fn create(pool: &PgPool, input: &NewEmployee) -> Result<CreatedEmployee, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let employee = insert_employee(&mut tx, input).await?;
        insert_roles(&mut tx, employee.id, &input.roles).await?;
        let token = insert_token(&mut tx, TokenKind::Activation, employee.id, &employee.email).await?;
        tx.commit().await?;

        Ok(CreatedEmployee {
            employee,
            roles: input.roles.clone(),
            activation_token: token.token,
        })
    }

    /// Persist a whole accepted import batch in one transaction: every
    /// employee first, then every role link, then one activation token per
    /// employee. Any failure rolls the entire batch back.
    pub async fn import_batch(
        pool: &PgPool,
        inputs: &[NewEmployee],
    ) -> Result<Vec<CreatedEmployee>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let mut employees = Vec::with_capacity(inputs.len());
        for input in inputs {
            employees.push(insert_employee(&mut tx, input).await?);
        }

        for (employee, input) in employees.iter().zip(inputs) {
            insert_roles(&mut tx, employee.id, &input.roles).await?;
        }

        let mut created = Vec::with_capacity(employees.len());
        for (employee, input) in employees.into_iter().zip(inputs) {
            let token =
                insert_token(&mut tx, TokenKind::Activation, employee.id, &employee.email).await?;
            created.push(CreatedEmployee {
                employee,
                roles: input.roles.clone(),
                activation_token: token.token,
            });
        }

        tx.commit().await?;
        tracing::debug!(rows = created.len(), "Import batch committed");
        Ok(created)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE id = $1");
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an employee by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE email = $1");
        sqlx::query_as::<_, Employee>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// One page of employees ordered by id, optionally filtered by a
    /// case-insensitive substring of "first last". Returns the page and the
    /// total number of matching rows.
    pub async fn list(
        pool: &PgPool,
        name: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Employee>, i64), sqlx::Error> {
        let pattern = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(|n| format!("%{n}%"));
        let filter = "($1::text IS NULL OR (first_name || ' ' || last_name) ILIKE $1)";

        let query = format!(
            "SELECT {COLUMNS} FROM employees WHERE {filter} ORDER BY id LIMIT $2 OFFSET $3"
        );
        let employees = sqlx::query_as::<_, Employee>(&query)
            .bind(pattern.as_deref())
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM employees WHERE {filter}");
        let (total,): (i64,) = sqlx::query_as(&count_query)
            .bind(pattern.as_deref())
            .fetch_one(pool)
            .await?;

        Ok((employees, total))
    }

    /// Role names of one employee, in insertion order.
    pub async fn roles_for(pool: &PgPool, employee_id: DbId) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT role FROM employee_roles WHERE employee_id = $1 ORDER BY id")
                .bind(employee_id)
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().map(|(role,)| role).collect())
    }

    /// Role names for several employees at once.
    pub async fn roles_for_many(
        pool: &PgPool,
        employee_ids: &[DbId],
    ) -> Result<HashMap<DbId, Vec<String>>, sqlx::Error> {
        let rows: Vec<(DbId, String)> = sqlx::query_as(
            "SELECT employee_id, role FROM employee_roles
             WHERE employee_id = ANY($1)
             ORDER BY employee_id, id",
        )
        .bind(employee_ids)
        .fetch_all(pool)
        .await?;

        let mut roles: HashMap<DbId, Vec<String>> = HashMap::new();
        for (employee_id, role) in rows {
            roles.entry(employee_id).or_default().push(role);
        }
        Ok(roles)
    }

    /// Stored emails among `emails`.
    pub async fn existing_emails(pool: &PgPool, emails: &[String]) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT email FROM employees WHERE email = ANY($1)")
                .bind(emails)
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().map(|(email,)| email).collect())
    }

    /// Stored employee numbers among `numbers`.
    pub async fn existing_numbers(pool: &PgPool, numbers: &[i64]) -> Result<Vec<i64>, sqlx::Error> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT number FROM employees WHERE number = ANY($1)")
                .bind(numbers)
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().map(|(number,)| number).collect())
    }

    /// Look up every unique-field candidate of an import batch, one query
    /// per field. Values are returned in canonical string form.
    pub async fn find_existing_values(
        pool: &PgPool,
        candidates: &UniqueCandidates,
    ) -> Result<ExistingValues, sqlx::Error> {
        let mut existing = ExistingValues::default();
        for (field, values) in candidates {
            if values.is_empty() {
                continue;
            }
            match *field {
                EMAIL => existing.insert(EMAIL, Self::existing_emails(pool, values).await?),
                NUMBER => {
                    // Unparseable numbers are already flagged by the row validator.
                    let numbers: Vec<i64> = values.iter().filter_map(|v| v.parse().ok()).collect();
                    let found = Self::existing_numbers(pool, &numbers).await?;
                    existing.insert(NUMBER, found.into_iter().map(|n| n.to_string()));
                }
                other => tracing::warn!(field = other, "No store lookup for unique field"),
            }
        }
        Ok(existing)
    }

    /// Apply a patch, optionally replacing roles and issuing a new
    /// activation token for the (possibly new) email, in one transaction.
    ///
    /// Returns `None` if no row with the given `id` exists, and the issued
    /// token alongside the updated row otherwise.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEmployee,
        issue_activation: bool,
    ) -> Result<Option<(Employee, Option<String>)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE employees SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                number = COALESCE($5, number),
                birth_date = CASE WHEN $14 THEN $6 ELSE birth_date END,
                address = CASE WHEN $15 THEN $7 ELSE address END,
                cnss_number = CASE WHEN $16 THEN $8 ELSE cnss_number END,
                contract_type = COALESCE($9, contract_type),
                gender = COALESCE($10, gender),
                phone_number = CASE WHEN $17 THEN $11 ELSE phone_number END,
                password_hash = COALESCE($12, password_hash),
                account_status = COALESCE($13, account_status)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .bind(input.first_name.as_deref())
            .bind(input.last_name.as_deref())
            .bind(input.email.as_deref())
            .bind(input.number)
            .bind(input.birth_date.flatten())
            .bind(input.address.as_ref().and_then(Option::as_deref))
            .bind(input.cnss_number.as_ref().and_then(Option::as_deref))
            .bind(input.contract_type.map(Choice::as_str))
            .bind(input.gender.map(Choice::as_str))
            .bind(input.phone_number.as_ref().and_then(Option::as_deref))
            .bind(input.password_hash.as_deref())
            .bind(input.account_status.map(Choice::as_str))
            .bind(input.birth_date.is_some())
            .bind(input.address.is_some())
            .bind(input.cnss_number.is_some())
            .bind(input.phone_number.is_some())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(employee) = updated else {
            return Ok(None);
        };

        if let Some(roles) = &input.roles {
            sqlx::query("DELETE FROM employee_roles WHERE employee_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_roles(&mut tx, id, roles).await?;
        }

        let token = if issue_activation {
            let token = insert_token(&mut tx, TokenKind::Activation, id, &employee.email).await?;
            Some(token.token)
        } else {
            None
        };

        tx.commit().await?;
        Ok(Some((employee, token)))
    }

    /// Redeem an activation token: mark it used and activate the account,
    /// optionally setting the first password. Returns `false` if the token
    /// was no longer pending, in which case nothing changes.
    pub async fn activate(
        pool: &PgPool,
        employee_id: DbId,
        token_id: DbId,
        password_hash: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        if !consume_token(&mut tx, TokenKind::Activation, token_id).await? {
            return Ok(false);
        }
        sqlx::query(
            "UPDATE employees SET
                account_status = $2,
                password_hash = COALESCE($3, password_hash)
             WHERE id = $1",
        )
        .bind(employee_id)
        .bind(AccountStatus::Active.as_str())
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(true)
    }

    /// Redeem a reset token and store the new password hash. Returns
    /// `false` if the token was no longer pending.
    pub async fn reset_password(
        pool: &PgPool,
        employee_id: DbId,
        token_id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        if !consume_token(&mut tx, TokenKind::ResetPassword, token_id).await? {
            return Ok(false);
        }
        sqlx::query("UPDATE employees SET password_hash = $2 WHERE id = $1")
            .bind(employee_id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(true)
    }
}

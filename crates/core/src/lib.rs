//! Domain logic for the HR records backend. No I/O lives here: the import
//! engine, validation rules and token checks are pure and are driven by the
//! `db` and `api` crates.

pub mod employee;
pub mod enums;
pub mod error;
pub mod import;
pub mod tokens;
pub mod types;

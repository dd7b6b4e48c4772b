//! Row models and DTOs.
//!
//! Row structs derive `FromRow` and mirror their table. Closed value sets
//! (contract type, gender, status, role) are stored as `TEXT` and kept as
//! strings here; typed access goes through [`hrm_core::enums::Choice`].

pub mod employee;
pub mod error_journal;
pub mod token;

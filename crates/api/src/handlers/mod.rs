//! Request handlers.
//!
//! Handlers delegate persistence to the repositories in `hrm_db`, domain
//! rules to `hrm_core`, and map errors via [`crate::error::AppError`].

pub mod auth;
pub mod employee;
pub mod redeem;
pub mod upload;

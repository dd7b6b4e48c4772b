//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Multi-table writes run in a
//! single transaction inside the repository.

pub mod blacklist_repo;
pub mod employee_repo;
pub mod error_journal_repo;
pub mod token_repo;

pub use blacklist_repo::BlacklistRepo;
pub use employee_repo::EmployeeRepo;
pub use error_journal_repo::ErrorJournalRepo;
pub use token_repo::{TokenKind, TokenRepo};

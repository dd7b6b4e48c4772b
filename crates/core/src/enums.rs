//! Closed value sets shared by the import engine, the repositories and the
//! HTTP layer.
//!
//! Every set is stored in PostgreSQL as `TEXT` guarded by a `CHECK`
//! constraint, so [`Choice::as_str`] must stay in sync with the migrations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A closed enumeration with a stable textual form.
pub trait Choice: Sized + Copy + 'static {
    /// Every variant, in declaration order.
    const ALL: &'static [Self];

    /// Stable string form (also the stored database value).
    fn as_str(self) -> &'static str;

    /// Case-insensitive, whitespace-trimmed match against [`Self::ALL`].
    fn parse_loose(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(raw))
    }

    /// Strict match used when reading rows back from the database.
    fn from_db(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == raw)
    }

    /// Textual forms of every variant.
    fn possible_values() -> Vec<&'static str> {
        Self::ALL.iter().map(|v| v.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Choice for Gender {
    const ALL: &'static [Self] = &[Self::Male, Self::Female];

    fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

/// Employment contract kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ContractType {
    Cdi,
    Cdd,
    Apprenti,
    Sivp,
}

impl ContractType {
    /// Permanent and fixed-term contracts must carry a CNSS number.
    pub fn requires_cnss(self) -> bool {
        matches!(self, Self::Cdi | Self::Cdd)
    }
}

impl Choice for ContractType {
    const ALL: &'static [Self] = &[Self::Cdi, Self::Cdd, Self::Apprenti, Self::Sivp];

    fn as_str(self) -> &'static str {
        match self {
            Self::Cdi => "Cdi",
            Self::Cdd => "Cdd",
            Self::Apprenti => "Apprenti",
            Self::Sivp => "Sivp",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Manager,
    Employee,
    Cashier,
}

impl Choice for Role {
    const ALL: &'static [Self] = &[Self::Admin, Self::Manager, Self::Employee, Self::Cashier];

    fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Manager => "Manager",
            Self::Employee => "Employee",
            Self::Cashier => "Cashier",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AccountStatus {
    Active,
    Inactive,
}

impl Choice for AccountStatus {
    const ALL: &'static [Self] = &[Self::Active, Self::Inactive];

    fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

/// Lifecycle of single-use activation and reset tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TokenStatus {
    Pending,
    Used,
}

impl Choice for TokenStatus {
    const ALL: &'static [Self] = &[Self::Pending, Self::Used];

    fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Used => "Used",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_as_str!(Gender, ContractType, Role, AccountStatus, TokenStatus);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_loose_ignores_case_and_whitespace() {
        assert_eq!(Gender::parse_loose("  female "), Some(Gender::Female));
        assert_eq!(ContractType::parse_loose("CDI"), Some(ContractType::Cdi));
        assert_eq!(Role::parse_loose("manager"), Some(Role::Manager));
    }

    #[test]
    fn parse_loose_rejects_unknown_values() {
        assert_eq!(Gender::parse_loose("other"), None);
        assert_eq!(ContractType::parse_loose(""), None);
    }

    #[test]
    fn from_db_is_strict() {
        assert_eq!(AccountStatus::from_db("Inactive"), Some(AccountStatus::Inactive));
        assert_eq!(AccountStatus::from_db("inactive"), None);
    }

    #[test]
    fn only_cdi_and_cdd_require_cnss() {
        assert!(ContractType::Cdi.requires_cnss());
        assert!(ContractType::Cdd.requires_cnss());
        assert!(!ContractType::Apprenti.requires_cnss());
        assert!(!ContractType::Sivp.requires_cnss());
    }

    #[test]
    fn possible_values_follow_declaration_order() {
        assert_eq!(
            ContractType::possible_values(),
            vec!["Cdi", "Cdd", "Apprenti", "Sivp"]
        );
    }

    #[test]
    fn display_matches_stored_form() {
        assert_eq!(TokenStatus::Pending.to_string(), "Pending");
        assert_eq!(Role::Cashier.to_string(), "Cashier");
    }
}

//! Projects as seen by the allocation and reporting logic.

use chrono::NaiveDate;
use projledger_shared::types::{ClientId, CompanyId, ProjectId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A project owned by a company.
///
/// `price` is the ceiling for both allocation pools; `None` or zero leaves
/// the project unconstrained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project ID.
    pub id: ProjectId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Client the project is billed to.
    pub client_id: Option<ClientId>,
    /// Display title.
    pub title: String,
    /// Contracted price.
    pub price: Option<Decimal>,
    /// First day of the project.
    pub start_date: Option<NaiveDate>,
    /// Last day of the project.
    pub due_date: Option<NaiveDate>,
    /// Free-form status; see [`ProjectStatus`] for the tracked values.
    pub status: String,
}

impl Project {
    /// Allocation ceiling. Zero means no ceiling is enforced.
    #[must_use]
    pub fn ceiling(&self) -> Decimal {
        self.price.unwrap_or(Decimal::ZERO)
    }
}

/// Project statuses counted by the statistics endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Not started.
    Draft,
    /// In progress.
    Active,
    /// Paused.
    OnHold,
    /// Abandoned.
    Cancelled,
    /// Delivered.
    Completed,
}

impl ProjectStatus {
    /// All tracked statuses.
    pub const ALL: [Self; 5] = [
        Self::Draft,
        Self::Active,
        Self::OnHold,
        Self::Cancelled,
        Self::Completed,
    ];

    /// Parses a stored status. Unknown values yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "active" => Some(Self::Active),
            "on_hold" => Some(Self::OnHold),
            "cancelled" => Some(Self::Cancelled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Returns the status as stored.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::OnHold => "on_hold",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn project(price: Option<Decimal>) -> Project {
        Project {
            id: ProjectId::new(),
            company_id: CompanyId::new(),
            client_id: None,
            title: "Website".into(),
            price,
            start_date: None,
            due_date: None,
            status: "active".into(),
        }
    }

    #[test]
    fn test_ceiling_defaults_to_zero() {
        assert_eq!(project(None).ceiling(), Decimal::ZERO);
        assert_eq!(project(Some(dec!(1000))).ceiling(), dec!(1000));
    }

    #[test]
    fn test_status_round_trip() {
        for status in ProjectStatus::ALL {
            assert_eq!(ProjectStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ProjectStatus::parse("archived"), None);
    }
}

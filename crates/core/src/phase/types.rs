//! Budget phase domain types.

use chrono::{DateTime, NaiveDate, Utc};
use projledger_shared::types::{CompanyId, PhaseId, ProjectId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A planned slice of a project's budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    /// Phase ID.
    pub id: PhaseId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Parent project.
    pub project_id: ProjectId,
    /// Display title.
    pub title: Option<String>,
    /// Budgeted amount; never negative.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// First day of the phase.
    pub start_date: Option<NaiveDate>,
    /// Last day of the phase.
    pub end_date: Option<NaiveDate>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a phase.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePhaseInput {
    /// Display title.
    pub title: Option<String>,
    /// Budgeted amount; defaults to zero.
    pub amount: Option<Decimal>,
    /// `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`.
    pub end_date: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Request body for a partial phase update.
///
/// Nullable columns use a double option: absent leaves the column alone,
/// `null` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePhaseInput {
    /// New title.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub title: Option<Option<String>>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New start date.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub start_date: Option<Option<String>>,
    /// New end date.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub end_date: Option<Option<String>>,
    /// New notes.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub notes: Option<Option<String>>,
}

impl UpdatePhaseInput {
    /// Returns true when no field was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.amount.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.notes.is_none()
    }
}

/// Validated fields to write on update. `None` leaves a column unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseChanges {
    /// New title.
    pub title: Option<Option<String>>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New start date.
    pub start_date: Option<Option<NaiveDate>>,
    /// New end date.
    pub end_date: Option<Option<NaiveDate>>,
    /// New notes.
    pub notes: Option<Option<String>>,
    /// Modification time.
    pub updated_at: DateTime<Utc>,
}

impl PhaseChanges {
    /// Applies the changes to a phase in place.
    pub fn apply(&self, phase: &mut Phase) {
        if let Some(title) = &self.title {
            phase.title.clone_from(title);
        }
        if let Some(amount) = self.amount {
            phase.amount = amount;
        }
        if let Some(start) = self.start_date {
            phase.start_date = start;
        }
        if let Some(end) = self.end_date {
            phase.end_date = end;
        }
        if let Some(notes) = &self.notes {
            phase.notes.clone_from(notes);
        }
        phase.updated_at = self.updated_at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_input_distinguishes_null_from_absent() {
        let input: UpdatePhaseInput =
            serde_json::from_str(r#"{"start_date": null, "title": "Design"}"#).unwrap();
        assert_eq!(input.start_date, Some(None));
        assert_eq!(input.end_date, None);
        assert_eq!(input.title, Some(Some("Design".into())));
        assert!(!input.is_empty());
    }

    #[test]
    fn test_empty_update() {
        let input: UpdatePhaseInput = serde_json::from_str("{}").unwrap();
        assert!(input.is_empty());
    }
}

//! Running allocation totals per project.

use projledger_shared::types::{CompanyId, ProjectId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::amount;
use crate::store::{LedgerSession, StoreError};

/// The two allocation categories checked against a project's price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPool {
    /// Payments received for the project.
    Payments,
    /// Planned budget phases of the project.
    Phases,
}

impl AllocationPool {
    /// Returns the pool name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Payments => "payments",
            Self::Phases => "phases",
        }
    }

    /// Phrase used in budget error messages.
    #[must_use]
    pub const fn describe_total(&self) -> &'static str {
        match self {
            Self::Payments => "Total payments",
            Self::Phases => "Total phase amount",
        }
    }
}

impl std::fmt::Display for AllocationPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One amount counted against a project's pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationRecord {
    /// ID of the payment or phase.
    pub id: Uuid,
    /// Owning company.
    pub company_id: CompanyId,
    /// Project the amount is allocated to.
    pub project_id: ProjectId,
    /// Allocated amount.
    pub amount: Decimal,
}

/// Computes how much of a project's price a pool already uses.
pub struct AllocationLedger;

impl AllocationLedger {
    /// Sums the records of `project_id` within `company_id`, skipping
    /// `exclude` when given. The result is unrounded.
    ///
    /// Records of other tenants or other projects never contribute, even if
    /// the caller hands them in.
    #[must_use]
    pub fn current_allocation(
        records: &[AllocationRecord],
        company_id: CompanyId,
        project_id: ProjectId,
        exclude: Option<Uuid>,
    ) -> Decimal {
        amount::sum(
            records
                .iter()
                .filter(|r| r.company_id == company_id && r.project_id == project_id)
                .filter(|r| exclude != Some(r.id))
                .map(|r| r.amount),
        )
    }

    /// Loads the pool of `project_id` through a session and totals it.
    pub async fn load<S: LedgerSession>(
        session: &S,
        project_id: ProjectId,
        pool: AllocationPool,
        exclude: Option<Uuid>,
    ) -> Result<Decimal, StoreError> {
        let records = session.allocation_records(project_id, pool).await?;
        Ok(Self::current_allocation(
            &records,
            session.company_id(),
            project_id,
            exclude,
        ))
    }
}

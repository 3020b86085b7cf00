//! Persistence seams for the core services.
//!
//! The db crate implements these traits on top of PostgreSQL; [`memory`]
//! provides an in-process implementation used by tests.
//!
//! Writes go through a [`LedgerSession`]: a unit of work bound to one
//! company. Every read and write it performs is scoped to that company, and
//! nothing it writes is visible to others until [`LedgerSession::commit`].
//! Dropping a session without committing discards its writes.

pub mod memory;

use projledger_shared::AppError;
use projledger_shared::types::{CompanyId, PageRequest, PaymentId, PhaseId, ProjectId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::allocation::{AllocationPool, AllocationRecord};
use crate::payment::{Payment, PaymentChanges, PaymentFilter};
use crate::phase::{Phase, PhaseChanges};
use crate::project::Project;
use crate::reports::{DateWindow, ExpenseEntry, ProjectSnapshot, RecordCounts};

pub use memory::InMemoryStore;

/// Errors raised by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store failed.
    #[error("Database error: {0}")]
    Database(String),

    /// The store's own ceiling guard rejected a write.
    #[error("Allocation exceeds project price. Remaining: {remaining}")]
    CeilingViolation {
        /// Budget left in the pool.
        remaining: Decimal,
    },
}

impl StoreError {
    /// Create a database error.
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let message = err.to_string();
        match err {
            StoreError::Database(_) => Self::Internal(message),
            StoreError::CeilingViolation { remaining } => {
                Self::BudgetExceeded { message, remaining }
            }
        }
    }
}

/// Opens tenant-bound sessions for the allocation services.
#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    /// Session type.
    type Session: LedgerSession;

    /// Begins a unit of work for `company_id`.
    async fn begin(&self, company_id: CompanyId) -> Result<Self::Session, StoreError>;
}

/// A unit of work scoped to one company.
#[async_trait::async_trait]
pub trait LedgerSession: Send + Sync {
    /// Company every operation is scoped to.
    fn company_id(&self) -> CompanyId;

    /// Reads a project without locking it.
    async fn find_project(&self, project_id: ProjectId) -> Result<Option<Project>, StoreError>;

    /// Reads a project and holds it exclusively until the session ends.
    ///
    /// Allocation writes lock their project before reading the pool total,
    /// so concurrent writers to one project are serialised.
    async fn lock_project(&self, project_id: ProjectId) -> Result<Option<Project>, StoreError>;

    /// Returns every record of `pool` allocated to `project_id`.
    async fn allocation_records(
        &self,
        project_id: ProjectId,
        pool: AllocationPool,
    ) -> Result<Vec<AllocationRecord>, StoreError>;

    /// Finds a payment by ID.
    async fn find_payment(&self, payment_id: PaymentId) -> Result<Option<Payment>, StoreError>;

    /// Lists payments newest first (`payment_date`, then `created_at`).
    ///
    /// Returns the requested page (all rows when `page` is `None`) and the
    /// total number of matching rows.
    async fn list_payments(
        &self,
        filter: PaymentFilter,
        page: Option<PageRequest>,
    ) -> Result<(Vec<Payment>, u64), StoreError>;

    /// Inserts a payment.
    async fn insert_payment(&mut self, payment: Payment) -> Result<Payment, StoreError>;

    /// Writes the supplied fields. Returns `None` if the payment is gone.
    async fn update_payment(
        &mut self,
        payment_id: PaymentId,
        changes: PaymentChanges,
    ) -> Result<Option<Payment>, StoreError>;

    /// Deletes a payment. Returns false if it did not exist.
    async fn delete_payment(&mut self, payment_id: PaymentId) -> Result<bool, StoreError>;

    /// Finds a phase of a project.
    async fn find_phase(
        &self,
        project_id: ProjectId,
        phase_id: PhaseId,
    ) -> Result<Option<Phase>, StoreError>;

    /// Lists a project's phases by `start_date` descending, then `created_at`.
    async fn list_phases(
        &self,
        project_id: ProjectId,
        page: PageRequest,
    ) -> Result<(Vec<Phase>, u64), StoreError>;

    /// Inserts a phase.
    async fn insert_phase(&mut self, phase: Phase) -> Result<Phase, StoreError>;

    /// Writes the supplied fields. Returns `None` if the phase is gone.
    async fn update_phase(
        &mut self,
        project_id: ProjectId,
        phase_id: PhaseId,
        changes: PhaseChanges,
    ) -> Result<Option<Phase>, StoreError>;

    /// Deletes a phase. Returns false if it did not exist.
    async fn delete_phase(
        &mut self,
        project_id: ProjectId,
        phase_id: PhaseId,
    ) -> Result<bool, StoreError>;

    /// Makes the session's writes durable.
    async fn commit(self) -> Result<(), StoreError>;
}

/// Read-only queries behind the financial reports.
#[async_trait::async_trait]
pub trait FinanceStore: Send + Sync + 'static {
    /// Amounts of the company's payments dated inside `window`.
    async fn payment_amounts(
        &self,
        company_id: CompanyId,
        window: DateWindow,
    ) -> Result<Vec<Decimal>, StoreError>;

    /// The company's expenses dated inside `window`.
    async fn expense_entries(
        &self,
        company_id: CompanyId,
        window: DateWindow,
    ) -> Result<Vec<ExpenseEntry>, StoreError>;

    /// Status and price of every project of the company.
    async fn project_snapshots(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<ProjectSnapshot>, StoreError>;

    /// Row counts per table for the company.
    async fn record_counts(&self, company_id: CompanyId) -> Result<RecordCounts, StoreError>;
}

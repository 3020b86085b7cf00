//! In-memory store.
//!
//! Sessions take the store's lock for their whole lifetime and work on a
//! staged copy of the state, so sessions are fully serialised and a dropped
//! session leaves no trace.

use std::cmp::Reverse;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use projledger_shared::types::{ClientId, CompanyId, PageRequest, PaymentId, PhaseId, ProjectId};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{FinanceStore, LedgerSession, LedgerStore, StoreError};
use crate::allocation::{AllocationPool, AllocationRecord};
use crate::payment::{Payment, PaymentChanges, PaymentFilter, PaymentMethod};
use crate::phase::{Phase, PhaseChanges};
use crate::project::Project;
use crate::reports::{DateWindow, ExpenseEntry, ProjectSnapshot, RecordCounts};

#[derive(Debug, Clone)]
struct Expense {
    company_id: CompanyId,
    amount: Decimal,
    expense_date: NaiveDate,
    expense_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    clients: Vec<(CompanyId, ClientId)>,
    projects: Vec<Project>,
    payments: Vec<Payment>,
    phases: Vec<Phase>,
    expenses: Vec<Expense>,
}

/// Store backed by process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a client.
    pub async fn add_client(&self, company_id: CompanyId, client_id: ClientId) {
        self.state.lock().await.clients.push((company_id, client_id));
    }

    /// Adds a project.
    pub async fn add_project(&self, project: Project) {
        self.state.lock().await.projects.push(project);
    }

    /// Changes a project's price without touching its allocations.
    pub async fn set_project_price(&self, project_id: ProjectId, price: Option<Decimal>) {
        let mut state = self.state.lock().await;
        if let Some(project) = state.projects.iter_mut().find(|p| p.id == project_id) {
            project.price = price;
        }
    }

    /// Adds a payment row directly, bypassing allocation checks.
    pub async fn add_payment_row(
        &self,
        company_id: CompanyId,
        project_id: ProjectId,
        amount: Decimal,
        payment_date: NaiveDate,
    ) -> PaymentId {
        let now = Utc::now();
        let id = PaymentId::new();
        self.state.lock().await.payments.push(Payment {
            id,
            company_id,
            project_id,
            amount,
            payment_date,
            payment_method: PaymentMethod::Other,
            notes: None,
            created_at: now,
            updated_at: now,
        });
        id
    }

    /// Adds an expense.
    pub async fn add_expense(
        &self,
        company_id: CompanyId,
        amount: Decimal,
        expense_date: NaiveDate,
        expense_type: Option<&str>,
    ) {
        self.state.lock().await.expenses.push(Expense {
            company_id,
            amount,
            expense_date,
            expense_type: expense_type.map(str::to_string),
        });
    }

    /// Committed payments of a project.
    pub async fn payments_for(&self, project_id: ProjectId) -> Vec<Payment> {
        let state = self.state.lock().await;
        state
            .payments
            .iter()
            .filter(|p| p.project_id == project_id)
            .cloned()
            .collect()
    }

    /// Committed phases of a project.
    pub async fn phases_for(&self, project_id: ProjectId) -> Vec<Phase> {
        let state = self.state.lock().await;
        state
            .phases
            .iter()
            .filter(|p| p.project_id == project_id)
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl LedgerStore for InMemoryStore {
    type Session = MemorySession;

    async fn begin(&self, company_id: CompanyId) -> Result<MemorySession, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = (*guard).clone();
        Ok(MemorySession {
            company_id,
            guard,
            staged,
        })
    }
}

/// Session over an [`InMemoryStore`].
#[derive(Debug)]
pub struct MemorySession {
    company_id: CompanyId,
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

impl MemorySession {
    fn project(&self, project_id: ProjectId) -> Option<Project> {
        self.staged
            .projects
            .iter()
            .find(|p| p.id == project_id && p.company_id == self.company_id)
            .cloned()
    }

    fn client_projects(&self, client_id: ClientId) -> Vec<ProjectId> {
        self.staged
            .projects
            .iter()
            .filter(|p| p.company_id == self.company_id && p.client_id == Some(client_id))
            .map(|p| p.id)
            .collect()
    }
}

fn paginate<T>(rows: Vec<T>, page: Option<PageRequest>) -> (Vec<T>, u64) {
    let total = rows.len() as u64;
    let Some(page) = page else {
        return (rows, total);
    };
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    (rows.into_iter().skip(offset).take(limit).collect(), total)
}

#[async_trait::async_trait]
impl LedgerSession for MemorySession {
    fn company_id(&self) -> CompanyId {
        self.company_id
    }

    async fn find_project(&self, project_id: ProjectId) -> Result<Option<Project>, StoreError> {
        Ok(self.project(project_id))
    }

    async fn lock_project(&self, project_id: ProjectId) -> Result<Option<Project>, StoreError> {
        // the session already holds the whole store
        Ok(self.project(project_id))
    }

    async fn allocation_records(
        &self,
        project_id: ProjectId,
        pool: AllocationPool,
    ) -> Result<Vec<AllocationRecord>, StoreError> {
        let records = match pool {
            AllocationPool::Payments => self
                .staged
                .payments
                .iter()
                .filter(|p| p.company_id == self.company_id && p.project_id == project_id)
                .map(|p| AllocationRecord {
                    id: p.id.into_inner(),
                    company_id: p.company_id,
                    project_id: p.project_id,
                    amount: p.amount,
                })
                .collect(),
            AllocationPool::Phases => self
                .staged
                .phases
                .iter()
                .filter(|p| p.company_id == self.company_id && p.project_id == project_id)
                .map(|p| AllocationRecord {
                    id: p.id.into_inner(),
                    company_id: p.company_id,
                    project_id: p.project_id,
                    amount: p.amount,
                })
                .collect(),
        };
        Ok(records)
    }

    async fn find_payment(&self, payment_id: PaymentId) -> Result<Option<Payment>, StoreError> {
        Ok(self
            .staged
            .payments
            .iter()
            .find(|p| p.id == payment_id && p.company_id == self.company_id)
            .cloned())
    }

    async fn list_payments(
        &self,
        filter: PaymentFilter,
        page: Option<PageRequest>,
    ) -> Result<(Vec<Payment>, u64), StoreError> {
        let client_projects = filter.client_id.map(|c| self.client_projects(c));

        let mut rows: Vec<Payment> = self
            .staged
            .payments
            .iter()
            .filter(|p| p.company_id == self.company_id)
            .filter(|p| filter.project_id.is_none_or(|id| p.project_id == id))
            .filter(|p| {
                client_projects
                    .as_ref()
                    .is_none_or(|ids| ids.contains(&p.project_id))
            })
            .cloned()
            .collect();
        rows.sort_by_key(|p| Reverse((p.payment_date, p.created_at)));

        Ok(paginate(rows, page))
    }

    async fn insert_payment(&mut self, payment: Payment) -> Result<Payment, StoreError> {
        self.staged.payments.push(payment.clone());
        Ok(payment)
    }

    async fn update_payment(
        &mut self,
        payment_id: PaymentId,
        changes: PaymentChanges,
    ) -> Result<Option<Payment>, StoreError> {
        let company_id = self.company_id;
        let Some(payment) = self
            .staged
            .payments
            .iter_mut()
            .find(|p| p.id == payment_id && p.company_id == company_id)
        else {
            return Ok(None);
        };
        changes.apply(payment);
        Ok(Some(payment.clone()))
    }

    async fn delete_payment(&mut self, payment_id: PaymentId) -> Result<bool, StoreError> {
        let company_id = self.company_id;
        let before = self.staged.payments.len();
        self.staged
            .payments
            .retain(|p| !(p.id == payment_id && p.company_id == company_id));
        Ok(self.staged.payments.len() < before)
    }

    async fn find_phase(
        &self,
        project_id: ProjectId,
        phase_id: PhaseId,
    ) -> Result<Option<Phase>, StoreError> {
        Ok(self
            .staged
            .phases
            .iter()
            .find(|p| {
                p.id == phase_id && p.project_id == project_id && p.company_id == self.company_id
            })
            .cloned())
    }

    async fn list_phases(
        &self,
        project_id: ProjectId,
        page: PageRequest,
    ) -> Result<(Vec<Phase>, u64), StoreError> {
        let mut rows: Vec<Phase> = self
            .staged
            .phases
            .iter()
            .filter(|p| p.project_id == project_id && p.company_id == self.company_id)
            .cloned()
            .collect();
        rows.sort_by_key(|p| Reverse((p.start_date, p.created_at)));

        Ok(paginate(rows, Some(page)))
    }

    async fn insert_phase(&mut self, phase: Phase) -> Result<Phase, StoreError> {
        self.staged.phases.push(phase.clone());
        Ok(phase)
    }

    async fn update_phase(
        &mut self,
        project_id: ProjectId,
        phase_id: PhaseId,
        changes: PhaseChanges,
    ) -> Result<Option<Phase>, StoreError> {
        let company_id = self.company_id;
        let Some(phase) = self.staged.phases.iter_mut().find(|p| {
            p.id == phase_id && p.project_id == project_id && p.company_id == company_id
        }) else {
            return Ok(None);
        };
        changes.apply(phase);
        Ok(Some(phase.clone()))
    }

    async fn delete_phase(
        &mut self,
        project_id: ProjectId,
        phase_id: PhaseId,
    ) -> Result<bool, StoreError> {
        let company_id = self.company_id;
        let before = self.staged.phases.len();
        self.staged.phases.retain(|p| {
            !(p.id == phase_id && p.project_id == project_id && p.company_id == company_id)
        });
        Ok(self.staged.phases.len() < before)
    }

    async fn commit(mut self) -> Result<(), StoreError> {
        *self.guard = self.staged;
        Ok(())
    }
}

#[async_trait::async_trait]
impl FinanceStore for InMemoryStore {
    async fn payment_amounts(
        &self,
        company_id: CompanyId,
        window: DateWindow,
    ) -> Result<Vec<Decimal>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .payments
            .iter()
            .filter(|p| p.company_id == company_id && window.contains(p.payment_date))
            .map(|p| p.amount)
            .collect())
    }

    async fn expense_entries(
        &self,
        company_id: CompanyId,
        window: DateWindow,
    ) -> Result<Vec<ExpenseEntry>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .expenses
            .iter()
            .filter(|e| e.company_id == company_id && window.contains(e.expense_date))
            .map(|e| ExpenseEntry {
                amount: e.amount,
                expense_type: e.expense_type.clone(),
            })
            .collect())
    }

    async fn project_snapshots(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<ProjectSnapshot>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .projects
            .iter()
            .filter(|p| p.company_id == company_id)
            .map(|p| ProjectSnapshot {
                status: p.status.clone(),
                price: p.price,
            })
            .collect())
    }

    async fn record_counts(&self, company_id: CompanyId) -> Result<RecordCounts, StoreError> {
        let state = self.state.lock().await;
        let count = |n: usize| n as u64;
        Ok(RecordCounts {
            clients: count(state.clients.iter().filter(|(c, _)| *c == company_id).count()),
            projects: count(state.projects.iter().filter(|p| p.company_id == company_id).count()),
            payments: count(state.payments.iter().filter(|p| p.company_id == company_id).count()),
            expenses: count(state.expenses.iter().filter(|e| e.company_id == company_id).count()),
        })
    }
}

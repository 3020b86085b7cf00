//! Phase service.
//!
//! Same allocation discipline as payments, against the phases pool, plus
//! the date containment check. Updates always re-run both checks with the
//! final (patched or inherited) values.

use std::sync::Arc;

use chrono::Utc;
use projledger_shared::types::{CompanyId, PageRequest, PageResponse, PhaseId, ProjectId};
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::types::{CreatePhaseInput, Phase, PhaseChanges, UpdatePhaseInput};
use super::window::{check_containment, parse_phase_date};
use crate::allocation::{AllocationError, AllocationLedger, AllocationPool, AllocationValidator};
use crate::amount::{AMOUNT_RANGE_MESSAGE, fits_storage};
use crate::date::normalize_text;
use crate::project::Project;
use crate::store::{LedgerSession, LedgerStore};

/// Phase service for allocation-checked budget phases.
pub struct PhaseService<S: LedgerStore> {
    store: Arc<S>,
}

impl<S: LedgerStore> Clone for PhaseService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

fn validate_amount(amount: Decimal) -> Result<Decimal, AllocationError> {
    if amount < Decimal::ZERO {
        return Err(AllocationError::invalid(
            "amount must be a non-negative number",
        ));
    }
    if !fits_storage(amount) {
        return Err(AllocationError::invalid(AMOUNT_RANGE_MESSAGE));
    }
    Ok(amount)
}

async fn ensure_within_ceiling<T: LedgerSession>(
    session: &T,
    project: &Project,
    amount: Decimal,
    exclude: Option<PhaseId>,
) -> Result<(), AllocationError> {
    let prior = AllocationLedger::load(
        session,
        project.id,
        AllocationPool::Phases,
        exclude.map(PhaseId::into_inner),
    )
    .await?;

    let check = AllocationValidator::validate(project.ceiling(), prior, amount);
    if !check.is_within() {
        warn!(
            company_id = %session.company_id(),
            project_id = %project.id,
            %amount,
            allocated = %prior,
            "Phase rejected: project price exceeded"
        );
    }
    check.into_result(AllocationPool::Phases)
}

impl<S: LedgerStore> PhaseService<S> {
    /// Create a new phase service.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Adds a phase to a project of the company.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a negative amount
    /// - `InvalidDateRange` for unparsable or out-of-window dates
    /// - `InvalidProject` if the project is not the company's
    /// - `BudgetExceeded` if the project's phases would exceed its price
    pub async fn create(
        &self,
        company_id: CompanyId,
        project_id: ProjectId,
        input: CreatePhaseInput,
    ) -> Result<Phase, AllocationError> {
        let amount = validate_amount(input.amount.unwrap_or(Decimal::ZERO))?;
        let start_date = parse_phase_date(input.start_date.as_deref())?;
        let end_date = parse_phase_date(input.end_date.as_deref())?;

        let mut session = self.store.begin(company_id).await?;
        let project = session
            .lock_project(project_id)
            .await?
            .ok_or(AllocationError::InvalidProject(project_id))?;

        check_containment(start_date, end_date, project.start_date, project.due_date)?;
        ensure_within_ceiling(&session, &project, amount, None).await?;

        let now = Utc::now();
        let phase = session
            .insert_phase(Phase {
                id: PhaseId::new(),
                company_id,
                project_id,
                title: normalize_text(input.title),
                amount,
                start_date,
                end_date,
                notes: normalize_text(input.notes),
                created_at: now,
                updated_at: now,
            })
            .await?;
        session.commit().await?;

        info!(
            %company_id,
            %project_id,
            phase_id = %phase.id,
            amount = %phase.amount,
            "Phase created"
        );

        Ok(phase)
    }

    /// Applies a partial update to a phase.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if nothing is supplied or the amount is negative
    /// - `PhaseNotFound` if the phase is not on the company's project
    /// - `ProjectNotFound` if the project disappeared
    /// - `InvalidDateRange` if the final dates violate containment
    /// - `BudgetExceeded` if the project's phases would exceed its price
    pub async fn update(
        &self,
        company_id: CompanyId,
        project_id: ProjectId,
        phase_id: PhaseId,
        input: UpdatePhaseInput,
    ) -> Result<Phase, AllocationError> {
        if input.is_empty() {
            return Err(AllocationError::invalid("no fields to update"));
        }
        let amount = input.amount.map(validate_amount).transpose()?;
        let start_date = input
            .start_date
            .as_ref()
            .map(|v| parse_phase_date(v.as_deref()))
            .transpose()?;
        let end_date = input
            .end_date
            .as_ref()
            .map(|v| parse_phase_date(v.as_deref()))
            .transpose()?;

        let mut session = self.store.begin(company_id).await?;
        let existing = session
            .find_phase(project_id, phase_id)
            .await?
            .ok_or(AllocationError::PhaseNotFound(phase_id))?;
        let project = session
            .lock_project(project_id)
            .await?
            .ok_or(AllocationError::ProjectNotFound(project_id))?;

        check_containment(
            start_date.unwrap_or(existing.start_date),
            end_date.unwrap_or(existing.end_date),
            project.start_date,
            project.due_date,
        )?;
        ensure_within_ceiling(
            &session,
            &project,
            amount.unwrap_or(existing.amount),
            Some(phase_id),
        )
        .await?;

        let changes = PhaseChanges {
            title: input.title.map(normalize_text),
            amount,
            start_date,
            end_date,
            notes: input.notes.map(normalize_text),
            updated_at: Utc::now(),
        };
        let phase = session
            .update_phase(project_id, phase_id, changes)
            .await?
            .ok_or(AllocationError::PhaseNotFound(phase_id))?;
        session.commit().await?;

        info!(
            %company_id,
            %project_id,
            %phase_id,
            amount = %phase.amount,
            "Phase updated"
        );

        Ok(phase)
    }

    /// Deletes a phase.
    ///
    /// # Errors
    ///
    /// Returns `PhaseNotFound` if the phase is not on the company's project.
    pub async fn delete(
        &self,
        company_id: CompanyId,
        project_id: ProjectId,
        phase_id: PhaseId,
    ) -> Result<PhaseId, AllocationError> {
        let mut session = self.store.begin(company_id).await?;
        if !session.delete_phase(project_id, phase_id).await? {
            return Err(AllocationError::PhaseNotFound(phase_id));
        }
        session.commit().await?;

        info!(%company_id, %project_id, %phase_id, "Phase deleted");
        Ok(phase_id)
    }

    /// Fetches one phase.
    ///
    /// # Errors
    ///
    /// Returns `PhaseNotFound` if the phase is not on the company's project.
    pub async fn get(
        &self,
        company_id: CompanyId,
        project_id: ProjectId,
        phase_id: PhaseId,
    ) -> Result<Phase, AllocationError> {
        let session = self.store.begin(company_id).await?;
        session
            .find_phase(project_id, phase_id)
            .await?
            .ok_or(AllocationError::PhaseNotFound(phase_id))
    }

    /// Lists a project's phases, latest start first.
    ///
    /// # Errors
    ///
    /// Returns `ProjectNotFound` if the project is not the company's.
    pub async fn list(
        &self,
        company_id: CompanyId,
        project_id: ProjectId,
        page: PageRequest,
    ) -> Result<PageResponse<Phase>, AllocationError> {
        let page = page.normalized();
        let session = self.store.begin(company_id).await?;
        if session.find_project(project_id).await?.is_none() {
            return Err(AllocationError::ProjectNotFound(project_id));
        }
        let (rows, total) = session.list_phases(project_id, page).await?;
        Ok(PageResponse::new(rows, page, total))
    }
}

//! Payment service.
//!
//! Every allocating write runs inside one store session: the target project
//! is locked, the payments pool is totalled (excluding the payment being
//! edited), the ceiling is checked, and only then is the row written.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use projledger_shared::types::{CompanyId, PageRequest, PageResponse, PaymentId, ProjectId};
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::types::{
    CreatePaymentInput, Payment, PaymentChanges, PaymentFilter, PaymentMethod, UpdatePaymentInput,
};
use crate::allocation::{AllocationError, AllocationLedger, AllocationPool, AllocationValidator};
use crate::amount::{AMOUNT_RANGE_MESSAGE, fits_storage};
use crate::date::{normalize_text, parse_iso_date};
use crate::project::Project;
use crate::store::{LedgerSession, LedgerStore};

/// Payment service for allocation-checked payment records.
pub struct PaymentService<S: LedgerStore> {
    store: Arc<S>,
}

impl<S: LedgerStore> Clone for PaymentService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

fn validate_amount(amount: Decimal) -> Result<Decimal, AllocationError> {
    if amount <= Decimal::ZERO {
        return Err(AllocationError::invalid("amount must be a positive number"));
    }
    if !fits_storage(amount) {
        return Err(AllocationError::invalid(AMOUNT_RANGE_MESSAGE));
    }
    Ok(amount)
}

fn parse_payment_date(value: &str) -> Result<NaiveDate, AllocationError> {
    parse_iso_date(value)
        .ok_or_else(|| AllocationError::invalid("payment_date must be YYYY-MM-DD"))
}

/// Checks that `amount` fits into the payments pool of `project`.
async fn ensure_within_ceiling<T: LedgerSession>(
    session: &T,
    project: &Project,
    amount: Decimal,
    exclude: Option<PaymentId>,
) -> Result<(), AllocationError> {
    let prior = AllocationLedger::load(
        session,
        project.id,
        AllocationPool::Payments,
        exclude.map(PaymentId::into_inner),
    )
    .await?;

    let check = AllocationValidator::validate(project.ceiling(), prior, amount);
    if !check.is_within() {
        warn!(
            company_id = %session.company_id(),
            project_id = %project.id,
            %amount,
            allocated = %prior,
            "Payment rejected: project price exceeded"
        );
    }
    check.into_result(AllocationPool::Payments)
}

impl<S: LedgerStore> PaymentService<S> {
    /// Create a new payment service.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Records a payment against a project of the company.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a missing or non-positive amount, a missing or
    ///   unknown method, a missing project or a malformed date
    /// - `InvalidProject` if the project is not the company's
    /// - `BudgetExceeded` if the project's payments would exceed its price
    pub async fn create(
        &self,
        company_id: CompanyId,
        input: CreatePaymentInput,
    ) -> Result<Payment, AllocationError> {
        let project_id = input
            .project_id
            .ok_or_else(|| AllocationError::invalid("project_id is required"))?;
        let amount = validate_amount(
            input
                .amount
                .ok_or_else(|| AllocationError::invalid("amount is required"))?,
        )?;
        let payment_method = PaymentMethod::parse(
            input
                .payment_method
                .as_deref()
                .ok_or_else(|| AllocationError::invalid("payment_method is required"))?,
        )?;
        let now = Utc::now();
        let payment_date = match input.payment_date.as_deref().map(str::trim) {
            None | Some("") => now.date_naive(),
            Some(text) => parse_payment_date(text)?,
        };

        let mut session = self.store.begin(company_id).await?;
        let project = session
            .lock_project(project_id)
            .await?
            .ok_or(AllocationError::InvalidProject(project_id))?;

        ensure_within_ceiling(&session, &project, amount, None).await?;

        let payment = session
            .insert_payment(Payment {
                id: PaymentId::new(),
                company_id,
                project_id,
                amount,
                payment_date,
                payment_method,
                notes: normalize_text(input.notes),
                created_at: now,
                updated_at: now,
            })
            .await?;
        session.commit().await?;

        info!(
            %company_id,
            %project_id,
            payment_id = %payment.id,
            amount = %payment.amount,
            "Payment recorded"
        );

        Ok(payment)
    }

    /// Applies a partial update to a payment.
    ///
    /// The ceiling is re-checked only when `amount` or `project_id` is
    /// supplied; it runs against the final project with the payment's own
    /// current row excluded, whether or not the project changes.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if nothing is supplied or a supplied field is invalid
    /// - `PaymentNotFound` if the payment is not the company's
    /// - `InvalidProject` if the new project is not the company's
    /// - `BudgetExceeded` if the final project's payments would exceed its price
    pub async fn update(
        &self,
        company_id: CompanyId,
        payment_id: PaymentId,
        input: UpdatePaymentInput,
    ) -> Result<Payment, AllocationError> {
        if input.is_empty() {
            return Err(AllocationError::invalid("no fields to update"));
        }
        let amount = input.amount.map(validate_amount).transpose()?;
        let payment_method = input
            .payment_method
            .as_deref()
            .map(PaymentMethod::parse)
            .transpose()?;
        let payment_date = input
            .payment_date
            .as_deref()
            .map(parse_payment_date)
            .transpose()?;

        let mut session = self.store.begin(company_id).await?;
        let existing = session
            .find_payment(payment_id)
            .await?
            .ok_or(AllocationError::PaymentNotFound(payment_id))?;

        if input.touches_allocation() {
            let final_project_id: ProjectId = input.project_id.unwrap_or(existing.project_id);
            let final_amount = amount.unwrap_or(existing.amount);

            let project = session
                .lock_project(final_project_id)
                .await?
                .ok_or(AllocationError::InvalidProject(final_project_id))?;

            ensure_within_ceiling(&session, &project, final_amount, Some(payment_id)).await?;
        }

        let changes = PaymentChanges {
            project_id: input.project_id,
            amount,
            payment_method,
            payment_date,
            notes: input.notes.map(normalize_text),
            updated_at: Utc::now(),
        };
        let payment = session
            .update_payment(payment_id, changes)
            .await?
            .ok_or(AllocationError::PaymentNotFound(payment_id))?;
        session.commit().await?;

        info!(
            %company_id,
            %payment_id,
            project_id = %payment.project_id,
            amount = %payment.amount,
            "Payment updated"
        );

        Ok(payment)
    }

    /// Deletes a payment. Freeing budget needs no ceiling check.
    ///
    /// # Errors
    ///
    /// Returns `PaymentNotFound` if the payment is not the company's.
    pub async fn delete(
        &self,
        company_id: CompanyId,
        payment_id: PaymentId,
    ) -> Result<PaymentId, AllocationError> {
        let mut session = self.store.begin(company_id).await?;
        if !session.delete_payment(payment_id).await? {
            return Err(AllocationError::PaymentNotFound(payment_id));
        }
        session.commit().await?;

        info!(%company_id, %payment_id, "Payment deleted");
        Ok(payment_id)
    }

    /// Fetches one payment.
    ///
    /// # Errors
    ///
    /// Returns `PaymentNotFound` if the payment is not the company's.
    pub async fn get(
        &self,
        company_id: CompanyId,
        payment_id: PaymentId,
    ) -> Result<Payment, AllocationError> {
        let session = self.store.begin(company_id).await?;
        session
            .find_payment(payment_id)
            .await?
            .ok_or(AllocationError::PaymentNotFound(payment_id))
    }

    /// Lists the company's payments, newest first.
    pub async fn list(
        &self,
        company_id: CompanyId,
        filter: PaymentFilter,
        page: PageRequest,
    ) -> Result<PageResponse<Payment>, AllocationError> {
        let page = page.normalized();
        let session = self.store.begin(company_id).await?;
        let (rows, total) = session.list_payments(filter, Some(page)).await?;
        Ok(PageResponse::new(rows, page, total))
    }

    /// Lists every payment of one project, newest first.
    pub async fn list_for_project(
        &self,
        company_id: CompanyId,
        project_id: ProjectId,
    ) -> Result<Vec<Payment>, AllocationError> {
        let session = self.store.begin(company_id).await?;
        let filter = PaymentFilter {
            project_id: Some(project_id),
            client_id: None,
        };
        let (rows, _) = session.list_payments(filter, None).await?;
        Ok(rows)
    }
}

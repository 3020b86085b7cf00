//! Financial aggregator.
//!
//! The pure functions (`summarize_*`, `compute_financial`, `project_stats`)
//! do all arithmetic on unrounded totals and round once when building the
//! output types. The async methods fetch rows through a [`FinanceStore`],
//! issuing independent queries concurrently.

use std::sync::Arc;

use projledger_shared::types::CompanyId;
use rust_decimal::Decimal;

use super::error::ReportError;
use super::types::{
    Dashboard, DashboardOverview, DateWindow, ExpenseEntry, ExpenseKind, ExpenseTotals,
    ExpensesSummary, FinancialReport, Margin, Overview, PaymentTotals, PaymentsSummary,
    ProjectSnapshot, ProjectStats, ProjectStatusCounts,
};
use crate::amount::{percent_of, round2, sum};
use crate::store::FinanceStore;

/// Builds financial summaries for a company.
pub struct FinancialAggregator<S: FinanceStore> {
    store: Arc<S>,
}

impl<S: FinanceStore> Clone for FinancialAggregator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: FinanceStore> FinancialAggregator<S> {
    /// Create a new aggregator over a store.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Totals payments within the window.
    pub fn summarize_payments(amounts: &[Decimal]) -> PaymentTotals {
        PaymentTotals {
            total: sum(amounts.iter().copied()),
            count: amounts.len() as u64,
        }
    }

    /// Totals expenses within the window, splitting direct from operational.
    pub fn summarize_expenses(entries: &[ExpenseEntry]) -> ExpenseTotals {
        let mut totals = ExpenseTotals {
            count: entries.len() as u64,
            ..ExpenseTotals::default()
        };
        for entry in entries {
            totals.total += entry.amount;
            match ExpenseKind::classify(entry.expense_type.as_deref()) {
                ExpenseKind::Direct => totals.direct += entry.amount,
                ExpenseKind::Operational => totals.operational += entry.amount,
            }
        }
        totals
    }

    /// Derives profitability metrics from unrounded totals.
    ///
    /// Net profit equals operating income; percentages are of revenue and
    /// zero when revenue is not positive.
    #[must_use]
    pub fn compute_financial(
        revenue: Decimal,
        direct: Decimal,
        operational: Decimal,
    ) -> FinancialReport {
        let gross_profit = revenue - direct;
        let operating_income = revenue - direct - operational;
        let net_profit = operating_income;

        let margin = |amount: Decimal| Margin {
            amount: round2(amount),
            percent: round2(percent_of(amount, revenue)),
        };

        FinancialReport {
            total_revenue: round2(revenue),
            direct_expenses: round2(direct),
            operational_expenses: round2(operational),
            total_expenses: round2(direct + operational),
            gross_profit: round2(gross_profit),
            gross_margin: margin(gross_profit),
            operating_income: round2(operating_income),
            operating_margin: margin(operating_income),
            net_profit: round2(net_profit),
            profit_margin: margin(net_profit),
        }
    }

    /// Counts projects per status and totals their prices.
    pub fn project_stats(projects: &[ProjectSnapshot]) -> ProjectStats {
        let mut by_status = ProjectStatusCounts::default();
        for project in projects {
            by_status.record(&project.status);
        }
        ProjectStats {
            by_status,
            total_count: projects.len() as u64,
            total_value: round2(sum(projects.iter().map(|p| p.price.unwrap_or_default()))),
        }
    }

    async fn payment_totals(
        &self,
        company_id: CompanyId,
        window: DateWindow,
    ) -> Result<PaymentTotals, ReportError> {
        let amounts = self.store.payment_amounts(company_id, window).await?;
        Ok(Self::summarize_payments(&amounts))
    }

    async fn expense_totals(
        &self,
        company_id: CompanyId,
        window: DateWindow,
    ) -> Result<ExpenseTotals, ReportError> {
        let entries = self.store.expense_entries(company_id, window).await?;
        Ok(Self::summarize_expenses(&entries))
    }

    /// Payments summary for the company.
    pub async fn payments_summary(
        &self,
        company_id: CompanyId,
        window: DateWindow,
    ) -> Result<PaymentsSummary, ReportError> {
        Ok(self.payment_totals(company_id, window).await?.summary())
    }

    /// Expenses summary for the company.
    pub async fn expenses_summary(
        &self,
        company_id: CompanyId,
        window: DateWindow,
    ) -> Result<ExpensesSummary, ReportError> {
        Ok(self.expense_totals(company_id, window).await?.summary())
    }

    /// Profitability report; revenue is the payments total.
    pub async fn financial_report(
        &self,
        company_id: CompanyId,
        window: DateWindow,
    ) -> Result<FinancialReport, ReportError> {
        let (payments, expenses) = tokio::try_join!(
            self.payment_totals(company_id, window),
            self.expense_totals(company_id, window),
        )?;

        tracing::debug!(
            %company_id,
            payments = payments.count,
            expenses = expenses.count,
            "Computed financial report"
        );

        Ok(Self::compute_financial(
            payments.total,
            expenses.direct,
            expenses.operational,
        ))
    }

    /// Record counts for the company.
    pub async fn overview(&self, company_id: CompanyId) -> Result<Overview, ReportError> {
        Ok(self.store.record_counts(company_id).await?.into())
    }

    /// Project counts by status and total value.
    pub async fn projects(&self, company_id: CompanyId) -> Result<ProjectStats, ReportError> {
        let projects = self.store.project_snapshots(company_id).await?;
        Ok(Self::project_stats(&projects))
    }

    /// Everything the dashboard shows, from one consistent set of totals.
    pub async fn dashboard(
        &self,
        company_id: CompanyId,
        window: DateWindow,
    ) -> Result<Dashboard, ReportError> {
        let (counts, projects, payments, expenses) = tokio::try_join!(
            async { Ok::<_, ReportError>(self.store.record_counts(company_id).await?) },
            async { Ok::<_, ReportError>(self.store.project_snapshots(company_id).await?) },
            self.payment_totals(company_id, window),
            self.expense_totals(company_id, window),
        )?;

        let stats = Self::project_stats(&projects);
        let payments_summary = payments.summary();
        let expenses_summary = expenses.summary();

        Ok(Dashboard {
            overview: DashboardOverview {
                total_clients: counts.clients,
                total_projects: stats.total_count,
                total_project_value: stats.total_value,
                total_payments_received: payments_summary.total,
                total_payments_count: payments_summary.count,
                total_expenses: expenses_summary.total,
                total_expenses_count: expenses_summary.count,
                date_range: window.echo(),
            },
            projects_by_status: stats.by_status,
            payments_summary,
            expenses_summary,
            financial: Self::compute_financial(
                payments.total,
                expenses.direct,
                expenses.operational,
            ),
        })
    }
}

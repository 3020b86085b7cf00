//! Report domain types.
//!
//! Output structs serialize amounts as JSON numbers and use the camelCase
//! keys of the statistics API. All amounts in them are already rounded.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ReportError;
use crate::amount::round2;
use crate::date::{DATE_FORMAT, parse_iso_date};
use crate::project::ProjectStatus;

/// Optional inclusive date bounds for payments and expenses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    /// Earliest date included.
    pub from: Option<NaiveDate>,
    /// Latest date included.
    pub to: Option<NaiveDate>,
}

impl DateWindow {
    /// A window with no bounds.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            from: None,
            to: None,
        }
    }

    /// Parses `YYYY-MM-DD` bounds. Blank strings count as absent.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidDate` naming the offending parameter.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, ReportError> {
        Ok(Self {
            from: parse_bound("from_date", from)?,
            to: parse_bound("to_date", to)?,
        })
    }

    /// Returns true if `date` lies within the bounds.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }

    /// Returns true when at least one bound is set.
    #[must_use]
    pub const fn is_bounded(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    /// The bounds as echoed in responses, or `None` when unbounded.
    #[must_use]
    pub fn echo(&self) -> Option<DateRange> {
        self.is_bounded().then(|| DateRange {
            from_date: self.from.map(|d| d.format(DATE_FORMAT).to_string()),
            to_date: self.to.map(|d| d.format(DATE_FORMAT).to_string()),
        })
    }
}

fn parse_bound(name: &str, value: Option<&str>) -> Result<Option<NaiveDate>, ReportError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_iso_date(text)
            .map(Some)
            .ok_or_else(|| ReportError::InvalidDate(format!("{name} must be YYYY-MM-DD"))),
    }
}

/// Date bounds as echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Lower bound.
    pub from_date: Option<String>,
    /// Upper bound.
    pub to_date: Option<String>,
}

/// Expense category for profitability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseKind {
    /// Cost directly attributable to project work.
    Direct,
    /// Overhead.
    Operational,
}

impl ExpenseKind {
    /// Classifies a stored expense type.
    ///
    /// Only `operational` is overhead; everything else, including a missing
    /// or unknown type, is a direct cost.
    #[must_use]
    pub fn classify(stored: Option<&str>) -> Self {
        match stored {
            Some("operational") => Self::Operational,
            Some(_) | None => Self::Direct,
        }
    }
}

/// One expense row as read for aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseEntry {
    /// Expense amount.
    pub amount: Decimal,
    /// Stored type, unvalidated.
    pub expense_type: Option<String>,
}

/// Status and price of a project, for project statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSnapshot {
    /// Stored status.
    pub status: String,
    /// Contracted price.
    pub price: Option<Decimal>,
}

/// Unrounded payment totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaymentTotals {
    /// Sum of amounts.
    pub total: Decimal,
    /// Number of payments.
    pub count: u64,
}

impl PaymentTotals {
    /// Rounded summary for output.
    #[must_use]
    pub fn summary(&self) -> PaymentsSummary {
        PaymentsSummary {
            total: round2(self.total),
            count: self.count,
        }
    }
}

/// Unrounded expense totals, split by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpenseTotals {
    /// Sum of all amounts.
    pub total: Decimal,
    /// Sum of direct costs.
    pub direct: Decimal,
    /// Sum of overhead.
    pub operational: Decimal,
    /// Number of expenses.
    pub count: u64,
}

impl ExpenseTotals {
    /// Rounded summary for output.
    #[must_use]
    pub fn summary(&self) -> ExpensesSummary {
        ExpensesSummary {
            total: round2(self.total),
            count: self.count,
            by_type: ExpenseBreakdown {
                direct: round2(self.direct),
                operational: round2(self.operational),
            },
        }
    }
}

/// Payments within a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentsSummary {
    /// Total received.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// Number of payments.
    pub count: u64,
}

/// Expenses within a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensesSummary {
    /// Total spent.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// Number of expenses.
    pub count: u64,
    /// Split by kind.
    pub by_type: ExpenseBreakdown,
}

/// Expense totals per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseBreakdown {
    /// Direct costs.
    #[serde(with = "rust_decimal::serde::float")]
    pub direct: Decimal,
    /// Overhead.
    #[serde(with = "rust_decimal::serde::float")]
    pub operational: Decimal,
}

/// An amount together with its share of revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margin {
    /// Absolute amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Percentage of revenue; zero when there is no revenue.
    #[serde(with = "rust_decimal::serde::float")]
    pub percent: Decimal,
}

/// Profitability metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialReport {
    /// Sum of payments.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    /// Direct costs.
    #[serde(with = "rust_decimal::serde::float")]
    pub direct_expenses: Decimal,
    /// Overhead.
    #[serde(with = "rust_decimal::serde::float")]
    pub operational_expenses: Decimal,
    /// Direct plus overhead.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expenses: Decimal,
    /// Revenue minus direct costs.
    #[serde(with = "rust_decimal::serde::float")]
    pub gross_profit: Decimal,
    /// Gross profit and its share of revenue.
    pub gross_margin: Margin,
    /// Revenue minus all expenses.
    #[serde(with = "rust_decimal::serde::float")]
    pub operating_income: Decimal,
    /// Operating income and its share of revenue.
    pub operating_margin: Margin,
    /// Equal to operating income; no other income or expense is modeled.
    #[serde(with = "rust_decimal::serde::float")]
    pub net_profit: Decimal,
    /// Net profit and its share of revenue.
    pub profit_margin: Margin,
}

/// Project counts per tracked status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStatusCounts {
    /// Draft projects.
    pub draft: u64,
    /// Active projects.
    pub active: u64,
    /// Projects on hold.
    pub on_hold: u64,
    /// Cancelled projects.
    pub cancelled: u64,
    /// Completed projects.
    pub completed: u64,
}

impl ProjectStatusCounts {
    /// Counts one project. Untracked statuses are ignored.
    pub fn record(&mut self, status: &str) {
        let Some(status) = ProjectStatus::parse(status) else {
            return;
        };
        let slot = match status {
            ProjectStatus::Draft => &mut self.draft,
            ProjectStatus::Active => &mut self.active,
            ProjectStatus::OnHold => &mut self.on_hold,
            ProjectStatus::Cancelled => &mut self.cancelled,
            ProjectStatus::Completed => &mut self.completed,
        };
        *slot += 1;
    }
}

/// Project statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    /// Counts per tracked status.
    pub by_status: ProjectStatusCounts,
    /// All projects, whatever their status.
    pub total_count: u64,
    /// Sum of project prices.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_value: Decimal,
}

/// Row counts of a company's records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordCounts {
    /// Clients.
    pub clients: u64,
    /// Projects.
    pub projects: u64,
    /// Payments.
    pub payments: u64,
    /// Expenses.
    pub expenses: u64,
}

/// Lightweight counts for the overview endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    /// Number of clients.
    pub total_clients: u64,
    /// Number of projects.
    pub total_projects: u64,
    /// Number of payments.
    pub total_payments_count: u64,
    /// Number of expenses.
    pub total_expenses_count: u64,
}

impl From<RecordCounts> for Overview {
    fn from(counts: RecordCounts) -> Self {
        Self {
            total_clients: counts.clients,
            total_projects: counts.projects,
            total_payments_count: counts.payments,
            total_expenses_count: counts.expenses,
        }
    }
}

/// Headline figures of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    /// Number of clients.
    pub total_clients: u64,
    /// Number of projects.
    pub total_projects: u64,
    /// Sum of project prices.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_project_value: Decimal,
    /// Payments received within the window.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_payments_received: Decimal,
    /// Number of payments within the window.
    pub total_payments_count: u64,
    /// Expenses within the window.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expenses: Decimal,
    /// Number of expenses within the window.
    pub total_expenses_count: u64,
    /// Echo of the requested window.
    pub date_range: Option<DateRange>,
}

/// Everything the dashboard shows in one response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Headline figures.
    pub overview: DashboardOverview,
    /// Project counts per status.
    pub projects_by_status: ProjectStatusCounts,
    /// Payments within the window.
    pub payments_summary: PaymentsSummary,
    /// Expenses within the window.
    pub expenses_summary: ExpensesSummary,
    /// Profitability within the window.
    pub financial: FinancialReport,
}

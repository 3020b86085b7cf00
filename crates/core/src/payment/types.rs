//! Payment domain types.

use chrono::{DateTime, NaiveDate, Utc};
use projledger_shared::types::{ClientId, CompanyId, PaymentId, ProjectId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::allocation::AllocationError;

/// How a payment was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash.
    Cash,
    /// Bank transfer.
    BankTransfer,
    /// Credit card.
    CreditCard,
    /// Anything else.
    Other,
}

impl PaymentMethod {
    /// Accepted values, as listed in error messages.
    pub const ALLOWED: &'static str = "cash, bank_transfer, credit_card, other";

    /// Parses a method name.
    ///
    /// # Errors
    ///
    /// Returns `AllocationError::InvalidArgument` for blank or unknown names.
    pub fn parse(value: &str) -> Result<Self, AllocationError> {
        match value.trim() {
            "" => Err(AllocationError::invalid("payment_method cannot be empty")),
            "cash" => Ok(Self::Cash),
            "bank_transfer" => Ok(Self::BankTransfer),
            "credit_card" => Ok(Self::CreditCard),
            "other" => Ok(Self::Other),
            _ => Err(AllocationError::invalid(format!(
                "payment_method must be one of: {}",
                Self::ALLOWED
            ))),
        }
    }

    /// Returns the method as stored.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::BankTransfer => "bank_transfer",
            Self::CreditCard => "credit_card",
            Self::Other => "other",
        }
    }
}

/// A payment received for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment ID.
    pub id: PaymentId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Project the payment counts against.
    pub project_id: ProjectId,
    /// Amount received; always positive.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Date the money was received.
    pub payment_date: NaiveDate,
    /// How the money was received.
    pub payment_method: PaymentMethod,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a payment.
///
/// Required fields are optional here so that a missing field is reported
/// as an invalid argument naming the field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePaymentInput {
    /// Project to allocate against.
    pub project_id: Option<ProjectId>,
    /// Amount; must be positive.
    pub amount: Option<Decimal>,
    /// One of `cash`, `bank_transfer`, `credit_card`, `other`.
    pub payment_method: Option<String>,
    /// `YYYY-MM-DD`; defaults to today.
    pub payment_date: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Request body for a partial payment update.
///
/// `notes` distinguishes "absent" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePaymentInput {
    /// Move the payment to another project.
    pub project_id: Option<ProjectId>,
    /// New amount; must be positive.
    pub amount: Option<Decimal>,
    /// New method.
    pub payment_method: Option<String>,
    /// New date, `YYYY-MM-DD`.
    pub payment_date: Option<String>,
    /// New notes, or `null` to clear.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub notes: Option<Option<String>>,
}

impl UpdatePaymentInput {
    /// Returns true when no field was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.project_id.is_none()
            && self.amount.is_none()
            && self.payment_method.is_none()
            && self.payment_date.is_none()
            && self.notes.is_none()
    }

    /// Returns true when the update can change the project's payment total.
    #[must_use]
    pub fn touches_allocation(&self) -> bool {
        self.amount.is_some() || self.project_id.is_some()
    }
}

/// Validated fields to write on update. `None` leaves a column unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentChanges {
    /// New project.
    pub project_id: Option<ProjectId>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New method.
    pub payment_method: Option<PaymentMethod>,
    /// New date.
    pub payment_date: Option<NaiveDate>,
    /// New notes; `Some(None)` clears them.
    pub notes: Option<Option<String>>,
    /// Modification time.
    pub updated_at: DateTime<Utc>,
}

impl PaymentChanges {
    /// Applies the changes to a payment in place.
    pub fn apply(&self, payment: &mut Payment) {
        if let Some(project_id) = self.project_id {
            payment.project_id = project_id;
        }
        if let Some(amount) = self.amount {
            payment.amount = amount;
        }
        if let Some(method) = self.payment_method {
            payment.payment_method = method;
        }
        if let Some(date) = self.payment_date {
            payment.payment_date = date;
        }
        if let Some(notes) = &self.notes {
            payment.notes.clone_from(notes);
        }
        payment.updated_at = self.updated_at;
    }
}

/// Filters for listing payments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PaymentFilter {
    /// Only payments of this project.
    pub project_id: Option<ProjectId>,
    /// Only payments of projects billed to this client.
    pub client_id: Option<ClientId>,
}

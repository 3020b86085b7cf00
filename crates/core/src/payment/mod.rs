//! Payments allocated against a project's price.

pub mod service;
pub mod types;


pub use service::PaymentService;
pub use types::{
    CreatePaymentInput, Payment, PaymentChanges, PaymentFilter, PaymentMethod, UpdatePaymentInput,
};

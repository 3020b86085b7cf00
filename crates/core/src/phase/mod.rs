//! Budget phases allocated against a project's price.

pub mod service;
pub mod types;
pub mod window;

#[cfg(test)]
mod tests;

pub use service::PhaseService;
pub use types::{CreatePhaseInput, Phase, PhaseChanges, UpdatePhaseInput};
pub use window::check_containment;

//! `SeaORM` entity definitions.

pub mod clients;
pub mod companies;
pub mod expenses;
pub mod payments;
pub mod phases;
pub mod projects;

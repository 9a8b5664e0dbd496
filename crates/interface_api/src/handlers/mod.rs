//! Request handlers

pub mod accounts;
pub mod documents;
pub mod health;
pub mod journal;
pub mod payments;
pub mod reports;

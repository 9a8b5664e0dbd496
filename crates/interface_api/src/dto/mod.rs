//! Request/Response data transfer objects

pub mod accounts;
pub mod documents;
pub mod journal;

use serde::Serialize;

/// Standard pagination envelope
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

use serde::{Deserialize, Serialize};

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of items across all pages.
    pub count: usize,
    /// 1-based page number.
    pub page: usize,
    pub page_size: usize,
    pub results: Vec<T>,
}

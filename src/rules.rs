//! Pagination and result limiting.
//!
//! The page size is clamped into `[1, max_results]` and the page number
//! into `[1, total_pages]`, so [`PaginationEngine::apply`] never fails and
//! always returns a descriptor, even for an empty result set.

use crate::config::LimitsConfig;
use crate::models::PaginationInfo;

/// One page of results plus its descriptor and count message.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PaginationInfo,
    pub message: String,
}

#[derive(Debug, Clone, Copy)]
pub struct PaginationEngine {
    max_results: usize,
    default_page_size: usize,
}

impl PaginationEngine {
    pub fn new(max_results: usize, default_page_size: usize) -> Self {
        Self {
            max_results: max_results.max(1),
            default_page_size: default_page_size.max(1),
        }
    }

    pub fn from_config(limits: &LimitsConfig) -> Self {
        Self::new(limits.max_results, limits.default_page_size)
    }

    /// Slice `items` to the requested page.
    ///
    /// `voice_mode` does not change the page size today: the default page
    /// size is already the spoken-response ceiling.
    pub fn apply<T: Clone>(
        &self,
        items: &[T],
        page: Option<usize>,
        page_size: Option<usize>,
        _voice_mode: bool,
    ) -> Page<T> {
        let page_size = page_size
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_results);
        let total = items.len();
        let total_pages = total.div_ceil(page_size).max(1);
        let page = page.unwrap_or(1).clamp(1, total_pages);

        let start = ((page - 1) * page_size).min(total);
        let end = (start + page_size).min(total);
        let page_items = items[start..end].to_vec();

        let pagination = PaginationInfo {
            current_page: page,
            page_size,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        };

        let message = if total == 0 {
            "No results found.".to_string()
        } else if page_items.len() == total {
            format!("Showing all {} results.", total)
        } else {
            format!(
                "Showing {} of {} results (page {}/{}).",
                page_items.len(),
                total,
                page,
                total_pages
            )
        };

        Page {
            items: page_items,
            pagination,
            message,
        }
    }
}

impl Default for PaginationEngine {
    fn default() -> Self {
        Self::from_config(&LimitsConfig::default())
    }
}

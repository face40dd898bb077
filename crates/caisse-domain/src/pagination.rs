//! Pagination types.

use serde::{Deserialize, Serialize};

/// Pagination parameters shared across all list endpoints.
///
/// `per_page` is fixed per screen (15 for management lists, 7 for sales),
/// so only `page` arrives from the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_per_page", rename = "per-page")]
    pub per_page: u32,
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_per_page() -> u32 {
    15
}

fn default_page() -> u32 {
    1
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            page: default_page(),
        }
    }
}

impl PageRequest {
    pub fn new(per_page: u32, page: u32) -> Self {
        Self { per_page, page }.clamped()
    }

    /// Clamp `per_page` to 1–15 and `page` to ≥ 1.
    pub fn clamped(self) -> Self {
        Self {
            per_page: self.per_page.clamp(1, 15),
            page: self.page.max(1),
        }
    }

    /// Row offset of the first item on this page.
    pub fn offset(self) -> u64 {
        let p = self.clamped();
        u64::from((p.page - 1) * p.per_page)
    }

    /// Number of pages needed for `total` rows (at least 1).
    pub fn total_pages(self, total: u64) -> u64 {
        let per_page = u64::from(self.clamped().per_page);
        total.div_ceil(per_page).max(1)
    }
}

//! Page-based slicing for listings.

/// Largest page a caller may request.
pub const MAX_PER_PAGE: u32 = 100;

/// 1-based page request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    /// Zero-based page index and clamped page size.
    pub fn normalize(self) -> (u64, u64) {
        let page = self.page.max(1);
        let per_page = self.per_page.clamp(1, MAX_PER_PAGE);
        (u64::from(page - 1), u64::from(per_page))
    }

    /// `(skip, take)` over an in-memory listing.
    pub fn window(self) -> (usize, usize) {
        let (idx, per_page) = self.normalize();
        let skip = idx.saturating_mul(per_page);
        (usize::try_from(skip).unwrap_or(usize::MAX), per_page as usize)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 20 } }
}

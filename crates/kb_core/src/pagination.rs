use std::ops::Range;

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// 1-indexed page cursor over a filtered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Requested page, before clamping against a collection length.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Changing the page size returns to the first page.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Number of pages for `len` items; an empty collection still has one page.
    pub fn page_count(&self, len: usize) -> usize {
        len.div_ceil(self.page_size).max(1)
    }

    /// The requested page clamped into `1..=page_count(len)`.
    pub fn current_page(&self, len: usize) -> usize {
        self.page.clamp(1, self.page_count(len))
    }

    /// Index range `[(k-1)*P, min(N, k*P))` of the clamped page `k`.
    pub fn page_range(&self, len: usize) -> Range<usize> {
        let page = self.current_page(len);
        let start = ((page - 1) * self.page_size).min(len);
        let end = (page * self.page_size).min(len);
        start..end
    }

    pub fn paginate<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.page_range(items.len())]
    }

    /// Moves the cursor by `delta` pages, clamped to the valid range.
    pub fn step(&mut self, delta: isize, len: usize) {
        let current = self.current_page(len) as isize;
        let last = self.page_count(len) as isize;
        self.page = (current + delta).clamp(1, last) as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_page_size_is_treated_as_one() {
        let pager = Pagination::new(0);
        assert_eq!(pager.page_size(), 1);
        assert_eq!(pager.page_count(3), 3);
    }

    #[test]
    fn empty_collection_has_one_empty_page() {
        let mut pager = Pagination::new(10);
        pager.set_page(4);
        assert_eq!(pager.page_count(0), 1);
        assert_eq!(pager.current_page(0), 1);
        assert_eq!(pager.page_range(0), 0..0);
    }

    #[test]
    fn step_stays_in_bounds() {
        let mut pager = Pagination::new(5);
        pager.step(-3, 12);
        assert_eq!(pager.page(), 1);
        pager.step(10, 12);
        assert_eq!(pager.page(), 3);
    }
}

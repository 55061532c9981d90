/// Pagination query parameters
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub const MAX_LIMIT: u32 = 100;

    /// Clamps page to >= 1 and limit to 1..=100.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 50)
    }
}

/// One page of results plus totals
#[derive(Debug)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total: u64, page: PageRequest) -> Self {
        let total_pages = total.div_ceil(page.limit as u64) as u32;
        Self {
            items,
            total,
            page: page.page,
            limit: page.limit,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_is_clamped() {
        let p = PageRequest::new(0, 1000);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 100);
        assert_eq!(p.offset(), 0);
        assert_eq!(PageRequest::new(3, 20).offset(), 40);
    }

    #[test]
    fn total_pages_rounds_up() {
        let r = PaginatedResult::new(vec![1, 2], 41, PageRequest::new(1, 20));
        assert_eq!(r.total_pages, 3);
        let empty: PaginatedResult<u8> = PaginatedResult::new(vec![], 0, PageRequest::default());
        assert_eq!(empty.total_pages, 0);
    }
}

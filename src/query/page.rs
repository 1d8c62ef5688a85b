//! The page cursor. Transitions are pure: each returns the next `PageState`.
use crate::query::filters::FilterError;
use std::ops::RangeInclusive;

/// Page sizes the view offers.
pub const PAGE_SIZES: [u32; 3] = [25, 50, 100];

/// How many page numbers the pagination control shows at once.
const WINDOW_WIDTH: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageSize(u32);

impl PageSize {
    pub fn new(size: u32) -> Result<Self, FilterError> {
        if PAGE_SIZES.contains(&size) {
            Ok(PageSize(size))
        } else {
            Err(FilterError::UnsupportedPageSize(size))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize(50)
    }
}

/// `(page, page_size, total)`. `total` is whatever the last successful fetch reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageState {
    page: u32,
    page_size: PageSize,
    total: u64,
}

impl Default for PageState {
    fn default() -> Self {
        PageState::new(PageSize::default())
    }
}

impl PageState {
    pub fn new(page_size: PageSize) -> Self {
        PageState {
            page: 1,
            page_size,
            total: 0,
        }
    }

    /// A cursor reopened at a known page before any total is known, e.g. from a bookmarked URL.
    /// The page is only clamped once the first response reports a total.
    pub fn resume(page: u32, page_size: PageSize) -> Self {
        PageState {
            page: page.max(1),
            ..PageState::new(page_size)
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// `max(1, ceil(total / page_size))`
    pub fn total_pages(&self) -> u32 {
        let size = u64::from(self.page_size.get());
        // Server-reported, so `total` may be close to u64::MAX.
        let pages = self.total / size + u64::from(self.total % size != 0);
        pages.max(1).min(u64::from(u32::MAX)) as u32
    }

    fn clamp(&self, requested: i64) -> u32 {
        requested.max(1).min(i64::from(self.total_pages())) as u32
    }

    /// Out-of-range requests land on the nearest valid page.
    pub fn set_page(&self, requested: i64) -> PageState {
        PageState {
            page: self.clamp(requested),
            ..*self
        }
    }

    /// A page index computed under the old size means nothing under the new one, so this always
    /// goes back to page 1.
    pub fn set_page_size(&self, page_size: PageSize) -> PageState {
        PageState {
            page: 1,
            page_size,
            ..*self
        }
    }

    /// The cursor after the filtered set changed.
    pub fn first_page(&self) -> PageState {
        PageState { page: 1, ..*self }
    }

    pub fn next_page(&self) -> PageState {
        self.set_page(i64::from(self.page) + 1)
    }

    pub fn previous_page(&self) -> PageState {
        self.set_page(i64::from(self.page) - 1)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Adopt what the server says it executed. The echo is authoritative over whatever was
    /// requested locally, except for page sizes the view doesn't offer.
    pub fn on_fetch_succeeded(
        &self,
        total: u64,
        reported_page: i64,
        reported_page_size: u32,
    ) -> PageState {
        let page_size = PageSize::new(reported_page_size).unwrap_or(self.page_size);
        let next = PageState {
            page: 1,
            page_size,
            total,
        };
        next.set_page(reported_page)
    }

    /// The page numbers to show in the pagination control, at most five, keeping the current
    /// page centered where possible.
    pub fn page_window(&self) -> RangeInclusive<u32> {
        let total_pages = self.total_pages();
        if total_pages <= WINDOW_WIDTH {
            return 1..=total_pages;
        }
        let half = WINDOW_WIDTH / 2;
        let start = if self.page <= half + 1 {
            1
        } else if self.page >= total_pages - half {
            total_pages - WINDOW_WIDTH + 1
        } else {
            self.page - half
        };
        start..=start + (WINDOW_WIDTH - 1)
    }
}

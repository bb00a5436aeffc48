//! Page-window arithmetic for the navigation bar.

use std::ops::RangeInclusive;

pub const DEFAULT_MAX_VISIBLE: u32 = 5;

/// Contiguous, ascending run of page numbers shown as navigation links.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageWindow {
    start: u32,
    end: u32,
}

impl PageWindow {
    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn len(&self) -> usize {
        (self.end - self.start + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, page: u32) -> bool {
        self.range().contains(&page)
    }

    pub fn range(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }

    pub fn pages(&self) -> Vec<u32> {
        self.range().collect()
    }
}

/// Centers a window of at most `max_visible` pages on `current_page`,
/// shifting it left when it would run past `total_pages`.
///
/// Inputs below 1 are treated as 1, and `current_page` is clamped into
/// `[1, total_pages]` so the result always contains it.
pub fn compute_window(current_page: u32, total_pages: u32, max_visible: u32) -> PageWindow {
    let total_pages = total_pages.max(1);
    let max_visible = max_visible.max(1);
    let current_page = current_page.clamp(1, total_pages);

    let mut start = current_page.saturating_sub(max_visible / 2).max(1);
    let end = total_pages.min(start + max_visible - 1);
    if end - start + 1 < max_visible {
        start = (end + 1).saturating_sub(max_visible).max(1);
    }
    PageWindow { start, end }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageLink {
    pub page: u32,
    pub active: bool,
}

/// Navigation bar: previous/next affordances around the page window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaginationBar {
    pub current_page: u32,
    pub total_pages: u32,
    pub previous: Option<u32>,
    pub next: Option<u32>,
    pub links: Vec<PageLink>,
}

impl PaginationBar {
    /// Returns `None` when there is nothing to paginate (`total_pages <= 1`).
    pub fn build(current_page: u32, total_pages: u32, max_visible: u32) -> Option<Self> {
        if total_pages <= 1 {
            return None;
        }
        let window = compute_window(current_page, total_pages, max_visible);
        let current_page = current_page.clamp(1, total_pages);
        let links = window
            .range()
            .map(|page| PageLink {
                page,
                active: page == current_page,
            })
            .collect();
        Some(Self {
            current_page,
            total_pages,
            previous: (current_page > 1).then(|| current_page - 1),
            next: (current_page < total_pages).then(|| current_page + 1),
            links,
        })
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

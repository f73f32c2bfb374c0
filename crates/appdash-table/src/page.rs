// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    index: usize,
    size: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            index: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageState {
    /// A zero size falls back to the default.
    pub fn new(size: usize) -> Self {
        Self {
            index: 0,
            size: if size == 0 { DEFAULT_PAGE_SIZE } else { size },
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Always at least one page, so an empty result still has page 0.
    pub fn page_count(&self, row_count: usize) -> usize {
        row_count.div_ceil(self.size).max(1)
    }

    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self, row_count: usize) -> bool {
        self.index + 1 < self.page_count(row_count)
    }

    /// Rows on the current page: `min(size, remaining)` starting at
    /// `index * size`, or nothing when the index is past the end.
    pub fn slice<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        Self::slice_at(rows, self.index, self.size)
    }

    pub fn slice_at<T>(rows: &[T], index: usize, size: usize) -> &[T] {
        let Some(start) = index.checked_mul(size) else {
            return &[];
        };
        if start >= rows.len() {
            return &[];
        }
        let end = start.saturating_add(size).min(rows.len());
        &rows[start..end]
    }

    /// Out-of-range requests are refused and leave the state unchanged.
    pub fn go_to(&mut self, index: usize, row_count: usize) -> bool {
        if index >= self.page_count(row_count) {
            return false;
        }
        self.index = index;
        true
    }

    pub fn next(&mut self, row_count: usize) -> bool {
        if !self.has_next(row_count) {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn previous(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn first(&mut self) {
        self.index = 0;
    }

    pub fn last(&mut self, row_count: usize) {
        self.index = self.page_count(row_count) - 1;
    }

    /// Changes the page size, keeping the first visible row on screen when
    /// possible. A zero size is refused.
    pub fn set_size(&mut self, size: usize, row_count: usize) -> bool {
        if size == 0 {
            return false;
        }
        let first_row = self.index.saturating_mul(self.size);
        self.size = size;
        self.index = first_row / size;
        self.clamp(row_count);
        true
    }

    pub fn clamp(&mut self, row_count: usize) {
        self.index = self.index.min(self.page_count(row_count) - 1);
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// One-based inclusive row range shown on the current page.
    pub fn range(&self, row_count: usize) -> Option<(usize, usize)> {
        let start = self.index * self.size;
        if start >= row_count {
            return None;
        }
        Some((start + 1, (start + self.size).min(row_count)))
    }
}

#[cfg(test)]
mod tests {
    use super::PageState;

    #[test]
    fn thirteen_rows_split_into_two_pages() {
        let rows: Vec<usize> = (0..13).collect();
        let mut page = PageState::new(10);
        assert_eq!(page.slice(&rows).len(), 10);
        assert!(page.go_to(1, rows.len()));
        assert_eq!(page.slice(&rows), &[10, 11, 12]);
        assert!(!page.go_to(2, rows.len()));
        assert_eq!(page.index(), 1);
        assert!(PageState::slice_at(&rows, 2, 10).is_empty());
    }

    #[test]
    fn boundaries_refuse_movement() {
        let mut page = PageState::new(5);
        assert!(!page.previous());
        assert!(page.next(7));
        assert!(!page.next(7));
        assert_eq!(page.index(), 1);
    }

    #[test]
    fn resizing_keeps_first_visible_row() {
        let mut page = PageState::new(5);
        page.go_to(3, 40);
        assert!(page.set_size(10, 40));
        // Row 16 (index 15) was first; it now sits on page 1 (rows 11-20).
        assert_eq!(page.index(), 1);
        assert_eq!(page.range(40), Some((11, 20)));
    }

    #[test]
    fn resizing_clamps_to_last_page() {
        let mut page = PageState::new(2);
        page.go_to(6, 13);
        assert!(page.set_size(20, 13));
        assert_eq!(page.index(), 0);
        assert!(!page.set_size(0, 13));
        assert_eq!(page.size(), 20);
    }

    #[test]
    fn clamp_handles_empty_results() {
        let mut page = PageState::new(10);
        page.go_to(2, 30);
        page.clamp(0);
        assert_eq!(page.index(), 0);
        assert_eq!(page.page_count(0), 1);
        assert_eq!(page.range(0), None);
    }
}

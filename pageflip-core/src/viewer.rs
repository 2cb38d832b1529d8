//! Page-by-page navigation over a book's images

/// Bounded cursor over `len` pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    current: usize,
    len: usize,
}

impl PageCursor {
    /// A cursor on the first page
    pub fn new(len: usize) -> Self {
        Self { current: 0, len }
    }

    /// 0-based index of the page shown
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn has_next(&self) -> bool {
        self.current + 1 < self.len
    }

    pub fn has_prev(&self) -> bool {
        self.current > 0
    }

    /// Flip forward; returns false on the last page
    pub fn next(&mut self) -> bool {
        if self.has_next() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Flip back; returns false on the first page
    pub fn prev(&mut self) -> bool {
        if self.has_prev() {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to a page, clamped to the book
    pub fn go_to(&mut self, index: usize) {
        self.current = index.min(self.len.saturating_sub(1));
    }

    /// Page indicator such as `3 / 7`
    pub fn label(&self) -> String {
        if self.is_empty() {
            "0 / 0".to_string()
        } else {
            format!("{} / {}", self.current + 1, self.len)
        }
    }

    /// The current page out of `pages`
    pub fn page<'a, T>(&self, pages: &'a [T]) -> Option<&'a T> {
        pages.get(self.current)
    }
}

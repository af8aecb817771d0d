use std::ops::Index;

use crate::model::Page;

/// Ordered pages of a paginated document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageList {
    pages: Vec<Page>,
    has_non_linear_flows: bool,
}

impl PageList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn last(&self) -> Option<&Page> {
        self.pages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Page> {
        self.pages.iter()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn has_non_linear_flows(&self) -> bool {
        self.has_non_linear_flows
    }

    /// Append a page; its index becomes its position in the list.
    pub fn push(&mut self, mut page: Page) {
        page.index = self.pages.len();
        self.has_non_linear_flows |= page.flow > 0;
        self.pages.push(page);
    }

    pub fn clear(&mut self) {
        self.pages.clear();
        self.has_non_linear_flows = false;
    }

    pub(crate) fn from_pages(pages: Vec<Page>) -> Self {
        let mut list = Self {
            pages,
            has_non_linear_flows: false,
        };
        list.renumber();
        list
    }

    fn renumber(&mut self) {
        for (i, page) in self.pages.iter_mut().enumerate() {
            page.index = i;
        }
        self.has_non_linear_flows = self.pages.iter().any(|p| p.flow > 0);
    }

    /// Index of the page best matching document position `y`.
    ///
    /// In a gap before a page, a non-positive `direction` prefers the page
    /// above. Inside a page, a positive `direction` moves to the next page and
    /// a negative one to the previous, unless `y` is the page's very top.
    pub fn find_nearest_page(&self, y: i32, direction: i32) -> usize {
        if self.pages.is_empty() {
            return 0;
        }
        let last = self.pages.len() - 1;
        for (i, page) in self.pages.iter().enumerate() {
            if y < page.start {
                return if i > 0 && direction <= 0 { i - 1 } else { i };
            }
            if y == page.start {
                return i;
            }
            if y < page.end() {
                if direction > 0 && i < last {
                    return i + 1;
                }
                if direction < 0 && i > 0 {
                    return i - 1;
                }
                return i;
            }
        }
        last
    }

    /// Swap the pages covering `old_start..old_start + old_height` for
    /// `new_pages`, after the region was re-paginated on its own.
    ///
    /// Pages below the region move by `shift`. Pages straddling an edge of
    /// the region are cut back to the part outside it; a page covering the
    /// whole region is split in two, its footnotes staying with the upper part.
    pub fn replace_pages(
        &mut self,
        old_start: i32,
        old_height: i32,
        new_pages: Vec<Page>,
        shift: i32,
    ) {
        let old_end = old_start + old_height;
        let mut before = Vec::new();
        let mut after = Vec::new();
        let mut removed = 0usize;

        for mut page in self.pages.drain(..) {
            let end = page.end();
            if end <= old_start {
                before.push(page);
            } else if page.start >= old_end {
                page.start += shift;
                after.push(page);
            } else if page.start < old_start {
                if end > old_end {
                    // Spans the whole region: its part below survives as a
                    // page of its own.
                    let mut tail = page.clone();
                    tail.start = old_end + shift;
                    tail.height = end - old_end;
                    tail.footnotes.clear();
                    after.push(tail);
                }
                page.height = old_start - page.start;
                before.push(page);
            } else if end > old_end {
                page.height = end - old_end;
                page.start = old_end + shift;
                after.push(page);
            } else {
                removed += 1;
            }
        }

        log::debug!(
            "Replacing {} pages in {}..{} with {} (shift {})",
            removed,
            old_start,
            old_end,
            new_pages.len(),
            shift
        );
        before.extend(new_pages);
        before.extend(after);
        self.pages = before;
        self.renumber();
    }

    /// Index of the first page of `flow`.
    pub fn first_page_in_flow(&self, flow: u16) -> Option<usize> {
        self.pages.iter().position(|p| p.flow == flow)
    }

    pub fn page_count_in_flow(&self, flow: u16) -> usize {
        self.pages.iter().filter(|p| p.flow == flow).count()
    }

    /// Highest flow number in use plus one.
    pub fn flow_count(&self) -> usize {
        self.pages
            .iter()
            .map(|p| p.flow as usize + 1)
            .max()
            .unwrap_or(0)
    }
}

impl Index<usize> for PageList {
    type Output = Page;

    fn index(&self, index: usize) -> &Page {
        &self.pages[index]
    }
}

impl<'a> IntoIterator for &'a PageList {
    type Item = &'a Page;
    type IntoIter = std::slice::Iter<'a, Page>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(starts: &[(i32, i32)]) -> PageList {
        let mut list = PageList::new();
        for &(start, height) in starts {
            list.push(Page::new(start, height));
        }
        list
    }

    #[test]
    fn empty_list_finds_zero() {
        assert_eq!(PageList::new().find_nearest_page(500, 1), 0);
    }

    #[test]
    fn top_of_document_is_first_page_in_any_direction() {
        let pages = list(&[(0, 100), (100, 100), (200, 100)]);
        for direction in [-1, 0, 1] {
            assert_eq!(pages.find_nearest_page(0, direction), 0);
        }
    }

    #[test]
    fn inside_a_page_direction_picks_neighbour() {
        let pages = list(&[(0, 100), (100, 100), (200, 100)]);
        assert_eq!(pages.find_nearest_page(150, 0), 1);
        assert_eq!(pages.find_nearest_page(150, 1), 2);
        assert_eq!(pages.find_nearest_page(150, -1), 0);
        assert_eq!(pages.find_nearest_page(250, 1), 2);
    }

    #[test]
    fn gap_before_page_prefers_previous_unless_moving_forward() {
        let pages = list(&[(0, 100), (150, 100)]);
        assert_eq!(pages.find_nearest_page(120, 1), 1);
        assert_eq!(pages.find_nearest_page(120, 0), 0);
        assert_eq!(pages.find_nearest_page(120, -1), 0);
    }

    #[test]
    fn past_the_end_is_last_page() {
        let pages = list(&[(0, 100), (100, 100)]);
        assert_eq!(pages.find_nearest_page(10_000, -1), 1);
        assert_eq!(pages.find_nearest_page(10_000, 1), 1);
    }

    #[test]
    fn non_linear_flag_follows_pages() {
        let mut pages = list(&[(0, 100)]);
        assert!(!pages.has_non_linear_flows());
        let mut aside = Page::new(100, 50);
        aside.flow = 2;
        pages.push(aside);
        assert!(pages.has_non_linear_flows());
        assert_eq!(pages.flow_count(), 3);
        assert_eq!(pages.first_page_in_flow(2), Some(1));
        assert_eq!(pages.page_count_in_flow(1), 0);
        pages.clear();
        assert!(!pages.has_non_linear_flows());
    }
}

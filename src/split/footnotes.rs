use crate::footnote::FootnoteId;
use crate::model::{Line, PageFootnoteFragment};

use super::PageSplitter;

impl PageSplitter<'_> {
    /// Place the footnotes linked from the lines of `run`.
    pub(super) fn add_lines_footnotes_to_page(&mut self, lines: &[Line], run: &[usize]) {
        let registry = self.registry;
        for &i in run {
            for &link in &lines[i].links {
                let id = registry.resolve(link);
                if !registry.is_actual(id) || registry.lines(id).is_empty() {
                    continue;
                }
                if self.retry_delayed {
                    self.place_delayed();
                }
                if self.page.seen.contains(&id) || self.delayed.contains(&id) {
                    continue;
                }
                if self.page.delay_rest {
                    self.delayed.push(id);
                    continue;
                }
                if self.page.fragments.is_empty()
                    && !self.page.is_empty()
                    && !self.first_footnote_line_fits(id)
                {
                    log::debug!(
                        "Delaying footnote {:?}: first line does not fit on page {}",
                        registry.get(id).name(),
                        self.pages.len()
                    );
                    self.page.delay_rest = true;
                    self.delayed.push(id);
                    continue;
                }
                self.add_footnote_to_page(id);
            }
        }
        if self.retry_delayed {
            self.place_delayed();
        }
    }

    /// Push delayed footnotes, in order, while their first line fits.
    /// An empty page always takes the next one, however tall.
    pub(super) fn place_delayed(&mut self) {
        self.retry_delayed = false;
        while let Some(&id) = self.delayed.first() {
            if !self.page.is_empty() && !self.first_footnote_line_fits(id) {
                break;
            }
            self.delayed.remove(0);
            if self.page.seen.contains(&id) {
                continue;
            }
            self.add_footnote_to_page(id);
        }
    }

    fn first_footnote_line_fits(&self, id: FootnoteId) -> bool {
        let Some(first) = self.registry.lines(id).first() else {
            return true;
        };
        let margin = if self.page.fragments.is_empty() {
            self.config.footnote_margin
        } else {
            0
        };
        self.used_height() + margin + first.height <= self.config.page_height
    }

    /// Place footnote `id` at the bottom of the page, continuing on the
    /// following pages when it overflows.
    fn add_footnote_to_page(&mut self, id: FootnoteId) {
        let registry = self.registry;
        self.page.seen.push(id);

        let mut fragment: Option<(i32, i32)> = None;
        for line in registry.lines(id) {
            let (start, end) = match fragment {
                Some((start, end)) => (start, end.max(line.end())),
                None => (line.start, line.end()),
            };
            let margin = if self.page.fragments.is_empty() {
                self.config.footnote_margin
            } else {
                0
            };
            let fits = self.used_height() + margin + (end - start) <= self.config.page_height;
            if fits || (fragment.is_none() && self.page.is_empty()) {
                fragment = Some((start, end));
                self.page.count_footnote_line(line);
                continue;
            }

            if let Some((start, end)) = fragment.take() {
                self.push_fragment(start, end);
            }
            log::debug!(
                "Footnote {:?} continues on page {}",
                registry.get(id).name(),
                self.pages.len() + 1
            );
            self.flush(false);
            // Same footnote on the next page must not show up a second time.
            self.page.seen.push(id);
            fragment = Some((line.start, line.end()));
            self.page.count_footnote_line(line);
        }
        if let Some((start, end)) = fragment {
            self.push_fragment(start, end);
        }
    }

    fn push_fragment(&mut self, start: i32, end: i32) {
        let fragment = PageFootnoteFragment::new(start, end - start);
        self.page.footnotes_height += fragment.height;
        self.page.fragments.push(fragment);
    }
}

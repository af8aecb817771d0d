//! # Page splitting
//!
//! A single forward pass over the renderer's lines. Lines are grouped into
//! unbreakable runs (no allowed break between members), each run is placed on
//! the current page or moves to a fresh one, and lines taller than what is
//! left get sliced. Footnotes linked from a run are placed at the bottom of
//! the same page when they fit, split across pages when they overflow, or
//! delayed to the next page when not even their first line fits.

mod footnotes;
mod runs;

use std::time::Instant;

use crate::error::{Error, Result};
use crate::footnote::{FootnoteId, FootnoteRegistry};
use crate::model::{Line, Page, PageFlags, PageFootnoteFragment};
use crate::page_list::PageList;
use crate::progress::ProgressHandle;

use runs::Boundary;

const DEFAULT_DOC_FONT_SIZE: i32 = 16;

/// Lines between two progress reports while splitting.
const PROGRESS_LINES: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitConfig {
    pub page_height: i32,
    /// Space kept above the first footnote of a page.
    pub footnote_margin: i32,
    pub doc_font_size: i32,
}

impl SplitConfig {
    pub fn new(page_height: i32) -> Self {
        Self {
            page_height,
            footnote_margin: 0,
            doc_font_size: DEFAULT_DOC_FONT_SIZE,
        }
    }

    pub fn with_footnote_margin(mut self, margin: i32) -> Self {
        self.footnote_margin = margin.max(0);
        self
    }

    pub fn with_doc_font_size(mut self, size: i32) -> Self {
        self.doc_font_size = size.max(0);
        self
    }

    /// Largest amount of page space that may be left empty to move a line
    /// that does not fit to the next page instead of slicing it.
    pub fn early_flush_slack(&self) -> i32 {
        2 * self.doc_font_size
    }

    /// Page heights must be positive and fit the `u16` height field of the
    /// page-list cache.
    pub fn validate(&self) -> Result<()> {
        if self.page_height <= 0 || self.page_height > i32::from(u16::MAX) {
            return Err(Error::InvalidPageHeight(self.page_height));
        }
        Ok(())
    }
}

/// Accumulation state of the page being filled.
#[derive(Debug, Default)]
struct PageState {
    /// Top of the main content, `None` until a main line lands here.
    top: Option<i32>,
    flow: Option<u16>,
    lines: u32,
    rtl_lines: u32,
    footnote_lines: u32,
    rtl_footnote_lines: u32,
    fragments: Vec<PageFootnoteFragment>,
    footnotes_height: i32,
    /// Resolved footnotes already shown on this page.
    seen: Vec<FootnoteId>,
    /// Set once a footnote was delayed: later ones wait too, to keep order.
    delay_rest: bool,
}

impl PageState {
    fn is_empty(&self) -> bool {
        self.top.is_none() && self.fragments.is_empty()
    }

    fn footnote_space(&self, margin: i32) -> i32 {
        if self.fragments.is_empty() {
            0
        } else {
            self.footnotes_height + margin
        }
    }

    fn count_line(&mut self, line: &Line) {
        self.lines += 1;
        if line.is_rtl() {
            self.rtl_lines += 1;
        }
    }

    fn count_footnote_line(&mut self, line: &Line) {
        self.footnote_lines += 1;
        if line.is_rtl() {
            self.rtl_footnote_lines += 1;
        }
    }

    fn flags(&self) -> PageFlags {
        let mut flags = PageFlags::NORMAL;
        if self.lines > 0 && self.rtl_lines * 2 > self.lines {
            flags |= PageFlags::MOSTLY_RTL;
        }
        if self.footnote_lines > 0 && self.rtl_footnote_lines * 2 > self.footnote_lines {
            flags |= PageFlags::FOOTNOTES_MOSTLY_RTL;
        }
        flags
    }
}

pub struct PageSplitter<'a> {
    config: SplitConfig,
    registry: &'a FootnoteRegistry,
    progress: Option<ProgressHandle>,
    pages: PageList,
    page: PageState,
    /// Lowest point of everything committed so far; lines reaching back above
    /// it only contribute their part below.
    bottom: i32,
    last_flow: u16,
    delayed: Vec<FootnoteId>,
    retry_delayed: bool,
}

impl<'a> PageSplitter<'a> {
    pub fn new(config: SplitConfig, registry: &'a FootnoteRegistry) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry,
            progress: None,
            pages: PageList::new(),
            page: PageState::default(),
            bottom: 0,
            last_flow: 0,
            delayed: Vec::new(),
            retry_delayed: false,
        })
    }

    pub fn with_progress(mut self, progress: ProgressHandle) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Split `lines` into pages. Lines flagged as footnote content are only
    /// shown through the links that reference them.
    pub fn split(mut self, lines: &[Line]) -> PageList {
        let t0 = Instant::now();

        let mut run: Vec<usize> = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            if i % PROGRESS_LINES == 0 {
                if let Some(progress) = &self.progress {
                    progress.report_split(i, lines.len());
                }
            }
            if line.is_footnote() {
                continue;
            }
            if let Some(&last) = run.last() {
                let boundary = runs::boundary(&lines[last], line);
                if boundary != Boundary::Join {
                    self.add_lines_to_page(lines, &run);
                    run.clear();
                }
                match boundary {
                    Boundary::Forced if line.start < self.bottom => {
                        log::debug!(
                            "Forced break before y={} cancelled: overlaps content down to {}",
                            line.start,
                            self.bottom
                        );
                    }
                    Boundary::Forced | Boundary::FlowChange => self.flush(true),
                    Boundary::Join | Boundary::Split => {}
                }
            }
            run.push(i);
        }
        if !run.is_empty() {
            self.add_lines_to_page(lines, &run);
        }
        self.finish();

        if let Some(progress) = &self.progress {
            progress.report_split(lines.len(), lines.len());
        }
        log::debug!(
            "Split {} lines into {} pages in {:.1}ms",
            lines.len(),
            self.pages.len(),
            t0.elapsed().as_secs_f64() * 1000.0,
        );
        self.pages
    }

    fn avail_height(&self) -> i32 {
        self.config.page_height - self.page.footnote_space(self.config.footnote_margin)
    }

    fn used_height(&self) -> i32 {
        let main = self.page.top.map_or(0, |top| self.bottom - top);
        main + self.page.footnote_space(self.config.footnote_margin)
    }

    fn add_lines_to_page(&mut self, lines: &[Line], run: &[usize]) {
        let (run_top, run_bottom) = runs::extent(lines, run);
        if !self.page.is_empty() {
            let top = self.page.top.unwrap_or(run_top.max(self.bottom));
            let fits_here = run_bottom - top <= self.avail_height();
            let fits_fresh = run_bottom - run_top.max(self.bottom) <= self.config.page_height;
            if !fits_here && fits_fresh {
                // Keep the whole fresh page for the run; delayed footnotes
                // are only tried once it is placed.
                self.flush(false);
            }
        }

        for &i in run {
            let line = &lines[i];
            if self.page.top.is_none() && line.discard_at_start() {
                log::debug!("Discarding line at y={} on top of a new page", line.start);
                continue;
            }
            self.place_line(line);
        }

        if self.retry_delayed {
            self.place_delayed();
        }
        self.add_lines_footnotes_to_page(lines, run);
    }

    fn place_line(&mut self, line: &Line) {
        let start = line.start.max(self.bottom);
        let end = line.end();
        if end < start {
            // Entirely above content already committed.
            return;
        }

        let top = self.page.top.unwrap_or(start);
        let limit = top + self.avail_height();
        if end <= limit {
            self.commit(line, start, end);
            return;
        }

        let wasted = limit - start;
        if !self.page.is_empty()
            && end - start <= self.config.page_height
            && wasted < self.config.early_flush_slack()
        {
            self.flush(false);
            if line.discard_at_start() {
                return;
            }
            self.commit(line, start, end);
            return;
        }
        self.slice_line(line, start, end);
    }

    /// Cut an oversized line at the page bottom until the rest fits.
    fn slice_line(&mut self, line: &Line, mut start: i32, end: i32) {
        loop {
            let top = self.page.top.unwrap_or(start);
            let limit = top + self.avail_height();
            if end <= limit {
                self.commit(line, start, end);
                return;
            }
            if limit > start {
                log::debug!("Slicing line {}..{} at y={}", line.start, end, limit);
                self.commit(line, start, limit);
                start = limit;
            }
            self.flush(true);
            if line.discard_at_start() {
                return;
            }
        }
    }

    fn commit(&mut self, line: &Line, start: i32, end: i32) {
        self.page.top.get_or_insert(start);
        self.page.flow.get_or_insert(line.flow);
        self.bottom = self.bottom.max(end);
        self.page.count_line(line);
    }

    /// Close the current page. With `eager`, delayed footnotes are pushed on
    /// the next page right away; otherwise they are retried after the next
    /// placement.
    fn flush(&mut self, eager: bool) {
        if self.page.is_empty() {
            return;
        }
        let state = std::mem::take(&mut self.page);
        let flow = state.flow.unwrap_or(self.last_flow);
        let page = Page {
            start: state.top.unwrap_or(self.bottom),
            height: state.top.map_or(0, |top| self.bottom - top),
            index: self.pages.len(),
            flags: state.flags(),
            flow,
            footnotes: state.fragments,
        };
        log::trace!(
            "Page {}: {}+{} flow {} with {} footnote fragments",
            page.index,
            page.start,
            page.height,
            page.flow,
            page.footnotes.len()
        );
        self.pages.push(page);
        self.last_flow = flow;

        if !self.delayed.is_empty() {
            if eager {
                self.place_delayed();
            } else {
                self.retry_delayed = true;
            }
        }
    }

    fn finish(&mut self) {
        self.flush(false);
        while !self.delayed.is_empty() {
            self.place_delayed();
            self.flush(false);
        }
        self.retry_delayed = false;
    }
}

//! Renderer-facing side of pagination: lines, footnote events and flows are
//! collected here during rendering, then split into pages by
//! [`PageContext::finalize`].

use std::time::Instant;

use crate::error::Result;
use crate::footnote::{FootnoteId, FootnoteRegistry};
use crate::model::{Line, LineFlags};
use crate::page_list::PageList;
use crate::progress::{ProgressCallback, ProgressConfig, ProgressHandle};
use crate::split::{PageSplitter, SplitConfig};

pub struct PageContext {
    config: SplitConfig,
    lines: Vec<Line>,
    footnotes: FootnoteRegistry,
    current_footnote: Option<FootnoteId>,
    current_flow: u16,
    max_flow: u16,
    flow_has_lines: bool,
    progress: ProgressHandle,
    /// Only the context that created the progress handle finishes it.
    owns_progress: bool,
    progress_config: ProgressConfig,
}

impl PageContext {
    pub fn new(config: SplitConfig) -> Self {
        Self::build(config, ProgressHandle::new(), true)
    }

    /// A secondary context reporting through the progress of another one.
    pub fn with_progress(config: SplitConfig, progress: ProgressHandle) -> Self {
        Self::build(config, progress, false)
    }

    fn build(config: SplitConfig, progress: ProgressHandle, owns_progress: bool) -> Self {
        Self {
            config,
            lines: Vec::new(),
            footnotes: FootnoteRegistry::new(),
            current_footnote: None,
            current_flow: 0,
            max_flow: 0,
            flow_has_lines: false,
            progress,
            owns_progress,
            progress_config: ProgressConfig::default(),
        }
    }

    pub fn with_progress_config(mut self, config: ProgressConfig) -> Self {
        self.progress_config = config;
        self
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Handle to pass to secondary contexts of the same render.
    pub fn progress(&self) -> ProgressHandle {
        self.progress.clone()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn footnotes(&self) -> &FootnoteRegistry {
        &self.footnotes
    }

    pub fn current_flow(&self) -> u16 {
        self.current_flow
    }

    /// Non-linear flows started so far, empty ones not counted.
    pub fn non_linear_flow_count(&self) -> u16 {
        self.max_flow
    }

    pub fn set_progress_callback(&mut self, callback: Box<dyn ProgressCallback>, total_units: u64) {
        if !self.owns_progress {
            log::warn!("Progress callback set on a secondary context, forwarding anyway");
        }
        self.progress.set_callback(callback, total_units, self.progress_config);
    }

    pub fn update_render_progress(&self, blocks_rendered: u64) {
        self.progress.add_rendered(blocks_rendered);
    }

    pub fn add_line(&mut self, start: i32, end: i32, flags: LineFlags) {
        self.add_line_in_flow(start, end, flags, self.current_flow);
    }

    pub fn add_line_in_flow(&mut self, start: i32, end: i32, flags: LineFlags, flow: u16) {
        let mut line = Line::new(start, end - start, flags).with_flow(flow);
        if let Some(id) = self.current_footnote {
            line.flags |= LineFlags::FOOTNOTE;
            let mut own = line.clone();
            own.flow = 0;
            self.footnotes.push_line(id, own);
        }
        self.lines.push(line);
        self.flow_has_lines = true;
    }

    pub fn enter_footnote(&mut self, id: &str) {
        self.enter_footnote_ids(&[id]);
    }

    pub fn enter_footnote_ids(&mut self, ids: &[&str]) {
        if let Some(current) = self.current_footnote {
            log::error!(
                "Nested footnote {ids:?} inside {:?}, ignored",
                self.footnotes.get(current).name()
            );
            return;
        }
        self.current_footnote = self.footnotes.get_or_create_many(ids);
        if self.current_footnote.is_none() {
            log::warn!("Footnote entered without any id, ignored");
        }
    }

    pub fn leave_footnote(&mut self) {
        if self.current_footnote.take().is_none() {
            log::error!("Leaving a footnote that was never entered");
        }
    }

    pub fn in_footnote(&self) -> bool {
        self.current_footnote.is_some()
    }

    /// Reference footnote `id` from the most recently added line.
    pub fn add_link(&mut self, id: &str) {
        self.insert_link(id, None);
    }

    /// Like [`add_link`](Self::add_link), inserting at `position` among the
    /// line's links.
    pub fn add_link_at(&mut self, id: &str, position: usize) {
        self.insert_link(id, Some(position));
    }

    fn insert_link(&mut self, id: &str, position: Option<usize>) {
        if self.lines.is_empty() {
            log::warn!("Footnote link {id:?} before any line, ignored");
            return;
        }
        let note = self.footnotes.get_or_create(id, false);
        let Some(line) = self.lines.last_mut() else {
            return;
        };
        let at = position.unwrap_or(line.links.len()).min(line.links.len());
        line.links.insert(at, note);
    }

    /// Start a new flow. A non-linear flow that got no line is given back.
    pub fn new_flow(&mut self, non_linear: bool) {
        self.retract_empty_flow();
        if non_linear {
            self.max_flow += 1;
            self.current_flow = self.max_flow;
        } else {
            self.current_flow = 0;
        }
        self.flow_has_lines = false;
    }

    fn retract_empty_flow(&mut self) {
        if self.current_flow > 0 && self.current_flow == self.max_flow && !self.flow_has_lines {
            log::debug!("Retracting empty flow {}", self.current_flow);
            self.max_flow -= 1;
        }
    }

    /// Split the collected lines into pages, consuming the per-pass state.
    pub fn finalize(mut self) -> Result<PageList> {
        let t0 = Instant::now();
        self.retract_empty_flow();
        if self.current_footnote.is_some() {
            log::warn!("Finalizing inside a footnote, closing it");
        }

        let result = PageSplitter::new(self.config, &self.footnotes)
            .map(|splitter| splitter.with_progress(self.progress.clone()).split(&self.lines));
        if self.owns_progress {
            self.progress.clear();
        }
        let pages = result?;

        log::info!(
            "Pagination: {} lines, {} footnotes, {} non-linear flows → {} pages in {:.1}ms",
            self.lines.len(),
            self.footnotes.len(),
            self.max_flow,
            pages.len(),
            t0.elapsed().as_secs_f64() * 1000.0,
        );
        Ok(pages)
    }
}

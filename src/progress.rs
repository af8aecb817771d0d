//! Throttled progress reporting shared by every flow context of one render.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Share of the percent range covered by rendering; splitting fills the rest.
const RENDER_SHARE: u64 = 50;

/// Receiver of formatting progress, usually a UI.
pub trait ProgressCallback {
    fn on_format_start(&mut self) {}

    fn on_format_progress(&mut self, percent: u8);

    fn on_format_end(&mut self) {}
}

impl<F: FnMut(u8)> ProgressCallback for F {
    fn on_format_progress(&mut self, percent: u8) {
        self(percent)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressConfig {
    /// Minimum wall-clock time between two notifications.
    pub interval: Duration,
    /// Minimum percent advance between two notifications.
    pub min_step: u8,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            min_step: 1,
        }
    }
}

#[derive(Default)]
struct Aggregator {
    sink: Option<Box<dyn ProgressCallback>>,
    config: ProgressConfig,
    total_units: u64,
    rendered_units: u64,
    started: bool,
    last_percent: Option<u8>,
    last_emit: Option<Instant>,
}

impl Aggregator {
    /// Forward `percent` if it moved up by at least the minimum step and the
    /// interval since the last notification has passed.
    fn emit(&mut self, percent: u8) {
        let percent = percent.min(100);
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if !self.started {
            self.started = true;
            sink.on_format_start();
        }
        let advanced = match self.last_percent {
            None => true,
            Some(last) => percent >= last.saturating_add(self.config.min_step.max(1)),
        };
        if !advanced {
            return;
        }
        let now = Instant::now();
        let due = match self.last_emit {
            None => true,
            Some(at) => now.duration_since(at) >= self.config.interval,
        };
        if !due {
            return;
        }
        self.last_percent = Some(percent);
        self.last_emit = Some(now);
        sink.on_format_progress(percent);
    }
}

/// Shared handle to the progress aggregator of one render operation.
///
/// The context that creates the handle installs the callback; every other
/// flow context gets a clone and forwards its counts through it. Rendering
/// reports 0..50%, splitting 50..100%, and reported values never go down.
/// The handle is single-threaded.
#[derive(Clone, Default)]
pub struct ProgressHandle(Rc<RefCell<Aggregator>>);

impl ProgressHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_callback(
        &self,
        callback: Box<dyn ProgressCallback>,
        total_units: u64,
        config: ProgressConfig,
    ) {
        let mut agg = self.0.borrow_mut();
        *agg = Aggregator {
            sink: Some(callback),
            config,
            total_units,
            ..Default::default()
        };
    }

    pub fn has_callback(&self) -> bool {
        self.0.borrow().sink.is_some()
    }

    /// Count rendered blocks towards the total given at install time.
    pub fn add_rendered(&self, units: u64) {
        let mut agg = self.0.borrow_mut();
        agg.rendered_units += units;
        if agg.total_units == 0 {
            return;
        }
        let done = agg.rendered_units.min(agg.total_units);
        let percent = (done * RENDER_SHARE / agg.total_units) as u8;
        agg.emit(percent);
    }

    pub(crate) fn report_split(&self, done: usize, total: usize) {
        if total == 0 {
            return;
        }
        let done = done.min(total) as u64;
        let percent = RENDER_SHARE + done * (100 - RENDER_SHARE) / total as u64;
        self.0.borrow_mut().emit(percent as u8);
    }

    /// Notify the end of formatting and drop the callback. A started run
    /// that never got to report 100% gets it here, once.
    pub fn clear(&self) {
        let mut agg = self.0.borrow_mut();
        let finished = agg.last_percent == Some(100);
        if let Some(mut sink) = agg.sink.take() {
            if agg.started {
                if !finished {
                    sink.on_format_progress(100);
                }
                sink.on_format_end();
            }
        }
        *agg = Aggregator::default();
    }
}

impl fmt::Debug for ProgressHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let agg = self.0.borrow();
        f.debug_struct("ProgressHandle")
            .field("has_callback", &agg.sink.is_some())
            .field("total_units", &agg.total_units)
            .field("rendered_units", &agg.rendered_units)
            .field("last_percent", &agg.last_percent)
            .finish()
    }
}

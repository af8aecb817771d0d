//! Page splitting for an e-book reading engine.
//!
//! The renderer feeds laid-out lines, footnote bodies and footnote links into
//! a [`PageContext`]; [`PageContext::finalize`] cuts the flow into fixed-height
//! pages with footnotes placed next to the text that references them. The
//! resulting [`PageList`] can be cached in a small checksummed binary format.

mod context;
mod error;
mod footnote;
mod model;
mod page_list;
mod progress;
mod serial;
mod split;

#[cfg(feature = "cli")]
pub mod script;

pub use context::PageContext;
pub use error::{Error, Result};
pub use footnote::{Footnote, FootnoteId, FootnoteRegistry};
pub use model::{Line, LineFlags, Page, PageFlags, PageFootnoteFragment, SplitHint};
pub use page_list::PageList;
pub use progress::{ProgressCallback, ProgressConfig, ProgressHandle};
pub use split::{PageSplitter, SplitConfig};

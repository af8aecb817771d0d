//! JSON event scripts: a recorded sequence of renderer calls that can be
//! replayed into a [`PageContext`] without a renderer.
//!
//! ```json
//! { "page_height": 1000,
//!   "events": [
//!     { "op": "line", "start": 0, "end": 120 },
//!     { "op": "link", "id": "n1" },
//!     { "op": "enter", "ids": ["n1"] },
//!     { "op": "line", "start": 120, "end": 150, "flags": 1024 },
//!     { "op": "leave" } ] }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::context::PageContext;
use crate::error::{Error, Result};
use crate::model::LineFlags;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Event {
    Line {
        start: i32,
        end: i32,
        /// Packed [`LineFlags`] bits.
        #[serde(default)]
        flags: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        flow: Option<u16>,
    },
    Enter {
        ids: Vec<String>,
    },
    Leave,
    Link {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<usize>,
    },
    Flow {
        #[serde(default)]
        non_linear: bool,
    },
    Progress {
        blocks: u64,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_height: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_font_size: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footnote_margin: Option<i32>,
    /// Total render blocks, for progress percentages.
    #[serde(default)]
    pub total_blocks: u64,
    pub events: Vec<Event>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Script(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Script(e.to_string()))
    }

    pub fn replay(&self, ctx: &mut PageContext) {
        for event in &self.events {
            match event {
                Event::Line {
                    start,
                    end,
                    flags,
                    flow,
                } => {
                    let flags = LineFlags::from_bits_retain(*flags);
                    match flow {
                        Some(flow) => ctx.add_line_in_flow(*start, *end, flags, *flow),
                        None => ctx.add_line(*start, *end, flags),
                    }
                }
                Event::Enter { ids } => {
                    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
                    ctx.enter_footnote_ids(&ids);
                }
                Event::Leave => ctx.leave_footnote(),
                Event::Link { id, position } => match position {
                    Some(position) => ctx.add_link_at(id, *position),
                    None => ctx.add_link(id),
                },
                Event::Flow { non_linear } => ctx.new_flow(*non_linear),
                Event::Progress { blocks } => ctx.update_render_progress(*blocks),
            }
        }
    }
}

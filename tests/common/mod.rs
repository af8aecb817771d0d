#![allow(dead_code)]

use std::collections::HashMap;

use flowpager::{LineFlags, PageContext, PageList, SplitConfig, SplitHint};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn context(page_height: i32) -> PageContext {
    init_logging();
    PageContext::new(SplitConfig::new(page_height))
}

pub fn avoid_after() -> LineFlags {
    LineFlags::empty().with_split_after(SplitHint::Avoid)
}

pub fn always_after() -> LineFlags {
    LineFlags::empty().with_split_after(SplitHint::Always)
}

/// Add consecutive lines of the given heights starting at `y`; returns the
/// bottom of the last one.
pub fn stack(ctx: &mut PageContext, mut y: i32, heights: &[i32], flags: LineFlags) -> i32 {
    for &h in heights {
        ctx.add_line(y, y + h, flags);
        y += h;
    }
    y
}

/// Enter footnote `id`, give it lines of the given heights at `y`, leave.
pub fn footnote(ctx: &mut PageContext, id: &str, y: i32, heights: &[i32]) -> i32 {
    ctx.enter_footnote(id);
    let end = stack(ctx, y, heights, LineFlags::empty());
    ctx.leave_footnote();
    end
}

pub fn bounds(pages: &PageList) -> Vec<(i32, i32)> {
    pages.iter().map(|p| (p.start, p.height)).collect()
}

/// Pages of one flow never overlap and come in document order.
pub fn assert_flows_ordered(pages: &PageList) {
    let mut last_end: HashMap<u16, i32> = HashMap::new();
    for page in pages {
        if let Some(&end) = last_end.get(&page.flow) {
            assert!(
                end <= page.start,
                "page {} of flow {} starts at {} before previous end {}",
                page.index,
                page.flow,
                page.start,
                end
            );
        }
        last_end.insert(page.flow, page.end());
    }
}

/// Map each fragment back to the footnote owning its first line, and check
/// that no footnote shows up twice on a page.
pub fn assert_no_duplicate_footnotes(pages: &PageList, footnote_starts: &HashMap<i32, String>) {
    for page in pages {
        let mut seen = Vec::new();
        for fragment in &page.footnotes {
            let owner = footnote_starts
                .get(&fragment.start)
                .unwrap_or_else(|| panic!("fragment at {} matches no footnote line", fragment.start));
            assert!(
                !seen.contains(owner),
                "footnote {owner} twice on page {}",
                page.index
            );
            seen.push(owner.clone());
        }
    }
}

//! Property tests over randomly generated documents: page order per flow,
//! footnote uniqueness per page, determinism and cache round trips.

mod common;

use std::collections::HashMap;

use common::{assert_flows_ordered, assert_no_duplicate_footnotes};
use flowpager::{LineFlags, PageContext, PageList, SplitConfig, SplitHint};
use proptest::prelude::*;

#[derive(Clone, Debug)]
struct LinePlan {
    height: i32,
    before: SplitHint,
    after: SplitHint,
    discard: bool,
    rtl: bool,
    link: Option<usize>,
    /// How far the line reaches back above the previous bottom.
    rewind: i32,
    new_flow: Option<bool>,
}

#[derive(Clone, Debug)]
struct Document {
    page_height: i32,
    margin: i32,
    lines: Vec<LinePlan>,
    notes: Vec<Vec<i32>>,
}

fn hint() -> impl Strategy<Value = SplitHint> {
    prop::sample::select(vec![
        SplitHint::Auto,
        SplitHint::Auto,
        SplitHint::Avoid,
        SplitHint::Always,
    ])
}

prop_compose! {
    fn line_plan()(
        height in 1..400i32,
        before in hint(),
        after in hint(),
        discard in prop::bool::weighted(0.1),
        rtl in any::<bool>(),
        link in prop::option::weighted(0.2, 0..4usize),
        rewind in prop_oneof![4 => Just(0i32), 1 => 1..60i32],
        new_flow in prop::option::weighted(0.05, any::<bool>()),
    ) -> LinePlan {
        LinePlan { height, before, after, discard, rtl, link, rewind, new_flow }
    }
}

prop_compose! {
    fn document()(
        page_height in 150..1200i32,
        margin in 0..40i32,
        lines in prop::collection::vec(line_plan(), 1..80),
        notes in prop::collection::vec(prop::collection::vec(1..150i32, 0..5), 4),
    ) -> Document {
        Document { page_height, margin, lines, notes }
    }
}

/// Paginate `doc`; also returns which footnote owns each footnote line start.
fn paginate(doc: &Document) -> (PageList, HashMap<i32, String>) {
    let config = SplitConfig::new(doc.page_height).with_footnote_margin(doc.margin);
    let mut ctx = PageContext::new(config);

    let mut y = 0;
    for plan in &doc.lines {
        if let Some(non_linear) = plan.new_flow {
            ctx.new_flow(non_linear);
        }
        let mut flags = LineFlags::empty()
            .with_split_before(plan.before)
            .with_split_after(plan.after);
        if plan.discard {
            flags |= LineFlags::DISCARD_AT_START;
        }
        if plan.rtl {
            flags |= LineFlags::RTL;
        }
        let start = y - plan.rewind.min(y);
        let end = start + plan.height;
        ctx.add_line(start, end, flags);
        if let Some(k) = plan.link {
            ctx.add_link(&format!("f{k}"));
        }
        y = y.max(end);
    }

    let mut owners = HashMap::new();
    y += 1000;
    for (k, heights) in doc.notes.iter().enumerate() {
        let name = format!("f{k}");
        ctx.enter_footnote(&name);
        for &h in heights {
            ctx.add_line(y, y + h, LineFlags::empty());
            owners.insert(y, name.clone());
            y += h;
        }
        ctx.leave_footnote();
    }

    let pages = ctx.finalize().unwrap();
    (pages, owners)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn pages_of_a_flow_never_overlap(doc in document()) {
        let (pages, _) = paginate(&doc);
        assert_flows_ordered(&pages);
        for page in &pages {
            prop_assert!(page.height >= 0);
            prop_assert!(page.height <= doc.page_height);
        }
    }

    #[test]
    fn footnote_at_most_once_per_page(doc in document()) {
        let (pages, owners) = paginate(&doc);
        assert_no_duplicate_footnotes(&pages, &owners);
    }

    #[test]
    fn indices_are_positions(doc in document()) {
        let (pages, _) = paginate(&doc);
        for (i, page) in pages.iter().enumerate() {
            prop_assert_eq!(page.index, i);
        }
    }

    #[test]
    fn splitting_is_deterministic(doc in document()) {
        let (first, _) = paginate(&doc);
        let (second, _) = paginate(&doc);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn cache_round_trip_preserves_pages(doc in document()) {
        let (pages, _) = paginate(&doc);
        let bytes = pages.to_bytes().unwrap();
        prop_assert_eq!(PageList::from_bytes(&bytes).unwrap(), pages);
    }
}

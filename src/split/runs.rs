use crate::model::{Line, SplitHint};

/// What separates two consecutive main-flow lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Boundary {
    /// Same unbreakable run.
    Join,
    /// A page break is allowed here.
    Split,
    /// A page break is requested here, unless the next line overlaps
    /// content already on the page.
    Forced,
    /// The next line belongs to another flow and always starts a page.
    FlowChange,
}

pub(super) fn boundary(prev: &Line, next: &Line) -> Boundary {
    if prev.flow != next.flow {
        return Boundary::FlowChange;
    }
    // Overlapping lines (floats next to text) can't be cut apart.
    if next.start < prev.end() {
        return Boundary::Join;
    }
    let after = prev.split_after();
    let before = next.split_before();
    if after == SplitHint::Avoid || before == SplitHint::Avoid {
        return Boundary::Join;
    }
    if after == SplitHint::Always || before == SplitHint::Always {
        return Boundary::Forced;
    }
    Boundary::Split
}

/// Lowest start and highest end over the run members.
pub(super) fn extent(lines: &[Line], run: &[usize]) -> (i32, i32) {
    run.iter().fold((i32::MAX, i32::MIN), |(top, bottom), &i| {
        (top.min(lines[i].start), bottom.max(lines[i].end()))
    })
}

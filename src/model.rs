use bitflags::bitflags;

use crate::footnote::FootnoteId;

/// Page-break preference on one side of a line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SplitHint {
    #[default]
    Auto,
    Avoid,
    Always,
}

impl SplitHint {
    fn from_code(code: u32) -> Self {
        match code & 0x7 {
            1 => SplitHint::Avoid,
            2 => SplitHint::Always,
            _ => SplitHint::Auto,
        }
    }

    fn code(self) -> u32 {
        match self {
            SplitHint::Auto => 0,
            SplitHint::Avoid => 1,
            SplitHint::Always => 2,
        }
    }
}

bitflags! {
    /// Packed per-line flags as handed over by the renderer.
    ///
    /// Bits 0..3 hold the split-before hint, bits 3..6 the split-after hint
    /// (0 = auto, 1 = avoid, 2 = always).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct LineFlags: u32 {
        const SPLIT_BEFORE_AVOID = 0x01;
        const SPLIT_BEFORE_ALWAYS = 0x02;
        const SPLIT_BEFORE_MASK = 0x07;
        const SPLIT_AFTER_AVOID = 0x08;
        const SPLIT_AFTER_ALWAYS = 0x10;
        const SPLIT_AFTER_MASK = 0x38;
        const FOOTNOTE = 0x100;
        const DISCARD_AT_START = 0x200;
        const RTL = 0x400;
    }
}

impl LineFlags {
    pub fn split_before(self) -> SplitHint {
        SplitHint::from_code(self.bits())
    }

    pub fn split_after(self) -> SplitHint {
        SplitHint::from_code(self.bits() >> 3)
    }

    pub fn with_split_before(self, hint: SplitHint) -> Self {
        let bits = (self.bits() & !Self::SPLIT_BEFORE_MASK.bits()) | hint.code();
        Self::from_bits_retain(bits)
    }

    pub fn with_split_after(self, hint: SplitHint) -> Self {
        let bits = (self.bits() & !Self::SPLIT_AFTER_MASK.bits()) | (hint.code() << 3);
        Self::from_bits_retain(bits)
    }
}

/// One vertical slice of the rendered flow.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Line {
    pub start: i32,
    pub height: i32,
    pub flags: LineFlags,
    /// 0 is the main linear flow, anything above is a non-linear flow.
    pub flow: u16,
    pub links: Vec<FootnoteId>,
}

impl Line {
    pub fn new(start: i32, height: i32, flags: LineFlags) -> Self {
        Self {
            start,
            height: height.max(0),
            flags,
            flow: 0,
            links: Vec::new(),
        }
    }

    pub fn with_flow(mut self, flow: u16) -> Self {
        self.flow = flow;
        self
    }

    pub fn end(&self) -> i32 {
        self.start + self.height
    }

    pub fn split_before(&self) -> SplitHint {
        self.flags.split_before()
    }

    pub fn split_after(&self) -> SplitHint {
        self.flags.split_after()
    }

    pub fn is_footnote(&self) -> bool {
        self.flags.contains(LineFlags::FOOTNOTE)
    }

    pub fn discard_at_start(&self) -> bool {
        self.flags.contains(LineFlags::DISCARD_AT_START)
    }

    pub fn is_rtl(&self) -> bool {
        self.flags.contains(LineFlags::RTL)
    }
}

bitflags! {
    /// Page flags, stored as a single byte in the page-list format.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PageFlags: u8 {
        const NORMAL = 0x01;
        const COVER = 0x02;
        const MOSTLY_RTL = 0x10;
        const FOOTNOTES_MOSTLY_RTL = 0x20;
    }
}

/// A contiguous slice of one footnote's content placed on a page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageFootnoteFragment {
    pub start: i32,
    pub height: i32,
}

impl PageFootnoteFragment {
    pub fn new(start: i32, height: i32) -> Self {
        Self { start, height }
    }

    pub fn end(&self) -> i32 {
        self.start + self.height
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Page {
    pub start: i32,
    /// Main-content height; footnote space is not included.
    pub height: i32,
    pub index: usize,
    pub flags: PageFlags,
    pub flow: u16,
    pub footnotes: Vec<PageFootnoteFragment>,
}

impl Page {
    pub fn new(start: i32, height: i32) -> Self {
        Self {
            start,
            height,
            flags: PageFlags::NORMAL,
            ..Default::default()
        }
    }

    /// A cover page occupies the top of the document and holds no flow content.
    pub fn cover(height: i32) -> Self {
        Self {
            height,
            flags: PageFlags::COVER,
            ..Default::default()
        }
    }

    pub fn end(&self) -> i32 {
        self.start + self.height
    }

    pub fn is_cover(&self) -> bool {
        self.flags.contains(PageFlags::COVER)
    }

    pub fn is_mostly_rtl(&self) -> bool {
        self.flags.contains(PageFlags::MOSTLY_RTL)
    }

    pub fn footnotes_mostly_rtl(&self) -> bool {
        self.flags.contains(PageFlags::FOOTNOTES_MOSTLY_RTL)
    }

    pub fn fragment_count(&self) -> usize {
        self.footnotes.len()
    }

    /// Total height of the footnote fragments placed on this page.
    pub fn footnotes_height(&self) -> i32 {
        self.footnotes.iter().map(|f| f.height).sum()
    }
}

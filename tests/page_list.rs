mod common;

use common::{bounds, context, footnote, stack};
use flowpager::{Error, LineFlags, Page, PageFootnoteFragment, PageList};

fn five_pages() -> PageList {
    let mut pages = PageList::new();
    for i in 0..5 {
        pages.push(Page::new(i * 100, 100));
    }
    pages
}

#[test]
fn nearest_page_at_document_edges() {
    let pages = five_pages();
    for direction in [-1, 0, 1] {
        assert_eq!(pages.find_nearest_page(0, direction), 0);
        assert_eq!(pages.find_nearest_page(10_000, direction), 4);
    }
    assert_eq!(pages.find_nearest_page(-50, 0), 0);
}

#[test]
fn nearest_page_at_page_boundaries() {
    let pages = five_pages();
    assert_eq!(pages.find_nearest_page(300, -1), 3);
    assert_eq!(pages.find_nearest_page(299, 0), 2);
    assert_eq!(pages.find_nearest_page(299, 1), 3);
}

#[test]
fn replace_two_pages_with_one() {
    let mut pages = five_pages();
    pages.replace_pages(200, 200, vec![Page::new(200, 150)], -50);

    assert_eq!(bounds(&pages), vec![(0, 100), (100, 100), (200, 150), (350, 100)]);
    let indices: Vec<usize> = pages.iter().map(|p| p.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
}

#[test]
fn replace_trims_straddling_pages() {
    let mut pages = PageList::new();
    pages.push(Page::new(0, 150));
    pages.push(Page::new(150, 150));
    pages.push(Page::new(300, 150));
    pages.replace_pages(100, 250, vec![Page::new(100, 300)], 50);

    assert_eq!(bounds(&pages), vec![(0, 100), (100, 300), (400, 100)]);
}

#[test]
fn replace_inside_one_tall_page_keeps_its_tail() {
    let mut pages = PageList::new();
    let mut tall = Page::new(0, 500);
    tall.footnotes.push(PageFootnoteFragment::new(900, 20));
    pages.push(tall);
    pages.push(Page::new(500, 100));
    pages.replace_pages(100, 100, vec![Page::new(100, 50)], -50);

    assert_eq!(
        bounds(&pages),
        vec![(0, 100), (100, 50), (150, 300), (450, 100)]
    );
    assert_eq!(pages[0].footnotes.len(), 1);
    assert!(pages[2].footnotes.is_empty());
    let indices: Vec<usize> = pages.iter().map(|p| p.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
}

#[test]
fn replace_with_non_linear_page_sets_flag() {
    let mut pages = five_pages();
    let mut aside = Page::new(100, 100);
    aside.flow = 1;
    pages.replace_pages(100, 100, vec![aside], 0);
    assert_eq!(pages.len(), 5);
    assert!(pages.has_non_linear_flows());
    assert_eq!(pages.first_page_in_flow(1), Some(1));
}

fn paginated() -> PageList {
    let mut ctx = context(300);
    ctx.add_line(0, 100, LineFlags::RTL);
    ctx.add_link("n1");
    stack(&mut ctx, 100, &[120, 120, 500], LineFlags::empty());
    ctx.new_flow(true);
    stack(&mut ctx, 840, &[50, 50], LineFlags::empty());
    footnote(&mut ctx, "n1", 2000, &[40, 40]);
    ctx.finalize().unwrap()
}

#[test]
fn saved_list_loads_back() {
    let pages = paginated();
    assert!(pages.iter().any(|p| !p.footnotes.is_empty()));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.pages");
    pages.save(&path).unwrap();
    let loaded = PageList::load(&path).unwrap();

    assert_eq!(loaded, pages);
    assert!(loaded.has_non_linear_flows());
}

#[test]
fn cache_file_is_framed_by_magic() {
    let bytes = paginated().to_bytes().unwrap();
    assert_eq!(&bytes[..8], b"PageList");
    let tail = bytes.len() - 12;
    assert_eq!(&bytes[tail..tail + 8], b"PageList");
    let crc = u32::from_le_bytes(bytes[tail + 8..].try_into().unwrap());
    assert_eq!(crc, crc32fast::hash(&bytes[8..tail]));
}

#[test]
fn damaged_cache_file_is_rejected() {
    let mut bytes = paginated().to_bytes().unwrap();
    bytes[14] ^= 0x40;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("damaged.pages");
    std::fs::write(&path, &bytes).unwrap();
    assert!(matches!(
        PageList::load(&path),
        Err(Error::ChecksumMismatch { .. })
    ));

    let mut pages = paginated();
    assert!(pages.deserialize(&bytes).is_err());
    assert!(pages.is_empty());
}

#[test]
fn missing_cache_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        PageList::load(&dir.path().join("absent.pages")),
        Err(Error::Io(_))
    ));
}

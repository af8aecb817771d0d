//! Binary page-list cache format.
//!
//! ```text
//! "PageList" | u32 count | count × page | "PageList" | u32 crc32
//! page: u32 start | u16 height | u8 flags | u16 flow | u16 n | n × (u32 start, u32 height)
//! ```
//!
//! Integers are little-endian; the CRC covers the bytes between the two magics.

use std::fs;
use std::io::{self, Cursor, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use memmap2::Mmap;

use crate::error::{Error, Result};
use crate::model::{Page, PageFlags, PageFootnoteFragment};
use crate::page_list::PageList;

const MAGIC: &[u8; 8] = b"PageList";

/// Smallest possible page record, used to bound preallocation.
const MIN_PAGE_RECORD: usize = 4 + 2 + 1 + 2 + 2;

fn clamp_u16(value: i32, what: &str, page: usize) -> u16 {
    match u16::try_from(value) {
        Ok(v) => v,
        Err(_) => {
            log::warn!("Page {page}: {what} {value} does not fit the page-list format, clamped");
            value.clamp(0, i32::from(u16::MAX)) as u16
        }
    }
}

fn clamp_u32(value: i32) -> u32 {
    value.max(0) as u32
}

fn write_page<W: Write>(w: &mut W, page: &Page) -> io::Result<()> {
    w.write_u32::<LittleEndian>(clamp_u32(page.start))?;
    w.write_u16::<LittleEndian>(clamp_u16(page.height, "height", page.index))?;
    w.write_u8(page.flags.bits())?;
    w.write_u16::<LittleEndian>(page.flow)?;
    let count = u16::try_from(page.footnotes.len()).unwrap_or(u16::MAX);
    w.write_u16::<LittleEndian>(count)?;
    for fragment in page.footnotes.iter().take(count as usize) {
        w.write_u32::<LittleEndian>(clamp_u32(fragment.start))?;
        w.write_u32::<LittleEndian>(clamp_u32(fragment.height))?;
    }
    Ok(())
}

fn read_page<R: Read>(r: &mut R, index: usize) -> io::Result<Page> {
    let start = r.read_u32::<LittleEndian>()? as i32;
    let height = i32::from(r.read_u16::<LittleEndian>()?);
    let flags = PageFlags::from_bits_retain(r.read_u8()?);
    let flow = r.read_u16::<LittleEndian>()?;
    let count = r.read_u16::<LittleEndian>()?;
    let mut footnotes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let start = r.read_u32::<LittleEndian>()? as i32;
        let height = r.read_u32::<LittleEndian>()? as i32;
        footnotes.push(PageFootnoteFragment::new(start, height));
    }
    Ok(Page {
        start,
        height,
        index,
        flags,
        flow,
        footnotes,
    })
}

fn truncated(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::Truncated
    } else {
        Error::Io(e)
    }
}

impl PageList {
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        let mut body = Vec::with_capacity(4 + self.len() * 16);
        body.write_u32::<LittleEndian>(self.len() as u32)?;
        for page in self {
            write_page(&mut body, page)?;
        }
        w.write_all(MAGIC)?;
        w.write_all(&body)?;
        w.write_all(MAGIC)?;
        w.write_u32::<LittleEndian>(crc32fast::hash(&body))?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Replace the contents with pages decoded from `buf`.
    ///
    /// The list is cleared first and stays empty when `buf` is rejected.
    pub fn deserialize(&mut self, buf: &[u8]) -> Result<()> {
        self.clear();
        *self = Self::from_bytes(buf)?;
        Ok(())
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        if buf.len() < MAGIC.len() || &buf[..MAGIC.len()] != MAGIC {
            return Err(Error::BadMagic { at: "start" });
        }
        let mut cursor = Cursor::new(&buf[MAGIC.len()..]);
        let count = cursor.read_u32::<LittleEndian>().map_err(truncated)? as usize;
        let mut pages = Vec::with_capacity(count.min(buf.len() / MIN_PAGE_RECORD));
        for index in 0..count {
            pages.push(read_page(&mut cursor, index).map_err(truncated)?);
        }

        let body_end = MAGIC.len() + cursor.position() as usize;
        let tail = &buf[body_end..];
        if tail.len() < MAGIC.len() || &tail[..MAGIC.len()] != MAGIC {
            return Err(Error::BadMagic { at: "end" });
        }
        let mut crc_bytes = &tail[MAGIC.len()..];
        let expected = crc_bytes.read_u32::<LittleEndian>().map_err(truncated)?;
        let found = crc32fast::hash(&buf[MAGIC.len()..body_end]);
        if expected != found {
            return Err(Error::ChecksumMismatch { expected, found });
        }
        Ok(Self::from_pages(pages))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        fs::write(path, bytes)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = fs::File::open(path)?;
        // SAFETY: read-only map that does not outlive this call.
        let map = unsafe { Mmap::map(&file) }?;
        Self::from_bytes(&map)
    }
}

//! Generic B+ tree reader (C3).
//!
//! A B+ tree lives as a contiguous buffer: a 38-byte `BTreeHeader`
//! followed by fixed-size pages numbered from 0. Index pages form the
//! upper levels; all entries live in leaf pages. The cursor descends
//! from the root by following each index page's `previous_page` pointer
//! for `n_levels - 1` hops (this, not a branching search, is how
//! `helpdeco`'s `GetFirstPage` reaches the leftmost leaf), then walks
//! the leaf chain via `next_page` until it reads `-1`.

use crate::error::{Error, Result};
use scroll::{Pread, LE};

pub const BTREE_MAGIC: u16 = 0x293B;
pub const HEADER_SIZE: usize = 38;

#[derive(Debug, Clone)]
pub struct BTreeHeader {
    pub magic: u16,
    pub flags: u16,
    pub page_size: u16,
    pub structure: [u8; 16],
    pub must_be_zero: i16,
    pub page_splits: i16,
    pub root_page: i16,
    pub must_be_neg_one: i16,
    pub total_pages: i16,
    pub n_levels: i16,
    pub total_btree_entries: i32,
}

impl BTreeHeader {
    fn parse(data: &[u8]) -> Result<BTreeHeader> {
        if data.len() < HEADER_SIZE {
            return Err(Error::BufferTooShort(HEADER_SIZE, "BTreeHeader"));
        }
        let mut offset = 0;
        let magic: u16 = data.gread_with(&mut offset, LE)?;
        if magic != BTREE_MAGIC {
            return Err(Error::Malformed(format!(
                "bad B+ tree magic: {:#06x}",
                magic
            )));
        }
        let flags: u16 = data.gread_with(&mut offset, LE)?;
        let page_size: u16 = data.gread_with(&mut offset, LE)?;
        let mut structure = [0u8; 16];
        structure.copy_from_slice(&data[offset..offset + 16]);
        offset += 16;
        let must_be_zero: i16 = data.gread_with(&mut offset, LE)?;
        let page_splits: i16 = data.gread_with(&mut offset, LE)?;
        let root_page: i16 = data.gread_with(&mut offset, LE)?;
        let must_be_neg_one: i16 = data.gread_with(&mut offset, LE)?;
        let total_pages: i16 = data.gread_with(&mut offset, LE)?;
        let n_levels: i16 = data.gread_with(&mut offset, LE)?;
        let total_btree_entries: i32 = data.gread_with(&mut offset, LE)?;
        Ok(BTreeHeader {
            magic,
            flags,
            page_size,
            structure,
            must_be_zero,
            page_splits,
            root_page,
            must_be_neg_one,
            total_pages,
            n_levels,
            total_btree_entries,
        })
    }

    /// The `structure` tag as a lossily-decoded string, used by callers
    /// (e.g. keyword index GID-variant detection) that scan it for
    /// marker characters such as `!`.
    pub fn structure_str(&self) -> String {
        let end = self
            .structure
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.structure.len());
        String::from_utf8_lossy(&self.structure[..end]).into_owned()
    }
}

/// A parsed B+ tree: header plus the raw bytes of every fixed-size page.
pub struct BTree<'a> {
    pub header: BTreeHeader,
    data: &'a [u8],
}

impl<'a> BTree<'a> {
    /// Parse a B+ tree's header and validate its page table fits.
    pub fn open(data: &'a [u8]) -> Result<BTree<'a>> {
        let header = BTreeHeader::parse(data)?;
        Ok(BTree { header, data })
    }

    fn page(&self, index: i16) -> Result<&'a [u8]> {
        if index < 0 || index as usize >= self.header.total_pages as usize {
            return Err(Error::Malformed(format!(
                "B+ tree page index out of range: {}",
                index
            )));
        }
        let page_size = self.header.page_size as usize;
        let start = HEADER_SIZE + index as usize * page_size;
        let end = start + page_size;
        if end > self.data.len() {
            return Err(Error::BufferTooShort(end, "B+ tree page"));
        }
        Ok(&self.data[start..end])
    }

    /// Descend from the root to the leftmost leaf page, returning its
    /// index. Matches `helpdeco`'s `GetFirstPage`.
    fn leftmost_leaf(&self) -> Result<i16> {
        let mut page_index = self.header.root_page;
        for _ in 1..self.header.n_levels {
            let page = self.page(page_index)?;
            if page.len() < 6 {
                return Err(Error::BufferTooShort(6, "B+ tree index page header"));
            }
            let prev_page: i16 = page.pread_with(4, LE)?;
            page_index = prev_page;
        }
        Ok(page_index)
    }

    /// Iterate every leaf page as `(page_bytes, n_entries)`, following
    /// `next_page` until it reads `-1`.
    pub fn leaf_pages(&self) -> Result<Vec<(&'a [u8], i16)>> {
        let mut pages = Vec::new();
        if self.header.total_btree_entries == 0 {
            return Ok(pages);
        }
        let mut page_index = self.leftmost_leaf()?;
        loop {
            let page = self.page(page_index)?;
            if page.len() < 8 {
                return Err(Error::BufferTooShort(8, "B+ tree leaf page header"));
            }
            let n_entries: i16 = page.pread_with(2, LE)?;
            let next_page: i16 = page.pread_with(6, LE)?;
            pages.push((page, n_entries));
            if next_page == -1 {
                break;
            }
            page_index = next_page;
        }
        Ok(pages)
    }

    /// Iterate every leaf entry, delegating entry decoding to `parser`.
    /// `parser` receives `(page_bytes, offset)` and returns
    /// `(entry, new_offset)`; a parser error stops iteration of that
    /// page only (matching spec §4.3's "malformed entries stop
    /// iteration of that page without aborting the whole tree").
    pub fn entries<F, T>(&self, mut parser: F) -> Result<Vec<T>>
    where
        F: FnMut(&'a [u8], usize) -> Result<(T, usize)>,
    {
        let mut out = Vec::new();
        for (page, n_entries) in self.leaf_pages()? {
            let mut offset = 8usize; // skip BTreeNodeHeader
            for _ in 0..n_entries {
                if offset >= page.len() {
                    break;
                }
                match parser(page, offset) {
                    Ok((entry, new_offset)) => {
                        out.push(entry);
                        offset = new_offset;
                    }
                    Err(_) => break,
                }
            }
        }
        Ok(out)
    }
}

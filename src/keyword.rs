//! Keyword indices (C11): the `|xWBTREE` + `|xWDATA` + `|xWMAP` triple
//! loaded per footnote letter (A-Z, a-z), and the `|xKWBTREE` variant
//! system records can declare as keyword indices.
//!
//! Grounded in `original_source`'s `internal_files/xwbtree.py`,
//! `xwdata.py` and `xwmap.py`: the GID-vs-HLP leaf layout fork is
//! treated there as a structural choice (`is_gid_format`), which this
//! module mirrors as [`KeywordLeaf`] rather than stretching one struct
//! over both shapes.

use std::collections::HashMap;

use scroll::{Pread, LE};

use crate::btree::BTree;
use crate::error::{Error, Result};
use crate::internal_file::FileHeader;
use crate::scan::read_stringz;
use crate::system::{decode_text, CodePage};

/// One `|xWBTREE` leaf entry. The GID variant is detected per spec
/// §4.11 by scanning the tree's `structure` tag for `!`.
#[derive(Debug, Clone)]
pub enum KeywordLeaf {
    /// Standard HLP layout: `count` entries live in `|xWDATA` starting
    /// at byte offset `kw_data_offset`.
    Standard { count: i16, kw_data_offset: i32 },
    /// Win95 GID layout: topic offsets (and an unknown `file_number`)
    /// are inline in the `|xWBTREE` leaf itself, no `|xWDATA` needed.
    Gid { records: Vec<(i32, i32)> },
}

/// A loaded keyword index for one footnote letter.
#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
    entries: HashMap<String, KeywordLeaf>,
    /// `|xWDATA`: an array of topic offsets, referenced by
    /// `KeywordLeaf::Standard::kw_data_offset` (a byte offset into this
    /// array, `/4` for the index).
    data: Vec<i32>,
    /// `|xWMAP`: `(first_keyword_number, page_number)` pairs, used by
    /// callers that want to accelerate scrolling; not needed for
    /// `search`.
    map: Vec<(i32, u16)>,
}

impl KeywordIndex {
    /// Parse `|xWBTREE` (or `|xKWBTREE`). `data` is the whole-file
    /// payload bytes (FILEHEADER stripped), per spec §4.5.
    pub fn parse_btree(data: &[u8], codepage: CodePage) -> Result<KeywordIndex> {
        let tree = BTree::open(data)?;
        let is_gid = tree.header.structure_str().contains('!');
        let mut entries = HashMap::new();
        tree.entries(|page, mut offset| {
            let keyword = read_stringz_decoded(page, &mut offset, codepage)?;
            let leaf = if is_gid {
                let size: i32 = page.pread_with(offset, LE)?;
                offset += 4;
                let n = (size.max(0) as usize) / 8;
                let mut records = Vec::with_capacity(n);
                for _ in 0..n {
                    if offset + 8 > page.len() {
                        break;
                    }
                    let file_number: i32 = page.pread_with(offset, LE)?;
                    let topic_offset: i32 = page.pread_with(offset + 4, LE)?;
                    offset += 8;
                    records.push((file_number, topic_offset));
                }
                KeywordLeaf::Gid { records }
            } else {
                let count: i16 = page.pread_with(offset, LE)?;
                offset += 2;
                let kw_data_offset: i32 = page.pread_with(offset, LE)?;
                offset += 4;
                KeywordLeaf::Standard { count, kw_data_offset }
            };
            Ok(((keyword, leaf), offset))
        })
        .map(|pairs| {
            for (k, v) in pairs {
                entries.insert(k, v);
            }
        })?;
        Ok(KeywordIndex {
            entries,
            data: Vec::new(),
            map: Vec::new(),
        })
    }

    /// Parse `|xWDATA`'s flat array of topic offsets.
    pub fn load_data(&mut self, payload: &[u8]) -> Result<()> {
        let mut offsets = Vec::with_capacity(payload.len() / 4);
        let mut offset = 0usize;
        while offset + 4 <= payload.len() {
            let v: i32 = payload.pread_with(offset, LE)?;
            offsets.push(v);
            offset += 4;
        }
        self.data = offsets;
        Ok(())
    }

    /// Parse `|xWMAP`: a `u16` entry count then that many
    /// `{i32 first_keyword_number, u16 page_number}` pairs.
    pub fn load_map(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len() < 2 {
            self.map = Vec::new();
            return Ok(());
        }
        let n_entries: u16 = payload.pread_with(0, LE)?;
        let mut offset = 2usize;
        let mut entries = Vec::with_capacity(n_entries as usize);
        for _ in 0..n_entries {
            if offset + 6 > payload.len() {
                break;
            }
            let first_keyword_number: i32 = payload.pread_with(offset, LE)?;
            let page_number: u16 = payload.pread_with(offset + 4, LE)?;
            offset += 6;
            entries.push((first_keyword_number, page_number));
        }
        self.map = entries;
        Ok(())
    }

    /// `search(keyword) -> list<topic_offset>`: case-sensitive ASCII
    /// lookup (spec §4.11), returning `-1` sentinels for macro-bound
    /// entries unresolved rather than silently dropping them.
    pub fn search(&self, keyword: &str) -> Vec<i32> {
        match self.entries.get(keyword) {
            Some(KeywordLeaf::Gid { records }) => {
                records.iter().map(|(_, topic_offset)| *topic_offset).collect()
            }
            Some(KeywordLeaf::Standard { count, kw_data_offset }) => {
                let start = (*kw_data_offset as usize) / 4;
                let end = (start + *count as usize).min(self.data.len());
                if start > self.data.len() {
                    Vec::new()
                } else {
                    self.data[start..end].to_vec()
                }
            }
            None => Vec::new(),
        }
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn read_stringz_decoded(
    page: &[u8],
    offset: &mut usize,
    codepage: CodePage,
) -> Result<String> {
    // Keywords may contain non-ASCII text (spec §4.6 applies codepage
    // decoding everywhere text is read); `read_stringz` gives the raw
    // bytes back as a lossy str, so decode the NUL-delimited span
    // ourselves to apply the file's actual codec.
    let start = *offset;
    let end = page[start..]
        .iter()
        .position(|&b| b == 0)
        .ok_or(Error::BufferTooShort(start, "keyword STRINGZ"))?
        + start;
    *offset = end + 1;
    Ok(decode_text(&page[start..end], codepage))
}

/// Internal-file naming helpers for the per-letter keyword triple
/// (`|AWBTREE`, `|aWBTREE`, or the `|xKWBTREE` variant).
pub fn btree_name(letter: char, is_kw_index: bool) -> String {
    if is_kw_index {
        format!("|{letter}KWBTREE")
    } else {
        format!("|{letter}WBTREE")
    }
}

pub fn data_name(letter: char) -> String {
    format!("|{letter}WDATA")
}

pub fn map_name(letter: char) -> String {
    format!("|{letter}WMAP")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_standard_tree(entries: &[(&str, i16, i32)]) -> Vec<u8> {
        let page_size: u16 = 1024;
        let mut page = vec![0u8; page_size as usize];
        page[2..4].copy_from_slice(&(entries.len() as i16).to_le_bytes());
        page[4..6].copy_from_slice(&(-1i16).to_le_bytes());
        page[6..8].copy_from_slice(&(-1i16).to_le_bytes());
        let mut offset = 8usize;
        for (kw, count, kw_data_offset) in entries {
            page[offset..offset + kw.len()].copy_from_slice(kw.as_bytes());
            offset += kw.len();
            page[offset] = 0;
            offset += 1;
            page[offset..offset + 2].copy_from_slice(&count.to_le_bytes());
            offset += 2;
            page[offset..offset + 4].copy_from_slice(&kw_data_offset.to_le_bytes());
            offset += 4;
        }

        let mut header = vec![0u8; crate::btree::HEADER_SIZE];
        header[0..2].copy_from_slice(&crate::btree::BTREE_MAGIC.to_le_bytes());
        header[4..6].copy_from_slice(&page_size.to_le_bytes());
        header[30..32].copy_from_slice(&1i16.to_le_bytes());
        header[32..34].copy_from_slice(&1i16.to_le_bytes());
        header[34..38].copy_from_slice(&(entries.len() as i32).to_le_bytes());

        let mut buf = header;
        buf.extend_from_slice(&page);
        buf
    }

    #[test]
    fn standard_search_reads_xwdata_slice() {
        let data = build_standard_tree(&[("alpha", 2, 0), ("beta", 1, 8)]);
        let mut index = KeywordIndex::parse_btree(&data, CodePage::Cp1252).unwrap();
        let mut xwdata = Vec::new();
        for v in [100i32, 200, 300] {
            xwdata.extend_from_slice(&v.to_le_bytes());
        }
        index.load_data(&xwdata).unwrap();
        assert_eq!(index.search("alpha"), vec![100, 200]);
        assert_eq!(index.search("beta"), vec![300]);
        assert_eq!(index.search("missing"), Vec::<i32>::new());
    }

    #[test]
    fn names_follow_the_per_letter_convention() {
        assert_eq!(btree_name('k', false), "|kWBTREE");
        assert_eq!(btree_name('K', true), "|KKWBTREE");
        assert_eq!(data_name('a'), "|aWDATA");
        assert_eq!(map_name('A'), "|AWMAP");
    }
}

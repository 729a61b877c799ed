//! Internal file directory (C4): a B+ tree mapping filename -> offset.
//!
//! Grounded in `archive/mod.rs`'s `Archive { files: HashMap<String, File> }`
//! shape: a magic-checked container exposing name-keyed lookup over a
//! single parsed buffer, adapted from a SysV archive's linear scan to a
//! WinHelp B+ tree walk.

use std::collections::HashMap;

use scroll::{Pread, LE};

use crate::error::Result;
use crate::internal_file::FileHeader;
use crate::scan::read_stringz;

/// The internal filename -> byte offset table at `HelpHeader.directory_start`.
#[derive(Debug, Default)]
pub struct Directory {
    files: HashMap<String, i32>,
}

impl Directory {
    /// Parse the directory from the bytes starting at `directory_start`.
    /// The directory is itself framed by a 9-byte `FILEHEADER`, which is
    /// stripped before the B+ tree (1 KiB pages) is parsed.
    pub fn parse(data: &[u8]) -> Result<Directory> {
        let header = FileHeader::parse(data)?;
        let btree_data = &data[FileHeader::SIZE..FileHeader::SIZE + header.used_space as usize];
        let tree = crate::btree::BTree::open(btree_data)?;
        let entries = tree.entries(|page, mut offset| {
            let name = read_stringz(page, &mut offset)?;
            let file_offset: i32 = page.pread_with(offset, LE)?;
            offset += 4;
            Ok(((name.to_string(), file_offset), offset))
        })?;
        let mut files = HashMap::with_capacity(entries.len());
        for (name, offset) in entries {
            files.insert(name, offset);
        }
        Ok(Directory { files })
    }

    /// Look up an internal file's byte offset by name, e.g. `"|SYSTEM"`.
    pub fn get(&self, name: &str) -> Option<i32> {
        self.files.get(name).copied()
    }

    /// Every internal filename present, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_directory(entries: &[(&str, i32)]) -> Vec<u8> {
        let page_size: u16 = 1024;
        let mut page = vec![0u8; page_size as usize];
        page[2..4].copy_from_slice(&(entries.len() as i16).to_le_bytes());
        page[4..6].copy_from_slice(&(-1i16).to_le_bytes());
        page[6..8].copy_from_slice(&(-1i16).to_le_bytes());
        let mut offset = 8usize;
        for (name, off) in entries {
            page[offset..offset + name.len()].copy_from_slice(name.as_bytes());
            offset += name.len();
            page[offset] = 0;
            offset += 1;
            page[offset..offset + 4].copy_from_slice(&off.to_le_bytes());
            offset += 4;
        }

        let mut btree_header = vec![0u8; crate::btree::HEADER_SIZE];
        btree_header[0..2].copy_from_slice(&crate::btree::BTREE_MAGIC.to_le_bytes());
        btree_header[4..6].copy_from_slice(&page_size.to_le_bytes());
        btree_header[30..32].copy_from_slice(&1i16.to_le_bytes());
        btree_header[32..34].copy_from_slice(&1i16.to_le_bytes());
        btree_header[34..38].copy_from_slice(&(entries.len() as i32).to_le_bytes());

        let mut btree_bytes = btree_header;
        btree_bytes.extend_from_slice(&page);

        let mut file_header = vec![0u8; 9];
        file_header[0..4].copy_from_slice(&(btree_bytes.len() as i32).to_le_bytes());
        file_header[4..8].copy_from_slice(&(btree_bytes.len() as i32).to_le_bytes());
        file_header[8] = 4;

        let mut out = file_header;
        out.extend_from_slice(&btree_bytes);
        out
    }

    #[test]
    fn looks_up_known_files() {
        let data = build_directory(&[("|SYSTEM", 32), ("|TOPIC", 4096)]);
        let dir = Directory::parse(&data).unwrap();
        assert_eq!(dir.get("|SYSTEM"), Some(32));
        assert_eq!(dir.get("|TOPIC"), Some(4096));
        assert_eq!(dir.get("|missing"), None);
        assert_eq!(dir.len(), 2);
    }
}

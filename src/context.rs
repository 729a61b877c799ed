//! Context/hash resolver (C10): context-name hashing, its reverse, a
//! constructive title-based fallback, and `|CONTEXT`/`|TOMAP` topic
//! lookup.
//!
//! Grounded in `original_source`'s `internal_files/context.py` for the
//! forward hash table and the `|CONTEXT` B+ tree leaf layout; its own
//! `reverse_hash` is an ad hoc best-effort stub (falls through to a
//! synthetic `CTX_{hash:08X}` placeholder when it can't find a match),
//! so the reverse/derive algorithms here follow spec §4.10's own
//! description instead (see the Open Question entry in `DESIGN.md`).

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::btree::BTree;
use crate::error::Result;
use crate::internal_file::FileHeader;

/// 256-entry remap table `T`, folding each input byte before the
/// multiply-add step. Verbatim from `context.py`'s `hash_table`.
#[rustfmt::skip]
const HASH_TABLE: [u32; 256] = [
    0x00, 0xD1, 0xD2, 0xD3, 0xD4, 0xD5, 0xD6, 0xD7, 0xD8, 0xD9, 0xDA, 0xDB, 0xDC, 0xDD, 0xDE, 0xDF,
    0xE0, 0xE1, 0xE2, 0xE3, 0xE4, 0xE5, 0xE6, 0xE7, 0xE8, 0xE9, 0xEA, 0xEB, 0xEC, 0xED, 0xEE, 0xEF,
    0xF0, 0x0B, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7, 0xF8, 0xF9, 0xFA, 0xFB, 0xFC, 0xFD, 0x0C, 0xFF,
    0x0A, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F,
    0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1A, 0x1B, 0x1C, 0x1D, 0x1E, 0x1F,
    0x20, 0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28, 0x29, 0x2A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0D,
    0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1A, 0x1B, 0x1C, 0x1D, 0x1E, 0x1F,
    0x20, 0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28, 0x29, 0x2A, 0x2B, 0x2C, 0x2D, 0x2E, 0x2F,
    0x50, 0x51, 0x52, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5A, 0x5B, 0x5C, 0x5D, 0x5E, 0x5F,
    0x60, 0x61, 0x62, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69, 0x6A, 0x6B, 0x6C, 0x6D, 0x6E, 0x6F,
    0x70, 0x71, 0x72, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7A, 0x7B, 0x7C, 0x7D, 0x7E, 0x7F,
    0x80, 0x81, 0x82, 0x83, 0x0B, 0x85, 0x86, 0x87, 0x88, 0x89, 0x8A, 0x8B, 0x8C, 0x8D, 0x8E, 0x8F,
    0x90, 0x91, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9A, 0x9B, 0x9C, 0x9D, 0x9E, 0x9F,
    0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7, 0xA8, 0xA9, 0xAA, 0xAB, 0xAC, 0xAD, 0xAE, 0xAF,
    0xB0, 0xB1, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6, 0xB7, 0xB8, 0xB9, 0xBA, 0xBB, 0xBC, 0xBD, 0xBE, 0xBF,
    0xC0, 0xC1, 0xC2, 0xC3, 0xC4, 0xC5, 0xC6, 0xC7, 0xC8, 0xC9, 0xCA, 0xCB, 0xCC, 0xCD, 0xCE, 0xCF,
];

/// The 64-character legal alphabet for context IDs.
const LEGAL_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_.";

/// Modular inverse of 43 mod 2^32, used to undo one fold step of the
/// hash: `h' = (h - T[c]) * INV43 mod 2^32`.
const INV43: u32 = 799_063_683;

const MAX_CONTEXT_LEN: usize = 14;
/// Bounds the reverse-hash search; the forward hash table aliases many
/// input bytes onto the same code, so more than one single-character
/// predecessor can exist at each step and a naive walk can blow up.
const MAX_DFS_NODES: usize = 200_000;

/// Hash a context name; the empty string hashes to 1.
pub fn hash(name: &str) -> u32 {
    if name.is_empty() {
        return 1;
    }
    let mut h: u32 = 0;
    for &b in name.as_bytes() {
        h = h
            .wrapping_mul(43)
            .wrapping_add(HASH_TABLE[b as usize]);
    }
    h
}

/// Reverse a hash value into a context name that produces it, if one
/// can be found within the search budget. `h == 1` is the empty string;
/// the other two documented fixed points are returned directly.
pub fn reverse_hash(h: u32) -> Option<String> {
    match h {
        1 => return Some(String::new()),
        0xFFFF_FFFF => return Some("21KSYK4".to_string()),
        0x0000_0000 => return Some("21KSYK5".to_string()),
        _ => {}
    }

    // Search by increasing target length (iterative deepening) rather
    // than one unbounded depth-first walk: a plain DFS over a
    // 64-character alphabet spends its whole budget fully exploring the
    // first branch (and its 64^depth descendants) before ever trying a
    // later top-level candidate, so a genuine one- or two-character
    // preimage could starve behind an unrelated longer dead end.
    // Searching each length to exhaustion first guarantees short answers
    // are found cheaply.
    let mut budget = MAX_DFS_NODES;
    for depth in 1..=MAX_CONTEXT_LEN {
        let mut buffer = Vec::with_capacity(depth);
        if let Some(candidate) = dfs(h, &mut buffer, depth, &mut budget) {
            // dfs peels folds back to the accumulator's start value (0,
            // per `hash`'s `let mut h: u32 = 0`), not 1 - the
            // empty-string-hashes-to-1 rule is a separate special case
            // handled above. Verify the forward hash before accepting,
            // as `context.py`'s `reverse_hash` does.
            if hash(&candidate) == h {
                return Some(candidate);
            }
        }
        if budget == 0 {
            break;
        }
    }
    None
}

/// Search for a preimage of exactly `depth` characters, folding `h`
/// backwards one character at a time.
fn dfs(h: u32, buffer: &mut Vec<u8>, depth: usize, budget: &mut usize) -> Option<String> {
    if buffer.len() == depth {
        if h != 0 {
            return None;
        }
        let mut chars: Vec<u8> = buffer.clone();
        chars.reverse();
        return String::from_utf8(chars).ok();
    }
    if *budget == 0 {
        return None;
    }

    for &c in LEGAL_ALPHABET {
        if *budget == 0 {
            return None;
        }
        *budget -= 1;
        let t = HASH_TABLE[c as usize];
        let prev = h.wrapping_sub(t).wrapping_mul(INV43);
        buffer.push(c);
        if let Some(found) = dfs(prev, buffer, depth, budget) {
            return Some(found);
        }
        buffer.pop();
    }
    None
}

/// Context-id prefixes HCRTF commonly generates, tried in order against
/// a title-derived candidate set.
const TITLE_PREFIXES: &[&str] = &[
    "idh_", "helpid_", "IDH_", "HID_", "HIDD_", "IDD_", "ID_", "IDM_",
];

/// Attempt a constructive inverse from a topic's title: filter it to
/// legal ID characters, try a handful of HCRTF-style prefixed/suffixed
/// variants, and return the first whose hash matches `target`.
pub fn derive_from_title(title: &str, target: u32) -> Option<String> {
    let filtered: String = title
        .chars()
        .filter(|c| c.is_ascii() && LEGAL_ALPHABET.contains(&(*c as u8)))
        .collect();
    if filtered.is_empty() {
        return None;
    }

    let mut candidates: Vec<String> = Vec::new();
    candidates.push(filtered.clone());
    for prefix in TITLE_PREFIXES {
        candidates.push(format!("{prefix}{filtered}"));
    }
    for suffix in 1..=9u8 {
        candidates.push(format!("{filtered}_{suffix}"));
    }
    for c in b'A'..=b'Z' {
        candidates.push(format!("{filtered}{}", c as char));
    }

    candidates.into_iter().find(|cand| hash(cand) == target)
}

/// `|CONTEXT`: a `hash_value -> topic_offset` B+ tree (v3.1+).
#[derive(Debug, Clone, Default)]
pub struct ContextTree {
    map: BTreeMap<u32, i32>,
}

impl ContextTree {
    /// `data` is the whole-file-relative `|CONTEXT` payload (FILEHEADER
    /// included), as returned by `internal_file::read_framed`.
    pub fn parse(data: &[u8]) -> Result<ContextTree> {
        let header = FileHeader::parse(data)?;
        let payload = header.payload(data)?;
        let btree = BTree::open(payload)?;
        let entries = btree.entries(|page, mut offset| {
            if offset + 8 > page.len() {
                return Err(crate::error::Error::BufferTooShort(8, "ContextLeafEntry"));
            }
            let hash_value = i32::from_le_bytes([
                page[offset],
                page[offset + 1],
                page[offset + 2],
                page[offset + 3],
            ]);
            let topic_offset = i32::from_le_bytes([
                page[offset + 4],
                page[offset + 5],
                page[offset + 6],
                page[offset + 7],
            ]);
            offset += 8;
            Ok(((hash_value as u32, topic_offset), offset))
        })?;
        Ok(ContextTree {
            map: entries.into_iter().collect(),
        })
    }

    pub fn topic_offset_for_hash(&self, h: u32) -> Option<i32> {
        self.map.get(&h).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// `|TOMAP`: the WinHelp 3.0 direct array of topic positions, indexed
/// by `topic_number - 16` (topic numbering starts at 16; confirmed by
/// reading `tomap.py`'s array-construction loop rather than its
/// ambiguous docstring).
#[derive(Debug, Clone, Default)]
pub struct TopicMap {
    positions: Vec<i32>,
}

impl TopicMap {
    pub fn parse(payload: &[u8]) -> Result<TopicMap> {
        let mut positions = Vec::with_capacity(payload.len() / 4);
        let mut offset = 0usize;
        while offset + 4 <= payload.len() {
            positions.push(i32::from_le_bytes([
                payload[offset],
                payload[offset + 1],
                payload[offset + 2],
                payload[offset + 3],
            ]));
            offset += 4;
        }
        Ok(TopicMap { positions })
    }

    pub fn topic_position(&self, topic_number: i32) -> Option<i32> {
        let index = topic_number.checked_sub(16)?;
        if index < 0 {
            return None;
        }
        self.positions.get(index as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

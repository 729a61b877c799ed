//! Hash/reverse-hash round trips and `|CONTEXT` lookup, exercised as a
//! caller would: hash a name, store it in a tiny `|CONTEXT` tree, then
//! recover a topic offset from it.

use winhelp::btree::{BTREE_MAGIC, HEADER_SIZE};
use winhelp::context::{derive_from_title, hash, reverse_hash, ContextTree};

#[test]
fn known_hash_vectors() {
    // Single-character context names fold through HASH_TABLE once.
    assert_eq!(hash("A"), 0x11);
    assert_eq!(hash("B"), 0x12);
    assert_eq!(hash(""), 1);
}

#[test]
fn reverse_hash_fixed_points() {
    assert_eq!(reverse_hash(1), Some(String::new()));
    assert_eq!(reverse_hash(0xFFFF_FFFF), Some("21KSYK4".to_string()));
    assert_eq!(reverse_hash(0), Some("21KSYK5".to_string()));
}

#[test]
fn reverse_hash_recovers_a_forward_hashed_name() {
    let h = hash("AB");
    let recovered = reverse_hash(h).expect("should find some preimage within budget");
    assert_eq!(hash(&recovered), h, "recovered name must hash back to the same value");
}

#[test]
fn derive_from_title_finds_hcrtf_style_prefix() {
    let target = hash("idh_Welcome");
    let derived = derive_from_title("Welcome", target);
    assert_eq!(derived, Some("idh_Welcome".to_string()));
}

fn build_context_tree(entries: &[(u32, i32)]) -> Vec<u8> {
    let page_size: u16 = 512;
    let mut page = vec![0u8; page_size as usize];
    page[2..4].copy_from_slice(&(entries.len() as i16).to_le_bytes());
    page[4..6].copy_from_slice(&(-1i16).to_le_bytes());
    page[6..8].copy_from_slice(&(-1i16).to_le_bytes());
    let mut offset = 8usize;
    for (h, topic_offset) in entries {
        page[offset..offset + 4].copy_from_slice(&h.to_le_bytes());
        offset += 4;
        page[offset..offset + 4].copy_from_slice(&topic_offset.to_le_bytes());
        offset += 4;
    }

    let mut header = vec![0u8; HEADER_SIZE];
    header[0..2].copy_from_slice(&BTREE_MAGIC.to_le_bytes());
    header[4..6].copy_from_slice(&page_size.to_le_bytes());
    header[30..32].copy_from_slice(&1i16.to_le_bytes());
    header[32..34].copy_from_slice(&1i16.to_le_bytes());
    header[34..38].copy_from_slice(&(entries.len() as i32).to_le_bytes());

    let mut btree_bytes = header;
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
fn context_tree_resolves_hash_to_topic_offset() {
    let welcome_hash = hash("idh_welcome");
    let data = build_context_tree(&[(welcome_hash, 16), (hash("idh_index"), 4096)]);
    let tree = ContextTree::parse(&data).unwrap();
    assert_eq!(tree.topic_offset_for_hash(welcome_hash), Some(16));
    assert_eq!(tree.topic_offset_for_hash(hash("idh_missing")), None);
    assert_eq!(tree.len(), 2);
}

//! Annotation files (C14): `.ANN` sidecar files attached to a topic by
//! WinHelp's "Annotate..." menu command. They reuse the ordinary HLP
//! container (§4.1-§4.5) but carry a different internal-file set:
//! `@VERSION`, `@LINK`, and one `"<topic_offset>!0"` plain-text file per
//! annotated topic.
//!
//! Grounded in `original_source`'s `ann.py`: `VersionFile`'s fixed
//! 6-byte tag, `LinkFile`'s `{topic_offset, unknown1, unknown2}` triple,
//! and `AnnotationTextFile`'s cp1252-with-latin-1-fallback decoding
//! (generalized here to the full `decode_text` codec chain already used
//! by every other text-bearing module, per `SPEC_FULL.md` §C).

use scroll::{Pread, LE};

use crate::directory::Directory;
use crate::error::{Error, Result};
use crate::internal_file::read_payload;
use crate::system::{decode_text, CodePage};

/// Expected `@VERSION` payload, per `ann.py`'s `VersionFile`.
const VERSION_TAG: [u8; 6] = [0x08, 0x62, 0x6D, 0x66, 0x01, 0x00];

/// One `@LINK` entry: which topic an annotation text blob belongs to.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationReference {
    pub topic_offset: i32,
    pub unknown1: i32,
    pub unknown2: i32,
}

/// A parsed `.ANN` file: the annotation text attached to each
/// referenced topic offset, in `@LINK`'s order.
#[derive(Debug, Clone)]
pub struct AnnotationFile {
    pub references: Vec<AnnotationReference>,
    pub texts: Vec<String>,
}

impl AnnotationFile {
    /// Parse a whole `.ANN` file's bytes (the same container shape as
    /// an `.HLP`/`.GID` file; see `helpfile::open`).
    pub fn parse(data: &[u8], codepage: CodePage) -> Result<AnnotationFile> {
        if data.len() < 16 {
            return Err(Error::BufferTooShort(16, "HelpHeader"));
        }
        let magic: u32 = data.pread_with(0, LE)?;
        if magic != 0x0003_5F3F {
            return Err(Error::Malformed(format!(
                "bad HelpHeader magic: {magic:#x}"
            )));
        }
        let directory_start: i32 = data.pread_with(4, LE)?;
        if directory_start < 0 || directory_start as usize >= data.len() {
            return Err(Error::Malformed(
                "HelpHeader.directory_start out of range".into(),
            ));
        }
        let directory = Directory::parse(&data[directory_start as usize..])?;

        let version_offset = directory
            .get("@VERSION")
            .ok_or_else(|| Error::Malformed("annotation file missing @VERSION".into()))?;
        let version = read_payload(data, version_offset as usize)?;
        if version != VERSION_TAG {
            return Err(Error::Malformed(format!(
                "unexpected @VERSION tag: {version:02x?}"
            )));
        }

        let link_offset = directory
            .get("@LINK")
            .ok_or_else(|| Error::Malformed("annotation file missing @LINK".into()))?;
        let link_payload = read_payload(data, link_offset as usize)?;
        let references = parse_link(link_payload)?;

        let mut texts = Vec::with_capacity(references.len());
        for reference in &references {
            let name = format!("{}!0", reference.topic_offset);
            let text = match directory.get(&name) {
                Some(offset) => {
                    let payload = read_payload(data, offset as usize)?;
                    decode_text(payload, codepage)
                }
                None => String::new(),
            };
            texts.push(text);
        }

        Ok(AnnotationFile { references, texts })
    }

    /// The annotation text for a given topic offset, if one exists.
    pub fn text_for_topic(&self, topic_offset: i32) -> Option<&str> {
        self.references
            .iter()
            .position(|r| r.topic_offset == topic_offset)
            .map(|i| self.texts[i].as_str())
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

fn parse_link(data: &[u8]) -> Result<Vec<AnnotationReference>> {
    if data.len() < 2 {
        return Err(Error::BufferTooShort(2, "@LINK count"));
    }
    let count: u16 = data.pread_with(0, LE)?;
    let mut offset = 2usize;
    let mut references = Vec::with_capacity(count as usize);
    for _ in 0..count {
        if offset + 12 > data.len() {
            return Err(Error::BufferTooShort(offset + 12, "@LINK entry"));
        }
        let topic_offset: i32 = data.pread_with(offset, LE)?;
        let unknown1: i32 = data.pread_with(offset + 4, LE)?;
        let unknown2: i32 = data.pread_with(offset + 8, LE)?;
        offset += 12;
        references.push(AnnotationReference {
            topic_offset,
            unknown1,
            unknown2,
        });
    }
    Ok(references)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::btree::{BTREE_MAGIC, HEADER_SIZE};

    fn build_directory_entries(files: &[(&str, Vec<u8>)]) -> Vec<u8> {
        // Lay out each internal file back-to-back after the directory
        // B+ tree, mirroring directory.rs's own test fixture builder.
        let page_size: u16 = 2048;
        let mut cursor = 16 + 9 + HEADER_SIZE as i32 + page_size as i32;
        let mut offsets = Vec::new();
        for (_, payload) in files {
            offsets.push(cursor);
            cursor += 9 + payload.len() as i32;
        }

        let mut page = vec![0u8; page_size as usize];
        page[2..4].copy_from_slice(&(files.len() as i16).to_le_bytes());
        page[4..6].copy_from_slice(&(-1i16).to_le_bytes());
        page[6..8].copy_from_slice(&(-1i16).to_le_bytes());
        let mut offset = 8usize;
        for ((name, _), file_offset) in files.iter().zip(&offsets) {
            page[offset..offset + name.len()].copy_from_slice(name.as_bytes());
            offset += name.len();
            page[offset] = 0;
            offset += 1;
            page[offset..offset + 4].copy_from_slice(&file_offset.to_le_bytes());
            offset += 4;
        }

        let mut header = vec![0u8; HEADER_SIZE];
        header[0..2].copy_from_slice(&BTREE_MAGIC.to_le_bytes());
        header[4..6].copy_from_slice(&page_size.to_le_bytes());
        header[30..32].copy_from_slice(&1i16.to_le_bytes());
        header[32..34].copy_from_slice(&1i16.to_le_bytes());
        header[34..38].copy_from_slice(&(files.len() as i32).to_le_bytes());

        let mut directory_file_header = vec![0u8; 9];
        let btree_len = (header.len() + page.len()) as i32;
        directory_file_header[0..4].copy_from_slice(&btree_len.to_le_bytes());
        directory_file_header[4..8].copy_from_slice(&btree_len.to_le_bytes());
        directory_file_header[8] = 4;

        let mut out = vec![0u8; 16];
        out[0..4].copy_from_slice(&0x00035F3Fu32.to_le_bytes());
        out[4..8].copy_from_slice(&16i32.to_le_bytes());
        out[8..12].copy_from_slice(&0i32.to_le_bytes());
        let total_len = 16 + directory_file_header.len() + header.len() + page.len();
        out[12..16].copy_from_slice(&(total_len as i32).to_le_bytes());

        out.extend_from_slice(&directory_file_header);
        out.extend_from_slice(&header);
        out.extend_from_slice(&page);

        for (_, payload) in files {
            let mut fh = vec![0u8; 9];
            fh[0..4].copy_from_slice(&(payload.len() as i32).to_le_bytes());
            fh[4..8].copy_from_slice(&(payload.len() as i32).to_le_bytes());
            fh[8] = 4;
            out.extend_from_slice(&fh);
            out.extend_from_slice(payload);
        }

        out
    }

    #[test]
    fn parses_version_link_and_text() {
        let mut link_payload = Vec::new();
        link_payload.extend_from_slice(&1u16.to_le_bytes());
        link_payload.extend_from_slice(&16i32.to_le_bytes());
        link_payload.extend_from_slice(&0i32.to_le_bytes());
        link_payload.extend_from_slice(&0i32.to_le_bytes());

        let files: Vec<(&str, Vec<u8>)> = vec![
            ("@VERSION", VERSION_TAG.to_vec()),
            ("@LINK", link_payload),
            ("16!0", b"Looks fine to me.".to_vec()),
        ];
        let data = build_directory_entries(&files);

        let ann = AnnotationFile::parse(&data, CodePage::Cp1252).unwrap();
        assert_eq!(ann.len(), 1);
        assert_eq!(ann.references[0].topic_offset, 16);
        assert_eq!(ann.text_for_topic(16), Some("Looks fine to me."));
        assert_eq!(ann.text_for_topic(99), None);
    }

    #[test]
    fn rejects_wrong_version_tag() {
        let files: Vec<(&str, Vec<u8>)> = vec![
            ("@VERSION", vec![0, 0, 0, 0, 0, 0]),
            ("@LINK", 0u16.to_le_bytes().to_vec()),
        ];
        let data = build_directory_entries(&files);
        assert!(AnnotationFile::parse(&data, CodePage::Cp1252).is_err());
    }
}

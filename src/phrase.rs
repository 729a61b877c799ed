//! Phrase tables (C7): `|Phrases` (v3.1) and `|PhrIndex`+`|PhrImage`
//! (v4.0 Hall/MVB).
//!
//! Grounded in `original_source`'s `internal_files/phrase.py` for the
//! v3.1 path; the v4.0 bit-packed index is specified by spec §4.7 only
//! (no Python reference was needed once the table of record sizes was
//! fixed).

use scroll::{Pread, LE};

use crate::compress::{self, Method};
use crate::error::{Error, Result};
use crate::system::CodePage;

/// A loaded phrase table: an ordered list of phrase strings, indexable
/// by phrase number.
#[derive(Debug, Clone, Default)]
pub struct PhraseTable {
    phrases: Vec<String>,
}

impl PhraseTable {
    pub fn get(&self, index: usize) -> Option<&str> {
        self.phrases.get(index).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.phrases
    }

    /// Parse the v3.1 `|Phrases` file. `before_31` selects the
    /// uncompressed-offsets/uncompressed-data WinHelp 3.0 layout versus
    /// the LZ77-compressed WinHelp 3.1+ layout.
    pub fn parse_v31(data: &[u8], before_31: bool, codepage: CodePage) -> Result<PhraseTable> {
        if data.len() < 6 {
            return Ok(PhraseTable::default());
        }
        let mut offset = 0usize;
        let mut phrase_count: u16 = data.pread_with(offset, LE)?;
        offset += 2;

        // VC4.0/MSDEV variant: phrase_count == 0x0800 flags a re-read.
        if phrase_count == 0x0800 {
            if offset + 2 > data.len() {
                return Ok(PhraseTable::default());
            }
            phrase_count = data.pread_with(offset, LE)?;
            offset += 2;
        }

        if offset + 2 > data.len() {
            return Ok(PhraseTable::default());
        }
        let magic: u16 = data.pread_with(offset, LE)?;
        offset += 2;
        if magic != 0x0100 {
            return Ok(PhraseTable::default());
        }
        if phrase_count == 0 {
            return Ok(PhraseTable::default());
        }

        let phrase_offsets_size = (phrase_count as usize + 1) * 2;
        let prologue_extra = if before_31 {
            0
        } else {
            if offset + 4 > data.len() {
                return Ok(PhraseTable::default());
            }
            offset += 4; // decompressed_size, unused directly
            4
        };
        let phrase_data_start = offset + phrase_offsets_size;
        if phrase_data_start > data.len() {
            return Err(Error::BufferTooShort(phrase_data_start, "phrase offsets"));
        }
        let base_offset = phrase_offsets_size + prologue_extra;

        let mut offsets = Vec::with_capacity(phrase_count as usize + 1);
        let mut cur = offset;
        for _ in 0..=phrase_count {
            if cur + 2 > data.len() {
                return Ok(PhraseTable::default());
            }
            let raw: u16 = data.pread_with(cur, LE)?;
            cur += 2;
            offsets.push(raw as i64 - base_offset as i64);
        }

        let raw_phrase_data = &data[phrase_data_start..];
        let phrase_data = if before_31 {
            raw_phrase_data.to_vec()
        } else {
            compress::decompress(Method::Lz77, raw_phrase_data)?
        };

        let mut phrases = Vec::with_capacity(phrase_count as usize);
        for i in 0..phrase_count as usize {
            let start = offsets[i];
            let end = offsets[i + 1];
            if start >= 0
                && end >= start
                && (end as usize) <= phrase_data.len()
                && (start as usize) < phrase_data.len().max(1)
            {
                let bytes = &phrase_data[start as usize..end as usize];
                phrases.push(crate::system::decode_text(bytes, codepage));
            } else {
                phrases.push(String::new());
            }
        }

        Ok(PhraseTable { phrases })
    }

    /// Parse the v4.0 (Hall/MVB) `|PhrIndex` + `|PhrImage` pair.
    ///
    /// `|PhrIndex` carries a 30-byte header followed by a bit-packed
    /// index of phrase offsets, each `bits` wide; `|PhrImage` carries
    /// the phrase bytes, LZ77-compressed when its two size fields
    /// differ.
    pub fn parse_v40(phr_index: &[u8], phr_image: &[u8], codepage: CodePage) -> Result<PhraseTable> {
        if phr_index.len() < 30 {
            return Err(Error::BufferTooShort(30, "PhrIndexHeader"));
        }
        let entries: u32 = phr_index.pread_with(4, LE)?;
        let phr_image_size: u32 = phr_index.pread_with(12, LE)?;
        let phr_image_compressed_size: u32 = phr_index.pread_with(16, LE)?;
        let bits_and_unknown: u16 = phr_index.pread_with(22, LE)?;
        let bits = (bits_and_unknown & 0x0F) as u32;

        let image = if phr_image_compressed_size != phr_image_size {
            compress::decompress(Method::Lz77, phr_image)?
        } else {
            phr_image.to_vec()
        };

        let bitstream = &phr_index[30..];
        let mut reader = BitReader::new(bitstream);
        let mut offsets = Vec::with_capacity(entries as usize + 1);
        for _ in 0..=entries {
            offsets.push(reader.read(bits)? as usize);
        }

        let mut phrases = Vec::with_capacity(entries as usize);
        for i in 0..entries as usize {
            let start = offsets[i];
            let end = offsets.get(i + 1).copied().unwrap_or(image.len());
            if start <= end && end <= image.len() {
                phrases.push(crate::system::decode_text(&image[start..end], codepage));
            } else {
                phrases.push(String::new());
            }
        }
        Ok(PhraseTable { phrases })
    }
}

/// A little-endian, LSB-first bit reader over a byte slice, used for
/// `|PhrIndex`'s bit-packed offset table.
struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        BitReader { data, bit_pos: 0 }
    }

    fn read(&mut self, bits: u32) -> Result<u32> {
        let mut value: u32 = 0;
        for i in 0..bits {
            let byte_index = self.bit_pos / 8;
            let bit_index = self.bit_pos % 8;
            if byte_index >= self.data.len() {
                return Err(Error::BufferTooShort(byte_index + 1, "PhrIndex bitstream"));
            }
            let bit = (self.data[byte_index] >> bit_index) & 1;
            value |= (bit as u32) << i;
            self.bit_pos += 1;
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_v31_table(phrases: &[&str], before_31: bool) -> Vec<u8> {
        let count = phrases.len() as u16;
        let mut phrase_data = Vec::new();
        let mut offsets = vec![0u16];
        for p in phrases {
            phrase_data.extend_from_slice(p.as_bytes());
            offsets.push(phrase_data.len() as u16);
        }

        let mut body = count.to_le_bytes().to_vec();
        body.extend_from_slice(&0x0100u16.to_le_bytes());
        let prologue_extra = if before_31 {
            0
        } else {
            body.extend_from_slice(&(phrase_data.len() as u32).to_le_bytes());
            4
        };
        let base = (offsets.len() * 2) + prologue_extra;
        for off in &offsets {
            body.extend_from_slice(&(*off as u16 + base as u16).to_le_bytes());
        }
        if before_31 {
            body.extend_from_slice(&phrase_data);
        } else {
            // compress with identity-equivalent LZ77: encode as all-literal blocks
            body.extend_from_slice(&lz77_encode_literal(&phrase_data));
        }
        body
    }

    fn lz77_encode_literal(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        for chunk in data.chunks(8) {
            out.push(0u8); // control byte: all literal
            out.extend_from_slice(chunk);
        }
        out
    }

    #[test]
    fn parses_v30_uncompressed() {
        let data = build_v31_table(&["the", "and", "for"], true);
        let table = PhraseTable::parse_v31(&data, true, CodePage::Cp1252).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(0), Some("the"));
        assert_eq!(table.get(2), Some("for"));
    }

    #[test]
    fn parses_v31_compressed() {
        let data = build_v31_table(&["alpha", "beta"], false);
        let table = PhraseTable::parse_v31(&data, false, CodePage::Cp1252).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0), Some("alpha"));
        assert_eq!(table.get(1), Some("beta"));
    }

    #[test]
    fn msdev_variant_reads_real_count() {
        let mut data = 0x0800u16.to_le_bytes().to_vec();
        data.extend_from_slice(&0u16.to_le_bytes()); // real count = 0 -> empty
        let table = PhraseTable::parse_v31(&data, true, CodePage::Cp1252).unwrap();
        assert!(table.is_empty());
    }
}

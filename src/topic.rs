//! Topic decoder (C8): walks `|TOPIC`'s fixed-size block chain, follows
//! the `TopicLink` chain inside each block, and dispatches display/table
//! records to the rich-text reassembler (§4.9).
//!
//! Grounded in `original_source`'s `internal_files/topic.py`:
//! `_parse_blocks`/`_next_topic_offset` for the block/link walk,
//! `_parse_table_content`/`_parse_table_cells_from_text` for §4.9's table
//! format. The Windows 3.0 `0x01` display record uses a distinct, much
//! smaller command set than v3.1+'s `0x80`-family (see `_parse_text_content`
//! in the reference); rather than stretching [`crate::richtext::parse_display`]
//! to cover both, v3.0 gets its own tiny reassembler below (see `DESIGN.md`).

use crate::compress::{self, Method};
use crate::error::{Error, Result};
use crate::options::ParseOptions;
use crate::phrase::PhraseTable;
use crate::richtext::{self, HotspotMapping, ParagraphInfo, TextSpan};
use crate::scan::{scan_int, scan_long, scan_word};
use crate::system::{decode_text, CodePage, SystemHeader};

const TOPIC_BLOCK_HEADER_SIZE: usize = 12;
const TOPIC_LINK_SIZE: usize = 21;

#[derive(Debug, Clone, Copy)]
pub struct TopicBlockHeader {
    pub last_topic_link: i32,
    pub first_topic_link: i32,
    pub last_topic_header: i32,
}

impl TopicBlockHeader {
    fn parse(data: &[u8]) -> Result<TopicBlockHeader> {
        if data.len() < TOPIC_BLOCK_HEADER_SIZE {
            return Err(Error::BufferTooShort(TOPIC_BLOCK_HEADER_SIZE, "TopicBlockHeader"));
        }
        Ok(TopicBlockHeader {
            last_topic_link: i32::from_le_bytes([data[0], data[1], data[2], data[3]]),
            first_topic_link: i32::from_le_bytes([data[4], data[5], data[6], data[7]]),
            last_topic_header: i32::from_le_bytes([data[8], data[9], data[10], data[11]]),
        })
    }
}

/// A 21-byte `TOPICLINK`, identical in size across versions (only the
/// field interpretation of `next_block` differs; see [`parse_topics`]).
#[derive(Debug, Clone, Copy)]
pub struct TopicLink {
    pub block_size: i32,
    pub data_len2: i32,
    pub prev_block: i32,
    pub next_block: i32,
    pub data_len1: i32,
    pub record_type: u8,
}

impl TopicLink {
    fn parse(data: &[u8]) -> Result<TopicLink> {
        if data.len() < TOPIC_LINK_SIZE {
            return Err(Error::BufferTooShort(TOPIC_LINK_SIZE, "TopicLink"));
        }
        Ok(TopicLink {
            block_size: i32::from_le_bytes([data[0], data[1], data[2], data[3]]),
            data_len2: i32::from_le_bytes([data[4], data[5], data[6], data[7]]),
            prev_block: i32::from_le_bytes([data[8], data[9], data[10], data[11]]),
            next_block: i32::from_le_bytes([data[12], data[13], data[14], data[15]]),
            data_len1: i32::from_le_bytes([data[16], data[17], data[18], data[19]]),
            record_type: data[20],
        })
    }
}

/// The WinHelp 3.1+ topic header (record type `0x02`'s LinkData1, 28
/// bytes): `<lllllll>`.
#[derive(Debug, Clone, Copy)]
pub struct TopicHeader {
    pub block_size: i32,
    pub browse_bck: i32,
    pub browse_for: i32,
    pub topic_num: i32,
    pub non_scroll: i32,
    pub scroll: i32,
    pub next_topic: i32,
}

impl TopicHeader {
    fn parse(data: &[u8]) -> Option<TopicHeader> {
        if data.len() < 28 {
            return None;
        }
        let field = |i: usize| i32::from_le_bytes([data[i], data[i + 1], data[i + 2], data[i + 3]]);
        Some(TopicHeader {
            block_size: field(0),
            browse_bck: field(4),
            browse_for: field(8),
            topic_num: field(12),
            non_scroll: field(16),
            scroll: field(20),
            next_topic: field(24),
        })
    }
}

/// The WinHelp 3.0 topic header (record type `0x01`'s predecessor, 12
/// bytes): `<lhhhh>`.
#[derive(Debug, Clone, Copy)]
pub struct TopicHeader30 {
    pub block_size: i32,
    pub prev_topic_num: i16,
    pub unused1: i16,
    pub next_topic_num: i16,
    pub unused2: i16,
}

impl TopicHeader30 {
    fn parse(data: &[u8]) -> Option<TopicHeader30> {
        if data.len() < 12 {
            return None;
        }
        Some(TopicHeader30 {
            block_size: i32::from_le_bytes([data[0], data[1], data[2], data[3]]),
            prev_topic_num: i16::from_le_bytes([data[4], data[5]]),
            unused1: i16::from_le_bytes([data[6], data[7]]),
            next_topic_num: i16::from_le_bytes([data[8], data[9]]),
            unused2: i16::from_le_bytes([data[10], data[11]]),
        })
    }
}

#[derive(Debug, Clone)]
pub struct TableCell {
    pub spans: Vec<TextSpan>,
}

#[derive(Debug, Clone, Default)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone)]
pub struct Table {
    pub columns: usize,
    pub table_type: u8,
    pub column_widths: Vec<i16>,
    pub column_gaps: Vec<i16>,
    pub rows: Vec<TableRow>,
}

/// One reassembled topic: everything between one `0x02` TopicHeader
/// record and the next (or end of file).
#[derive(Debug, Clone, Default)]
pub struct ParsedTopic {
    pub topic_number: Option<i32>,
    pub browse_bck: Option<i32>,
    pub browse_for: Option<i32>,
    pub non_scroll: Option<i32>,
    pub next_topic: Option<i32>,
    /// File offset (`TOPICPOS`) of this topic's `0x02` TopicHeader link.
    pub topic_offset: i64,
    pub spans: Vec<TextSpan>,
    pub hotspots: Vec<HotspotMapping>,
    pub tables: Vec<Table>,
}

impl ParsedTopic {
    fn new(topic_offset: i64) -> ParsedTopic {
        ParsedTopic {
            topic_offset,
            ..Default::default()
        }
    }

    /// Concatenate every span's decoded text in reassembly order,
    /// followed by each table's cell text row-major. Deterministic for
    /// a given `ParsedTopic`, so re-parsing the same `|TOPIC` bytes
    /// yields byte-identical output (spec §8 property 5).
    pub fn get_plain_text(&self) -> String {
        let mut out = String::new();
        for span in &self.spans {
            out.push_str(&span.text);
        }
        for table in &self.tables {
            for row in &table.rows {
                for cell in &row.cells {
                    for span in &cell.spans {
                        out.push_str(&span.text);
                    }
                }
            }
        }
        out
    }
}

/// Everything `parse_topics` needs beyond the raw `|TOPIC` payload: the
/// version/compression facts from `|SYSTEM`, and the phrase table
/// appropriate to the file's phrase-compression scheme (`|Phrases` for
/// v3.1, `|PhrIndex`+`|PhrImage`/Hall for v4.0 — never both).
pub struct TopicContext<'a> {
    pub before_31: bool,
    pub block_size: usize,
    pub method: Method,
    pub codepage: CodePage,
    pub phrases: Option<&'a PhraseTable>,
    pub options: &'a ParseOptions,
}

impl<'a> TopicContext<'a> {
    pub fn from_system_header(
        header: &SystemHeader,
        codepage: CodePage,
        phrases: Option<&'a PhraseTable>,
        options: &'a ParseOptions,
    ) -> TopicContext<'a> {
        // `_next_topic_offset`'s own version gate is `minor < 16`, distinct
        // from `SystemHeader::is_pre_31`'s `minor <= 16` used for |SYSTEM
        // record-vs-title-only framing; both are grounded, just at
        // different thresholds (see DESIGN.md).
        if header.minor < 16 {
            TopicContext {
                before_31: true,
                block_size: 2048,
                method: Method::Identity,
                codepage,
                phrases,
                options,
            }
        } else {
            let tc = header.topic_compression();
            TopicContext {
                before_31: false,
                block_size: tc.block_size,
                method: tc.method,
                codepage,
                phrases,
                options,
            }
        }
    }
}

/// Walk every topic block in `|TOPIC`'s payload and reassemble topics.
pub fn parse_topics(topic_data: &[u8], ctx: &TopicContext) -> Result<Vec<ParsedTopic>> {
    let mut topics: Vec<ParsedTopic> = Vec::new();
    let mut current: Option<ParsedTopic> = None;

    let mut file_offset = 0usize;
    let mut topic_pos = TOPIC_BLOCK_HEADER_SIZE as i64;

    while file_offset + TOPIC_BLOCK_HEADER_SIZE <= topic_data.len() {
        let _block_header = TopicBlockHeader::parse(&topic_data[file_offset..])?;
        let raw_start = file_offset + TOPIC_BLOCK_HEADER_SIZE;
        let raw_end = (file_offset + ctx.block_size).min(topic_data.len());
        if raw_start > raw_end {
            break;
        }
        let raw_block = &topic_data[raw_start..raw_end];
        let block_data = if ctx.before_31 || ctx.method == Method::Identity {
            raw_block.to_vec()
        } else {
            compress::decompress(ctx.method, raw_block)?
        };

        parse_links(&block_data, topic_pos, ctx, &mut topics, &mut current)?;

        file_offset += ctx.block_size;
        topic_pos = file_offset as i64 + TOPIC_BLOCK_HEADER_SIZE as i64;
    }

    if let Some(topic) = current.take() {
        topics.push(topic);
    }

    Ok(topics)
}

fn parse_links(
    block_data: &[u8],
    topic_pos: i64,
    ctx: &TopicContext,
    topics: &mut Vec<ParsedTopic>,
    current: &mut Option<ParsedTopic>,
) -> Result<()> {
    let mut offset = 0usize;
    loop {
        if offset + TOPIC_LINK_SIZE > block_data.len() {
            break;
        }
        let link = TopicLink::parse(&block_data[offset..])?;
        if link.block_size <= 0 || link.data_len1 < TOPIC_LINK_SIZE as i32 || link.data_len1 > link.block_size {
            break;
        }

        let linkdata1_size = (link.data_len1 - TOPIC_LINK_SIZE as i32) as usize;
        let linkdata2_size = (link.block_size - link.data_len1) as usize;
        let data1_start = offset + TOPIC_LINK_SIZE;
        let data1_end = data1_start + linkdata1_size;
        let data2_start = data1_end;
        let data2_end = offset + link.block_size as usize;
        if data1_end > block_data.len() || data2_end > block_data.len() {
            break;
        }
        let link_data1 = &block_data[data1_start..data1_end];
        let link_data2 = &block_data[data2_start..data2_end];

        let link_topic_pos = topic_pos + offset as i64;

        match link.record_type {
            0x02 => {
                if let Some(topic) = current.take() {
                    topics.push(topic);
                }
                let mut topic = ParsedTopic::new(link_topic_pos);
                if ctx.before_31 {
                    if let Some(h) = TopicHeader30::parse(link_data1) {
                        topic.topic_number = Some(h.prev_topic_num as i32);
                        topic.next_topic = Some(h.next_topic_num as i32);
                    }
                } else if let Some(h) = TopicHeader::parse(link_data1) {
                    topic.topic_number = Some(h.topic_num);
                    topic.browse_bck = Some(h.browse_bck);
                    topic.browse_for = Some(h.browse_for);
                    topic.non_scroll = Some(h.non_scroll);
                    topic.next_topic = Some(h.next_topic);
                }
                *current = Some(topic);
            }
            0x20 => {
                let (_info, fmt_offset) = ParagraphInfo::parse(link_data1)?;
                let fmt = &link_data1[fmt_offset..];
                let text = decompress_link_data2(link_data2, link.data_len2, link.block_size, link.data_len1, ctx);
                let (mut spans, mut hotspots) =
                    richtext::parse_display(fmt, &text, ctx.codepage, ctx.options)?;
                let topic = current.get_or_insert_with(|| ParsedTopic::new(link_topic_pos));
                let base = topic.spans.len();
                for h in &mut hotspots {
                    h.span_index += base;
                }
                topic.spans.append(&mut spans);
                topic.hotspots.append(&mut hotspots);
            }
            0x01 => {
                let _info = ParagraphInfo::parse_v30(link_data1)?;
                let text = decompress_link_data2(link_data2, link.data_len2, link.block_size, link.data_len1, ctx);
                let (mut spans, mut hotspots) = parse_display_v30(&text, ctx.codepage);
                let topic = current.get_or_insert_with(|| ParsedTopic::new(link_topic_pos));
                let base = topic.spans.len();
                for h in &mut hotspots {
                    h.span_index += base;
                }
                topic.spans.append(&mut spans);
                topic.hotspots.append(&mut hotspots);
            }
            0x23 => {
                let text = decompress_link_data2(link_data2, link.data_len2, link.block_size, link.data_len1, ctx);
                if let Some(table) = parse_table(link_data1, &text, ctx) {
                    let topic = current.get_or_insert_with(|| ParsedTopic::new(link_topic_pos));
                    topic.tables.push(table);
                }
            }
            other => {
                if !ctx.options.is_permissive() {
                    return Err(Error::UnknownRecordType(other));
                }
            }
        }

        if link.block_size == 0 || link.next_block <= 0 {
            break;
        }

        if ctx.before_31 {
            offset += link.next_block as usize;
        } else {
            // next_block is an absolute TOPICPOS; the block-relative offset
            // is measured from the block's own start (topic_pos), not from
            // this link's position within the block.
            let relative = link.next_block as i64 - topic_pos;
            if relative < 0 || relative as usize >= block_data.len() {
                break;
            }
            offset = relative as usize;
        }
    }
    Ok(())
}

/// Decompress LinkData2 per `TopicPhraseRead`: if it already fits in the
/// space left over after LinkData1, it's stored uncompressed; otherwise
/// it was phrase-compressed (old-style `|Phrases`, or Hall for
/// `|PhrIndex`+`|PhrImage` — same table shape either way once loaded).
fn decompress_link_data2(
    data: &[u8],
    data_len2: i32,
    block_size: i32,
    data_len1: i32,
    ctx: &TopicContext,
) -> Vec<u8> {
    let len2 = data_len2.max(0) as usize;
    if data_len2 <= block_size - data_len1 {
        return data[..len2.min(data.len())].to_vec();
    }
    match ctx.phrases {
        Some(phrases) => compress::phrase_decompress(data, phrases.as_slice()),
        None => data[..len2.min(data.len())].to_vec(),
    }
}

/// The Windows 3.0 display record's command set: a handful of
/// single-byte codes, much smaller than v3.1+'s `0x80`-family (there is
/// no phrase compression, no embedded images, no external jumps in the
/// WinHelp 3.0 format).
fn parse_display_v30(text: &[u8], codepage: CodePage) -> (Vec<TextSpan>, Vec<HotspotMapping>) {
    let mut spans = Vec::new();
    let hotspots = Vec::new();
    let mut current = Vec::new();
    let mut font: Option<i16> = None;

    let flush = |current: &mut Vec<u8>, font: Option<i16>, spans: &mut Vec<TextSpan>| {
        if current.is_empty() {
            return;
        }
        spans.push(TextSpan {
            text: decode_text(current, codepage),
            font_number: font,
            embedded_image: None,
        });
        current.clear();
    };

    let mut i = 0usize;
    while i < text.len() {
        let b = text[i];
        match b {
            0x00 => {
                i += 1;
            }
            0x01 => {
                if i + 1 < text.len() {
                    flush(&mut current, font, &mut spans);
                    font = Some(text[i + 1] as i16);
                    i += 2;
                } else {
                    i += 1;
                }
            }
            0x02 => {
                current.extend_from_slice(b"\n");
                i += 1;
            }
            0x03 => {
                current.extend_from_slice(b"\n\n");
                i += 1;
            }
            0x04 => {
                current.extend_from_slice(b"\t");
                i += 1;
            }
            0x05 => {
                flush(&mut current, font, &mut spans);
                i += 1;
            }
            _ => {
                current.push(b);
                i += 1;
            }
        }
    }
    flush(&mut current, font, &mut spans);
    (spans, hotspots)
}

/// Parse a `0x23` table record: column definitions from LinkData1
/// (after the ParagraphInfo prefix), cell text from the already
/// phrase-decompressed LinkData2, split on `0x82` cell/row delimiters.
fn parse_table(link_data1: &[u8], text: &[u8], ctx: &TopicContext) -> Option<Table> {
    let mut offset = 0usize;
    let _expanded_size = scan_long(link_data1, &mut offset).ok()?;
    let _topic_offset_increment = scan_word(link_data1, &mut offset).ok()?;
    if offset >= link_data1.len() {
        return None;
    }
    let cols = link_data1[offset] as usize;
    offset += 1;
    if offset >= link_data1.len() {
        return None;
    }
    let table_type = link_data1[offset];
    offset += 1;

    if matches!(table_type, 0 | 2) {
        if offset + 2 <= link_data1.len() {
            offset += 2; // min_width, unused downstream
        }
    }

    let mut column_widths = Vec::with_capacity(cols);
    let mut column_gaps = Vec::with_capacity(cols);
    for _ in 0..cols {
        if offset + 4 > link_data1.len() {
            break;
        }
        let width = i16::from_le_bytes([link_data1[offset], link_data1[offset + 1]]);
        let gap = i16::from_le_bytes([link_data1[offset + 2], link_data1[offset + 3]]);
        column_widths.push(width);
        column_gaps.push(gap);
        offset += 4;
    }

    // Per-column header + paragraph-info blocks precede the cell text;
    // these are skipped rather than retained since cell formatting is
    // not modeled (see module docs).
    skip_column_headers(link_data1, &mut offset);

    let rows = parse_table_cells(text, ctx.codepage);
    if rows.is_empty() {
        return None;
    }

    Some(Table {
        columns: cols,
        table_type,
        column_widths,
        column_gaps,
        rows,
    })
}

fn skip_column_headers(data: &[u8], offset: &mut usize) {
    loop {
        if *offset + 2 > data.len() {
            return;
        }
        let terminator = i16::from_le_bytes([data[*offset], data[*offset + 1]]);
        if terminator == -1 {
            *offset += 2;
            return;
        }
        if *offset + 5 > data.len() {
            return;
        }
        *offset += 5; // column_number:i16, flags:u16, cell_id:u8
        if *offset + 2 > data.len() {
            return;
        }
        let para_bits = u16::from_le_bytes([data[*offset], data[*offset + 1]]);
        *offset += 2;
        let skip_scan_long = |offset: &mut usize| {
            let _ = scan_long(data, offset);
        };
        let skip_scan_int = |offset: &mut usize| {
            let _ = scan_int(data, offset);
        };
        if para_bits & 0x0001 != 0 {
            skip_scan_long(offset);
        }
        for bit in [0x0002u16, 0x0004, 0x0008, 0x0010, 0x0020, 0x0040] {
            if para_bits & bit != 0 {
                skip_scan_int(offset);
            }
        }
        if para_bits & 0x0100 != 0 {
            if *offset >= data.len() {
                return;
            }
            *offset += 1;
            skip_scan_int(offset);
        }
        if para_bits & 0x0200 != 0 {
            let count = match scan_word(data, offset) {
                Ok(c) => c,
                Err(_) => return,
            };
            for _ in 0..count {
                let tab = match scan_word(data, offset) {
                    Ok(t) => t,
                    Err(_) => return,
                };
                if tab & 0x4000 != 0 {
                    let _ = scan_word(data, offset);
                }
            }
        }
    }
}

/// Split a table's decompressed text stream on `0x82` delimiters into
/// rows of cells, each cell kept as a single plain text span (the
/// reference implementation this is grounded on does not further parse
/// formatting commands within a cell; see module docs).
fn parse_table_cells(text: &[u8], codepage: CodePage) -> Vec<TableRow> {
    let mut rows = Vec::new();
    let mut current_row = TableRow::default();
    let mut cell_bytes = Vec::new();
    let mut last_col: i16 = -1;

    let mut flush_cell = |cell_bytes: &mut Vec<u8>, row: &mut TableRow| {
        if !cell_bytes.is_empty() {
            row.cells.push(TableCell {
                spans: vec![TextSpan {
                    text: decode_text(cell_bytes, codepage),
                    font_number: None,
                    embedded_image: None,
                }],
            });
            cell_bytes.clear();
        }
    };

    let mut i = 0usize;
    while i < text.len() {
        let b = text[i];
        if b == 0x82 && i + 4 <= text.len() && text[i + 1] != 0xFF {
            let col_indicator = i16::from_le_bytes([text[i + 2], text[i + 3]]);
            if col_indicator == -1 {
                flush_cell(&mut cell_bytes, &mut current_row);
                if !current_row.cells.is_empty() {
                    rows.push(core::mem::take(&mut current_row));
                }
                last_col = -1;
            } else if col_indicator == last_col {
                cell_bytes.extend_from_slice(b"\n");
            } else {
                flush_cell(&mut cell_bytes, &mut current_row);
                last_col = col_indicator;
            }
            i += 4;
            continue;
        }
        if b == 0x00 {
            i += 1;
            continue;
        }
        cell_bytes.push(b);
        i += 1;
    }
    flush_cell(&mut cell_bytes, &mut current_row);
    if !current_row.cells.is_empty() {
        rows.push(current_row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ParseMode;

    fn options_permissive() -> ParseOptions {
        ParseOptions::new().with_parse_mode(ParseMode::Permissive)
    }

    fn topic_link_bytes(block_size: i32, data_len2: i32, next_block: i32, data_len1: i32, record_type: u8) -> Vec<u8> {
        let mut v = Vec::with_capacity(21);
        v.extend_from_slice(&block_size.to_le_bytes());
        v.extend_from_slice(&data_len2.to_le_bytes());
        v.extend_from_slice(&0i32.to_le_bytes()); // prev_block
        v.extend_from_slice(&next_block.to_le_bytes());
        v.extend_from_slice(&data_len1.to_le_bytes());
        v.push(record_type);
        v
    }

    #[test]
    fn single_topic_header_then_display() {
        // Block 0: TopicBlockHeader (12 bytes) + two TOPICLINKs.
        let header_link1 = TopicHeader {
            block_size: 0,
            browse_bck: -1,
            browse_for: -1,
            topic_num: 1,
            non_scroll: 0,
            scroll: 0,
            next_topic: -1,
        };
        let mut link1_data1 = Vec::new();
        for field in [
            header_link1.block_size,
            header_link1.browse_bck,
            header_link1.browse_for,
            header_link1.topic_num,
            header_link1.non_scroll,
            header_link1.scroll,
            header_link1.next_topic,
        ] {
            link1_data1.extend_from_slice(&field.to_le_bytes());
        }
        let link1_total = 21 + link1_data1.len();
        let link1 = topic_link_bytes(link1_total as i32, 0, link1_total as i32, link1_total as i32, 0x02);

        // Display record: ParagraphInfo (6 bytes minimal) + fmt [0x81,0xFF]; text "hi\0".
        let mut para = vec![0u8; 4]; // topic_size = 0
        para.push(0); // topic_length = 0, one-byte scan_word
        para.push(0); // bits = 0, one-byte scan_word
        para.push(0x81);
        para.push(0xFF);
        let link_data1_size = para.len();
        let text = b"hi\0";
        let link2_total = 21 + link_data1_size + text.len();
        let link2 = topic_link_bytes(
            link2_total as i32,
            text.len() as i32,
            0, // no further link
            (21 + link_data1_size) as i32,
            0x20,
        );

        let mut block_data = Vec::new();
        block_data.extend_from_slice(&link1);
        block_data.extend_from_slice(&link1_data1);
        block_data.extend_from_slice(&link2);
        block_data.extend_from_slice(&para);
        block_data.extend_from_slice(text);

        let mut topic_data = vec![0u8; 12];
        topic_data.extend_from_slice(&block_data);

        let options = options_permissive();
        let ctx = TopicContext {
            before_31: false,
            block_size: topic_data.len(),
            method: Method::Identity,
            codepage: CodePage::Cp1252,
            phrases: None,
            options: &options,
        };
        let topics = parse_topics(&topic_data, &ctx).unwrap();
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].topic_number, Some(1));
        assert!(!topics[0].spans.is_empty());
    }

    #[test]
    fn unknown_record_type_errors_in_strict_mode() {
        let link = topic_link_bytes(21, 0, 0, 21, 0x55);
        let mut topic_data = vec![0u8; 12];
        topic_data.extend_from_slice(&link);
        let options = ParseOptions::new().with_parse_mode(ParseMode::Strict);
        let ctx = TopicContext {
            before_31: false,
            block_size: topic_data.len(),
            method: Method::Identity,
            codepage: CodePage::Cp1252,
            phrases: None,
            options: &options,
        };
        assert!(parse_topics(&topic_data, &ctx).is_err());
    }
}

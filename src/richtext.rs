//! Rich-text reassembler (C9): the paragraph-info prefix and the
//! two-stream (LinkData1 formatting / LinkData2 text) interleaved
//! decoder that turns a `0x01`/`0x20` display record into text spans
//! and hotspot mappings.
//!
//! Grounded in `original_source`'s `_parse_paragraph_info` and
//! `_parse_topic_content_interleaved`; the command-byte table follows
//! spec §4.9 directly rather than the Python's v3.0 shortcut (see
//! module docs on [`crate::topic`]).

use crate::error::{Error, Result};
use crate::options::ParseOptions;
use crate::scan::{scan_int, scan_long, scan_word};
use crate::system::{decode_text, CodePage};

/// The 12 presence bits of [`ParagraphInfo`], in LSB-to-MSB order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParagraphInfoBits {
    pub unknown_follows: bool,
    pub spacing_above_follows: bool,
    pub spacing_below_follows: bool,
    pub spacing_lines_follows: bool,
    pub left_indent_follows: bool,
    pub right_indent_follows: bool,
    pub firstline_indent_follows: bool,
    pub unused: bool,
    pub borderinfo_follows: bool,
    pub tabinfo_follows: bool,
    pub right_aligned_paragraph: bool,
    pub center_aligned_paragraph: bool,
}

impl ParagraphInfoBits {
    fn from_raw(raw: u16) -> ParagraphInfoBits {
        ParagraphInfoBits {
            unknown_follows: raw & 0x0001 != 0,
            spacing_above_follows: raw & 0x0002 != 0,
            spacing_below_follows: raw & 0x0004 != 0,
            spacing_lines_follows: raw & 0x0008 != 0,
            left_indent_follows: raw & 0x0010 != 0,
            right_indent_follows: raw & 0x0020 != 0,
            firstline_indent_follows: raw & 0x0040 != 0,
            unused: raw & 0x0080 != 0,
            borderinfo_follows: raw & 0x0100 != 0,
            tabinfo_follows: raw & 0x0200 != 0,
            right_aligned_paragraph: raw & 0x0400 != 0,
            center_aligned_paragraph: raw & 0x0800 != 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BorderInfo {
    pub border_box: bool,
    pub border_top: bool,
    pub border_left: bool,
    pub border_bottom: bool,
    pub border_right: bool,
    pub border_thick: bool,
    pub border_double: bool,
    pub border_unknown: bool,
    pub border_width: i16,
}

#[derive(Debug, Clone, Copy)]
pub struct TabStop {
    pub position: u16,
    pub tab_type: Option<u16>,
}

#[derive(Debug, Clone, Default)]
pub struct TabInfo {
    pub tabs: Vec<TabStop>,
}

/// The per-display-record paragraph header preceding the formatting
/// stream. `topic_size` is read as a raw (uncompressed) `i32`; every
/// other field is a compressed integer gated by `bits`.
#[derive(Debug, Clone)]
pub struct ParagraphInfo {
    pub topic_size: i32,
    pub topic_length: u16,
    pub bits: ParagraphInfoBits,
    pub unknown: Option<i32>,
    pub spacing_above: Option<i16>,
    pub spacing_below: Option<i16>,
    pub spacing_lines: Option<i16>,
    pub left_indent: Option<i16>,
    pub right_indent: Option<i16>,
    pub firstline_indent: Option<i16>,
    pub border_info: Option<BorderInfo>,
    pub tab_info: Option<TabInfo>,
}

impl ParagraphInfo {
    /// Parse a v3.1+ `ParagraphInfo`, returning it alongside the byte
    /// offset where the formatting command stream (the remainder of
    /// LinkData1) begins.
    pub fn parse(data: &[u8]) -> Result<(ParagraphInfo, usize)> {
        if data.len() < 4 {
            return Err(Error::BufferTooShort(4, "ParagraphInfo.topic_size"));
        }
        let topic_size = i32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        let mut offset = 4usize;

        let topic_length = scan_word(data, &mut offset)?;
        let bits_raw = scan_word(data, &mut offset)?;
        let bits = ParagraphInfoBits::from_raw(bits_raw);

        let unknown = if bits.unknown_follows {
            Some(scan_long(data, &mut offset)?)
        } else {
            None
        };
        let spacing_above = if bits.spacing_above_follows {
            Some(scan_int(data, &mut offset)?)
        } else {
            None
        };
        let spacing_below = if bits.spacing_below_follows {
            Some(scan_int(data, &mut offset)?)
        } else {
            None
        };
        let spacing_lines = if bits.spacing_lines_follows {
            Some(scan_int(data, &mut offset)?)
        } else {
            None
        };
        let left_indent = if bits.left_indent_follows {
            Some(scan_int(data, &mut offset)?)
        } else {
            None
        };
        let right_indent = if bits.right_indent_follows {
            Some(scan_int(data, &mut offset)?)
        } else {
            None
        };
        let firstline_indent = if bits.firstline_indent_follows {
            Some(scan_int(data, &mut offset)?)
        } else {
            None
        };

        let border_info = if bits.borderinfo_follows && offset < data.len() {
            let raw = data[offset];
            offset += 1;
            let border_width = scan_int(data, &mut offset)?;
            Some(BorderInfo {
                border_box: raw & 0x01 != 0,
                border_top: raw & 0x02 != 0,
                border_left: raw & 0x04 != 0,
                border_bottom: raw & 0x08 != 0,
                border_right: raw & 0x10 != 0,
                border_thick: raw & 0x20 != 0,
                border_double: raw & 0x40 != 0,
                border_unknown: raw & 0x80 != 0,
                border_width,
            })
        } else {
            None
        };

        let tab_info = if bits.tabinfo_follows && offset < data.len() {
            let count = scan_word(data, &mut offset)?;
            let mut tabs = Vec::with_capacity(count as usize);
            for _ in 0..count {
                if offset >= data.len() {
                    break;
                }
                let tab_stop = scan_word(data, &mut offset)?;
                let tab_type = if tab_stop & 0x4000 != 0 && offset < data.len() {
                    Some(scan_word(data, &mut offset)?)
                } else {
                    None
                };
                tabs.push(TabStop {
                    position: tab_stop & 0x3FFF,
                    tab_type,
                });
            }
            Some(TabInfo { tabs })
        } else {
            None
        };

        Ok((
            ParagraphInfo {
                topic_size,
                topic_length,
                bits,
                unknown,
                spacing_above,
                spacing_below,
                spacing_lines,
                left_indent,
                right_indent,
                firstline_indent,
                border_info,
                tab_info,
            },
            offset,
        ))
    }

    /// Parse the simpler Windows 3.0 paragraph header: an uncompressed
    /// `topic_size:i32` followed by an uncompressed `topic_length:u16`,
    /// with no optional fields.
    pub fn parse_v30(data: &[u8]) -> Result<ParagraphInfo> {
        if data.len() < 6 {
            return Err(Error::BufferTooShort(6, "ParagraphInfo30"));
        }
        let topic_size = i32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        let topic_length = u16::from_le_bytes([data[4], data[5]]);
        Ok(ParagraphInfo {
            topic_size,
            topic_length,
            bits: ParagraphInfoBits::default(),
            unknown: None,
            spacing_above: None,
            spacing_below: None,
            spacing_lines: None,
            left_indent: None,
            right_indent: None,
            firstline_indent: None,
            border_info: None,
            tab_info: None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Center,
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub enum EmbeddedImage {
    Window {
        alignment: Alignment,
        bitmap_ref: Option<u16>,
    },
    Bitmap {
        alignment: Alignment,
        bitmap_ref: Option<u16>,
    },
}

/// Where a hotspot, once closed, actually points.
#[derive(Debug, Clone)]
pub enum HotspotTarget {
    /// `0xE0..0xE3`/`0xE6`/`0xE7`: jump to a topic by `TOPICOFFSET` or
    /// context hash, depending on the help file's addressing mode.
    Topic {
        topic_offset: u32,
        is_popup: bool,
        suppress_font_change: bool,
    },
    /// `0xC8`/`0xCC`: run a macro string instead of jumping.
    Macro {
        macro_text: String,
        suppress_font_change: bool,
    },
    /// `0xEA`/`0xEB`/`0xEE`/`0xEF`: jump into another help file, or a
    /// named window within this one.
    External {
        type_field: u8,
        topic_offset: i32,
        window_number: Option<u8>,
        external_file: Option<String>,
        window_name: Option<String>,
        is_popup: bool,
        suppress_font_change: bool,
    },
}

#[derive(Debug, Clone)]
pub struct TextSpan {
    pub text: String,
    pub font_number: Option<i16>,
    pub embedded_image: Option<EmbeddedImage>,
}

#[derive(Debug, Clone)]
pub struct HotspotMapping {
    pub span_index: usize,
    pub target: HotspotTarget,
    pub display_text: String,
    pub start_position: usize,
    pub end_position: usize,
}

/// Running formatting state threaded through one display record's
/// reassembly.
struct ReassemblyState {
    text_spans: Vec<TextSpan>,
    hotspots: Vec<HotspotMapping>,
    current_text: Vec<u8>,
    current_font: Option<i16>,
    current_embedded_image: Option<EmbeddedImage>,
    pending_hotspot: Option<HotspotTarget>,
    hotspot_active: bool,
    hotspot_start: usize,
    total_text_position: usize,
    codepage: CodePage,
}

impl ReassemblyState {
    fn finish_span(&mut self) {
        if self.current_text.is_empty() {
            return;
        }
        let text = decode_text(&self.current_text, self.codepage);
        let span_index = self.text_spans.len();

        if self.hotspot_active {
            if let Some(target) = self.pending_hotspot.take() {
                self.hotspots.push(HotspotMapping {
                    span_index,
                    target,
                    display_text: text.clone(),
                    start_position: self.hotspot_start,
                    end_position: self.total_text_position + text.chars().count(),
                });
            }
        }

        self.total_text_position += text.chars().count();
        self.text_spans.push(TextSpan {
            text,
            font_number: self.current_font,
            embedded_image: self.current_embedded_image.take(),
        });
        self.current_text.clear();
    }
}

/// Reassemble one `0x01`/`0x20` display record's text: `fmt` is the
/// formatting command stream (LinkData1 after the `ParagraphInfo`
/// prefix has been consumed); `text` is the already phrase-decompressed
/// text stream (LinkData2).
pub fn parse_display(
    fmt: &[u8],
    text: &[u8],
    codepage: CodePage,
    options: &ParseOptions,
) -> Result<(Vec<TextSpan>, Vec<HotspotMapping>)> {
    let mut state = ReassemblyState {
        text_spans: Vec::new(),
        hotspots: Vec::new(),
        current_text: Vec::new(),
        current_font: None,
        current_embedded_image: None,
        pending_hotspot: None,
        hotspot_active: false,
        hotspot_start: 0,
        total_text_position: 0,
        codepage,
    };

    let mut text_ptr = 0usize;
    let mut fmt_ptr = 0usize;

    // A truncated command stops just this display record in permissive
    // mode (the record-so-far is still returned), and is fatal in strict
    // mode (spec §7's per-record degrade policy).
    macro_rules! truncated {
        ($what:expr) => {{
            if options.is_permissive() {
                break;
            }
            return Err(Error::Malformed(format!(
                "truncated formatting command: {}",
                $what
            )));
        }};
    }

    while text_ptr < text.len() || fmt_ptr < fmt.len() {
        if text_ptr < text.len() {
            let start = text_ptr;
            while text_ptr < text.len() && text[text_ptr] != 0x00 {
                text_ptr += 1;
            }
            state.current_text.extend_from_slice(&text[start..text_ptr]);
            if text_ptr < text.len() {
                text_ptr += 1; // skip NUL
            }
        }

        if fmt_ptr >= fmt.len() {
            break;
        }
        let command = fmt[fmt_ptr];
        fmt_ptr += 1;

        match command {
            0x00 | 0xFF => break,
            0x20 => {
                // vfld variable field: a u32 value with no visible
                // effect on the reassembled text itself.
                if fmt_ptr + 4 > fmt.len() {
                    truncated!("vfld");
                }
                fmt_ptr += 4;
            }
            0x21 => {
                // dtype (MVB): a u16 value, likewise opaque here.
                if fmt_ptr + 2 > fmt.len() {
                    truncated!("dtype");
                }
                fmt_ptr += 2;
            }
            0x80 => {
                if fmt_ptr + 2 > fmt.len() {
                    truncated!("font change");
                }
                state.finish_span();
                let raw = u16::from_le_bytes([fmt[fmt_ptr], fmt[fmt_ptr + 1]]);
                state.current_font = Some(raw as i16);
                fmt_ptr += 2;
            }
            0x81 => {
                state.finish_span();
                state.current_text.extend_from_slice(b"\n");
            }
            0x82 => {
                state.finish_span();
                state.current_text.extend_from_slice(b"\n\n");
            }
            0x83 => {
                state.finish_span();
                state.current_text.extend_from_slice(b"\t");
            }
            0x89 => {
                state.finish_span();
                state.hotspot_active = false;
                state.pending_hotspot = None;
            }
            0x8B => {
                state.finish_span();
                state.current_text.extend_from_slice(b" ");
            }
            0x8C => {
                state.finish_span();
                state.current_text.extend_from_slice(b"-");
            }
            0x86 | 0x87 | 0x88 => {
                state.finish_span();
                if fmt_ptr + 2 > fmt.len() {
                    truncated!("embedded image header");
                }
                let _x3 = fmt[fmt_ptr];
                let x1 = fmt[fmt_ptr + 1];
                fmt_ptr += 2;
                let alignment = match command {
                    0x86 => Alignment::Center,
                    0x87 => Alignment::Left,
                    _ => Alignment::Right,
                };
                let picture_size = scan_long(fmt, &mut fmt_ptr)?;
                if x1 == 0x22 {
                    // HC31: an extra hotspot count precedes the bitmap
                    // reference.
                    let _num_hotspots = scan_word(fmt, &mut fmt_ptr)?;
                }
                let bitmap_ref = if fmt_ptr + 2 <= fmt.len() {
                    Some(scan_word(fmt, &mut fmt_ptr)?)
                } else {
                    None
                };
                state.current_embedded_image = Some(if x1 == 0x05 {
                    EmbeddedImage::Window {
                        alignment,
                        bitmap_ref,
                    }
                } else {
                    EmbeddedImage::Bitmap {
                        alignment,
                        bitmap_ref,
                    }
                });
                let remaining = (picture_size as i64) - 4;
                if remaining > 0 {
                    fmt_ptr = (fmt_ptr + remaining as usize).min(fmt.len());
                }
            }
            0xC8 | 0xCC => {
                state.finish_span();
                if fmt_ptr + 2 > fmt.len() {
                    truncated!("macro length");
                }
                let len = i16::from_le_bytes([fmt[fmt_ptr], fmt[fmt_ptr + 1]]) as usize;
                fmt_ptr += 2;
                if fmt_ptr + len > fmt.len() {
                    truncated!("macro body");
                }
                let macro_text = decode_text(&fmt[fmt_ptr..fmt_ptr + len], codepage);
                fmt_ptr += len;
                state.hotspot_active = true;
                state.hotspot_start = state.total_text_position;
                state.pending_hotspot = Some(HotspotTarget::Macro {
                    macro_text,
                    suppress_font_change: command == 0xCC,
                });
            }
            0xE0..=0xE3 | 0xE6 | 0xE7 => {
                state.finish_span();
                if fmt_ptr + 4 > fmt.len() {
                    truncated!("internal jump target");
                }
                let topic_offset = u32::from_le_bytes([
                    fmt[fmt_ptr],
                    fmt[fmt_ptr + 1],
                    fmt[fmt_ptr + 2],
                    fmt[fmt_ptr + 3],
                ]);
                fmt_ptr += 4;
                let is_popup = matches!(command, 0xE0 | 0xE2 | 0xE6);
                let suppress_font_change = matches!(command, 0xE6 | 0xE7);
                state.hotspot_active = true;
                state.hotspot_start = state.total_text_position;
                state.pending_hotspot = Some(HotspotTarget::Topic {
                    topic_offset,
                    is_popup,
                    suppress_font_change,
                });
            }
            0xEA | 0xEB | 0xEE | 0xEF => {
                state.finish_span();
                if fmt_ptr + 2 > fmt.len() {
                    truncated!("external jump length");
                }
                let data_length =
                    i16::from_le_bytes([fmt[fmt_ptr], fmt[fmt_ptr + 1]]) as usize;
                fmt_ptr += 2;
                if fmt_ptr + data_length > fmt.len() {
                    truncated!("external jump body");
                }
                let data_start = fmt_ptr;
                let data_end = data_start + data_length;
                let mut p = data_start;

                if p >= data_end {
                    fmt_ptr = data_end;
                    continue;
                }
                let type_field = fmt[p];
                p += 1;
                if p + 4 > data_end {
                    fmt_ptr = data_end;
                    continue;
                }
                let topic_offset = i32::from_le_bytes([fmt[p], fmt[p + 1], fmt[p + 2], fmt[p + 3]]);
                p += 4;

                let mut window_number = None;
                let mut external_file = None;
                let mut window_name = None;

                match type_field {
                    1 => {
                        if p < data_end {
                            window_number = Some(fmt[p]);
                            p += 1;
                        }
                    }
                    4 | 6 => {
                        let start = p;
                        while p < data_end && fmt[p] != 0x00 {
                            p += 1;
                        }
                        if p < data_end {
                            external_file = Some(decode_text(&fmt[start..p], codepage));
                            p += 1;
                        }
                        if type_field == 6 {
                            let start = p;
                            while p < data_end && fmt[p] != 0x00 {
                                p += 1;
                            }
                            if p < data_end {
                                window_name = Some(decode_text(&fmt[start..p], codepage));
                                p += 1;
                            }
                        }
                    }
                    _ => {}
                }

                fmt_ptr = data_end;
                let is_popup = matches!(command, 0xEA | 0xEE);
                let suppress_font_change = matches!(command, 0xEE | 0xEF);
                state.hotspot_active = true;
                state.hotspot_start = state.total_text_position;
                state.pending_hotspot = Some(HotspotTarget::External {
                    type_field,
                    topic_offset,
                    window_number,
                    external_file,
                    window_name,
                    is_popup,
                    suppress_font_change,
                });
            }
            other => {
                if options.is_permissive() {
                    // Unknown commands are skipped, matching a reader
                    // that tolerates formatting extensions it doesn't
                    // understand yet.
                } else {
                    return Err(Error::UnknownFormattingCommand(other));
                }
            }
        }
    }

    state.finish_span();
    Ok((state.text_spans, state.hotspots))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ParseMode;

    fn permissive() -> ParseOptions {
        ParseOptions::new().with_parse_mode(ParseMode::Permissive)
    }

    fn strict() -> ParseOptions {
        ParseOptions::new().with_parse_mode(ParseMode::Strict)
    }

    #[test]
    fn paragraph_info_minimal() {
        let mut data = vec![0u8; 4];
        data[0..4].copy_from_slice(&100i32.to_le_bytes());
        data.push(10 << 1); // topic_length = 5, one-byte scan_word
        data.push(0); // bits_raw = 0, one-byte scan_word
        let (info, offset) = ParagraphInfo::parse(&data).unwrap();
        assert_eq!(info.topic_size, 100);
        assert_eq!(info.topic_length, 5);
        assert_eq!(offset, 6);
        assert!(info.border_info.is_none());
    }

    #[test]
    fn paragraph_info_with_indents() {
        let mut data = vec![0u8; 4];
        data[0..4].copy_from_slice(&1i32.to_le_bytes());
        data.push(2 << 1); // topic_length = 1
        data.push((0x0010 << 1) as u8); // left_indent_follows bit, one-byte scan_word
        data.push(((5i16 + 0x40) << 1) as u8); // scan_int one-byte encoding of +5
        let (info, _offset) = ParagraphInfo::parse(&data).unwrap();
        assert!(info.bits.left_indent_follows);
        assert_eq!(info.left_indent, Some(5));
    }

    #[test]
    fn simple_text_and_line_break() {
        let text = b"hello\0world\0";
        let fmt = [0x81u8, 0xFF];
        let (spans, hotspots) = parse_display(&fmt, text, CodePage::Cp1252, &permissive()).unwrap();
        assert!(hotspots.is_empty());
        assert_eq!(spans[0].text, "hello");
        assert_eq!(spans[1].text, "\n");
        assert_eq!(spans[2].text, "world");
    }

    #[test]
    fn font_change_flushes_span() {
        let text = b"a\0b\0";
        let mut fmt = vec![0x80u8];
        fmt.extend_from_slice(&5i16.to_le_bytes());
        fmt.push(0xFF);
        let (spans, _) = parse_display(&fmt, text, CodePage::Cp1252, &permissive()).unwrap();
        assert_eq!(spans[0].text, "a");
        assert_eq!(spans[0].font_number, None);
        assert_eq!(spans[1].text, "b");
        assert_eq!(spans[1].font_number, Some(5));
    }

    #[test]
    fn internal_jump_creates_hotspot() {
        let text = b"click here\0";
        let mut fmt = vec![0xE3u8];
        fmt.extend_from_slice(&0x1234u32.to_le_bytes());
        fmt.push(0x89); // end hotspot
        fmt.push(0xFF);
        let (spans, hotspots) = parse_display(&fmt, text, CodePage::Cp1252, &permissive()).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(hotspots.len(), 1);
        match &hotspots[0].target {
            HotspotTarget::Topic {
                topic_offset,
                is_popup,
                ..
            } => {
                assert_eq!(*topic_offset, 0x1234);
                assert!(!is_popup);
            }
            _ => panic!("expected Topic target"),
        }
    }

    #[test]
    fn macro_hotspot_reads_text() {
        let text = b"press me\0";
        let macro_bytes = b"!DoSomething()";
        let mut fmt = vec![0xC8u8];
        fmt.extend_from_slice(&(macro_bytes.len() as i16).to_le_bytes());
        fmt.extend_from_slice(macro_bytes);
        fmt.push(0x89);
        fmt.push(0xFF);
        let (_spans, hotspots) = parse_display(&fmt, text, CodePage::Cp1252, &permissive()).unwrap();
        assert_eq!(hotspots.len(), 1);
        match &hotspots[0].target {
            HotspotTarget::Macro { macro_text, .. } => assert_eq!(macro_text, "!DoSomething()"),
            _ => panic!("expected Macro target"),
        }
    }

    #[test]
    fn external_jump_reads_filename() {
        let text = b"other file\0";
        let mut body = vec![4u8]; // type_field = 4: external file present
        body.extend_from_slice(&7i32.to_le_bytes()); // topic_offset
        body.extend_from_slice(b"OTHER.HLP\0");
        let mut fmt = vec![0xEAu8];
        fmt.extend_from_slice(&(body.len() as i16).to_le_bytes());
        fmt.extend_from_slice(&body);
        fmt.push(0x89);
        fmt.push(0xFF);
        let (_spans, hotspots) = parse_display(&fmt, text, CodePage::Cp1252, &permissive()).unwrap();
        assert_eq!(hotspots.len(), 1);
        match &hotspots[0].target {
            HotspotTarget::External {
                external_file,
                is_popup,
                ..
            } => {
                assert_eq!(external_file.as_deref(), Some("OTHER.HLP"));
                assert!(is_popup);
            }
            _ => panic!("expected External target"),
        }
    }

    #[test]
    fn unknown_command_errors_in_strict_mode() {
        let text = b"x\0";
        let fmt = [0x55u8, 0xFF];
        assert!(parse_display(&fmt, text, CodePage::Cp1252, &strict()).is_err());
    }

    #[test]
    fn unknown_command_skipped_in_permissive_mode() {
        let text = b"x\0";
        let fmt = [0x55u8, 0xFF];
        assert!(parse_display(&fmt, text, CodePage::Cp1252, &permissive()).is_ok());
    }

    #[test]
    fn truncated_command_errors_in_strict_mode() {
        let text = b"a\0";
        // 0x20 (vfld) needs 4 more bytes; only one is present.
        let fmt = [0x20u8, 0x01];
        assert!(parse_display(&fmt, text, CodePage::Cp1252, &strict()).is_err());
    }

    #[test]
    fn truncated_command_stops_record_in_permissive_mode() {
        let text = b"a\0";
        let fmt = [0x20u8, 0x01];
        let (spans, hotspots) = parse_display(&fmt, text, CodePage::Cp1252, &permissive()).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "a");
        assert!(hotspots.is_empty());
    }
}

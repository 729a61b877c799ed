//! `|SYSTEM` record decoder (C6).
//!
//! Drives version/compression detection and the text codec used
//! everywhere else in the crate. Record layout and the LCID/CHARSET to
//! codepage tables are grounded in `original_source`'s
//! `internal_files/system.py`.

use encoding_rs::Encoding;

use crate::error::{Error, Result};
use scroll::{Pread, LE};

pub const SYSTEM_MAGIC: u16 = 0x036C;

/// The 12-byte header at the start of `|SYSTEM`.
#[derive(Debug, Clone, Copy)]
pub struct SystemHeader {
    pub magic: u16,
    pub minor: u16,
    pub major: u16,
    pub gen_date: i32,
    pub flags: u16,
}

impl SystemHeader {
    pub const SIZE: usize = 12;

    pub fn parse(data: &[u8]) -> Result<SystemHeader> {
        if data.len() < Self::SIZE {
            return Err(Error::BufferTooShort(Self::SIZE, "SystemHeader"));
        }
        let magic: u16 = data.pread_with(0, LE)?;
        if magic != SYSTEM_MAGIC {
            return Err(Error::Malformed(format!(
                "bad |SYSTEM magic: {:#06x}",
                magic
            )));
        }
        let minor: u16 = data.pread_with(2, LE)?;
        let major: u16 = data.pread_with(4, LE)?;
        let gen_date: i32 = data.pread_with(6, LE)?;
        let flags: u16 = data.pread_with(10, LE)?;
        Ok(SystemHeader {
            magic,
            minor,
            major,
            gen_date,
            flags,
        })
    }

    /// Whether this is a WinHelp 3.0 file (title-only `|SYSTEM`, no
    /// typed record stream).
    pub fn is_pre_31(&self) -> bool {
        self.minor <= 16
    }
}

/// The topic-block compression scheme and block size, derived from
/// `|SYSTEM.flags` (spec §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicCompression {
    pub method: crate::compress::Method,
    pub block_size: usize,
}

impl SystemHeader {
    pub fn topic_compression(&self) -> TopicCompression {
        match self.flags {
            4 => TopicCompression {
                method: crate::compress::Method::Lz77,
                block_size: 4096,
            },
            8 => TopicCompression {
                method: crate::compress::Method::Lz77,
                block_size: 2048,
            },
            _ => TopicCompression {
                method: crate::compress::Method::Identity,
                block_size: 2048,
            },
        }
    }
}

/// A single typed `|SYSTEM` record (spec's record type table).
#[derive(Debug, Clone)]
pub enum SystemRecord {
    Title(String),
    Copyright(String),
    Contents { offset: i32 },
    Macro(String),
    Icon(Vec<u8>),
    SecWindow(SecWindow),
    Citation(String),
    Lcid { primary: i16, secondary: i16, tertiary: i16 },
    Cnt(String),
    Charset(u16),
    DefFont(DefFont),
    Groups(String),
    KeyIndex(KeyIndex),
    DllMaps([String; 4]),
    Unknown { record_type: u16, data: Vec<u8> },
}

#[derive(Debug, Clone, Default)]
pub struct SecWindow {
    pub flags: u16,
    pub kind: Vec<u8>,
    pub name: Vec<u8>,
    pub caption: Vec<u8>,
    pub x: i16,
    pub y: i16,
    pub width: i16,
    pub height: i16,
    pub maximize: u16,
    pub rgb: (u8, u8, u8),
    pub rgb_nsr: (u8, u8, u8),
}

#[derive(Debug, Clone, Default)]
pub struct KeyIndex {
    pub btree_name: String,
    pub map_name: String,
    pub data_name: String,
    pub title: String,
}

#[derive(Debug, Clone, Default)]
pub struct DefFont {
    pub height_in_points: u16,
    pub charset: u8,
    pub font_name: String,
}

/// The legacy Windows codepage selected by LCID/CHARSET, used for every
/// text decode in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePage {
    Cp1250,
    Cp1251,
    Cp1252,
    Cp1253,
    Cp1254,
    Cp1255,
    Cp1256,
    Cp1257,
    Cp874,
    Cp932,
    Cp936,
    Cp949,
    Cp950,
}

impl CodePage {
    fn encoding(self) -> &'static Encoding {
        match self {
            CodePage::Cp1250 => encoding_rs::WINDOWS_1250,
            CodePage::Cp1251 => encoding_rs::WINDOWS_1251,
            CodePage::Cp1252 => encoding_rs::WINDOWS_1252,
            CodePage::Cp1253 => encoding_rs::WINDOWS_1253,
            CodePage::Cp1254 => encoding_rs::WINDOWS_1254,
            CodePage::Cp1255 => encoding_rs::WINDOWS_1255,
            CodePage::Cp1256 => encoding_rs::WINDOWS_1256,
            CodePage::Cp1257 => encoding_rs::WINDOWS_1257,
            CodePage::Cp874 => encoding_rs::WINDOWS_874,
            CodePage::Cp932 => encoding_rs::SHIFT_JIS,
            CodePage::Cp936 => encoding_rs::GBK,
            CodePage::Cp949 => encoding_rs::EUC_KR,
            CodePage::Cp950 => encoding_rs::BIG5,
        }
    }

    pub fn from_lcid(lcid: i16) -> Option<CodePage> {
        match lcid {
            0x0409 | 0x0809 | 0x040C | 0x0407 | 0x0410 | 0x040A => Some(CodePage::Cp1252),
            0x0419 => Some(CodePage::Cp1251),
            0x0411 => Some(CodePage::Cp932),
            0x0412 => Some(CodePage::Cp949),
            0x0804 => Some(CodePage::Cp936),
            0x0404 => Some(CodePage::Cp950),
            _ => None,
        }
    }

    pub fn from_charset(charset: u16) -> Option<CodePage> {
        match charset {
            161 => Some(CodePage::Cp1253),
            162 => Some(CodePage::Cp1254),
            177 => Some(CodePage::Cp1255),
            178 => Some(CodePage::Cp1256),
            186 => Some(CodePage::Cp1257),
            204 => Some(CodePage::Cp1251),
            222 => Some(CodePage::Cp874),
            238 => Some(CodePage::Cp1250),
            128 => Some(CodePage::Cp932),
            129 => Some(CodePage::Cp949),
            134 => Some(CodePage::Cp936),
            136 => Some(CodePage::Cp950),
            _ => None,
        }
    }
}

impl Default for CodePage {
    fn default() -> Self {
        CodePage::Cp1252
    }
}

/// Decode legacy codepage bytes to a `String`. `encoding_rs`'s decoders
/// substitute U+FFFD for invalid sequences rather than failing, so this
/// never fails: the spec's documented `cp850`/`iso-8859-1` fallback
/// chain collapses into a single infallible call (see `DESIGN.md`).
pub fn decode_text(data: &[u8], codepage: CodePage) -> String {
    let (text, _, _) = codepage.encoding().decode(data);
    text.into_owned()
}

/// The parsed `|SYSTEM` file.
#[derive(Debug, Clone, Default)]
pub struct System {
    pub header: Option<SystemHeader>,
    pub title: Option<String>,
    pub copyright: Option<String>,
    pub codepage: CodePage,
    pub lcid: Option<i16>,
    pub charset: Option<u16>,
    pub records: Vec<SystemRecord>,
}

impl System {
    pub fn parse(data: &[u8]) -> Result<System> {
        let header = SystemHeader::parse(data)?;
        let mut system = System {
            header: Some(header),
            ..Default::default()
        };
        if header.is_pre_31() {
            system.parse_title_only(data);
        } else {
            system.parse_records(data)?;
        }
        Ok(system)
    }

    fn parse_title_only(&mut self, data: &[u8]) {
        let rest = &data[SystemHeader::SIZE..];
        let mut offset = 0usize;
        if let Ok(s) = crate::scan::read_stringz(rest, &mut offset) {
            self.title = Some(s.to_string());
        }
    }

    fn parse_records(&mut self, data: &[u8]) -> Result<()> {
        let mut offset = SystemHeader::SIZE;
        while offset + 4 <= data.len() {
            let record_type: u16 = data.pread_with(offset, LE)?;
            let data_size: u16 = data.pread_with(offset + 2, LE)?;
            offset += 4;
            let size = data_size as usize;
            if offset + size > data.len() {
                break;
            }
            let record_data = &data[offset..offset + size];
            offset += size;
            self.parse_record(record_type, record_data);
        }
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> String {
        decode_text(bytes, self.codepage)
    }

    fn parse_record(&mut self, record_type: u16, data: &[u8]) {
        let nul_terminated = |d: &[u8]| -> &[u8] {
            d.iter().position(|&b| b == 0).map(|i| &d[..i]).unwrap_or(d)
        };
        match record_type {
            1 => self.title = Some(self.decode(nul_terminated(data))),
            2 => self.copyright = Some(self.decode(nul_terminated(data))),
            3 => {
                let offset = data.pread_with::<i32>(0, LE).unwrap_or(0);
                self.records.push(SystemRecord::Contents { offset });
            }
            4 => self
                .records
                .push(SystemRecord::Macro(self.decode(nul_terminated(data)))),
            5 => self.records.push(SystemRecord::Icon(data.to_vec())),
            6 => {
                if let Some(rec) = parse_sec_window(data) {
                    self.records.push(SystemRecord::SecWindow(rec));
                }
            }
            8 => self
                .records
                .push(SystemRecord::Citation(self.decode(nul_terminated(data)))),
            9 => {
                if data.len() >= 10 {
                    let lcid2 = data.pread_with::<i16>(0, LE).unwrap_or(0);
                    let lcid3 = data.pread_with::<i16>(2, LE).unwrap_or(0);
                    let lcid1 = data.pread_with::<i16>(8, LE).unwrap_or(0);
                    self.lcid = Some(lcid1);
                    if let Some(cp) = CodePage::from_lcid(lcid1) {
                        self.codepage = cp;
                    }
                    self.records.push(SystemRecord::Lcid {
                        primary: lcid1,
                        secondary: lcid2,
                        tertiary: lcid3,
                    });
                }
            }
            10 => self
                .records
                .push(SystemRecord::Cnt(self.decode(nul_terminated(data)))),
            11 => {
                if data.len() >= 2 {
                    let charset = data.pread_with::<u16>(0, LE).unwrap_or(0);
                    self.charset = Some(charset);
                    if let Some(cp) = CodePage::from_charset(charset) {
                        self.codepage = cp;
                    }
                    self.records.push(SystemRecord::Charset(charset));
                }
            }
            12 => {
                if let Some(rec) = parse_def_font(data, |d| self.decode(d)) {
                    self.records.push(SystemRecord::DefFont(rec));
                }
            }
            13 => self
                .records
                .push(SystemRecord::Groups(self.decode(nul_terminated(data)))),
            14 => {
                if let Some(rec) = parse_key_index(data) {
                    self.records.push(SystemRecord::KeyIndex(rec));
                }
            }
            19 => {
                let strings = parse_dllmaps(data, |d| self.decode(d));
                self.records.push(SystemRecord::DllMaps(strings));
            }
            other => self.records.push(SystemRecord::Unknown {
                record_type: other,
                data: data.to_vec(),
            }),
        }
    }
}

fn parse_sec_window(data: &[u8]) -> Option<SecWindow> {
    if data.len() < 2 {
        return None;
    }
    let mut offset = 0usize;
    let flags: u16 = data.pread_with(offset, LE).ok()?;
    offset += 2;
    let mut rec = SecWindow {
        flags,
        ..Default::default()
    };
    let take = |data: &[u8], offset: &mut usize, len: usize| -> Option<Vec<u8>> {
        if *offset + len > data.len() {
            return None;
        }
        let slice = data[*offset..*offset + len].to_vec();
        *offset += len;
        Some(slice)
    };
    if flags & 0x01 != 0 {
        rec.kind = take(data, &mut offset, 10)?;
    }
    if flags & 0x02 != 0 {
        rec.name = take(data, &mut offset, 9)?;
    }
    if flags & 0x04 != 0 {
        rec.caption = take(data, &mut offset, 51)?;
    }
    if flags & 0x08 != 0 {
        rec.x = data.pread_with(offset, LE).ok()?;
        offset += 2;
    }
    if flags & 0x10 != 0 {
        rec.y = data.pread_with(offset, LE).ok()?;
        offset += 2;
    }
    if flags & 0x20 != 0 {
        rec.width = data.pread_with(offset, LE).ok()?;
        offset += 2;
    }
    if flags & 0x40 != 0 {
        rec.height = data.pread_with(offset, LE).ok()?;
        offset += 2;
    }
    if flags & 0x80 != 0 {
        rec.maximize = data.pread_with(offset, LE).ok()?;
        offset += 2;
    }
    if flags & 0x100 != 0 {
        if offset + 3 > data.len() {
            return Some(rec);
        }
        rec.rgb = (data[offset], data[offset + 1], data[offset + 2]);
        offset += 3;
    }
    if flags & 0x200 != 0 {
        offset += 2;
    }
    if flags & 0x400 != 0 {
        if offset + 3 > data.len() {
            return Some(rec);
        }
        rec.rgb_nsr = (data[offset], data[offset + 1], data[offset + 2]);
        offset += 3;
    }
    Some(rec)
}

fn parse_key_index(data: &[u8]) -> Option<KeyIndex> {
    // Tolerate truncated records by reading as much as is present and
    // padding the rest, matching the reference's recovery behaviour.
    let field = |start: usize, len: usize| -> Vec<u8> {
        if start >= data.len() {
            return Vec::new();
        }
        let end = (start + len).min(data.len());
        data[start..end].to_vec()
    };
    let strz = |bytes: &[u8]| -> String {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        String::from_utf8_lossy(&bytes[..end]).into_owned()
    };
    Some(KeyIndex {
        btree_name: strz(&field(0, 10)),
        map_name: strz(&field(10, 10)),
        data_name: strz(&field(20, 10)),
        title: strz(&field(30, 80)),
    })
}

fn parse_def_font(data: &[u8], decode: impl Fn(&[u8]) -> String) -> Option<DefFont> {
    if data.len() < 2 {
        return None;
    }
    let height_in_points: u16 = data.pread_with(0, LE).ok()?;
    let charset = if data.len() >= 3 { data[2] } else { 0 };
    let name_bytes = if data.len() > 3 { &data[3..] } else { &[] };
    let end = name_bytes.iter().position(|&b| b == 0).unwrap_or(name_bytes.len());
    Some(DefFont {
        height_in_points,
        charset,
        font_name: decode(&name_bytes[..end]),
    })
}

fn parse_dllmaps(data: &[u8], decode: impl Fn(&[u8]) -> String) -> [String; 4] {
    let mut strings = [String::new(), String::new(), String::new(), String::new()];
    let mut offset = 0usize;
    for slot in strings.iter_mut() {
        if offset >= data.len() {
            break;
        }
        let start = offset;
        while offset < data.len() && data[offset] != 0 {
            offset += 1;
        }
        if offset < data.len() {
            *slot = decode(&data[start..offset]);
            offset += 1;
        } else {
            break;
        }
    }
    strings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(minor: u16, flags: u16) -> Vec<u8> {
        let mut data = vec![0u8; 12];
        data[0..2].copy_from_slice(&SYSTEM_MAGIC.to_le_bytes());
        data[2..4].copy_from_slice(&minor.to_le_bytes());
        data[4..6].copy_from_slice(&1u16.to_le_bytes());
        data[6..10].copy_from_slice(&0i32.to_le_bytes());
        data[10..12].copy_from_slice(&flags.to_le_bytes());
        data
    }

    #[test]
    fn v30_title_only() {
        let mut data = header_bytes(15, 0);
        data.extend_from_slice(b"My Title\0");
        let sys = System::parse(&data).unwrap();
        assert_eq!(sys.title.as_deref(), Some("My Title"));
        assert!(sys.header.unwrap().is_pre_31());
    }

    #[test]
    fn v31_title_record() {
        let mut data = header_bytes(21, 4);
        let title = b"Hello\0";
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&(title.len() as u16).to_le_bytes());
        data.extend_from_slice(title);
        let sys = System::parse(&data).unwrap();
        assert_eq!(sys.title.as_deref(), Some("Hello"));
        let compression = sys.header.unwrap().topic_compression();
        assert_eq!(compression.block_size, 4096);
    }

    #[test]
    fn lcid_selects_codepage() {
        let mut data = header_bytes(21, 8);
        let mut lcid_data = vec![0u8; 10];
        lcid_data[8..10].copy_from_slice(&0x0419i16.to_le_bytes()); // Russian
        data.extend_from_slice(&9u16.to_le_bytes());
        data.extend_from_slice(&(lcid_data.len() as u16).to_le_bytes());
        data.extend_from_slice(&lcid_data);
        let sys = System::parse(&data).unwrap();
        assert_eq!(sys.codepage, CodePage::Cp1251);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut data = vec![0u8; 12];
        data[0..2].copy_from_slice(&0x1234u16.to_le_bytes());
        assert!(System::parse(&data).is_err());
    }
}

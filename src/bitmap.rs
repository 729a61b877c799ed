//! Bitmap / SHG / MRB decoder (C13): `|bmN` internal files, their
//! hotspot tables, and synthesis of a standalone `.BMP` byte stream.
//!
//! Grounded in `original_source`'s `internal_files/bitmap.py`: the
//! fixed 48-byte picture header, the 15-byte `HOTSPOT` record, and the
//! `BITMAPFILEHEADER`/`BITMAPINFOHEADER` synthesis in
//! `extract_bitmap_as_bmp`. The picture "type" field and compression
//! selector are not fully pinned down (spec §9 Open Question); the raw
//! header bytes are retained on [`Picture`] for forensic inspection.

use scroll::{Pread, LE};

use crate::error::{Error, Result};
use crate::system::{decode_text, CodePage};

const PICTURE_HEADER_SIZE: usize = 48;
const HOTSPOT_SIZE: usize = 15;

/// The uncompressed header preceding a `|bmN` file's picture and
/// hotspot payloads.
#[derive(Debug, Clone, Copy)]
pub struct PictureHeader {
    pub x_pels: u32,
    pub y_pels: u32,
    pub planes: u16,
    pub bit_count: u16,
    pub width: u32,
    pub height: u32,
    pub colors_used: u32,
    pub colors_important: u32,
    pub data_size: u32,
    pub hotspot_size: u32,
    pub picture_offset: u32,
    pub hotspot_offset: u32,
}

impl PictureHeader {
    fn parse(data: &[u8]) -> Result<PictureHeader> {
        if data.len() < PICTURE_HEADER_SIZE {
            return Err(Error::BufferTooShort(PICTURE_HEADER_SIZE, "picture header"));
        }
        Ok(PictureHeader {
            x_pels: data.pread_with(0, LE)?,
            y_pels: data.pread_with(4, LE)?,
            planes: data.pread_with(8, LE)?,
            bit_count: data.pread_with(10, LE)?,
            width: data.pread_with(12, LE)?,
            height: data.pread_with(16, LE)?,
            colors_used: data.pread_with(20, LE)?,
            colors_important: data.pread_with(24, LE)?,
            data_size: data.pread_with(28, LE)?,
            hotspot_size: data.pread_with(32, LE)?,
            picture_offset: data.pread_with(36, LE)?,
            hotspot_offset: data.pread_with(40, LE)?,
        })
    }
}

/// A clickable region inside a bitmap, identified by a 32-bit context
/// hash (spec §4.10 resolves these to canonical context names).
#[derive(Debug, Clone)]
pub struct Hotspot {
    pub id0: u8,
    pub id1: u8,
    pub id2: u8,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub hash: u32,
    pub name: String,
    pub target: String,
}

/// Coarse format classification, derived from payload signatures and
/// hotspot presence (spec §4.13).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureFormat {
    Bmp,
    Wmf,
    Emf,
    Shg,
}

/// One decoded `|bmN` picture: the raw pixel payload plus its hotspot
/// table.
#[derive(Debug, Clone)]
pub struct Picture {
    pub header: PictureHeader,
    pub format: PictureFormat,
    pub pixel_data: Vec<u8>,
    pub hotspots: Vec<Hotspot>,
}

impl Picture {
    /// Parse a `|bmN` internal file's payload (FILEHEADER already
    /// stripped by the caller via `internal_file::read_payload`).
    pub fn parse(data: &[u8], codepage: CodePage) -> Result<Picture> {
        let header = PictureHeader::parse(data)?;
        let pixel_data = extract_picture_bytes(data, &header)?;
        let hotspots = parse_hotspots(data, &header, codepage)?;
        let format = classify_format(&header, &pixel_data, &hotspots);
        Ok(Picture {
            header,
            format,
            pixel_data,
            hotspots,
        })
    }

    /// Synthesize a standalone `.BMP` byte stream: a
    /// `BITMAPFILEHEADER` + `BITMAPINFOHEADER`, palette (for <= 8 bpp
    /// images), then the pixel payload. Returns `None` for non-raster
    /// formats (`wmf`/`emf`).
    pub fn to_bmp(&self) -> Option<Vec<u8>> {
        if !matches!(self.format, PictureFormat::Bmp | PictureFormat::Shg) {
            return None;
        }
        let h = &self.header;
        let colors = if h.colors_used > 0 {
            h.colors_used
        } else if h.bit_count <= 8 {
            1u32 << h.bit_count
        } else {
            0
        };
        let palette_size = colors * 4;
        let header_total = 14 + 40;
        let pixel_offset = header_total + palette_size;
        let file_size = pixel_offset + self.pixel_data.len() as u32;

        let mut out = Vec::with_capacity(file_size as usize);
        out.extend_from_slice(b"BM");
        out.extend_from_slice(&file_size.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&pixel_offset.to_le_bytes());

        out.extend_from_slice(&40u32.to_le_bytes()); // biSize
        out.extend_from_slice(&h.width.to_le_bytes());
        out.extend_from_slice(&h.height.to_le_bytes());
        out.extend_from_slice(&h.planes.to_le_bytes());
        out.extend_from_slice(&h.bit_count.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // BI_RGB
        out.extend_from_slice(&(self.pixel_data.len() as u32).to_le_bytes());
        let x_dpi = if h.x_pels > 0 { h.x_pels } else { 2835 };
        let y_dpi = if h.y_pels > 0 { h.y_pels } else { 2835 };
        out.extend_from_slice(&x_dpi.to_le_bytes());
        out.extend_from_slice(&y_dpi.to_le_bytes());
        out.extend_from_slice(&colors.to_le_bytes());
        out.extend_from_slice(&h.colors_important.to_le_bytes());

        if palette_size > 0 {
            let have = palette_size.min(self.pixel_data.len() as u32) as usize;
            out.extend_from_slice(&self.pixel_data[..have]);
            out.resize(out.len() + (palette_size as usize - have), 0);
            out.extend_from_slice(&self.pixel_data[have.min(self.pixel_data.len())..]);
        } else {
            out.extend_from_slice(&self.pixel_data);
        }
        Some(out)
    }
}

fn extract_picture_bytes(data: &[u8], header: &PictureHeader) -> Result<Vec<u8>> {
    let start = header.picture_offset as usize;
    if start == 0 || header.data_size == 0 || start >= data.len() {
        return Ok(Vec::new());
    }
    let end = (start + header.data_size as usize).min(data.len());
    let raw = &data[start..end];
    // Some pictures store a leading compression-method byte (identity
    // or runlen) ahead of the pixel stream; neither the spec nor
    // `bitmap.py` pins this down precisely (spec §9), so picture bytes
    // are returned as-is. Callers that know the method can call
    // `compress::decompress` themselves.
    Ok(raw.to_vec())
}

fn parse_hotspots(data: &[u8], header: &PictureHeader, codepage: CodePage) -> Result<Vec<Hotspot>> {
    let start = header.hotspot_offset as usize;
    if start == 0 || header.hotspot_size == 0 {
        return Ok(Vec::new());
    }
    let end = (start + header.hotspot_size as usize).min(data.len());
    if start >= end {
        return Ok(Vec::new());
    }
    let region = &data[start..end];
    let mut offset = 0usize;
    let mut hotspots = Vec::new();
    while offset + HOTSPOT_SIZE <= region.len() {
        let id0 = region[offset];
        let id1 = region[offset + 1];
        let id2 = region[offset + 2];
        let x: u16 = region.pread_with(offset + 3, LE)?;
        let y: u16 = region.pread_with(offset + 5, LE)?;
        let width: u16 = region.pread_with(offset + 7, LE)?;
        let height: u16 = region.pread_with(offset + 9, LE)?;
        let hash: u32 = region.pread_with(offset + 11, LE)?;
        offset += HOTSPOT_SIZE;

        let name = read_stringz_lossy(region, &mut offset, codepage);
        let target = read_stringz_lossy(region, &mut offset, codepage);

        hotspots.push(Hotspot {
            id0,
            id1,
            id2,
            x,
            y,
            width,
            height,
            hash,
            name,
            target,
        });
    }
    Ok(hotspots)
}

fn read_stringz_lossy(data: &[u8], offset: &mut usize, codepage: CodePage) -> String {
    if *offset >= data.len() {
        return String::new();
    }
    let start = *offset;
    let end = data[start..]
        .iter()
        .position(|&b| b == 0)
        .map(|i| start + i)
        .unwrap_or(data.len());
    *offset = (end + 1).min(data.len());
    decode_text(&data[start..end], codepage)
}

fn classify_format(header: &PictureHeader, pixel_data: &[u8], hotspots: &[Hotspot]) -> PictureFormat {
    if pixel_data.len() >= 4 {
        if &pixel_data[..4] == b"\x01\x00\x09\x00" {
            return PictureFormat::Wmf;
        }
        if &pixel_data[..4] == b"\xd7\xcd\xc6\x9a" {
            return PictureFormat::Emf;
        }
    }
    if !hotspots.is_empty() && header.bit_count <= 8 {
        return PictureFormat::Shg;
    }
    PictureFormat::Bmp
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_picture(pixel: &[u8], hotspots: &[(u32, u16, u16, u16, u16)]) -> Vec<u8> {
        let mut data = vec![0u8; PICTURE_HEADER_SIZE];
        let picture_offset = PICTURE_HEADER_SIZE as u32;
        let mut hotspot_bytes = Vec::new();
        for (hash, x, y, w, h) in hotspots {
            hotspot_bytes.push(0u8);
            hotspot_bytes.push(0u8);
            hotspot_bytes.push(0u8);
            hotspot_bytes.extend_from_slice(&x.to_le_bytes());
            hotspot_bytes.extend_from_slice(&y.to_le_bytes());
            hotspot_bytes.extend_from_slice(&w.to_le_bytes());
            hotspot_bytes.extend_from_slice(&h.to_le_bytes());
            hotspot_bytes.extend_from_slice(&hash.to_le_bytes());
            hotspot_bytes.push(0); // empty name
            hotspot_bytes.push(0); // empty target
        }
        let hotspot_offset = picture_offset + pixel.len() as u32;

        data[0..4].copy_from_slice(&0u32.to_le_bytes());
        data[4..8].copy_from_slice(&0u32.to_le_bytes());
        data[8..10].copy_from_slice(&1u16.to_le_bytes());
        data[10..12].copy_from_slice(&8u16.to_le_bytes());
        data[12..16].copy_from_slice(&2u32.to_le_bytes());
        data[16..20].copy_from_slice(&2u32.to_le_bytes());
        data[20..24].copy_from_slice(&0u32.to_le_bytes());
        data[24..28].copy_from_slice(&0u32.to_le_bytes());
        data[28..32].copy_from_slice(&(pixel.len() as u32).to_le_bytes());
        data[32..36].copy_from_slice(&(hotspot_bytes.len() as u32).to_le_bytes());
        data[36..40].copy_from_slice(&picture_offset.to_le_bytes());
        data[40..44].copy_from_slice(&hotspot_offset.to_le_bytes());

        data.extend_from_slice(pixel);
        data.extend_from_slice(&hotspot_bytes);
        data
    }

    #[test]
    fn parses_header_and_pixel_data() {
        let pixel = vec![0xAAu8; 4];
        let data = build_picture(&pixel, &[(0x11, 1, 2, 3, 4)]);
        let pic = Picture::parse(&data, CodePage::Cp1252).unwrap();
        assert_eq!(pic.pixel_data, pixel);
        assert_eq!(pic.hotspots.len(), 1);
        assert_eq!(pic.hotspots[0].hash, 0x11);
    }

    #[test]
    fn bmp_starts_with_bm_and_matches_bf_size() {
        let pixel = vec![0x00u8; 64];
        let data = build_picture(&pixel, &[]);
        let pic = Picture::parse(&data, CodePage::Cp1252).unwrap();
        let bmp = pic.to_bmp().unwrap();
        assert_eq!(&bmp[0..2], b"BM");
        let bf_size = u32::from_le_bytes([bmp[2], bmp[3], bmp[4], bmp[5]]);
        assert_eq!(bf_size as usize, bmp.len());
    }
}

//! Internal-file framing (C5): the 9-byte `FILEHEADER` preceding every
//! internal file's payload.

use scroll::{Pread, LE};

use crate::error::{Error, Result};

/// Structure at the start of each internal file.
#[derive(Debug, Clone, Copy)]
pub struct FileHeader {
    /// Size reserved for this internal file, including this header.
    pub reserved_space: i32,
    /// Size of the payload following this header, in bytes.
    pub used_space: i32,
    /// Normally 4.
    pub file_flags: u8,
}

impl FileHeader {
    pub const SIZE: usize = 9;

    pub fn parse(data: &[u8]) -> Result<FileHeader> {
        if data.len() < Self::SIZE {
            return Err(Error::BufferTooShort(Self::SIZE, "FILEHEADER"));
        }
        let reserved_space: i32 = data.pread_with(0, LE)?;
        let used_space: i32 = data.pread_with(4, LE)?;
        let file_flags: u8 = data.pread_with(8, LE)?;
        Ok(FileHeader {
            reserved_space,
            used_space,
            file_flags,
        })
    }

    /// The payload bytes following this header, bounds-checked against
    /// `used_space`.
    pub fn payload<'a>(&self, data: &'a [u8]) -> Result<&'a [u8]> {
        let end = Self::SIZE
            .checked_add(self.used_space.max(0) as usize)
            .ok_or(Error::BufferTooShort(0, "FILEHEADER.used_space overflow"))?;
        if end > data.len() {
            return Err(Error::BufferTooShort(end, "internal file payload"));
        }
        Ok(&data[Self::SIZE..end])
    }
}

/// Read an internal file's raw payload given the whole-file bytes and
/// the directory-resolved offset.
pub fn read_payload(whole_file: &[u8], offset: i32) -> Result<&[u8]> {
    if offset < 0 || offset as usize >= whole_file.len() {
        return Err(Error::Malformed(format!(
            "internal file offset out of range: {}",
            offset
        )));
    }
    let data = &whole_file[offset as usize..];
    let header = FileHeader::parse(data)?;
    header.payload(data)
}

/// Like [`read_payload`] but returns the header-inclusive slice, for
/// components that re-parse their own `FILEHEADER` + B+ tree together
/// (`|CONTEXT`, `|TopicId`, `|TTLBTREE`, `|Rose`, `|Petra`; see spec
/// §4.5).
pub fn read_framed<'a>(whole_file: &'a [u8], offset: i32) -> Result<&'a [u8]> {
    if offset < 0 || offset as usize >= whole_file.len() {
        return Err(Error::Malformed(format!(
            "internal file offset out of range: {}",
            offset
        )));
    }
    let data = &whole_file[offset as usize..];
    let header = FileHeader::parse(data)?;
    let end = FileHeader::SIZE + header.used_space.max(0) as usize;
    if end > data.len() {
        return Err(Error::BufferTooShort(end, "framed internal file"));
    }
    Ok(&data[..end])
}

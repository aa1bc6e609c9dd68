//! The file-info decoder (§4.7): turns a short-name entry (plus an
//! optional collected long name) into the record directory reads hand back
//! to callers.
//!
//! Grounded on the teacher's `fat/dir.rs` `DirEntry` field layout; the
//! pretty-printing of the 11-byte short name (inserting the dot, restoring
//! the `0x05`→`0xE5` escape, lower-casing per the NT case bits) has no
//! teacher analogue and is new, following §4.7's description directly.

use crate::codepage::CodePage;
use crate::dirent::{Attributes, ShortDirEntry, ESCAPED_E5, DELETED_MARK};

pub const NT_CASE_LOWER_EXT: u8 = 0x10;
pub const NT_CASE_LOWER_BODY: u8 = 0x08;

/// Capacity of the pretty-printed short name: `8 + 1 (dot) + 3 + 1 (nul)`.
pub const ALT_NAME_CAPACITY: usize = 13;

#[derive(Debug, Clone)]
pub struct FileInfo {
    pub name: [u16; 256],
    pub name_len: usize,
    pub alt_name: [u8; ALT_NAME_CAPACITY],
    pub alt_name_len: usize,
    pub attributes: Attributes,
    pub size: u32,
    pub mtime: u32,
}

/// Pretty-prints the 11-byte short name field (§4.7): inserts the dot,
/// restores the `0xE5` escape, and lower-cases body/extension per the NT
/// case-flag byte.
pub fn alt_name(entry: &ShortDirEntry, codepage: &impl CodePage) -> ([u8; ALT_NAME_CAPACITY], usize) {
    let mut name = entry.name;
    if name[0] == ESCAPED_E5 {
        name[0] = DELETED_MARK;
    }

    let body_end = name[..8].iter().rposition(|&b| b != b' ').map(|i| i + 1).unwrap_or(0);
    let ext_end = name[8..11].iter().rposition(|&b| b != b' ').map(|i| i + 1).unwrap_or(0);

    let mut out = [0u8; ALT_NAME_CAPACITY];
    let mut len = 0;

    for &b in &name[..body_end] {
        out[len] = if entry.nt_case & NT_CASE_LOWER_BODY != 0 {
            lower_ascii(b, codepage)
        } else {
            b
        };
        len += 1;
    }

    if ext_end > 0 {
        out[len] = b'.';
        len += 1;
        for &b in &name[8..8 + ext_end] {
            out[len] = if entry.nt_case & NT_CASE_LOWER_EXT != 0 {
                lower_ascii(b, codepage)
            } else {
                b
            };
            len += 1;
        }
    }

    (out, len)
}

fn lower_ascii(b: u8, _codepage: &impl CodePage) -> u8 {
    if (0x41..=0x5A).contains(&b) {
        b + 0x20
    } else {
        b
    }
}

/// Builds a `FileInfo` from a short entry and its (possibly absent) long
/// name. When there is no LFN, the short name is copied into both `name`
/// and `alt_name` (§4.7).
pub fn decode(entry: &ShortDirEntry, long_name: Option<&[u16]>, codepage: &impl CodePage) -> FileInfo {
    let (alt, alt_len) = alt_name(entry, codepage);

    let mut name = [0u16; 256];
    let name_len = match long_name {
        Some(units) => {
            let n = units.len().min(256);
            name[..n].copy_from_slice(&units[..n]);
            n
        }
        None => {
            for i in 0..alt_len {
                name[i] = alt[i] as u16;
            }
            alt_len
        }
    };

    FileInfo {
        name,
        name_len,
        alt_name: alt,
        alt_name_len: alt_len,
        attributes: entry.attrs,
        size: entry.size,
        mtime: ((entry.modify_date as u32) << 16) | entry.modify_time as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codepage::Ascii;

    #[test]
    fn alt_name_inserts_dot_and_trims_padding() {
        let entry = ShortDirEntry { name: *b"README  TXT", ..Default::default() };
        let (buf, len) = alt_name(&entry, &Ascii);
        assert_eq!(&buf[..len], b"README.TXT");
    }

    #[test]
    fn alt_name_with_no_extension_omits_dot() {
        let entry = ShortDirEntry { name: *b"ABCDEFGH   ", ..Default::default() };
        let (buf, len) = alt_name(&entry, &Ascii);
        assert_eq!(&buf[..len], b"ABCDEFGH");
    }

    #[test]
    fn alt_name_lower_cases_per_nt_flags() {
        let entry = ShortDirEntry {
            name: *b"README  TXT",
            nt_case: NT_CASE_LOWER_BODY | NT_CASE_LOWER_EXT,
            ..Default::default()
        };
        let (buf, len) = alt_name(&entry, &Ascii);
        assert_eq!(&buf[..len], b"readme.txt");
    }

    #[test]
    fn decode_without_lfn_mirrors_short_name_into_both_fields() {
        let entry = ShortDirEntry { name: *b"README  TXT", size: 5, ..Default::default() };
        let info = decode(&entry, None, &Ascii);
        assert_eq!(&info.alt_name[..info.alt_name_len], b"README.TXT");
        assert_eq!(info.name[..info.name_len].iter().map(|&u| u as u8).collect::<Vec<_>>(), b"README.TXT");
        assert_eq!(info.size, 5);
    }

    #[test]
    fn decode_restores_e5_escape() {
        let mut entry = ShortDirEntry { name: *b"AME  TXT   ", ..Default::default() };
        entry.name[0] = crate::dirent::ESCAPED_E5;
        let (buf, _len) = alt_name(&entry, &Ascii);
        assert_eq!(buf[0], DELETED_MARK);
    }
}

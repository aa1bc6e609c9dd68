//! Path traversal (§6.6, "X:PATH" syntax minus the drive-letter prefix,
//! which the registry peels off before calling in here): walks every
//! non-terminal segment as a directory and hands the terminal segment's
//! canonical name back to the caller (file open, mkdir, directory open,
//! rename, ...) to `dir_find`/`dir_register` itself.
//!
//! Has no teacher analogue; grounded on §6.6 and on `name::PathTokenizer`
//! plus `directory::dir_find`, both already built for exactly this purpose.

use crate::codepage::CodePage;
use crate::dirent::Attributes;
use crate::directory::{self, DirCursor, DirOrigin};
use crate::drive::BlockDevice;
use crate::error::{FatError, FatResult};
use crate::fat_table::{FatGeometry, FatType};
use crate::name::{self, CanonicalName, LongNameBuf, PathTokenizer};
use crate::object::Filesystem;
use crate::window::Window;

/// Where path resolution without a leading separator should start (§4.9,
/// §6.6): the volume root, or (when relative paths are enabled and a
/// current directory is set) that directory.
pub fn root_origin(geom: &FatGeometry) -> DirOrigin {
    if geom.fat_type == FatType::Fat32 {
        DirOrigin::Chain(geom.root_dir_cluster)
    } else {
        DirOrigin::StaticRoot
    }
}

fn start_origin(fs: &Filesystem, path: &str) -> DirOrigin {
    let is_absolute = path.starts_with('/') || path.starts_with('\\');
    if is_absolute || fs.current_dir_cluster == 0 {
        root_origin(&fs.geom)
    } else {
        DirOrigin::Chain(fs.current_dir_cluster)
    }
}

fn segment_units(segment: &str, buf: &mut [u16; name::LFN_MAX_UNITS]) -> FatResult<usize> {
    let mut len = 0;
    for u in segment.encode_utf16() {
        if len >= buf.len() {
            return Err(FatError::InvalidName);
        }
        buf[len] = u;
        len += 1;
    }
    Ok(len)
}

/// The terminal segment's canonicalized name, ready to hand to
/// `dir_find`/`dir_register`, plus the cursor positioned at the start of
/// the directory stream it lives (or would live) in.
pub struct ResolvedParent {
    pub cursor: DirCursor,
    pub canonical: CanonicalName,
    pub long: Option<LongNameBuf>,
}

/// Walks every segment but the last as a directory, `dir_find`ing each one
/// and descending into it; returns the last segment canonicalized and a
/// cursor reset to the start of its parent directory.
pub fn resolve_parent<D: BlockDevice>(
    fs: &mut Filesystem,
    drive: &mut D,
    path: &str,
    lfn_enabled: bool,
    codepage: &impl CodePage,
) -> FatResult<ResolvedParent> {
    let mut origin = start_origin(fs, path);
    let mut tokens = PathTokenizer::new(path).peekable();

    loop {
        let (segment, is_last) = match tokens.next() {
            Some(t) => t,
            None => return Err(FatError::InvalidName),
        };

        let mut buf = [0u16; name::LFN_MAX_UNITS];
        let len = segment_units(segment, &mut buf)?;
        let (canonical, long) = name::canonicalize(&buf[..len], is_last, true, lfn_enabled, codepage)?;

        if is_last {
            let cursor = DirCursor::new(origin, &fs.geom);
            return Ok(ResolvedParent { cursor, canonical, long });
        }

        let mut cursor = DirCursor::new(origin, &fs.geom);
        let found = directory::dir_find(
            &mut fs.window,
            drive,
            &fs.geom,
            &mut fs.hint,
            &mut cursor,
            &canonical,
            long.as_ref().map(|l| l.as_units()),
            codepage,
        )?;

        match found {
            Some(r) if r.entry.attrs.contains(Attributes::DIRECTORY) => {
                origin = DirOrigin::Chain(r.entry.cluster());
            }
            Some(_) => return Err(FatError::NoPath),
            None => return Err(FatError::NoPath),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codepage::Ascii;
    use crate::drive::{DriveStatus, IoctlCode};
    use crate::fat_table::FreeSpaceHint;

    struct RamDisk {
        sectors: Vec<[u8; 512]>,
    }
    impl RamDisk {
        fn new(count: usize) -> Self {
            Self { sectors: vec![[0u8; 512]; count] }
        }
    }
    impl BlockDevice for RamDisk {
        fn initialize(&mut self) -> DriveStatus {
            DriveStatus::NONE
        }
        fn status(&self) -> DriveStatus {
            DriveStatus::NONE
        }
        fn read(&mut self, buf: &mut [u8], lba: u64, count: u32) -> FatResult<()> {
            for i in 0..count as u64 {
                let off = (i as usize) * 512;
                buf[off..off + 512].copy_from_slice(&self.sectors[(lba + i) as usize]);
            }
            Ok(())
        }
        fn write(&mut self, buf: &[u8], lba: u64, count: u32) -> FatResult<()> {
            for i in 0..count as u64 {
                let off = (i as usize) * 512;
                self.sectors[(lba + i) as usize].copy_from_slice(&buf[off..off + 512]);
            }
            Ok(())
        }
        fn ioctl(&mut self, _code: IoctlCode, _out: &mut [u8]) -> FatResult<()> {
            Ok(())
        }
    }

    fn fs_fat16() -> Filesystem {
        let geom = FatGeometry {
            fat_type: FatType::Fat16,
            fat_base: 1,
            sectors_per_fat: 4,
            num_fats: 2,
            data_base: 9,
            sectors_per_cluster: 1,
            sector_size: 512,
            total_clusters: 100,
            root_dir_base: 9,
            root_dir_sectors: 2,
            root_dir_cluster: 0,
        };
        let hint = FreeSpaceHint { last_allocated: 2, free_count: FreeSpaceHint::UNKNOWN, info_dirty: false };
        Filesystem::new(0, geom, hint, 1)
    }

    #[test]
    fn single_segment_path_resolves_against_the_root() {
        let mut fs = fs_fat16();
        let mut drive = RamDisk::new(50);
        let resolved = resolve_parent(&mut fs, &mut drive, "README.TXT", true, &Ascii).unwrap();
        assert_eq!(resolved.cursor.origin, root_origin(&fs.geom));
        assert_eq!(resolved.canonical.short, *b"README  TXT");
    }

    #[test]
    fn missing_intermediate_directory_is_nopath() {
        let mut fs = fs_fat16();
        let mut drive = RamDisk::new(50);
        assert_eq!(
            resolve_parent(&mut fs, &mut drive, "nosuchdir/file.txt", true, &Ascii).unwrap_err(),
            FatError::NoPath
        );
    }

    #[test]
    fn empty_path_is_invalid() {
        let mut fs = fs_fat16();
        let mut drive = RamDisk::new(50);
        assert_eq!(resolve_parent(&mut fs, &mut drive, "", true, &Ascii).unwrap_err(), FatError::InvalidName);
    }
}

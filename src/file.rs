//! The file API (§4.9, §3.3): open/read/write/seek/sync/close/truncate/expand
//! over the object model.
//!
//! Grounded on the teacher's `fat/file.rs` `File`/`FileWrapper` shape (a
//! handle plus a wrapper borrowing the mounted filesystem and drive for the
//! duration of a call) and `fat/table.rs`'s chain-stepping loop, generalized
//! from the teacher's unfinished stub to the full read/write/seek state
//! machine in §4.9. The private per-file sector buffer reuses
//! [`crate::window::Window`] rather than a second hand-rolled buffer type,
//! since §3.3 describes exactly what §3.1 already built for the volume.

use crate::codepage::CodePage;
use crate::dirent::{Attributes, ShortDirEntry};
use crate::directory::{self, DirCursor};
use crate::drive::BlockDevice;
use crate::error::{FatError, FatResult};
use crate::fat_table::{self, Cluster, FatValue};
use crate::object::{Filesystem, ObjectHeader};
use crate::path;
use crate::share::{AccessMode, ShareTable};
use crate::window::Window;

/// Exactly one of these three governs whether `open` may create the entry
/// (§4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateMode {
    /// Fails with `NoFile` if the entry is missing.
    MustExist,
    /// Opens the entry if present, creates it otherwise.
    OpenOrCreate,
    /// Fails with `Exist` if the entry is already present.
    MustCreate,
}

/// Builder mirroring `std::fs::OpenOptions`'s idiom, over the independent
/// read/write/append/truncate bits plus the tri-state creation mode (§4.9).
#[derive(Debug, Clone, Copy)]
pub struct OpenOptions {
    create: CreateMode,
    read: bool,
    write: bool,
    append: bool,
    truncate: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self { create: CreateMode::MustExist, read: true, write: false, append: false, truncate: false }
    }
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn read(mut self, v: bool) -> Self {
        self.read = v;
        self
    }
    pub fn write(mut self, v: bool) -> Self {
        self.write = v;
        self
    }
    pub fn append(mut self, v: bool) -> Self {
        self.append = v;
        self
    }
    pub fn truncate(mut self, v: bool) -> Self {
        self.truncate = v;
        self
    }
    pub fn create(mut self) -> Self {
        self.create = CreateMode::OpenOrCreate;
        self
    }
    pub fn create_new(mut self) -> Self {
        self.create = CreateMode::MustCreate;
        self
    }
}

/// A live file handle (§3.3). Its private sector buffer is a `Window`
/// independent of the filesystem's own — a write can touch both without one
/// evicting the other mid-call.
pub struct FileHandle {
    header: ObjectHeader,
    write: bool,
    size: u32,
    offset: u32,
    cluster_start: Cluster,
    /// Cluster holding the sector at `current_index` cluster-lengths into
    /// the file; `0` when the file has no cluster yet (empty, just opened).
    current_cluster: Cluster,
    current_index: u32,
    buf: Window,
    dir_sector: u64,
    dir_entry_offset: u32,
    modified: bool,
}

impl FileHandle {
    pub fn size(&self) -> u32 {
        self.size
    }
    pub fn offset(&self) -> u32 {
        self.offset
    }
}

fn cluster_bytes(fs: &Filesystem) -> u64 {
    directory::cluster_bytes(&fs.geom)
}

/// Open (§4.9). `path` is resolved relative to the volume root (or the
/// current directory, when set) via [`crate::path::resolve_parent`].
pub fn open<D: BlockDevice>(
    fs: &mut Filesystem,
    drive: &mut D,
    share: &mut ShareTable,
    path: &str,
    options: OpenOptions,
    mtime: u32,
    codepage: &impl CodePage,
) -> FatResult<FileHandle> {
    let lfn_enabled = cfg!(feature = "lfn");
    let resolved = path::resolve_parent(fs, drive, path, lfn_enabled, codepage)?;
    let mut cursor = resolved.cursor;

    let found = directory::dir_find(
        &mut fs.window,
        drive,
        &fs.geom,
        &mut fs.hint,
        &mut cursor,
        &resolved.canonical,
        resolved.long.as_ref().map(|l| l.as_units()),
        codepage,
    )?;

    let (entry, dir_offset_in_stream, created) = match found {
        Some(r) => {
            if options.create == CreateMode::MustCreate {
                return Err(FatError::Exist);
            }
            if r.entry.attrs.is_dir() {
                return Err(FatError::Denied);
            }
            if (options.write || options.append) && r.entry.attrs.contains(Attributes::READ_ONLY) {
                return Err(FatError::Denied);
            }
            (r.entry, r.offset, false)
        }
        None => {
            if options.create == CreateMode::MustExist {
                return Err(FatError::NoFile);
            }
            let offset = directory::dir_register(
                &mut fs.window,
                drive,
                &fs.geom,
                &mut fs.hint,
                &mut cursor,
                &resolved.canonical,
                resolved.long.as_ref().map(|l| l.as_units()),
                Attributes::ARCHIVE,
                0,
                0,
                mtime,
            )?;
            (ShortDirEntry { attrs: Attributes::ARCHIVE, ..Default::default() }, offset, true)
        }
    };

    let mode = if options.write || options.append { AccessMode::Write } else { AccessMode::Read };
    let share_idx = share.acquire(fs.logical_drive, dir_offset_in_stream, mode)?;

    directory::index_set(&mut fs.window, drive, &fs.geom, &mut cursor, dir_offset_in_stream)?;
    let dir_sector = cursor.sector;

    let mut cluster_start = entry.cluster();
    let mut size = entry.size;
    let mut modified = false;

    if !created && options.truncate && (options.write || options.append) {
        if cluster_start != 0 {
            fat_table::chain_remove(&mut fs.window, drive, &fs.geom, &mut fs.hint, cluster_start, 0, |_, _| {})?;
            cluster_start = 0;
        }
        size = 0;
        modified = true;
    }

    let header = ObjectHeader { share_idx: Some(share_idx), ..ObjectHeader::new(fs, cluster_start, entry.attrs) };

    let mut file = FileHandle {
        header,
        write: options.write || options.append,
        size,
        offset: 0,
        cluster_start,
        current_cluster: 0,
        current_index: 0,
        buf: Window::new(fs.geom.sector_size),
        dir_sector,
        dir_entry_offset: dir_offset_in_stream,
        modified,
    };

    if options.append {
        seek(fs, drive, &mut file, file.size)?;
    }

    Ok(file)
}

/// Maps a byte offset to its cluster, walking forward from the file's
/// current position when possible and restarting from `cluster_start`
/// otherwise (§4.9 "Seek"). With `stretch`, extends the chain (and, when
/// `cluster_start` is still zero, allocates the first cluster) instead of
/// failing at end-of-chain.
fn cluster_for_index<D: BlockDevice>(
    fs: &mut Filesystem,
    drive: &mut D,
    file: &mut FileHandle,
    target_index: u32,
    stretch: bool,
) -> FatResult<Cluster> {
    if target_index == file.current_index && file.current_cluster != 0 {
        return Ok(file.current_cluster);
    }

    let (mut cluster, mut index) = if file.current_cluster != 0 && target_index >= file.current_index {
        (file.current_cluster, file.current_index)
    } else if file.cluster_start != 0 {
        (file.cluster_start, 0)
    } else if stretch {
        let head = fat_table::chain_create(&mut fs.window, drive, &fs.geom, &mut fs.hint)?;
        file.cluster_start = head;
        (head, 0)
    } else {
        return Err(FatError::NoFile);
    };

    while index < target_index {
        cluster = match fat_table::get(&mut fs.window, drive, &fs.geom, cluster)? {
            FatValue::Next(n) => n,
            _ if stretch => fat_table::chain_stretch(&mut fs.window, drive, &fs.geom, &mut fs.hint, cluster)?,
            _ => return Err(FatError::NoFile),
        };
        index += 1;
    }

    file.current_cluster = cluster;
    file.current_index = index;
    Ok(cluster)
}

/// Read (§4.9): caps at `size - offset`, copies whole sectors straight from
/// the drive where possible, and falls back to the private window buffer
/// only for the partial sector at each end of the request.
pub fn read<D: BlockDevice>(fs: &mut Filesystem, drive: &mut D, file: &mut FileHandle, out: &mut [u8]) -> FatResult<usize> {
    file.header.validate(fs)?;

    let remaining_in_file = file.size.saturating_sub(file.offset) as usize;
    let want = out.len().min(remaining_in_file);
    let cb = cluster_bytes(fs);
    let mut done = 0usize;

    while done < want {
        let target_index = (file.offset as u64 / cb) as u32;
        let cluster = cluster_for_index(fs, drive, file, target_index, false)?;
        let intra_cluster = file.offset as u64 % cb;
        let sector_in_cluster = intra_cluster / fs.geom.sector_size as u64;
        let sector_lba = fs.geom.cluster_to_sector(cluster) + sector_in_cluster;
        let sector_off = (intra_cluster % fs.geom.sector_size as u64) as usize;

        let chunk = (fs.geom.sector_size - sector_off).min(want - done);

        if sector_off == 0 && chunk == fs.geom.sector_size && file.buf.current_lba() != Some(sector_lba) {
            crate::drive::io_read(drive, &mut out[done..done + chunk], sector_lba, 1)?;
        } else {
            file.buf.load(drive, sector_lba, None)?;
            file.buf.with(|buf| out[done..done + chunk].copy_from_slice(&buf[sector_off..sector_off + chunk]));
        }

        done += chunk;
        file.offset += chunk as u32;
    }

    Ok(done)
}

/// Write (§4.9): mirrors `read`'s three regimes, allocating/stretching the
/// chain on cluster boundaries and clipping at the 4 GiB ceiling.
pub fn write<D: BlockDevice>(fs: &mut Filesystem, drive: &mut D, file: &mut FileHandle, data: &[u8]) -> FatResult<usize> {
    file.header.validate(fs)?;
    if !file.write {
        return Err(FatError::Denied);
    }

    let ceiling = u32::MAX;
    let want = data.len().min((ceiling - file.offset) as usize);
    let cb = cluster_bytes(fs);
    let mut done = 0usize;

    while done < want {
        let target_index = (file.offset as u64 / cb) as u32;
        let cluster = cluster_for_index(fs, drive, file, target_index, true)?;
        let intra_cluster = file.offset as u64 % cb;
        let sector_in_cluster = intra_cluster / fs.geom.sector_size as u64;
        let sector_lba = fs.geom.cluster_to_sector(cluster) + sector_in_cluster;
        let sector_off = (intra_cluster % fs.geom.sector_size as u64) as usize;

        let chunk = (fs.geom.sector_size - sector_off).min(want - done);

        if sector_off == 0 && chunk == fs.geom.sector_size && file.buf.current_lba() != Some(sector_lba) {
            crate::drive::io_write(drive, &data[done..done + chunk], sector_lba, 1)?;
        } else {
            file.buf.load(drive, sector_lba, None)?;
            file.buf.with_mut(|buf| buf[sector_off..sector_off + chunk].copy_from_slice(&data[done..done + chunk]));
        }

        done += chunk;
        file.offset += chunk as u32;
        if file.offset > file.size {
            file.size = file.offset;
        }
    }

    if done > 0 {
        file.modified = true;
    }
    Ok(done)
}

/// Seek (§4.9): repositions `offset`, flushing and refilling the private
/// window only if the landing sector differs from what's cached. Passing
/// `target` past the current size in write mode stretches the chain ahead
/// of time so the next write lands on an already-allocated cluster.
pub fn seek<D: BlockDevice>(fs: &mut Filesystem, drive: &mut D, file: &mut FileHandle, target: u32) -> FatResult<()> {
    file.header.validate(fs)?;
    file.buf.flush(drive, None)?;

    let cb = cluster_bytes(fs);
    let target_index = (target as u64 / cb) as u32;
    if target_index > 0 || file.cluster_start != 0 {
        cluster_for_index(fs, drive, file, target_index, file.write && target > file.size)?;
    }
    file.offset = target;
    Ok(())
}

/// Sync (§4.9): flush the private window, then rewrite the directory entry
/// through the filesystem's own window.
pub fn sync<D: BlockDevice>(fs: &mut Filesystem, drive: &mut D, file: &mut FileHandle, mtime: u32) -> FatResult<()> {
    file.header.validate(fs)?;
    file.buf.flush(drive, None)?;

    if !file.modified {
        return Ok(());
    }

    let cursor =
        DirCursor { origin: directory::DirOrigin::Chain(0), offset: file.dir_entry_offset, cluster: 0, sector: file.dir_sector };
    let bytes = directory::read_entry(&mut fs.window, drive, &fs.geom, &cursor)?;
    let mut entry = ShortDirEntry::from_bytes(&bytes);
    entry.attrs = entry.attrs | Attributes::ARCHIVE;
    entry.set_cluster(file.cluster_start);
    entry.size = file.size;
    entry.modify_time = (mtime & 0xFFFF) as u16;
    entry.modify_date = (mtime >> 16) as u16;
    entry.last_access_date = 0;

    let mut out = [0u8; crate::dirent::DIR_ENTRY_SIZE];
    entry.to_bytes(&mut out);
    directory::write_entry(&mut fs.window, drive, &fs.geom, &cursor, &out)?;
    fs.window.flush(drive, Some(&fs.geom.region()))?;

    file.modified = false;
    Ok(())
}

/// Close (§4.9): sync, release the share-lock slot, consume the handle.
/// Rust's ownership already gives us the "invalidate the back-reference"
/// step for free — no caller can hold a `FileHandle` after this returns.
pub fn close<D: BlockDevice>(fs: &mut Filesystem, drive: &mut D, share: &mut ShareTable, file: FileHandle, mtime: u32) -> FatResult<()> {
    let mut file = file;
    let result = sync(fs, drive, &mut file, mtime);
    if let Some(idx) = file.header.share_idx {
        share.release(idx);
    }
    result
}

/// Truncate (§4.9): drop everything past the current offset. Works out the
/// last cluster still needed from `offset - 1` rather than trusting whatever
/// cluster happens to be cached, since `offset` itself may sit exactly on a
/// cluster boundary (in which case the cached cluster is one past the cut).
pub fn truncate<D: BlockDevice>(fs: &mut Filesystem, drive: &mut D, file: &mut FileHandle) -> FatResult<()> {
    file.header.validate(fs)?;
    if !file.write {
        return Err(FatError::Denied);
    }

    if file.offset == 0 {
        if file.cluster_start != 0 {
            fat_table::chain_remove(&mut fs.window, drive, &fs.geom, &mut fs.hint, file.cluster_start, 0, |_, _| {})?;
            file.cluster_start = 0;
            file.current_cluster = 0;
            file.current_index = 0;
        }
    } else {
        let cb = cluster_bytes(fs);
        let last_kept_index = ((file.offset - 1) as u64 / cb) as u32;
        let last_kept_cluster = cluster_for_index(fs, drive, file, last_kept_index, false)?;
        if let FatValue::Next(successor) = fat_table::get(&mut fs.window, drive, &fs.geom, last_kept_cluster)? {
            fat_table::chain_remove(&mut fs.window, drive, &fs.geom, &mut fs.hint, successor, last_kept_cluster, |_, _| {})?;
        }
    }

    file.size = file.offset;
    file.modified = true;
    Ok(())
}

/// Expand (§4.9): scans for (and, if `allocate` is true, links in) a
/// contiguous run of free clusters large enough for `size` bytes, starting
/// from the free-cluster hint.
pub fn expand<D: BlockDevice>(fs: &mut Filesystem, drive: &mut D, file: &mut FileHandle, size: u32, allocate: bool) -> FatResult<()> {
    file.header.validate(fs)?;
    if !file.write {
        return Err(FatError::Denied);
    }

    let cb = cluster_bytes(fs);
    let needed = ((size as u64 + cb - 1) / cb) as u32;
    if needed == 0 {
        return Ok(());
    }

    let origin = if fs.geom.in_range(fs.hint.last_allocated) { fs.hint.last_allocated } else { 2 };
    let mut run_start: Option<Cluster> = None;
    let mut run_len = 0u32;
    let mut cluster = origin;
    let entries_nb = fs.geom.entries_nb();

    for _ in 0..entries_nb {
        match fat_table::get(&mut fs.window, drive, &fs.geom, cluster)? {
            FatValue::Free => {
                if run_start.is_none() {
                    run_start = Some(cluster);
                }
                run_len += 1;
                if run_len == needed {
                    break;
                }
            }
            _ => {
                run_start = None;
                run_len = 0;
            }
        }
        cluster = if cluster + 1 >= entries_nb { 2 } else { cluster + 1 };
    }

    if run_len < needed {
        return Err(FatError::Denied);
    }

    if !allocate {
        return Ok(());
    }

    let start = run_start.unwrap();
    let mut prev: Option<Cluster> = None;
    let mut c = start;
    for _ in 0..needed {
        fat_table::set(&mut fs.window, drive, &fs.geom, c, FatValue::EndOfChain)?;
        if let Some(p) = prev {
            fat_table::set(&mut fs.window, drive, &fs.geom, p, FatValue::Next(c))?;
        }
        prev = Some(c);
        fs.hint.last_allocated = c;
        if fs.hint.free_count != fat_table::FreeSpaceHint::UNKNOWN {
            fs.hint.free_count -= 1;
        }
        fs.hint.info_dirty = true;
        let next = if c + 1 >= entries_nb { 2 } else { c + 1 };
        c = next;
    }

    if file.cluster_start == 0 {
        file.cluster_start = start;
    } else {
        let last_index = ((file.size.max(1) - 1) as u64 / cb) as u32;
        let tail = cluster_for_index(fs, drive, file, last_index, false)?;
        fat_table::set(&mut fs.window, drive, &fs.geom, tail, FatValue::Next(start))?;
    }

    file.modified = true;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codepage::Ascii;
    use crate::drive::{DriveStatus, IoctlCode};
    use crate::fat_table::{FatGeometry, FatType, FreeSpaceHint};

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

    fn fat32_fs() -> Filesystem {
        let geom = FatGeometry {
            fat_type: FatType::Fat32,
            fat_base: 1,
            sectors_per_fat: 8,
            num_fats: 2,
            data_base: 17,
            sectors_per_cluster: 1,
            sector_size: 512,
            total_clusters: 60,
            root_dir_base: 0,
            root_dir_sectors: 0,
            root_dir_cluster: 2,
        };
        let hint = FreeSpaceHint { last_allocated: 2, free_count: 58, info_dirty: false };
        Filesystem::new(0, geom, hint, 1)
    }

    fn mk_root<D: BlockDevice>(fs: &mut Filesystem, drive: &mut D) {
        fat_table::set(&mut fs.window, drive, &fs.geom, 2, FatValue::EndOfChain).unwrap();
    }

    #[test]
    fn create_write_close_then_reopen_reads_back_the_same_bytes() {
        let mut fs = fat32_fs();
        let mut drive = RamDisk::new(80);
        mk_root(&mut fs, &mut drive);
        let mut share = ShareTable::new();

        let mut f = open(&mut fs, &mut drive, &mut share, "A.TXT", OpenOptions::new().write(true).create(), 0, &Ascii).unwrap();
        let n = write(&mut fs, &mut drive, &mut f, b"hello, world").unwrap();
        assert_eq!(n, 12);
        close(&mut fs, &mut drive, &mut share, f, 0).unwrap();

        let mut f2 = open(&mut fs, &mut drive, &mut share, "A.TXT", OpenOptions::new().read(true), 0, &Ascii).unwrap();
        assert_eq!(f2.size(), 12);
        let mut out = [0u8; 12];
        let read_n = read(&mut fs, &mut drive, &mut f2, &mut out).unwrap();
        assert_eq!(read_n, 12);
        assert_eq!(&out, b"hello, world");
        close(&mut fs, &mut drive, &mut share, f2, 0).unwrap();
    }

    #[test]
    fn write_spanning_multiple_clusters_builds_a_chain() {
        let mut fs = fat32_fs();
        let mut drive = RamDisk::new(80);
        mk_root(&mut fs, &mut drive);
        let mut share = ShareTable::new();

        let mut f = open(&mut fs, &mut drive, &mut share, "BIG.BIN", OpenOptions::new().write(true).create(), 0, &Ascii).unwrap();
        let data = vec![0xAAu8; 512 * 3];
        let n = write(&mut fs, &mut drive, &mut f, &data).unwrap();
        assert_eq!(n, data.len());
        assert_eq!(f.size(), data.len() as u32);
        close(&mut fs, &mut drive, &mut share, f, 0).unwrap();

        let mut f2 = open(&mut fs, &mut drive, &mut share, "BIG.BIN", OpenOptions::new().read(true), 0, &Ascii).unwrap();
        let mut out = vec![0u8; data.len()];
        read(&mut fs, &mut drive, &mut f2, &mut out).unwrap();
        assert_eq!(out, data);
        close(&mut fs, &mut drive, &mut share, f2, 0).unwrap();
    }

    #[test]
    fn truncate_frees_the_dropped_tail() {
        let mut fs = fat32_fs();
        let mut drive = RamDisk::new(80);
        mk_root(&mut fs, &mut drive);
        let mut share = ShareTable::new();

        let initial_free = fs.hint.free_count;
        let mut f = open(&mut fs, &mut drive, &mut share, "T.BIN", OpenOptions::new().write(true).create(), 0, &Ascii).unwrap();
        write(&mut fs, &mut drive, &mut f, &vec![1u8; 512 * 2]).unwrap();
        assert_eq!(fs.hint.free_count, initial_free - 2);

        seek(&mut fs, &mut drive, &mut f, 10).unwrap();
        truncate(&mut fs, &mut drive, &mut f).unwrap();
        assert_eq!(f.size(), 10);
        assert_eq!(fs.hint.free_count, initial_free - 1);
        close(&mut fs, &mut drive, &mut share, f, 0).unwrap();
    }

    #[test]
    fn second_writer_is_denied_while_the_first_holds_the_entry() {
        let mut fs = fat32_fs();
        let mut drive = RamDisk::new(80);
        mk_root(&mut fs, &mut drive);
        let mut share = ShareTable::new();

        let _f = open(&mut fs, &mut drive, &mut share, "X.TXT", OpenOptions::new().write(true).create(), 0, &Ascii).unwrap();
        let second = open(&mut fs, &mut drive, &mut share, "X.TXT", OpenOptions::new().write(true), 0, &Ascii);
        assert_eq!(second.unwrap_err(), FatError::Locked);
    }

    #[test]
    fn create_new_on_an_existing_name_is_rejected() {
        let mut fs = fat32_fs();
        let mut drive = RamDisk::new(80);
        mk_root(&mut fs, &mut drive);
        let mut share = ShareTable::new();

        let f = open(&mut fs, &mut drive, &mut share, "DUP.TXT", OpenOptions::new().write(true).create(), 0, &Ascii).unwrap();
        close(&mut fs, &mut drive, &mut share, f, 0).unwrap();

        let again = open(&mut fs, &mut drive, &mut share, "DUP.TXT", OpenOptions::new().write(true).create_new(), 0, &Ascii);
        assert_eq!(again.unwrap_err(), FatError::Exist);
    }

    #[test]
    fn opening_a_missing_file_without_create_is_nofile() {
        let mut fs = fat32_fs();
        let mut drive = RamDisk::new(80);
        mk_root(&mut fs, &mut drive);
        let mut share = ShareTable::new();

        let result = open(&mut fs, &mut drive, &mut share, "NOPE.TXT", OpenOptions::new(), 0, &Ascii);
        assert_eq!(result.unwrap_err(), FatError::NoFile);
    }
}

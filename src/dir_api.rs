//! The directory API (§4.10): open/close/read/mkdir/remove/rename/chmod,
//! plus volume-label get/set.
//!
//! Grounded on `file.rs`'s handle shape (a header plus the state a call
//! needs) generalized to a directory stream, and on
//! `original_source/src/public/base/ef_remove.c`,
//! `src/public/level1/ef_rename.c`, `src/public/level1/ef_chmod.c` and
//! `src/public/label/ef_label_set.c` for the exact ordering of checks each
//! operation runs (dot/origin/read-only rejection before the share-lock
//! check, the same-entry short-circuit in rename, the attribute mask in
//! chmod, the forbidden-character set in the label setter).

use crate::codepage::CodePage;
use crate::dirent::{Attributes, ShortDirEntry, DELETED_MARK, DIR_ENTRY_SIZE, END_MARK};
use crate::directory::{self, DirCursor, DirOrigin};
use crate::drive::BlockDevice;
use crate::error::{FatError, FatResult};
use crate::fat_table::{self, Cluster, FatGeometry};
use crate::fileinfo::{self, FileInfo};
use crate::name::NameFlags;
use crate::object::{Filesystem, ObjectHeader};
use crate::pattern;
use crate::path;
use crate::share::{AccessMode, ShareTable};
use crate::window::Window;

/// Capacity of a glob pattern installed on a [`DirHandle`] via
/// [`DirHandle::set_pattern`] (§4.11): same as the long-name work area,
/// since a pattern is itself a (possibly wildcarded) name.
pub const MAX_PATTERN_UNITS: usize = 255;

/// A fixed-capacity glob pattern, no heap allocation (§4.11).
#[derive(Debug, Clone)]
pub struct Pattern {
    units: [u16; MAX_PATTERN_UNITS],
    len: usize,
}

impl Pattern {
    pub fn new(units: &[u16]) -> FatResult<Self> {
        if units.len() > MAX_PATTERN_UNITS {
            return Err(FatError::InvalidName);
        }
        let mut buf = [0u16; MAX_PATTERN_UNITS];
        buf[..units.len()].copy_from_slice(units);
        Ok(Self { units: buf, len: units.len() })
    }

    fn as_units(&self) -> &[u16] {
        &self.units[..self.len]
    }
}

/// A live directory handle (§3.4, §4.10).
pub struct DirHandle {
    header: ObjectHeader,
    cursor: DirCursor,
    pattern: Option<Pattern>,
}

impl DirHandle {
    /// Installs (or clears) the glob filter `read` applies to every
    /// subsequent call (§4.11).
    pub fn set_pattern(&mut self, pattern: Option<Pattern>) {
        self.pattern = pattern;
    }
}

fn parent_cluster_of(origin: DirOrigin) -> Cluster {
    match origin {
        DirOrigin::Chain(c) => c,
        DirOrigin::StaticRoot => 0,
    }
}

/// Open (§4.10): follows `path`, verifying the terminal entry is a
/// directory, and takes a read share-lock on its directory entry (offset 0
/// for the root, FAT32 or fixed-size alike). An empty path (or a bare
/// separator) opens the root itself, which `path::resolve_parent` cannot
/// name as a terminal segment.
pub fn open<D: BlockDevice>(
    fs: &mut Filesystem,
    drive: &mut D,
    share: &mut ShareTable,
    path: &str,
    codepage: &impl CodePage,
) -> FatResult<DirHandle> {
    let lfn_enabled = cfg!(feature = "lfn");
    let is_root = path.is_empty() || path == "/" || path == "\\";

    let (origin, dir_offset_in_stream, attrs, start_cluster) = if is_root {
        (path::root_origin(&fs.geom), 0u32, Attributes::DIRECTORY, 0 as Cluster)
    } else {
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
        match found {
            Some(r) if r.entry.attrs.contains(Attributes::DIRECTORY) => {
                (DirOrigin::Chain(r.entry.cluster()), r.offset, r.entry.attrs, r.entry.cluster())
            }
            Some(_) => return Err(FatError::Denied),
            None => return Err(FatError::NoFile),
        }
    };

    let share_idx = share.acquire(fs.logical_drive, dir_offset_in_stream, AccessMode::Read)?;
    let header = ObjectHeader { share_idx: Some(share_idx), ..ObjectHeader::new(fs, start_cluster, attrs) };
    let cursor = DirCursor::new(origin, &fs.geom);

    Ok(DirHandle { header, cursor, pattern: None })
}

/// Close (§4.10): mirrors file close minus the sync step, since a directory
/// stream is never written back through its own handle. Releases the
/// share-lock slot and consumes the handle.
pub fn close(share: &mut ShareTable, handle: DirHandle) {
    if let Some(idx) = handle.header.share_idx {
        share.release(idx);
    }
}

/// Rewinds a handle to the start of its directory stream (§4.10 "Read": a
/// fresh call with no prior position starts here too, since `DirHandle::open`
/// already leaves the cursor at offset 0).
pub fn rewind<D: BlockDevice>(fs: &mut Filesystem, drive: &mut D, handle: &mut DirHandle) -> FatResult<()> {
    handle.header.validate(fs)?;
    directory::index_set(&mut fs.window, drive, &fs.geom, &mut handle.cursor, 0)
}

/// Read (§4.10): returns one record per call, advancing by one meaningful
/// entry each time; `Ok(None)` at end of stream. A pattern installed via
/// [`DirHandle::set_pattern`] filters out non-matching entries without
/// consuming the caller's "no more entries" signal early.
pub fn read<D: BlockDevice>(
    fs: &mut Filesystem,
    drive: &mut D,
    handle: &mut DirHandle,
    codepage: &impl CodePage,
) -> FatResult<Option<FileInfo>> {
    handle.header.validate(fs)?;

    loop {
        let found = match directory::dir_read(&mut fs.window, drive, &fs.geom, &mut fs.hint, &mut handle.cursor)? {
            None => return Ok(None),
            Some(r) => r,
        };

        let info = fileinfo::decode(
            &found.entry,
            if found.has_long_name { Some(found.long_name.as_units()) } else { None },
            codepage,
        );

        if let Some(pattern) = &handle.pattern {
            if !pattern::matches(pattern.as_units(), &info.name[..info.name_len], codepage) {
                continue;
            }
        }

        return Ok(Some(info));
    }
}

fn write_dot_entry<D: BlockDevice>(
    window: &mut Window,
    drive: &mut D,
    geom: &FatGeometry,
    cursor: &mut DirCursor,
    name: [u8; 11],
    cluster: Cluster,
    mtime: u32,
) -> FatResult<()> {
    let mut entry = ShortDirEntry {
        name,
        attrs: Attributes::DIRECTORY,
        modify_time: (mtime & 0xFFFF) as u16,
        modify_date: (mtime >> 16) as u16,
        creation_time: (mtime & 0xFFFF) as u16,
        creation_date: (mtime >> 16) as u16,
        ..Default::default()
    };
    entry.set_cluster(cluster);
    let mut bytes = [0u8; DIR_ENTRY_SIZE];
    entry.to_bytes(&mut bytes);
    directory::write_entry(window, drive, geom, cursor, &bytes)
}

/// Make-directory (§4.10): registers the entry, allocates and zeros one
/// cluster, and synthesizes the two canonical dot entries before rewriting
/// the registered entry's cluster/attribute fields (done by `dir_register`
/// itself, since it already takes `attrs`/`start_cluster` as arguments).
pub fn mkdir<D: BlockDevice>(
    fs: &mut Filesystem,
    drive: &mut D,
    path: &str,
    mtime: u32,
    codepage: &impl CodePage,
) -> FatResult<()> {
    let lfn_enabled = cfg!(feature = "lfn");
    let resolved = path::resolve_parent(fs, drive, path, lfn_enabled, codepage)?;
    let mut cursor = resolved.cursor;
    let parent_cluster = parent_cluster_of(cursor.origin);

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
    if found.is_some() {
        return Err(FatError::Exist);
    }

    let new_cluster = fat_table::chain_create(&mut fs.window, drive, &fs.geom, &mut fs.hint)?;
    directory::cluster_clear(&mut fs.window, drive, &fs.geom, new_cluster)?;

    let mut dot = [b' '; 11];
    dot[0] = b'.';
    let mut dotdot = [b' '; 11];
    dotdot[0] = b'.';
    dotdot[1] = b'.';

    let mut dot_cursor = DirCursor::new(DirOrigin::Chain(new_cluster), &fs.geom);
    write_dot_entry(&mut fs.window, drive, &fs.geom, &mut dot_cursor, dot, new_cluster, mtime)?;
    directory::index_next(&mut fs.window, drive, &fs.geom, &mut fs.hint, &mut dot_cursor, false)?;
    write_dot_entry(&mut fs.window, drive, &fs.geom, &mut dot_cursor, dotdot, parent_cluster, mtime)?;

    directory::dir_register(
        &mut fs.window,
        drive,
        &fs.geom,
        &mut fs.hint,
        &mut cursor,
        &resolved.canonical,
        resolved.long.as_ref().map(|l| l.as_units()),
        Attributes::DIRECTORY,
        new_cluster,
        0,
        mtime,
    )?;

    fs.window.flush(drive, Some(&fs.geom.region()))?;
    Ok(())
}

/// Remove (§4.10): rejects dot entries, the current directory, and
/// read-only entries; for a sub-directory target, verifies it holds nothing
/// past its two dot entries before unlinking it.
pub fn remove<D: BlockDevice>(
    fs: &mut Filesystem,
    drive: &mut D,
    share: &mut ShareTable,
    path: &str,
    codepage: &impl CodePage,
) -> FatResult<()> {
    let lfn_enabled = cfg!(feature = "lfn");
    let resolved = path::resolve_parent(fs, drive, path, lfn_enabled, codepage)?;
    if resolved.canonical.flags.contains(NameFlags::DOT) {
        return Err(FatError::InvalidName);
    }

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
    )?
    .ok_or(FatError::NoFile)?;

    let target_cluster = found.entry.cluster();
    if target_cluster != 0 && target_cluster == fs.current_dir_cluster {
        return Err(FatError::Denied);
    }
    if found.entry.attrs.contains(Attributes::READ_ONLY) {
        return Err(FatError::Denied);
    }

    if found.entry.attrs.contains(Attributes::DIRECTORY) {
        let mut scan = DirCursor::new(DirOrigin::Chain(target_cluster), &fs.geom);
        directory::index_next(&mut fs.window, drive, &fs.geom, &mut fs.hint, &mut scan, false)?;
        directory::index_next(&mut fs.window, drive, &fs.geom, &mut fs.hint, &mut scan, false)?;
        if directory::dir_read(&mut fs.window, drive, &fs.geom, &mut fs.hint, &mut scan)?.is_some() {
            return Err(FatError::Denied);
        }
    }

    // A transient exclusive acquire: with no pre-existing opener the table
    // grants it unconditionally, so this only ever blocks a target someone
    // else already has open.
    let share_idx = share.acquire(fs.logical_drive, found.offset, AccessMode::Exclusive)?;
    let outcome = (|| -> FatResult<()> {
        directory::dir_remove(&mut fs.window, drive, &fs.geom, &mut fs.hint, &mut cursor, &found)?;
        if target_cluster != 0 {
            fat_table::chain_remove(&mut fs.window, drive, &fs.geom, &mut fs.hint, target_cluster, 0, |_, _| {})?;
        }
        Ok(())
    })();
    share.release(share_idx);
    outcome?;

    fs.window.flush(drive, Some(&fs.geom.region()))?;
    Ok(())
}

/// Rename (§4.10): snapshots the source entry's body, registers the
/// destination under the snapshot (preserving everything but the name),
/// rewrites a moved sub-directory's `..` entry on a true cross-directory
/// move, then removes the source.
pub fn rename<D: BlockDevice>(
    fs: &mut Filesystem,
    drive: &mut D,
    share: &mut ShareTable,
    old_path: &str,
    new_path: &str,
    mtime: u32,
    codepage: &impl CodePage,
) -> FatResult<()> {
    let lfn_enabled = cfg!(feature = "lfn");

    let old_resolved = path::resolve_parent(fs, drive, old_path, lfn_enabled, codepage)?;
    if old_resolved.canonical.flags.contains(NameFlags::DOT) {
        return Err(FatError::InvalidName);
    }
    let mut old_cursor = old_resolved.cursor;
    let old_found = directory::dir_find(
        &mut fs.window,
        drive,
        &fs.geom,
        &mut fs.hint,
        &mut old_cursor,
        &old_resolved.canonical,
        old_resolved.long.as_ref().map(|l| l.as_units()),
        codepage,
    )?
    .ok_or(FatError::NoFile)?;
    let old_parent_cluster = parent_cluster_of(old_cursor.origin);

    let mut old_bytes = [0u8; DIR_ENTRY_SIZE];
    old_found.entry.to_bytes(&mut old_bytes);

    let share_idx = share.acquire(fs.logical_drive, old_found.offset, AccessMode::Exclusive)?;
    let outcome = (|| -> FatResult<()> {
        let new_resolved = path::resolve_parent(fs, drive, new_path, lfn_enabled, codepage)?;
        if new_resolved.canonical.flags.contains(NameFlags::DOT) {
            return Err(FatError::InvalidName);
        }
        let mut new_cursor = new_resolved.cursor;
        let new_parent_cluster = parent_cluster_of(new_cursor.origin);

        let existing = directory::dir_find(
            &mut fs.window,
            drive,
            &fs.geom,
            &mut fs.hint,
            &mut new_cursor,
            &new_resolved.canonical,
            new_resolved.long.as_ref().map(|l| l.as_units()),
            codepage,
        )?;

        let same_entry = old_parent_cluster == new_parent_cluster
            && existing.as_ref().map(|r| r.offset) == Some(old_found.offset);
        if same_entry {
            return Ok(());
        }
        if existing.is_some() {
            return Err(FatError::Exist);
        }

        let mut moved = ShortDirEntry::from_bytes(&old_bytes);
        let is_dir = moved.attrs.contains(Attributes::DIRECTORY);
        if !is_dir {
            moved.attrs = moved.attrs | Attributes::ARCHIVE;
        }
        let moved_cluster = moved.cluster();

        let new_offset = directory::dir_register(
            &mut fs.window,
            drive,
            &fs.geom,
            &mut fs.hint,
            &mut new_cursor,
            &new_resolved.canonical,
            new_resolved.long.as_ref().map(|l| l.as_units()),
            moved.attrs,
            moved_cluster,
            moved.size,
            mtime,
        )?;

        // `dir_register` synthesized fresh timestamps from `mtime`; restore
        // everything the old entry carried but the name.
        let mut rewrite_cursor = new_cursor;
        directory::index_set(&mut fs.window, drive, &fs.geom, &mut rewrite_cursor, new_offset)?;
        let mut new_bytes = directory::read_entry(&mut fs.window, drive, &fs.geom, &rewrite_cursor)?;
        new_bytes[13..32].copy_from_slice(&old_bytes[13..32]);
        directory::write_entry(&mut fs.window, drive, &fs.geom, &rewrite_cursor, &new_bytes)?;

        if is_dir && old_parent_cluster != new_parent_cluster {
            let mut dotdot_cursor = DirCursor::new(DirOrigin::Chain(moved_cluster), &fs.geom);
            directory::index_next(&mut fs.window, drive, &fs.geom, &mut fs.hint, &mut dotdot_cursor, false)?;
            let mut bytes = directory::read_entry(&mut fs.window, drive, &fs.geom, &dotdot_cursor)?;
            let mut dotdot_entry = ShortDirEntry::from_bytes(&bytes);
            dotdot_entry.set_cluster(new_parent_cluster);
            dotdot_entry.to_bytes(&mut bytes);
            directory::write_entry(&mut fs.window, drive, &fs.geom, &dotdot_cursor, &bytes)?;
        }

        directory::dir_remove(&mut fs.window, drive, &fs.geom, &mut fs.hint, &mut old_cursor, &old_found)?;
        Ok(())
    })();
    share.release(share_idx);
    outcome?;

    fs.window.flush(drive, Some(&fs.geom.region()))?;
    Ok(())
}

const CHMOD_MASK: u8 = Attributes::READ_ONLY.0 | Attributes::HIDDEN.0 | Attributes::SYSTEM.0 | Attributes::ARCHIVE.0;

/// Chmod (§4.10): modifies the attribute byte under a mask restricted to
/// read-only/hidden/system/archive, leaving the directory/volume-label bits
/// untouched regardless of what the caller passed in.
pub fn chmod<D: BlockDevice>(
    fs: &mut Filesystem,
    drive: &mut D,
    path: &str,
    attrs: Attributes,
    codepage: &impl CodePage,
) -> FatResult<()> {
    let lfn_enabled = cfg!(feature = "lfn");
    let resolved = path::resolve_parent(fs, drive, path, lfn_enabled, codepage)?;
    if resolved.canonical.flags.contains(NameFlags::DOT) {
        return Err(FatError::InvalidName);
    }

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
    )?
    .ok_or(FatError::NoFile)?;

    directory::index_set(&mut fs.window, drive, &fs.geom, &mut cursor, found.offset)?;
    let mut bytes = directory::read_entry(&mut fs.window, drive, &fs.geom, &cursor)?;
    let existing = bytes[11];
    bytes[11] = (attrs.0 & CHMOD_MASK) | (existing & !CHMOD_MASK);
    directory::write_entry(&mut fs.window, drive, &fs.geom, &cursor, &bytes)?;

    fs.window.flush(drive, Some(&fs.geom.region()))?;
    Ok(())
}

/// Capacity of the raw 11-byte volume-label field (§4.10).
pub const LABEL_CAPACITY: usize = 11;
const LABEL_BAD_CHARS: &[u8] = b"+.,;=[]/\\\"*:<>?|\x7F";

/// Scans the root directory for a volume-label entry (attribute byte
/// `VOLUME_ID`, not an LFN slot — the two share a bit, so both checks are
/// needed). Unlike `dir_read`, this cannot use the shared walk: that walk
/// exists specifically to skip label entries.
fn find_label_entry<D: BlockDevice>(fs: &mut Filesystem, drive: &mut D) -> FatResult<Option<DirCursor>> {
    let mut cursor = DirCursor::new(path::root_origin(&fs.geom), &fs.geom);
    loop {
        let bytes = directory::read_entry(&mut fs.window, drive, &fs.geom, &cursor)?;
        match bytes[0] {
            END_MARK => return Ok(None),
            DELETED_MARK => {}
            _ => {
                let attrs = Attributes(bytes[11]);
                if attrs.contains(Attributes::VOLUME_ID) && !attrs.is_lfn_slot() {
                    return Ok(Some(cursor));
                }
            }
        }
        match directory::index_next(&mut fs.window, drive, &fs.geom, &mut fs.hint, &mut cursor, false) {
            Ok(()) => {}
            Err(FatError::NoFile) => return Ok(None),
            Err(e) => return Err(e),
        }
    }
}

/// Label get (§4.10): the raw 11-byte field, space-trimmed, or an empty
/// result when no label entry exists.
pub fn label_get<D: BlockDevice>(fs: &mut Filesystem, drive: &mut D) -> FatResult<([u8; LABEL_CAPACITY], usize)> {
    match find_label_entry(fs, drive)? {
        None => Ok(([b' '; LABEL_CAPACITY], 0)),
        Some(cursor) => {
            let bytes = directory::read_entry(&mut fs.window, drive, &fs.geom, &cursor)?;
            let mut name = [0u8; LABEL_CAPACITY];
            name.copy_from_slice(&bytes[0..11]);
            let len = name.iter().rposition(|&b| b != b' ').map(|i| i + 1).unwrap_or(0);
            Ok((name, len))
        }
    }
}

/// Label set (§4.10): upper-folds `label` through the code page into the
/// 11-byte field, rejecting the forbidden-punctuation set; an empty label
/// deletes the existing entry instead of writing one.
pub fn label_set<D: BlockDevice>(
    fs: &mut Filesystem,
    drive: &mut D,
    label: &[u16],
    mtime: u32,
    codepage: &impl CodePage,
) -> FatResult<()> {
    let mut buf = [b' '; LABEL_CAPACITY];
    let mut len = 0usize;

    for &u in label {
        if len >= LABEL_CAPACITY {
            return Err(FatError::InvalidName);
        }
        let folded = codepage.upper_fold(u as u32);
        let oem = codepage.unicode_to_oem(folded).ok_or(FatError::InvalidName)?;
        if oem > 0xFF {
            return Err(FatError::InvalidName);
        }
        let byte = oem as u8;
        if LABEL_BAD_CHARS.contains(&byte) {
            return Err(FatError::InvalidName);
        }
        buf[len] = byte;
        len += 1;
    }

    while len > 0 && buf[len - 1] == b' ' {
        len -= 1;
    }
    if buf[0] == DELETED_MARK {
        return Err(FatError::InvalidName);
    }

    match find_label_entry(fs, drive)? {
        Some(cursor) => {
            let mut bytes = directory::read_entry(&mut fs.window, drive, &fs.geom, &cursor)?;
            if len == 0 {
                bytes[0] = DELETED_MARK;
            } else {
                bytes[0..11].copy_from_slice(&buf);
            }
            directory::write_entry(&mut fs.window, drive, &fs.geom, &cursor, &bytes)?;
        }
        None => {
            if len == 0 {
                return Ok(());
            }
            let mut cursor = DirCursor::new(path::root_origin(&fs.geom), &fs.geom);
            let offset = directory::allocate(&mut fs.window, drive, &fs.geom, &mut fs.hint, &mut cursor, 1)?;
            directory::index_set(&mut fs.window, drive, &fs.geom, &mut cursor, offset)?;

            let entry = ShortDirEntry {
                name: buf,
                attrs: Attributes::VOLUME_ID,
                modify_time: (mtime & 0xFFFF) as u16,
                modify_date: (mtime >> 16) as u16,
                creation_time: (mtime & 0xFFFF) as u16,
                creation_date: (mtime >> 16) as u16,
                ..Default::default()
            };
            let mut bytes = [0u8; DIR_ENTRY_SIZE];
            entry.to_bytes(&mut bytes);
            directory::write_entry(&mut fs.window, drive, &fs.geom, &cursor, &bytes)?;
        }
    }

    fs.window.flush(drive, Some(&fs.geom.region()))?;
    Ok(())
}

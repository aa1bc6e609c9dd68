//! The directory engine (§4.5): index_set/index_next, cluster_clear,
//! allocate, dir_read/dir_find/dir_register/dir_remove, with LFN
//! slot-chain integration.
//!
//! Grounded on the teacher's `fat/dir.rs` `DirIter` (entry-at-a-time walk
//! over a cluster chain) generalized to also cover the FAT12/16 fixed-size
//! root, and on `original_source/inc/private/ef_prv_directory.h` /
//! `ef_prv_dirfunc_vfat.c` for the LFN-aware read/find/register/remove
//! semantics the teacher's iterator never implemented.

use crate::codepage::CodePage;
use crate::dirent::{
    short_name_checksum, Attributes, ShortDirEntry, DELETED_MARK, DIR_ENTRY_SIZE, END_MARK, ESCAPED_E5, LfnSlot,
    LFN_LAST_SLOT, LFN_UNITS_PER_SLOT,
};
use crate::error::{FatError, FatResult};
use crate::fat_table::{self, Cluster, FatGeometry, FatValue, FreeSpaceHint};
use crate::name::{self, CanonicalName, LongNameBuf, NameFlags};
use crate::window::Window;
use crate::drive::BlockDevice;

/// Hard ceiling on a directory stream's size (§4.5): 65 536 entries.
pub const MAX_DIR_ENTRIES: u32 = 65_536;
pub const MAX_DIR_BYTES: u32 = MAX_DIR_ENTRIES * DIR_ENTRY_SIZE as u32;

/// Where a directory stream lives (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirOrigin {
    /// The fixed-size FAT12/16 root: a contiguous run of sectors, no chain.
    StaticRoot,
    /// A cluster chain: the FAT32 root, or any subdirectory, starting here.
    Chain(Cluster),
}

/// Current position inside a directory stream (§3.4).
#[derive(Debug, Clone, Copy)]
pub struct DirCursor {
    pub origin: DirOrigin,
    pub offset: u32,
    pub cluster: Cluster,
    pub sector: u64,
}

impl DirCursor {
    /// Positions the cursor at offset 0 of `origin` (§4.5). Takes `geom`
    /// rather than deferring to a later `index_set` because `dir_read`/
    /// `dir_find` read `cursor.sector` directly on their very first
    /// iteration, before any `index_next`/`index_set` call could fix it up.
    pub fn new(origin: DirOrigin, geom: &FatGeometry) -> Self {
        let (cluster, sector) = match origin {
            DirOrigin::Chain(start) => (start, geom.cluster_to_sector(start)),
            DirOrigin::StaticRoot => (0, geom.root_dir_base),
        };
        Self { origin, offset: 0, cluster, sector }
    }
}

pub(crate) fn cluster_bytes(geom: &FatGeometry) -> u64 {
    geom.sector_size as u64 * geom.sectors_per_cluster as u64
}

/// `index_set(offset)` (§4.5).
pub fn index_set<D: BlockDevice>(
    window: &mut Window,
    drive: &mut D,
    geom: &FatGeometry,
    cursor: &mut DirCursor,
    offset: u32,
) -> FatResult<()> {
    match cursor.origin {
        DirOrigin::StaticRoot => {
            let total = geom.root_dir_sectors as u64 * geom.sector_size as u64;
            if offset as u64 >= total {
                return Err(FatError::NoFile);
            }
            cursor.offset = offset;
            cursor.sector = geom.root_dir_base + offset as u64 / geom.sector_size as u64;
            Ok(())
        }
        DirOrigin::Chain(start) => {
            let cb = cluster_bytes(geom);
            let cluster_index = offset as u64 / cb;
            let mut c = start;
            for _ in 0..cluster_index {
                match fat_table::get(window, drive, geom, c)? {
                    FatValue::Next(n) => c = n,
                    _ => return Err(FatError::NoFile),
                }
            }
            cursor.cluster = c;
            cursor.offset = offset;
            cursor.sector = geom.cluster_to_sector(c) + (offset as u64 % cb) / geom.sector_size as u64;
            Ok(())
        }
    }
}

/// `index_next(stretch)` (§4.5).
pub fn index_next<D: BlockDevice>(
    window: &mut Window,
    drive: &mut D,
    geom: &FatGeometry,
    hint: &mut FreeSpaceHint,
    cursor: &mut DirCursor,
    stretch: bool,
) -> FatResult<()> {
    let new_offset = cursor.offset + DIR_ENTRY_SIZE as u32;

    match cursor.origin {
        DirOrigin::StaticRoot => {
            let total = geom.root_dir_sectors as u64 * geom.sector_size as u64;
            if new_offset as u64 >= total {
                return Err(FatError::NoFile);
            }
            cursor.offset = new_offset;
            cursor.sector = geom.root_dir_base + new_offset as u64 / geom.sector_size as u64;
            Ok(())
        }
        DirOrigin::Chain(_) => {
            let cb = cluster_bytes(geom);

            if new_offset as u64 % cb == 0 {
                if new_offset >= MAX_DIR_BYTES {
                    return Err(FatError::Denied);
                }
                let next = match fat_table::get(window, drive, geom, cursor.cluster)? {
                    FatValue::Next(n) => n,
                    _ if stretch => {
                        let n = fat_table::chain_stretch(window, drive, geom, hint, cursor.cluster)?;
                        cluster_clear(window, drive, geom, n)?;
                        n
                    }
                    _ => return Err(FatError::NoFile),
                };
                cursor.cluster = next;
                cursor.sector = geom.cluster_to_sector(next);
            } else if new_offset as u64 % geom.sector_size as u64 == 0 {
                cursor.sector += 1;
            }

            cursor.offset = new_offset;
            Ok(())
        }
    }
}

/// `cluster_clear(cluster)` (§4.5).
pub fn cluster_clear<D: BlockDevice>(
    window: &mut Window,
    drive: &mut D,
    geom: &FatGeometry,
    cluster: Cluster,
) -> FatResult<()> {
    let base = geom.cluster_to_sector(cluster);
    let region = geom.region();
    for i in 0..geom.sectors_per_cluster as u64 {
        window.load(drive, base + i, Some(&region))?;
        window.with_mut(|buf| buf.iter_mut().for_each(|b| *b = 0));
    }
    Ok(())
}

pub(crate) fn read_entry<D: BlockDevice>(
    window: &mut Window,
    drive: &mut D,
    geom: &FatGeometry,
    cursor: &DirCursor,
) -> FatResult<[u8; DIR_ENTRY_SIZE]> {
    window.load(drive, cursor.sector, Some(&geom.region()))?;
    let off = (cursor.offset as usize) % geom.sector_size;
    let mut out = [0u8; DIR_ENTRY_SIZE];
    window.with(|buf| out.copy_from_slice(&buf[off..off + DIR_ENTRY_SIZE]));
    Ok(out)
}

pub(crate) fn write_entry<D: BlockDevice>(
    window: &mut Window,
    drive: &mut D,
    geom: &FatGeometry,
    cursor: &DirCursor,
    bytes: &[u8; DIR_ENTRY_SIZE],
) -> FatResult<()> {
    window.load(drive, cursor.sector, Some(&geom.region()))?;
    let off = (cursor.offset as usize) % geom.sector_size;
    window.with_mut(|buf| buf[off..off + DIR_ENTRY_SIZE].copy_from_slice(bytes));
    Ok(())
}

/// `allocate(n)` (§4.5): finds (or creates, via stretch) a run of `n`
/// consecutive free/deleted entries and returns its starting offset.
pub fn allocate<D: BlockDevice>(
    window: &mut Window,
    drive: &mut D,
    geom: &FatGeometry,
    hint: &mut FreeSpaceHint,
    cursor: &mut DirCursor,
    n: u32,
) -> FatResult<u32> {
    index_set(window, drive, geom, cursor, 0)?;

    let mut run_start = 0u32;
    let mut run_len = 0u32;

    loop {
        let first_byte = read_entry(window, drive, geom, cursor)?[0];

        if first_byte == END_MARK || first_byte == DELETED_MARK {
            if run_len == 0 {
                run_start = cursor.offset;
            }
            run_len += 1;
            if run_len == n {
                return Ok(run_start);
            }
        } else {
            run_len = 0;
        }

        match index_next(window, drive, geom, hint, cursor, true) {
            Ok(()) => {}
            Err(FatError::NoFile) => return Err(FatError::Denied),
            Err(e) => return Err(e),
        }
    }
}

/// One entry surfaced by [`dir_read`]/[`dir_find`]: the short-name entry
/// plus its long name (if an intact LFN block preceded it).
pub struct DirReadResult {
    pub offset: u32,
    pub lfn_block_start: Option<u32>,
    pub entry: ShortDirEntry,
    pub long_name: LongNameBuf,
    pub has_long_name: bool,
}

/// `dir_read` / the shared walk behind `dir_find` (§4.5): skips deleted
/// entries, LFN slots (collected into the work buffer), and volume-label
/// entries; stops at the first real entry, or returns `Ok(None)` at `0x00`.
pub fn dir_read<D: BlockDevice>(
    window: &mut Window,
    drive: &mut D,
    geom: &FatGeometry,
    hint: &mut FreeSpaceHint,
    cursor: &mut DirCursor,
) -> FatResult<Option<DirReadResult>> {
    let mut lfn_units = [0u16; 20 * LFN_UNITS_PER_SLOT];
    let mut expected_order: Option<u8> = None;
    let mut lfn_checksum: Option<u8> = None;
    let mut lfn_block_start: Option<u32> = None;
    let mut lfn_slot_count: u8 = 0;

    loop {
        let bytes = read_entry(window, drive, geom, cursor)?;
        let first = bytes[0];

        if first == END_MARK {
            return Ok(None);
        }

        if first == DELETED_MARK {
            expected_order = None;
            lfn_checksum = None;
            lfn_block_start = None;
            index_next(window, drive, geom, hint, cursor, false)?;
            continue;
        }

        let attrs = Attributes(bytes[11]);

        if attrs.is_lfn_slot() {
            let slot = LfnSlot::from_bytes(&bytes);
            let consistent = match expected_order {
                None => slot.is_last(),
                Some(exp) => !slot.is_last() && slot.index() == exp - 1 && lfn_checksum == Some(slot.checksum),
            };

            if consistent {
                if slot.is_last() {
                    lfn_slot_count = slot.index();
                    lfn_checksum = Some(slot.checksum);
                    lfn_block_start = Some(cursor.offset);
                }
                let base = (slot.index() as usize - 1) * LFN_UNITS_PER_SLOT;
                lfn_units[base..base + LFN_UNITS_PER_SLOT].copy_from_slice(&slot.units);
                expected_order = Some(slot.index());
            } else {
                // Order/checksum break: discard whatever was collected so far
                // and restart collection from this slot if it's a last-slot.
                log::warn!("discarding broken LFN chain at directory offset {}", cursor.offset);
                expected_order = None;
                lfn_checksum = None;
                lfn_block_start = None;
                if slot.is_last() {
                    lfn_slot_count = slot.index();
                    lfn_checksum = Some(slot.checksum);
                    lfn_block_start = Some(cursor.offset);
                    let base = (slot.index() as usize - 1) * LFN_UNITS_PER_SLOT;
                    lfn_units[base..base + LFN_UNITS_PER_SLOT].copy_from_slice(&slot.units);
                    expected_order = Some(slot.index());
                }
            }

            index_next(window, drive, geom, hint, cursor, false)?;
            continue;
        }

        if attrs.contains(Attributes::VOLUME_ID) {
            expected_order = None;
            lfn_checksum = None;
            lfn_block_start = None;
            index_next(window, drive, geom, hint, cursor, false)?;
            continue;
        }

        let entry = ShortDirEntry::from_bytes(&bytes);
        let mut name_for_checksum = entry.name;
        if name_for_checksum[0] == ESCAPED_E5 {
            name_for_checksum[0] = DELETED_MARK;
        }

        let has_long_name = expected_order == Some(1) && lfn_checksum == Some(short_name_checksum(&name_for_checksum));

        let mut long_name = LongNameBuf::default();
        if has_long_name {
            let total = lfn_slot_count as usize * LFN_UNITS_PER_SLOT;
            let mut len = lfn_units[..total].iter().position(|&u| u == 0).unwrap_or(total);
            while len > 0 && lfn_units[len - 1] == 0xFFFF {
                len -= 1;
            }
            for &u in &lfn_units[..len] {
                long_name.push_for_read(u);
            }
        }

        let result = DirReadResult {
            offset: cursor.offset,
            lfn_block_start: if has_long_name { lfn_block_start } else { None },
            entry,
            long_name,
            has_long_name,
        };

        index_next(window, drive, geom, hint, cursor, false)?;
        return Ok(Some(result));
    }
}

fn units_eq_ci(a: &[u16], b: &[u16], codepage: &impl CodePage) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(&x, &y)| codepage.upper_fold(x as u32) == codepage.upper_fold(y as u32))
}

/// `dir_find` (§4.5): walks like `dir_read`, matching each candidate
/// against `canonical`/`long_name`.
pub fn dir_find<D: BlockDevice>(
    window: &mut Window,
    drive: &mut D,
    geom: &FatGeometry,
    hint: &mut FreeSpaceHint,
    cursor: &mut DirCursor,
    canonical: &CanonicalName,
    long_name: Option<&[u16]>,
    codepage: &impl CodePage,
) -> FatResult<Option<DirReadResult>> {
    loop {
        match dir_read(window, drive, geom, hint, cursor)? {
            None => return Ok(None),
            Some(r) => {
                let matched = match long_name {
                    Some(target) => r.has_long_name && units_eq_ci(r.long_name.as_units(), target, codepage),
                    None => !canonical.flags.contains(NameFlags::LOSS) && r.entry.name == canonical.short,
                };
                if matched {
                    return Ok(Some(r));
                }
            }
        }
    }
}

/// `dir_register` (§4.5): allocates and writes an LFN block (if needed)
/// followed by the short-name entry, retrying with a numeric-tail variant
/// of the short name on collision.
pub fn dir_register<D: BlockDevice>(
    window: &mut Window,
    drive: &mut D,
    geom: &FatGeometry,
    hint: &mut FreeSpaceHint,
    cursor: &mut DirCursor,
    canonical: &CanonicalName,
    long_name: Option<&[u16]>,
    attrs: Attributes,
    start_cluster: Cluster,
    size: u32,
    mtime: u32,
) -> FatResult<u32> {
    let long = match long_name {
        Some(l) => l,
        None => {
            if short_name_collides(window, drive, geom, hint, cursor.origin, canonical.short)? {
                return Err(FatError::Exist);
            }
            let offset = allocate(window, drive, geom, hint, cursor, 1)?;
            index_set(window, drive, geom, cursor, offset)?;
            write_short_entry(window, drive, geom, cursor, &canonical.short, attrs, start_cluster, size, mtime)?;
            return Ok(offset);
        }
    };

    let slots = name::lfn_slots_needed(long.len()) as u32 + 1;

    for seq in 1..100u32 {
        let short = if seq == 1 {
            canonical.short
        } else {
            let mut body = [0u8; 8];
            body.copy_from_slice(&canonical.short[..8]);
            let tailed = name::numeric_tail(&body, seq - 1, long);
            let mut s = canonical.short;
            s[..8].copy_from_slice(&tailed);
            s
        };

        if short_name_collides(window, drive, geom, hint, cursor.origin, short)? {
            continue;
        }

        let offset = allocate(window, drive, geom, hint, cursor, slots)?;
        let checksum = short_name_checksum(&short);

        // Write LFN slots in storage order: highest index first.
        let lfn_slot_count = slots - 1;
        for i in 0..lfn_slot_count {
            let order = lfn_slot_count - i;
            let mut units = [0xFFFFu16; LFN_UNITS_PER_SLOT];
            let base = (order as usize - 1) * LFN_UNITS_PER_SLOT;
            for (j, slot) in units.iter_mut().enumerate() {
                let idx = base + j;
                *slot = if idx < long.len() {
                    long[idx]
                } else if idx == long.len() {
                    0x0000
                } else {
                    0xFFFF
                };
            }
            let order_byte = if order == lfn_slot_count { order as u8 | LFN_LAST_SLOT } else { order as u8 };
            let slot = LfnSlot { order: order_byte, checksum, units };
            let mut bytes = [0u8; DIR_ENTRY_SIZE];
            slot.to_bytes(&mut bytes);

            index_set(window, drive, geom, cursor, offset + i * DIR_ENTRY_SIZE as u32)?;
            write_entry(window, drive, geom, cursor, &bytes)?;
        }

        let short_offset = offset + lfn_slot_count * DIR_ENTRY_SIZE as u32;
        index_set(window, drive, geom, cursor, short_offset)?;
        write_short_entry(window, drive, geom, cursor, &short, attrs, start_cluster, size, mtime)?;

        return Ok(short_offset);
    }

    Err(FatError::Denied)
}

fn write_short_entry<D: BlockDevice>(
    window: &mut Window,
    drive: &mut D,
    geom: &FatGeometry,
    cursor: &DirCursor,
    name: &[u8; 11],
    attrs: Attributes,
    start_cluster: Cluster,
    size: u32,
    mtime: u32,
) -> FatResult<()> {
    let mut entry = ShortDirEntry {
        name: *name,
        attrs,
        size,
        modify_time: (mtime & 0xFFFF) as u16,
        modify_date: (mtime >> 16) as u16,
        creation_time: (mtime & 0xFFFF) as u16,
        creation_date: (mtime >> 16) as u16,
        ..Default::default()
    };
    if entry.name[0] == DELETED_MARK {
        entry.name[0] = ESCAPED_E5;
    }
    entry.set_cluster(start_cluster);

    let mut bytes = [0u8; DIR_ENTRY_SIZE];
    entry.to_bytes(&mut bytes);
    write_entry(window, drive, geom, cursor, &bytes)
}


fn short_name_collides<D: BlockDevice>(
    window: &mut Window,
    drive: &mut D,
    geom: &FatGeometry,
    hint: &mut FreeSpaceHint,
    origin: DirOrigin,
    short: [u8; 11],
) -> FatResult<bool> {
    let mut scan = DirCursor::new(origin, geom);
    loop {
        match dir_read(window, drive, geom, hint, &mut scan)? {
            None => return Ok(false),
            Some(r) if r.entry.name == short => return Ok(true),
            Some(_) => {}
        }
    }
}

/// `dir_remove` (§4.5): marks every entry of an LFN block (if present)
/// through the short-name entry itself as deleted.
pub fn dir_remove<D: BlockDevice>(
    window: &mut Window,
    drive: &mut D,
    geom: &FatGeometry,
    hint: &mut FreeSpaceHint,
    cursor: &mut DirCursor,
    found: &DirReadResult,
) -> FatResult<()> {
    let start = found.lfn_block_start.unwrap_or(found.offset);
    let mut offset = start;

    loop {
        index_set(window, drive, geom, cursor, offset)?;
        let mut bytes = read_entry(window, drive, geom, cursor)?;
        bytes[0] = DELETED_MARK;
        write_entry(window, drive, geom, cursor, &bytes)?;

        if offset == found.offset {
            break;
        }
        offset += DIR_ENTRY_SIZE as u32;
    }

    Ok(())
}

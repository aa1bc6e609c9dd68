//! The share-lock table (§4.12): one process-wide, compile-time-bounded
//! table of `{filesystem slot, directory offset} -> open-count` entries
//! enforcing FAT's open-file sharing policy.
//!
//! Has no teacher analogue; grounded on §4.12 directly and sized with
//! [`crate::util::bitmap::BitMap`] for occupancy tracking, the same way the
//! volume registry (§4.13) tracks its mounted slots.

use crate::error::{FatError, FatResult};
use crate::util::bitmap::BitMap;

/// How a handle wants to touch the entry it is opening (§4.12).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
    /// Delete or rename: requires the entry to have exactly one opener
    /// (itself).
    Exclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct ShareEntry {
    fs_slot: u8,
    dir_offset: u32,
    write_held: bool,
    open_count: u32,
}

/// Bounded table: at most 16 concurrently open/shared entries across every
/// mounted volume. Sized to match [`crate::registry::MAX_VOLUMES`] times a
/// handful of opens per volume; callers who need more get `TooManyOpenFiles`.
pub const MAX_SHARE_LOCKS: usize = 16;
const SHARE_BYTES: usize = (MAX_SHARE_LOCKS + 7) / 8;

pub struct ShareTable {
    occupied: BitMap<MAX_SHARE_LOCKS, SHARE_BYTES>,
    entries: [ShareEntry; MAX_SHARE_LOCKS],
}

impl Default for ShareTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ShareTable {
    pub fn new() -> Self {
        Self { occupied: BitMap::new(), entries: [ShareEntry::default(); MAX_SHARE_LOCKS] }
    }

    fn find(&self, fs_slot: u8, dir_offset: u32) -> Option<usize> {
        (0..MAX_SHARE_LOCKS).find(|&i| {
            self.occupied.get(i).unwrap_or(false)
                && self.entries[i].fs_slot == fs_slot
                && self.entries[i].dir_offset == dir_offset
        })
    }

    /// Registers an open against `(fs_slot, dir_offset)` under `mode`,
    /// enforcing the sharing policy (§4.12):
    /// - `Write` requires no existing openers at all.
    /// - `Read` requires no existing write holder.
    /// - `Exclusive` (delete/rename) requires exactly one existing opener
    ///   (the caller's own).
    ///
    /// Returns the table index to hand back to the caller's object handle
    /// and to pass to [`ShareTable::release`] on close.
    pub fn acquire(&mut self, fs_slot: u8, dir_offset: u32, mode: AccessMode) -> FatResult<usize> {
        match self.find(fs_slot, dir_offset) {
            Some(idx) => {
                let entry = &self.entries[idx];
                match mode {
                    AccessMode::Write => {
                        if entry.open_count > 0 {
                            return Err(FatError::Locked);
                        }
                    }
                    AccessMode::Read => {
                        if entry.write_held {
                            return Err(FatError::Locked);
                        }
                    }
                    AccessMode::Exclusive => {
                        if entry.open_count != 1 {
                            return Err(FatError::Locked);
                        }
                    }
                }
                self.entries[idx].open_count += 1;
                if mode == AccessMode::Write {
                    self.entries[idx].write_held = true;
                }
                Ok(idx)
            }
            None => {
                let idx = self.occupied.next_empty_bit().map_err(|()| FatError::TooManyOpenFiles)?;
                self.occupied.set(idx, true).unwrap();
                self.entries[idx] = ShareEntry {
                    fs_slot,
                    dir_offset,
                    write_held: mode == AccessMode::Write,
                    open_count: 1,
                };
                Ok(idx)
            }
        }
    }

    /// Releases one opener from slot `idx`. Frees the slot entirely once the
    /// open count reaches zero.
    pub fn release(&mut self, idx: usize) {
        if !self.occupied.get(idx).unwrap_or(false) {
            return;
        }
        let entry = &mut self.entries[idx];
        entry.open_count = entry.open_count.saturating_sub(1);
        if entry.open_count == 0 {
            entry.write_held = false;
            self.occupied.set(idx, false).unwrap();
            self.entries[idx] = ShareEntry::default();
        }
    }

    /// Empties every entry belonging to `fs_slot` (§4.13: "unmount clears the
    /// slot"). Called on unmount so stale locks never survive a remount.
    pub fn clear_filesystem(&mut self, fs_slot: u8) {
        for i in 0..MAX_SHARE_LOCKS {
            if self.occupied.get(i).unwrap_or(false) && self.entries[i].fs_slot == fs_slot {
                self.occupied.set(i, false).unwrap();
                self.entries[i] = ShareEntry::default();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_writer_is_locked_out() {
        let mut t = ShareTable::new();
        let _a = t.acquire(0, 32, AccessMode::Write).unwrap();
        assert_eq!(t.acquire(0, 32, AccessMode::Write).unwrap_err(), FatError::Locked);
    }

    #[test]
    fn reader_locked_out_while_write_held() {
        let mut t = ShareTable::new();
        let _a = t.acquire(0, 32, AccessMode::Write).unwrap();
        assert_eq!(t.acquire(0, 32, AccessMode::Read).unwrap_err(), FatError::Locked);
    }

    #[test]
    fn multiple_readers_coexist() {
        let mut t = ShareTable::new();
        let a = t.acquire(0, 32, AccessMode::Read).unwrap();
        let b = t.acquire(0, 32, AccessMode::Read).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn exclusive_requires_sole_opener() {
        let mut t = ShareTable::new();
        let _a = t.acquire(0, 32, AccessMode::Read).unwrap();
        let _b = t.acquire(0, 32, AccessMode::Read).unwrap();
        assert_eq!(t.acquire(0, 32, AccessMode::Exclusive).unwrap_err(), FatError::Locked);
    }

    #[test]
    fn release_frees_the_slot_for_reuse() {
        let mut t = ShareTable::new();
        let idx = t.acquire(0, 32, AccessMode::Write).unwrap();
        t.release(idx);
        // A second writer can now take the same entry.
        t.acquire(0, 32, AccessMode::Write).unwrap();
    }

    #[test]
    fn clear_filesystem_drops_only_its_own_entries() {
        let mut t = ShareTable::new();
        t.acquire(0, 32, AccessMode::Read).unwrap();
        t.acquire(1, 64, AccessMode::Read).unwrap();
        t.clear_filesystem(0);
        // fs 0's entry is gone, so a write can now be acquired on it.
        t.acquire(0, 32, AccessMode::Write).unwrap();
        // fs 1's entry survives and still blocks a second writer.
        assert_eq!(t.acquire(1, 64, AccessMode::Write).unwrap_err(), FatError::Locked);
    }

    #[test]
    fn table_is_full_once_every_slot_is_used() {
        let mut t = ShareTable::new();
        for i in 0..MAX_SHARE_LOCKS as u32 {
            t.acquire(0, i * 32, AccessMode::Read).unwrap();
        }
        assert_eq!(t.acquire(0, 9999, AccessMode::Read).unwrap_err(), FatError::TooManyOpenFiles);
    }
}

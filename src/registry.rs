//! The volume registry (§4.13): a bounded array of mount slots addressed by
//! drive letter, plus the mount/unmount lifecycle and current-drive
//! tracking that every path lookup (`path::resolve_parent`, §6.6) sits on
//! top of.
//!
//! Has no direct teacher analogue — the teacher's `fat/mod.rs` only ever
//! mounted a single implicit `FatFs<S>` over one partition number — but the
//! one-volume-at-a-time shape of `FatFs::mount` is kept as the grounding for
//! `mount`'s own signature (drive + partition in, a freshly derived
//! filesystem out). The slot count and drive-letter-to-index arithmetic
//! follow `original_source/inc/private/ef_prv_volume_nb.h`.

use crate::drive::BlockDevice;
use crate::error::{FatError, FatResult};
use crate::mount;
use crate::mutex::{Mutex, MutexInterface};
use crate::object::Filesystem;
use crate::share::ShareTable;

/// Numbered slots available for mounting (§4.13). `A:`..`A:+MAX_VOLUMES-1:`
/// are the only drive letters `parse_drive_letter` will accept.
pub const MAX_VOLUMES: usize = 4;

/// Splits a leading `X:` drive-letter prefix off `path` (§6.6). `X` may be
/// either case. Returns `None` when there is no such prefix, in which case
/// the caller falls back to the current drive (or slot 0).
pub fn parse_drive_letter(path: &str) -> Option<(u8, &str)> {
    let bytes = path.as_bytes();
    if bytes.len() < 2 || bytes[1] != b':' {
        return None;
    }
    let letter = match bytes[0] {
        b'A'..=b'Z' => bytes[0] - b'A',
        b'a'..=b'z' => bytes[0] - b'a',
        _ => return None,
    };
    Some((letter, &path[2..]))
}

/// One numbered mount slot: `None` while unmounted, behind its own sync
/// object so one volume's traffic never contends with another's (§5).
pub struct Registry {
    slots: [Mutex<Option<Filesystem>>; MAX_VOLUMES],
    /// Bumped on every successful mount, across every slot, so two mounts of
    /// the same slot number never share a generation (§3.2, §9).
    mount_counter: u32,
    /// Used when a path carries no `X:` prefix and relative paths are
    /// enabled (§6.6); slot 0 otherwise.
    current_drive: u8,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            slots: [Mutex::new(None), Mutex::new(None), Mutex::new(None), Mutex::new(None)],
            mount_counter: 0,
            current_drive: 0,
        }
    }

    fn check_drive(drive_num: u8) -> FatResult<usize> {
        let idx = drive_num as usize;
        if idx >= MAX_VOLUMES {
            return Err(FatError::InvalidDrive);
        }
        Ok(idx)
    }

    pub fn current_drive(&self) -> u8 {
        self.current_drive
    }

    pub fn set_current_drive(&mut self, drive_num: u8) -> FatResult<()> {
        Self::check_drive(drive_num)?;
        self.current_drive = drive_num;
        Ok(())
    }

    /// Resolves a path's target drive (§6.6): an explicit `X:` prefix wins;
    /// otherwise the current drive. Never consults relative-path state
    /// beyond that — `.`/`..` handling is `path::resolve_parent`'s job.
    pub fn resolve_drive<'a>(&self, path: &'a str) -> FatResult<(u8, &'a str)> {
        match parse_drive_letter(path) {
            Some((drive_num, rest)) => {
                Self::check_drive(drive_num)?;
                Ok((drive_num, rest))
            }
            None => Ok((self.current_drive, path)),
        }
    }

    pub fn is_mounted(&self, drive_num: u8) -> bool {
        match Self::check_drive(drive_num) {
            Ok(idx) => self.slots[idx].cs(|slot| slot.is_some()),
            Err(_) => false,
        }
    }

    /// Mounts `drive_num` (§4.8 steps 1-7 via [`crate::mount::mount`], step
    /// 8 here): derives the volume's layout and free-space hint, assigns it
    /// a fresh mount generation, and stores it into the slot, overwriting
    /// anything already mounted there.
    pub fn mount<D: BlockDevice>(&mut self, drive_num: u8, drive: &mut D, partition: u8) -> FatResult<()> {
        let idx = Self::check_drive(drive_num)?;
        let result = mount::mount(drive, partition)?;

        self.mount_counter = self.mount_counter.wrapping_add(1);
        if self.mount_counter == 0 {
            self.mount_counter = 1;
        }

        let fs = Filesystem::new(drive_num, result.geom, result.hint, self.mount_counter);
        self.slots[idx].cs(|slot| *slot = Some(fs));
        Ok(())
    }

    /// Unmounts `drive_num`: empties the slot and, per
    /// `original_source/inc/private/ef_prv_lock.h`, every share-lock table
    /// entry that referenced it, so a later mount reusing the same slot
    /// index never inherits a stale lock.
    pub fn unmount(&mut self, drive_num: u8, share: &mut ShareTable) -> FatResult<()> {
        let idx = Self::check_drive(drive_num)?;
        let was_mounted = self.slots[idx].cs(|slot| slot.take().is_some());
        if !was_mounted {
            return Err(FatError::NotEnabled);
        }
        share.clear_filesystem(drive_num);
        Ok(())
    }

    /// Borrow-scoped access to a mounted slot's `Filesystem` (§9's window
    /// closure pattern, applied here to the volume itself): `NotEnabled` if
    /// the slot is empty.
    pub fn with<D, F, R>(&self, drive_num: u8, drive: &mut D, f: F) -> FatResult<R>
    where
        D: BlockDevice,
        F: FnOnce(&mut Filesystem, &mut D) -> FatResult<R>,
    {
        let idx = Self::check_drive(drive_num)?;
        self.slots[idx].cs(|slot| {
            let fs = slot.as_mut().ok_or(FatError::NotEnabled)?;
            f(fs, drive)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::store_u16;
    use crate::drive::{DriveStatus, IoctlCode};

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

    fn write_fat16_vbr(disk: &mut RamDisk) {
        let mut vbr = [0u8; 512];
        store_u16(&mut vbr, 11, 512);
        vbr[13] = 1;
        store_u16(&mut vbr, 14, 1);
        vbr[16] = 2;
        store_u16(&mut vbr, 17, 32);
        store_u16(&mut vbr, 19, 1 + 2 * 4 + 2 + 5000);
        store_u16(&mut vbr, 22, 4);
        store_u16(&mut vbr, 510, 0xAA55);
        disk.sectors[0] = vbr;
    }

    #[test]
    fn parses_drive_letter_either_case() {
        assert_eq!(parse_drive_letter("A:FOO.TXT"), Some((0, "FOO.TXT")));
        assert_eq!(parse_drive_letter("c:/bar"), Some((2, "/bar")));
        assert_eq!(parse_drive_letter("/no/prefix"), None);
        assert_eq!(parse_drive_letter(""), None);
    }

    #[test]
    fn resolve_drive_falls_back_to_current_drive() {
        let mut reg = Registry::new();
        reg.set_current_drive(1).unwrap();
        assert_eq!(reg.resolve_drive("README.TXT").unwrap(), (1, "README.TXT"));
        assert_eq!(reg.resolve_drive("B:README.TXT").unwrap(), (1, "README.TXT"));
    }

    #[test]
    fn set_current_drive_rejects_out_of_range() {
        let mut reg = Registry::new();
        assert_eq!(reg.set_current_drive(MAX_VOLUMES as u8).unwrap_err(), FatError::InvalidDrive);
    }

    #[test]
    fn mount_then_unmount_round_trips_slot_occupancy() {
        let mut reg = Registry::new();
        let mut disk = RamDisk::new(500);
        write_fat16_vbr(&mut disk);
        let mut share = ShareTable::new();

        assert!(!reg.is_mounted(0));
        reg.mount(0, &mut disk, 0).unwrap();
        assert!(reg.is_mounted(0));

        reg.unmount(0, &mut share).unwrap();
        assert!(!reg.is_mounted(0));
    }

    #[test]
    fn unmounting_an_empty_slot_is_not_enabled() {
        let mut reg = Registry::new();
        let mut share = ShareTable::new();
        assert_eq!(reg.unmount(0, &mut share).unwrap_err(), FatError::NotEnabled);
    }

    #[test]
    fn unmount_clears_that_slots_share_locks_but_not_others() {
        let mut reg = Registry::new();
        let mut disk0 = RamDisk::new(500);
        write_fat16_vbr(&mut disk0);
        let mut disk1 = RamDisk::new(500);
        write_fat16_vbr(&mut disk1);
        let mut share = ShareTable::new();

        reg.mount(0, &mut disk0, 0).unwrap();
        reg.mount(1, &mut disk1, 0).unwrap();

        share.acquire(0, 64, crate::share::AccessMode::Write).unwrap();
        share.acquire(1, 64, crate::share::AccessMode::Write).unwrap();

        reg.unmount(0, &mut share).unwrap();

        // drive 0's lock is gone, so a fresh write acquire against the same
        // offset succeeds; drive 1's lock survives and still blocks one.
        share.acquire(0, 64, crate::share::AccessMode::Write).unwrap();
        assert_eq!(
            share.acquire(1, 64, crate::share::AccessMode::Write).unwrap_err(),
            FatError::Locked
        );
    }

    #[test]
    fn mount_assigns_increasing_generations_across_slots() {
        let mut reg = Registry::new();
        let mut disk0 = RamDisk::new(500);
        write_fat16_vbr(&mut disk0);
        let mut disk1 = RamDisk::new(500);
        write_fat16_vbr(&mut disk1);

        reg.mount(0, &mut disk0, 0).unwrap();
        reg.mount(1, &mut disk1, 0).unwrap();

        let gen0 = reg.with(0, &mut disk0, |fs, _| Ok(fs.mount_generation)).unwrap();
        let gen1 = reg.with(1, &mut disk1, |fs, _| Ok(fs.mount_generation)).unwrap();
        assert_ne!(gen0, gen1);
    }

    #[test]
    fn with_on_an_unmounted_slot_is_not_enabled() {
        let reg = Registry::new();
        let mut disk = RamDisk::new(500);
        assert_eq!(
            reg.with(0, &mut disk, |_, _| Ok(())).unwrap_err(),
            FatError::NotEnabled
        );
    }

    #[test]
    fn out_of_range_drive_number_is_invalid_drive() {
        let mut reg = Registry::new();
        let mut disk = RamDisk::new(500);
        assert_eq!(reg.mount(MAX_VOLUMES as u8, &mut disk, 0).unwrap_err(), FatError::InvalidDrive);
    }
}

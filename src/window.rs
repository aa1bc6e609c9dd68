//! The single-sector window cache (§3.1, §4.3, §9 "the single sector window").
//!
//! One sector-sized buffer per mounted volume, read-through and write-back.
//! Grounded on the teacher's `fat/cache.rs` `CacheEntry` (resident/dirty
//! tracking), simplified from its N-way, age-ordered eviction scheme down to
//! the one-entry-per-volume cache the spec calls for. The borrow-scoped
//! accessors (`with`/`with_mut`) follow the closure pattern the design notes
//! (§9) recommend so that a live borrow into the window can never outlive a
//! call that might reload it.

use crate::drive::{BlockDevice, MAX_SECTOR_SIZE};
use crate::error::{FatError, FatResult};

/// Up to this many mirrored copies of the FAT are kept in lock-step (§3.1:
/// "number of FAT copies (1 or 2)").
pub const MAX_FAT_COPIES: u8 = 2;

/// Describes the FAT region of a mounted volume so the window knows which
/// sectors need mirroring across every FAT copy on flush (§4.3).
#[derive(Debug, Clone, Copy)]
pub struct FatRegion {
    pub fat_base: u64,
    pub sectors_per_fat: u64,
    pub copies: u8,
}

impl FatRegion {
    fn contains(&self, lba: u64) -> bool {
        self.offset_within_first_copy(lba).is_some()
    }

    fn offset_within_first_copy(&self, lba: u64) -> Option<u64> {
        let total = self.sectors_per_fat * self.copies as u64;
        if lba < self.fat_base || lba >= self.fat_base + total {
            return None;
        }
        Some((lba - self.fat_base) % self.sectors_per_fat)
    }

    /// Every LBA holding a copy of the sector that `lba` lives in.
    fn mirrors(&self, lba: u64) -> impl Iterator<Item = u64> + '_ {
        let offset = self.offset_within_first_copy(lba).unwrap_or(0);
        (0..self.copies as u64).map(move |copy| self.fat_base + copy * self.sectors_per_fat + offset)
    }
}

/// One sector-sized read-through/write-back buffer (§3.1, §4.3).
pub struct Window {
    buf: [u8; MAX_SECTOR_SIZE],
    sector_size: usize,
    current_lba: Option<u64>,
    dirty: bool,
}

impl Window {
    pub fn new(sector_size: usize) -> Self {
        assert!(sector_size > 0 && sector_size <= MAX_SECTOR_SIZE);
        Self {
            buf: [0; MAX_SECTOR_SIZE],
            sector_size,
            current_lba: None,
            dirty: false,
        }
    }

    pub fn current_lba(&self) -> Option<u64> {
        self.current_lba
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn buf(&self) -> &[u8] {
        &self.buf[..self.sector_size]
    }

    fn buf_mut(&mut self) -> &mut [u8] {
        &mut self.buf[..self.sector_size]
    }

    /// Borrow-scoped read access (§9). The closure's return value cannot
    /// carry the borrow out, so the caller is free to call `load` again
    /// right after.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[u8]) -> R,
    {
        f(self.buf())
    }

    /// Borrow-scoped write access; marks the window dirty unconditionally,
    /// since a caller only reaches for `with_mut` to mutate.
    pub fn with_mut<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        self.dirty = true;
        f(self.buf_mut())
    }

    /// `store()` (§4.3): flush only; a no-op when not dirty. Mirrors the
    /// write across every FAT copy when the current sector lies in the FAT
    /// region.
    pub fn flush<D: BlockDevice>(&mut self, drive: &mut D, fat_region: Option<&FatRegion>) -> FatResult<()> {
        if !self.dirty {
            return Ok(());
        }

        let lba = self.current_lba.ok_or(FatError::IntError("dirty window with no LBA"))?;
        let in_fat = fat_region.map_or(false, |r| r.contains(lba));

        let result = if in_fat {
            let region = fat_region.unwrap();
            let mut res = Ok(());
            for mirror_lba in region.mirrors(lba) {
                if crate::drive::io_write(drive, self.buf(), mirror_lba, 1).is_err() {
                    res = Err(FatError::DiskError);
                    break;
                }
            }
            res
        } else {
            crate::drive::io_write(drive, self.buf(), lba, 1)
        };

        match result {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(e) => {
                self.current_lba = None;
                Err(e)
            }
        }
    }

    /// `load(lba)` (§4.3): no-op if already resident; otherwise flush any
    /// dirty sector, then read the new one. Invalidates `current_lba` on
    /// driver failure (§3.1 invariant).
    pub fn load<D: BlockDevice>(&mut self, drive: &mut D, lba: u64, fat_region: Option<&FatRegion>) -> FatResult<()> {
        if self.current_lba == Some(lba) {
            return Ok(());
        }

        self.flush(drive, fat_region)?;

        match crate::drive::io_read(drive, &mut self.buf[..self.sector_size], lba, 1) {
            Ok(()) => {
                self.current_lba = Some(lba);
                self.dirty = false;
                Ok(())
            }
            Err(e) => {
                self.current_lba = None;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
                let sector = &self.sectors[(lba + i) as usize];
                let off = (i as usize) * 512;
                buf[off..off + 512].copy_from_slice(sector);
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

    #[test]
    fn load_is_idempotent_for_same_lba() {
        let mut disk = RamDisk::new(4);
        let mut w = Window::new(512);
        w.load(&mut disk, 2, None).unwrap();
        assert_eq!(w.current_lba(), Some(2));
        w.load(&mut disk, 2, None).unwrap();
        assert!(!w.is_dirty());
    }

    #[test]
    fn dirty_sector_flushes_before_reload() {
        let mut disk = RamDisk::new(4);
        let mut w = Window::new(512);
        w.load(&mut disk, 0, None).unwrap();
        w.with_mut(|buf| buf[0] = 0xAB);
        assert!(w.is_dirty());

        w.load(&mut disk, 1, None).unwrap();
        assert!(!w.is_dirty());
        assert_eq!(disk.sectors[0][0], 0xAB);
    }

    #[test]
    fn fat_sector_mirrors_to_every_copy() {
        let mut disk = RamDisk::new(10);
        let region = FatRegion { fat_base: 1, sectors_per_fat: 3, copies: 2 };
        let mut w = Window::new(512);

        w.load(&mut disk, 2, Some(&region)).unwrap();
        w.with_mut(|buf| buf[0] = 0x42);
        w.flush(&mut disk, Some(&region)).unwrap();

        assert_eq!(disk.sectors[2][0], 0x42);
        assert_eq!(disk.sectors[5][0], 0x42);
    }

    #[test]
    fn read_failure_invalidates_current_lba() {
        struct Failing;
        impl BlockDevice for Failing {
            fn initialize(&mut self) -> DriveStatus {
                DriveStatus::NONE
            }
            fn status(&self) -> DriveStatus {
                DriveStatus::NONE
            }
            fn read(&mut self, _buf: &mut [u8], _lba: u64, _count: u32) -> FatResult<()> {
                Err(FatError::DiskError)
            }
            fn write(&mut self, _buf: &[u8], _lba: u64, _count: u32) -> FatResult<()> {
                Err(FatError::DiskError)
            }
            fn ioctl(&mut self, _code: IoctlCode, _out: &mut [u8]) -> FatResult<()> {
                Ok(())
            }
        }

        let mut disk = Failing;
        let mut w = Window::new(512);
        assert!(w.load(&mut disk, 0, None).is_err());
        assert_eq!(w.current_lba(), None);
    }
}

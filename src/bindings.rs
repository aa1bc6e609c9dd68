//! C Bindings for this crate.
//!
//! Regrounded on the teacher's `edisk` FFI adapter: the same `eDisk_Read`/
//! `eDisk_Write` hooks an embedded target's board-support layer provides,
//! now wired to this crate's own [`crate::drive::BlockDevice`] trait
//! instead of the dropped `storage-traits` crate, so anything mounted
//! through [`crate::registry`] can run straight over them.

#[no_mangle]
pub extern "C" fn foo_bar(yo: u8) -> u8 {
    yo * 2
}

#[no_mangle]
pub extern "C" fn yay(yo: u8) -> u8 {
    yo * 2
}

#[no_mangle]
pub extern "C" fn new_edisk_storage(drive_num: u8, size_in_sectors: u64) -> edisk::EDiskStorage {
    edisk::EDiskStorage { drive_num, size_in_sectors }
}

/// Sums the bytes of one 512-byte sector, or `0` if `sector_num` is out of
/// range. Exercises a `read` call through the FFI adapter without pulling
/// in a heap-allocating helper.
#[no_mangle]
pub extern "C" fn sector_sum(storage: &mut edisk::EDiskStorage, sector_num: u32) -> u64 {
    use crate::drive::BlockDevice;

    if sector_num as u64 >= storage.size_in_sectors {
        return 0;
    }

    let mut sector = [0u8; 512];
    if storage.read(&mut sector, sector_num as u64, 1).is_err() {
        return 0;
    }

    sector.iter().fold(0u64, |acc, &b| acc.wrapping_add(b as u64))
}

pub mod edisk {
    use crate::drive::{BlockDevice, DriveStatus, IoctlCode};
    use crate::error::{FatError, FatResult};

    #[repr(C)]
    pub struct EDiskStorage {
        pub drive_num: u8,
        pub size_in_sectors: u64,
    }

    #[repr(C)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum DResult {
        /// Successful
        ResOk = 0,
        /// R/W Error
        ResError = 1,
        /// Write Protected
        ResWrPrt = 2,
        /// Not Ready
        ResNotRdy = 3,
        /// Invalid Parameter
        ResParErr = 4,
    }

    extern "C" {
        fn eDisk_Read(drv: u8, buff: *mut u8, sector: u32, count: u32) -> DResult;
        fn eDisk_Write(drv: u8, buff: *const u8, sector: u32, count: u32) -> DResult;
    }

    impl BlockDevice for EDiskStorage {
        fn initialize(&mut self) -> DriveStatus {
            DriveStatus::NONE
        }

        fn status(&self) -> DriveStatus {
            DriveStatus::NONE
        }

        fn read(&mut self, buf: &mut [u8], lba: u64, count: u32) -> FatResult<()> {
            if lba + count as u64 > self.size_in_sectors {
                return Err(FatError::DiskError);
            }
            match unsafe { eDisk_Read(self.drive_num, buf.as_mut_ptr(), lba as u32, count) } {
                DResult::ResOk => Ok(()),
                _ => Err(FatError::DiskError),
            }
        }

        fn write(&mut self, buf: &[u8], lba: u64, count: u32) -> FatResult<()> {
            if lba + count as u64 > self.size_in_sectors {
                return Err(FatError::DiskError);
            }
            match unsafe { eDisk_Write(self.drive_num, buf.as_ptr(), lba as u32, count) } {
                DResult::ResOk => Ok(()),
                _ => Err(FatError::DiskError),
            }
        }

        fn ioctl(&mut self, _code: IoctlCode, _out: &mut [u8]) -> FatResult<()> {
            Ok(())
        }
    }
}

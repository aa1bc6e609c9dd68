//! Mounts a FAT volume off a disk image and lists its root directory.
//!
//! Run with: cargo run --example dir

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use efat::codepage::Ascii;
use efat::dir_api;
use efat::drive::{BlockDevice, DriveStatus, IoctlCode};
use efat::error::{FatError, FatResult};
use efat::registry::Registry;
use efat::share::ShareTable;

const IMG_PATH: &str = "assets/gpt.img";
const SECTOR_SIZE: usize = 512;

struct FileDisk {
    file: File,
}

impl BlockDevice for FileDisk {
    fn initialize(&mut self) -> DriveStatus {
        DriveStatus::NONE
    }

    fn status(&self) -> DriveStatus {
        DriveStatus::NONE
    }

    fn read(&mut self, buf: &mut [u8], lba: u64, count: u32) -> FatResult<()> {
        self.file.seek(SeekFrom::Start(lba * SECTOR_SIZE as u64)).map_err(|_| FatError::DiskError)?;
        self.file.read_exact(&mut buf[..count as usize * SECTOR_SIZE]).map_err(|_| FatError::DiskError)
    }

    fn write(&mut self, buf: &[u8], lba: u64, count: u32) -> FatResult<()> {
        self.file.seek(SeekFrom::Start(lba * SECTOR_SIZE as u64)).map_err(|_| FatError::DiskError)?;
        self.file.write_all(&buf[..count as usize * SECTOR_SIZE]).map_err(|_| FatError::DiskError)
    }

    fn ioctl(&mut self, _code: IoctlCode, _out: &mut [u8]) -> FatResult<()> {
        Ok(())
    }
}

fn main() {
    let file = File::open(IMG_PATH).expect("open disk image");
    let mut disk = FileDisk { file };

    let mut registry = Registry::new();
    let mut share = ShareTable::new();
    registry.mount(0, &mut disk, 1).expect("mount partition 1");

    registry
        .with(0, &mut disk, |fs, drive| {
            let mut handle = dir_api::open(fs, drive, &mut share, "/", &Ascii)?;
            while let Some(info) = dir_api::read(fs, drive, &mut handle, &Ascii)? {
                let name: String = char::decode_utf16(info.name[..info.name_len].iter().copied())
                    .map(|r| r.unwrap_or('\u{FFFD}'))
                    .collect();
                println!("{:>10}  {}", info.size, name);
            }
            dir_api::close(&mut share, handle);
            Ok(())
        })
        .unwrap();
}

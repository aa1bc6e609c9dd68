//! End-to-end coverage over the full mount → file/directory API surface,
//! against the in-memory ramdisk built in `common`.

mod common;

use common::RamDisk;

use efat::codepage::Ascii;
use efat::error::FatError;
use efat::file::{self, OpenOptions};
use efat::registry::Registry;
use efat::share::ShareTable;

#[test]
fn fat32_round_trips_a_file_across_a_remount() {
    let mut disk = RamDisk::new();
    // 8 sectors/cluster, well past the FAT16 classification boundary.
    let total_clusters = 70_000u32;
    common::write_fat32_vbr(&mut disk, 8, total_clusters, total_clusters - 1);

    let mut registry = Registry::new();
    let mut share = ShareTable::new();
    registry.mount(0, &mut disk, 0).unwrap();

    let free = registry.with(0, &mut disk, |fs, _| Ok(fs.hint.free_count)).unwrap();
    assert_eq!(free, total_clusters - 1);

    registry
        .with(0, &mut disk, |fs, drive| {
            let mut f = file::open(fs, drive, &mut share, "README.TXT", OpenOptions::new().write(true).create(), 0, &Ascii)?;
            let n = file::write(fs, drive, &mut f, b"hello")?;
            assert_eq!(n, 5);
            file::close(fs, drive, &mut share, f, 0)
        })
        .unwrap();

    registry.unmount(0, &mut share).unwrap();
    registry.mount(0, &mut disk, 0).unwrap();

    registry
        .with(0, &mut disk, |fs, drive| {
            let mut f = file::open(fs, drive, &mut share, "README.TXT", OpenOptions::new().read(true), 0, &Ascii)?;
            let mut buf = [0u8; 5];
            let n = file::read(fs, drive, &mut f, &mut buf)?;
            assert_eq!(n, 5);
            assert_eq!(&buf, b"hello");
            file::close(fs, drive, &mut share, f, 0)
        })
        .unwrap();
}

#[test]
fn fat16_root_directory_full_rejects_a_17th_entry_without_corrupting_the_first_16() {
    let mut disk = RamDisk::new();
    // 16 entries at 32 bytes each exactly fill one 512-byte sector: the
    // 17th registration has nowhere left to land.
    common::write_fat16_vbr(&mut disk, 16);

    let mut registry = Registry::new();
    let mut share = ShareTable::new();
    registry.mount(0, &mut disk, 0).unwrap();

    let names: Vec<String> = (0..16).map(|i| format!("F{i}.TXT")).collect();

    for name in &names {
        registry
            .with(0, &mut disk, |fs, drive| {
                let f = file::open(fs, drive, &mut share, name, OpenOptions::new().write(true).create_new(), 0, &Ascii)?;
                file::close(fs, drive, &mut share, f, 0)
            })
            .unwrap();
    }

    let overflow = registry.with(0, &mut disk, |fs, drive| {
        file::open(fs, drive, &mut share, "OVERFLOW.TXT", OpenOptions::new().write(true).create_new(), 0, &Ascii)
    });
    assert_eq!(overflow.unwrap_err(), FatError::Denied);

    for name in &names {
        registry
            .with(0, &mut disk, |fs, drive| {
                let f = file::open(fs, drive, &mut share, name, OpenOptions::new().read(true), 0, &Ascii)?;
                file::close(fs, drive, &mut share, f, 0)
            })
            .unwrap();
    }
}

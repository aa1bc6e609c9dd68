//! The volume mounter (§4.8): locates a FAT volume behind a VBR, an MBR, or
//! a GPT, validates its BPB, derives the mounted layout, and primes the
//! free-space hint.
//!
//! The teacher's `fat/boot_sector.rs` only ever parsed a single hardcoded
//! FAT32 BPB over a fixed 512-byte `Storage`; its field offsets are kept as
//! grounding for the byte layout here; everything else — the MBR/GPT scan,
//! FAT12/16 classification, runtime sector size — is new, grounded on
//! §4.8's eight steps and on `original_source/src/private/ef_prv_mount.c`
//! for the exact classification thresholds and FSInfo signature check.

use crate::codec::{load_u16, load_u32};
use crate::drive::{io_read, BlockDevice, MAX_SECTOR_SIZE};
use crate::error::{FatError, FatResult};
use crate::fat_table::{FatGeometry, FatType, FreeSpaceHint};
use crate::gpt::Gpt;

const BOOT_SIGNATURE_OFFSET: usize = 510;
const BOOT_SIGNATURE: u16 = 0xAA55;

const FSI_LEAD_SIG: u32 = 0x4161_5252;
const FSI_STRUC_SIG: u32 = 0x6141_7272;

/// Which kind of sector-0 we found the volume behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Candidate {
    /// Sector 0 is a VBR directly.
    DirectVbr,
    /// Sector 0 is an MBR; the VBR lives at this partition's first LBA.
    MbrPartition(u64),
}

fn read_sector<D: BlockDevice>(drive: &mut D, sector_size: usize, lba: u64) -> FatResult<[u8; MAX_SECTOR_SIZE]> {
    let mut buf = [0u8; MAX_SECTOR_SIZE];
    io_read(drive, &mut buf[..sector_size], lba, 1)?;
    Ok(buf)
}

/// Step 2 of §4.8: classic MBR partition table, entries at offset
/// `446 + 16*i`, partition type byte at `+4`, first LBA at `+8` (u32 LE).
fn mbr_partition_lba(sector: &[u8], partition: u8) -> Option<u64> {
    if partition == 0 || partition > 4 {
        return None;
    }
    let entry = 446 + 16 * (partition as usize - 1);
    let kind = sector[entry + 4];
    if kind == 0 {
        return None;
    }
    Some(load_u32(sector, entry + 8) as u64)
}

/// Step 2, GPT branch: sector 1 holds the GPT header; partition `n` (1-based)
/// is matched against the basic-data-partition type GUID.
fn gpt_partition_lba<D: BlockDevice>(drive: &mut D, sector_size: usize, partition: u8) -> FatResult<u64> {
    let gpt = Gpt::read_gpt(drive, sector_size)?;
    if partition == 0 {
        return Err(FatError::NoFilesystem);
    }
    let entry = gpt.get_partition_entry(drive, sector_size, partition as u32 - 1)?;
    if !entry.is_fat_candidate() {
        return Err(FatError::NoFilesystem);
    }
    Ok(entry.first_lba)
}

/// Locates the VBR's LBA for `partition` (0 = find-first / superfloppy).
fn locate_vbr<D: BlockDevice>(drive: &mut D, sector_size: usize, partition: u8) -> FatResult<u64> {
    let sector0 = read_sector(drive, sector_size, 0)?;
    let sector0 = &sector0[..sector_size];

    if load_u16(sector0, BOOT_SIGNATURE_OFFSET) != BOOT_SIGNATURE {
        return Err(FatError::NoFilesystem);
    }

    let candidate = if partition == 0 {
        Candidate::DirectVbr
    } else if sector0[450] == 0xEE {
        // Protective MBR: single partition entry of type 0xEE covering the
        // whole disk, real partition table lives in the GPT at sector 1.
        return gpt_partition_lba(drive, sector_size, partition).map_err(|_| FatError::NoFilesystem);
    } else {
        match mbr_partition_lba(sector0, partition) {
            Some(lba) => Candidate::MbrPartition(lba),
            None => return Err(FatError::NoFilesystem),
        }
    };

    match candidate {
        Candidate::DirectVbr => Ok(0),
        Candidate::MbrPartition(lba) => Ok(lba),
    }
}

/// Step 5 of §4.8: classify by total cluster count.
fn classify(total_clusters: u32) -> FatResult<FatType> {
    if total_clusters <= 0x0FF5 {
        Ok(FatType::Fat12)
    } else if total_clusters <= 0xFFF5 {
        Ok(FatType::Fat16)
    } else if total_clusters <= 0x0FFF_FFF5 {
        Ok(FatType::Fat32)
    } else {
        Err(FatError::NoFilesystem)
    }
}

/// The freshly derived state of a mount, before it is wrapped into a
/// [`crate::object::Filesystem`] and assigned a slot (§4.8 step 8 is the
/// registry's job, not this function's).
pub struct MountResult {
    pub geom: FatGeometry,
    pub hint: FreeSpaceHint,
}

/// Runs the full eight-step scan (minus step 8, the registry's share-lock
/// clear and generation bump) and returns the derived geometry plus the
/// primed free-space hint.
pub fn mount<D: BlockDevice>(drive: &mut D, partition: u8) -> FatResult<MountResult> {
    drive.initialize();
    let status = drive.status();
    if status.contains(crate::drive::DriveStatus::NOT_INITIALIZED) || status.contains(crate::drive::DriveStatus::NO_DISK) {
        return Err(FatError::NotReady);
    }

    let vbr_lba = locate_vbr(drive, 512, partition)?;
    let vbr = read_sector(drive, 512, vbr_lba)?;

    if load_u16(&vbr, BOOT_SIGNATURE_OFFSET) != BOOT_SIGNATURE {
        return Err(FatError::NoFilesystem);
    }

    let sector_size = load_u16(&vbr, 11) as usize;
    if sector_size == 0 || sector_size > MAX_SECTOR_SIZE || !sector_size.is_power_of_two() {
        return Err(FatError::NoFilesystem);
    }

    let sectors_per_cluster = vbr[13];
    if sectors_per_cluster == 0 || !sectors_per_cluster.is_power_of_two() {
        return Err(FatError::NoFilesystem);
    }

    let reserved_sectors = load_u16(&vbr, 14) as u64;
    let num_fats = vbr[16];
    if num_fats == 0 || num_fats > 2 {
        return Err(FatError::NoFilesystem);
    }

    let root_entries = load_u16(&vbr, 17) as u32;
    let root_dir_bytes = root_entries as u64 * 32;
    if root_dir_bytes % sector_size as u64 != 0 {
        return Err(FatError::NoFilesystem);
    }
    let root_dir_sectors = (root_dir_bytes / sector_size as u64) as u32;

    let total_sectors_16 = load_u16(&vbr, 19) as u64;
    let total_sectors_32 = load_u32(&vbr, 32) as u64;
    let total_sectors = if total_sectors_16 != 0 { total_sectors_16 } else { total_sectors_32 };

    let fat_size_16 = load_u16(&vbr, 22) as u64;
    let is_fat32_shaped = fat_size_16 == 0 && root_entries == 0;
    let sectors_per_fat = if fat_size_16 != 0 { fat_size_16 } else { load_u32(&vbr, 36) as u64 };
    if sectors_per_fat == 0 {
        return Err(FatError::NoFilesystem);
    }

    let fat_base = vbr_lba + reserved_sectors;
    let root_dir_base = fat_base + num_fats as u64 * sectors_per_fat;
    let first_data_sector = root_dir_base + root_dir_sectors as u64;

    let data_sectors = total_sectors.saturating_sub(first_data_sector - vbr_lba);
    let total_clusters = (data_sectors / sectors_per_cluster as u64) as u32;

    let fat_type = classify(total_clusters)?;
    if is_fat32_shaped != (fat_type == FatType::Fat32) {
        // BPB shape (16-bit FAT-size/root-entries fields vs the FAT32 EBPB)
        // must agree with what the cluster count implies.
        return Err(FatError::NoFilesystem);
    }

    let root_dir_cluster = if fat_type == FatType::Fat32 { load_u32(&vbr, 44) } else { 0 };

    let geom = FatGeometry {
        fat_type,
        fat_base,
        sectors_per_fat,
        num_fats,
        data_base: first_data_sector,
        sectors_per_cluster,
        sector_size,
        total_clusters,
        root_dir_base,
        root_dir_sectors,
        root_dir_cluster,
    };

    let hint = if fat_type == FatType::Fat32 {
        // FSInfo sector number lives at BPB offset 48 (u16 LE).
        let fsinfo_lba = vbr_lba + load_u16(&vbr, 48) as u64;
        read_fsinfo(drive, sector_size, fsinfo_lba).unwrap_or(FreeSpaceHint {
            last_allocated: 2,
            free_count: FreeSpaceHint::UNKNOWN,
            info_dirty: false,
        })
    } else {
        FreeSpaceHint { last_allocated: 2, free_count: FreeSpaceHint::UNKNOWN, info_dirty: false }
    };

    Ok(MountResult { geom, hint })
}

/// Step 7 of §4.8: adopt FSInfo's hints only when both signatures match;
/// otherwise the caller's "unknown" default stands.
fn read_fsinfo<D: BlockDevice>(drive: &mut D, sector_size: usize, lba: u64) -> FatResult<FreeSpaceHint> {
    let buf = read_sector(drive, sector_size, lba)?;
    if load_u32(&buf, 0) != FSI_LEAD_SIG || load_u32(&buf, 484) != FSI_STRUC_SIG {
        return Err(FatError::NoFilesystem);
    }
    let free_count = load_u32(&buf, 488);
    let last_allocated = load_u32(&buf, 492);
    Ok(FreeSpaceHint { last_allocated, free_count, info_dirty: false })
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

    /// Writes a minimal, directly-bootable FAT16 VBR: 512-byte sectors, 1
    /// sector/cluster, 2 FATs of 4 sectors each, a 32-entry (2-sector) root,
    /// reserved=1, enough total sectors to land comfortably in the FAT16
    /// cluster-count band.
    fn write_fat16_vbr(disk: &mut RamDisk) {
        let mut vbr = [0u8; 512];
        store_u16(&mut vbr, 11, 512); // bytes per sector
        vbr[13] = 1; // sectors per cluster
        store_u16(&mut vbr, 14, 1); // reserved sectors
        vbr[16] = 2; // num FATs
        store_u16(&mut vbr, 17, 32); // root entries -> 2 sectors
        store_u16(&mut vbr, 19, 1 + 2 * 4 + 2 + 5000); // total sectors (16-bit field); 5000 data clusters lands in the FAT16 band
        store_u16(&mut vbr, 22, 4); // sectors per FAT
        store_u16(&mut vbr, BOOT_SIGNATURE_OFFSET, BOOT_SIGNATURE);
        disk.sectors[0] = vbr;
    }

    #[test]
    fn mounts_a_direct_fat16_vbr() {
        let mut disk = RamDisk::new(500);
        write_fat16_vbr(&mut disk);

        let result = mount(&mut disk, 0).unwrap();
        assert_eq!(result.geom.fat_type, FatType::Fat16);
        assert_eq!(result.geom.fat_base, 1);
        assert_eq!(result.geom.root_dir_base, 1 + 2 * 4);
        assert_eq!(result.geom.data_base, 1 + 2 * 4 + 2);
        assert_eq!(result.geom.root_dir_sectors, 2);
    }

    #[test]
    fn rejects_a_sector_with_no_boot_signature() {
        let mut disk = RamDisk::new(500);
        assert_eq!(mount(&mut disk, 0).unwrap_err(), FatError::NoFilesystem);
    }

    #[test]
    fn rejects_an_mbr_partition_slot_with_no_entry() {
        let mut disk = RamDisk::new(500);
        let mut mbr = [0u8; 512];
        store_u16(&mut mbr, BOOT_SIGNATURE_OFFSET, BOOT_SIGNATURE);
        disk.sectors[0] = mbr;
        assert_eq!(mount(&mut disk, 1).unwrap_err(), FatError::NoFilesystem);
    }
}

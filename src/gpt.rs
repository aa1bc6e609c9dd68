//! GUID Partition Table reading (§6.1), used by the volume mounter when a
//! drive's sector 0 turns out to be a protective MBR over a GPT disk rather
//! than a VBR or classic MBR.
//!
//! Grounded on the teacher's `gpt.rs` (`Guid`, `Gpt`, `PartitionEntry` byte
//! layouts are kept verbatim) but generalized off its fixed
//! `Storage<Word = u8, SECTOR_SIZE = U512>` bound onto this crate's
//! `BlockDevice` + runtime sector size, and taught to return `FatResult`
//! instead of unwrapping.

use core::convert::TryInto;
use core::fmt::{self, Debug};

use crate::drive::{io_read, BlockDevice, MAX_SECTOR_SIZE};
use crate::error::{FatError, FatResult};

pub const GPT_SIGNATURE: [u8; 8] = *b"EFI PART";

/// A "middle-endian" 128-bit GUID, as GPT stores it.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Guid {
    first: u32,
    second: u16,
    third: u16,
    fourth: u16,
    fifth_p1: u16,
    fifth_p2: u32,
}

impl Guid {
    pub fn from_mixed_u128(u: u128) -> Self {
        Self::from_mixed(u.to_le_bytes())
    }

    /// The "basic data partition" type GUID FAT volumes are tagged with on
    /// GPT disks (§6.1).
    pub fn microsoft_basic_data() -> Self {
        Guid::from_mixed_u128(0xEBD0A0A2_B9E5_4433_87C0_68B6B72699C7u128)
    }

    pub fn from_mixed([p, o, n, m, l, k, j, i, g, h, e, f, a, b, c, d]: [u8; 16]) -> Self {
        Self {
            first: u32::from_le_bytes([a, b, c, d]),
            second: u16::from_le_bytes([e, f]),
            third: u16::from_le_bytes([g, h]),
            fourth: u16::from_be_bytes([i, j]),
            fifth_p1: u16::from_be_bytes([k, l]),
            fifth_p2: u32::from_be_bytes([m, n, o, p]),
        }
    }

    pub fn to_bytes(&self) -> [u8; 16] {
        let [a, b, c, d] = self.first.to_le_bytes();
        let [e, f] = self.second.to_le_bytes();
        let [g, h] = self.third.to_le_bytes();
        let [i, j] = self.fourth.to_be_bytes();
        let [k, l] = self.fifth_p1.to_be_bytes();
        let [m, n, o, p] = self.fifth_p2.to_be_bytes();
        [a, b, c, d, e, f, g, h, i, j, k, l, m, n, o, p]
    }

    pub fn from_bytes([a, b, c, d, e, f, g, h, i, j, k, l, m, n, o, p]: [u8; 16]) -> Self {
        Self {
            first: u32::from_le_bytes([a, b, c, d]),
            second: u16::from_le_bytes([e, f]),
            third: u16::from_le_bytes([g, h]),
            fourth: u16::from_be_bytes([i, j]),
            fifth_p1: u16::from_be_bytes([k, l]),
            fifth_p2: u32::from_be_bytes([m, n, o, p]),
        }
    }
}

impl Debug for Guid {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            fmt,
            "{:08X}-{:04X}-{:04X}-{:04X}-{:04X}{:08X}",
            self.first, self.second, self.third, self.fourth, self.fifth_p1, self.fifth_p2,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gpt {
    pub revision: u32,
    pub header_size: u32,
    pub header_crc32: u32,
    pub current_lba: u64,
    pub backup_lba: u64,
    pub first_usable_lba: u64,
    pub last_usable_lba: u64,
    pub disk_guid: Guid,
    pub partition_entries_starting_lba: u64,
    pub num_partition_entries: u32,
    pub partition_entry_size: u32,
    pub partition_entries_crc32: u32,
}

#[derive(Clone)]
pub struct PartitionEntry {
    pub partition_type: Guid,
    pub unique_guid: Guid,
    pub first_lba: u64,
    pub last_lba: u64,
    pub attribute_flags: u64,
    pub name: [u16; 36],
}

impl Debug for PartitionEntry {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct(core::any::type_name::<Self>())
            .field("partition_type", &self.partition_type)
            .field("unique_guid", &self.unique_guid)
            .field("first_lba", &self.first_lba)
            .field("last_lba", &self.last_lba)
            .field("attribute_flags", &self.attribute_flags)
            .finish()
    }
}

impl PartitionEntry {
    /// Is this entry's type GUID the basic-data-partition GUID FAT uses?
    pub fn is_fat_candidate(&self) -> bool {
        self.partition_type == Guid::microsoft_basic_data()
    }
}

impl Gpt {
    /// Reads the GPT header from LBA 1 (§6.1).
    pub fn read_gpt<D: BlockDevice>(drive: &mut D, sector_size: usize) -> FatResult<Gpt> {
        let mut buf = [0u8; MAX_SECTOR_SIZE];
        io_read(drive, &mut buf[..sector_size], 1, 1)?;
        let sector = &buf[..sector_size];

        if sector[0..8] != GPT_SIGNATURE {
            return Err(FatError::NoFilesystem);
        }

        Ok(Self {
            revision: u32::from_le_bytes(sector[8..12].try_into().unwrap()),
            header_size: u32::from_le_bytes(sector[12..16].try_into().unwrap()),
            header_crc32: u32::from_le_bytes(sector[16..20].try_into().unwrap()),
            current_lba: u64::from_le_bytes(sector[24..32].try_into().unwrap()),
            backup_lba: u64::from_le_bytes(sector[32..40].try_into().unwrap()),
            first_usable_lba: u64::from_le_bytes(sector[40..48].try_into().unwrap()),
            last_usable_lba: u64::from_le_bytes(sector[48..56].try_into().unwrap()),
            disk_guid: Guid::from_bytes(sector[56..72].try_into().unwrap()),
            partition_entries_starting_lba: u64::from_le_bytes(sector[72..80].try_into().unwrap()),
            num_partition_entries: u32::from_le_bytes(sector[80..84].try_into().unwrap()),
            partition_entry_size: u32::from_le_bytes(sector[84..88].try_into().unwrap()),
            partition_entries_crc32: u32::from_le_bytes(sector[88..92].try_into().unwrap()),
        })
    }

    /// Reads partition entry `idx` (0-based), matched against partitions
    /// 1..128 per §6.1.
    pub fn get_partition_entry<D: BlockDevice>(
        &self,
        drive: &mut D,
        sector_size: usize,
        idx: u32,
    ) -> FatResult<PartitionEntry> {
        if idx >= self.num_partition_entries {
            return Err(FatError::InvalidParameter);
        }

        let entries_per_sector = sector_size as u32 / self.partition_entry_size;
        let sector = self.partition_entries_starting_lba + (idx / entries_per_sector) as u64;
        let offset = ((idx % entries_per_sector) * self.partition_entry_size) as usize;

        let mut buf = [0u8; MAX_SECTOR_SIZE];
        io_read(drive, &mut buf[..sector_size], sector, 1)?;
        let entry = &buf[offset..offset + self.partition_entry_size as usize];

        Ok(PartitionEntry {
            partition_type: Guid::from_bytes(entry[0..16].try_into().unwrap()),
            unique_guid: Guid::from_bytes(entry[16..32].try_into().unwrap()),
            first_lba: u64::from_le_bytes(entry[32..40].try_into().unwrap()),
            last_lba: u64::from_le_bytes(entry[40..48].try_into().unwrap()),
            attribute_flags: u64::from_le_bytes(entry[48..56].try_into().unwrap()),
            name: {
                let mut buf = [0u16; 36];
                for (i, slot) in buf.iter_mut().enumerate() {
                    *slot = ((entry[56 + 2 * i + 1] as u16) << 8) | (entry[56 + 2 * i] as u16);
                }
                buf
            },
        })
    }
}

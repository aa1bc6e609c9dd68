//! The shared filesystem/object model (§3.1–3.2, §9): one `Filesystem` per
//! mounted volume, plus the mount-generation check every file/directory
//! handle runs before touching it.
//!
//! Has no teacher analogue (the teacher never built a mountable volume, only
//! ad hoc `fat`/`gpt` readers over a `Storage` type parameter); grounded
//! directly on §3.1/§3.2/§9's description of an arena-of-volumes design. The
//! block device itself is never stored here — every operation takes
//! `&mut Filesystem` and `&mut D: BlockDevice` side by side, the same calling
//! convention `fat_table`/`directory` already established, so a `Filesystem`
//! is `Send`-safe to park behind [`crate::mutex::Mutex`] in the registry
//! without requiring the drive type to be.

use crate::fat_table::{Cluster, FatGeometry, FreeSpaceHint};
use crate::error::{FatError, FatResult};
use crate::window::Window;

/// One mounted volume's live state (§3.1). Lives behind a
/// [`crate::mutex::Mutex`] in a [`crate::registry`] slot; never touched
/// without that lock held (§5).
pub struct Filesystem {
    /// Bumped on every successful mount; every handle's `generation` must
    /// match this for the handle to still be valid (§3.2, §9).
    pub mount_generation: u32,
    /// Which registry slot this volume lives in.
    pub logical_drive: u8,
    pub geom: FatGeometry,
    pub hint: FreeSpaceHint,
    pub window: Window,
    /// Current-directory cluster, used when relative paths are enabled
    /// (§3.1); `0` means the root.
    pub current_dir_cluster: Cluster,
}

impl Filesystem {
    pub fn new(logical_drive: u8, geom: FatGeometry, hint: FreeSpaceHint, mount_generation: u32) -> Self {
        let window = Window::new(geom.sector_size);
        Self { mount_generation, logical_drive, geom, hint, window, current_dir_cluster: 0 }
    }
}

/// Shared prefix of every object handle (§3.2): which volume it belongs to,
/// the generation observed at open time, its starting cluster, its
/// attributes, and an optional share-lock table index.
#[derive(Debug, Clone, Copy)]
pub struct ObjectHeader {
    pub logical_drive: u8,
    pub generation: u32,
    pub start_cluster: Cluster,
    pub attrs: crate::dirent::Attributes,
    pub share_idx: Option<usize>,
}

impl ObjectHeader {
    pub fn new(fs: &Filesystem, start_cluster: Cluster, attrs: crate::dirent::Attributes) -> Self {
        Self {
            logical_drive: fs.logical_drive,
            generation: fs.mount_generation,
            start_cluster,
            attrs,
            share_idx: None,
        }
    }

    /// `(a) the back-pointer is non-null, (b) the generation matches` (§5).
    /// Item (c), "the drive gateway still reports initialized", is checked
    /// by the caller against the live `BlockDevice` since this type never
    /// sees one.
    pub fn validate(&self, fs: &Filesystem) -> FatResult<()> {
        if self.logical_drive != fs.logical_drive || self.generation != fs.mount_generation {
            return Err(FatError::InvalidObject);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dirent::Attributes;
    use crate::fat_table::FatType;

    fn geom() -> FatGeometry {
        FatGeometry {
            fat_type: FatType::Fat16,
            fat_base: 1,
            sectors_per_fat: 4,
            num_fats: 2,
            data_base: 9,
            sectors_per_cluster: 1,
            sector_size: 512,
            total_clusters: 100,
            root_dir_base: 9,
            root_dir_sectors: 2,
            root_dir_cluster: 0,
        }
    }

    fn hint() -> FreeSpaceHint {
        FreeSpaceHint { last_allocated: 2, free_count: FreeSpaceHint::UNKNOWN, info_dirty: false }
    }

    #[test]
    fn header_validates_against_its_own_filesystem() {
        let fs = Filesystem::new(0, geom(), hint(), 1);
        let header = ObjectHeader::new(&fs, 5, Attributes::ARCHIVE);
        assert!(header.validate(&fs).is_ok());
    }

    #[test]
    fn stale_generation_is_rejected() {
        let fs = Filesystem::new(0, geom(), hint(), 1);
        let header = ObjectHeader::new(&fs, 5, Attributes::ARCHIVE);

        let remounted = Filesystem::new(0, geom(), hint(), 2);
        assert_eq!(header.validate(&remounted).unwrap_err(), FatError::InvalidObject);
    }

    #[test]
    fn mismatched_drive_is_rejected() {
        let fs = Filesystem::new(0, geom(), hint(), 1);
        let header = ObjectHeader::new(&fs, 5, Attributes::ARCHIVE);

        let other_drive = Filesystem::new(1, geom(), hint(), 1);
        assert_eq!(header.validate(&other_drive).unwrap_err(), FatError::InvalidObject);
    }
}

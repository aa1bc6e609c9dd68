//! The closed error enumeration every public operation returns through.
//!
//! One variant per row of the return-code table; internal-only variants
//! (`FatInternal`, `FatFull`, `FatClusterUnder`, `FatClusterOver`) are produced
//! by `fat_table`/`directory` and wrapped into `IntError` (or left as `FatFull`)
//! at the public API boundary, same as the source this crate is patterned on.

/// `Result` alias used pervasively across the crate.
pub type FatResult<T> = Result<T, FatError>;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatError {
    #[error("block device reported a read/write failure")]
    DiskError,

    #[error("internal invariant violated: {0}")]
    IntError(&'static str),

    #[error("drive is not initialized")]
    NotReady,

    #[error("no such file or directory")]
    NoFile,

    #[error("a component of the path could not be traversed")]
    NoPath,

    #[error("name rejected by the name pipeline")]
    InvalidName,

    #[error("access denied")]
    Denied,

    #[error("entry already exists")]
    Exist,

    #[error("object handle is stale or invalid")]
    InvalidObject,

    #[error("medium is write protected")]
    WriteProtected,

    #[error("drive letter out of range")]
    InvalidDrive,

    #[error("volume slot is not mounted")]
    NotEnabled,

    #[error("no recognizable FAT volume found")]
    NoFilesystem,

    #[error("timed out waiting for the volume lock")]
    Timeout,

    #[error("entry is locked by the sharing policy")]
    Locked,

    #[error("could not allocate the long-filename working buffer")]
    NotEnoughCore,

    #[error("share-lock table is full")]
    TooManyOpenFiles,

    #[error("argument out of range")]
    InvalidParameter,

    /// FAT-traversal-internal: surfaced as `IntError` at the public boundary.
    #[error("FAT traversal error")]
    FatInternal,

    /// FAT-traversal-internal: surfaced verbatim at the public boundary (§7).
    #[error("no free clusters remain")]
    FatFull,

    /// FAT-traversal-internal: cluster number below the valid range `[2, fat_entries_nb)`.
    #[error("cluster number below valid range")]
    FatClusterUnder,

    /// FAT-traversal-internal: cluster number at/above the valid range `[2, fat_entries_nb)`.
    #[error("cluster number above valid range")]
    FatClusterOver,
}

impl FatError {
    /// Maps an internal FAT-traversal condition to the public-boundary code it
    /// is reported as (§7's propagation policy). `FatFull` passes through
    /// unchanged; everything else in the internal family becomes `IntError`.
    pub fn at_api_boundary(self) -> Self {
        match self {
            FatError::FatInternal | FatError::FatClusterUnder | FatError::FatClusterOver => {
                FatError::IntError("FAT traversal")
            }
            other => other,
        }
    }
}

//! Disk capabilities consumed by the operations table
//!
//! The operations never touch hardware directly. They resolve a partition by
//! label through a [`PartitionLookup`] and move bytes through the [`DiskIo`]
//! the resulting handle carries.

mod block_disk;
mod gpt_lookup;
mod label;
mod partition_io;

pub use block_disk::{BlockDiskIo, BlockIoRef};
pub use gpt_lookup::GptPartitionLookup;
pub use label::Label;
pub use partition_io::{read_from_partition, resolve_offset, write_to_partition};

pub(crate) use partition_io::lookup_failed;

use crate::config::LogicalUnit;
use core::fmt;

/// Errors reported by a disk capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskError {
    /// Hardware or driver failure
    DeviceError,
    /// Request extends past the last block
    OutOfRange,
    /// Media is read-only
    WriteProtected,
    /// No media, or media reports zero blocks
    NoMedia,
    /// Scratch buffer could not be allocated
    OutOfResources,
    /// Raw firmware status code
    Status(usize),
}

impl fmt::Display for DiskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceError => write!(f, "Device error"),
            Self::OutOfRange => write!(f, "Access beyond end of media"),
            Self::WriteProtected => write!(f, "Media is write protected"),
            Self::NoMedia => write!(f, "No media"),
            Self::OutOfResources => write!(f, "Out of resources"),
            Self::Status(code) => write!(f, "UEFI error: {:#x}", code),
        }
    }
}

/// Media description, the part of EFI_BLOCK_IO_MEDIA the operations need
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MediaInfo {
    pub media_id: u32,
    pub block_size: u32,
    pub last_block: u64,
    pub read_only: bool,
}

impl MediaInfo {
    /// Total media size in bytes, `None` on overflow
    pub fn size_bytes(&self) -> Option<u64> {
        self.last_block
            .checked_add(1)?
            .checked_mul(u64::from(self.block_size))
    }
}

/// Byte-addressed disk access.
///
/// Offsets are absolute on the device. Transfers either complete in full or
/// fail; there is no short read or write at this level.
pub trait DiskIo {
    fn media(&self) -> MediaInfo;

    fn read_disk(&self, offset: u64, dst: &mut [u8]) -> Result<(), DiskError>;

    fn write_disk(&self, offset: u64, src: &[u8]) -> Result<(), DiskError>;
}

impl<D: DiskIo + ?Sized> DiskIo for &D {
    fn media(&self) -> MediaInfo {
        (**self).media()
    }

    fn read_disk(&self, offset: u64, dst: &mut [u8]) -> Result<(), DiskError> {
        (**self).read_disk(offset, dst)
    }

    fn write_disk(&self, offset: u64, src: &[u8]) -> Result<(), DiskError> {
        (**self).write_disk(offset, src)
    }
}

/// Why a label or root disk could not be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    /// No disk attached for the logical unit
    NoDisk,
    /// No partition carries the label
    NotFound,
    /// More than one partition carries the label
    Ambiguous,
    /// Allocation failed during the lookup
    OutOfMemory,
    /// Partition table could not be read
    Io,
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDisk => write!(f, "No disk for logical unit"),
            Self::NotFound => write!(f, "Partition not found"),
            Self::Ambiguous => write!(f, "Label matches more than one partition"),
            Self::OutOfMemory => write!(f, "Out of memory"),
            Self::Io => write!(f, "Partition table unreadable"),
        }
    }
}

/// A partition resolved for a single operation.
///
/// Handles are never cached: each operation looks the label up again so a
/// caller cannot observe a stale table entry.
#[derive(Debug)]
pub struct PartitionHandle<'a, D: ?Sized> {
    pub label: &'a Label,
    pub starting_lba: u64,
    pub ending_lba: u64,
    pub block_size: u32,
    pub unique_guid: [u8; 16],
    pub io: &'a D,
}

impl<D: ?Sized> PartitionHandle<'_, D> {
    /// Partition size in bytes; `None` for an inverted or overflowing extent
    pub fn size(&self) -> Option<u64> {
        self.ending_lba
            .checked_sub(self.starting_lba)?
            .checked_add(1)?
            .checked_mul(u64::from(self.block_size))
    }

    /// Absolute byte offset of the first partition byte
    pub fn byte_start(&self) -> Option<u64> {
        self.starting_lba.checked_mul(u64::from(self.block_size))
    }
}

/// Partition table capability: resolves labels on a logical unit
pub trait PartitionLookup {
    type Disk: DiskIo;

    /// Disk backing the whole logical unit
    fn root_disk(&self, unit: LogicalUnit) -> Result<&Self::Disk, LookupError>;

    /// Resolve `label` to exactly one partition on `unit`
    fn partition_by_label<'a>(
        &'a self,
        label: &'a Label,
        unit: LogicalUnit,
    ) -> Result<PartitionHandle<'a, Self::Disk>, LookupError>;
}

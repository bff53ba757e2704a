// GPT-backed partition lookup using gpt-disk-rs

use super::{
    BlockDiskIo, BlockIoRef, DiskIo, Label, LookupError, PartitionHandle, PartitionLookup,
};
use crate::config::LogicalUnit;
use alloc::vec::Vec;
use gpt_disk_io::{BlockIo, Disk};
use log::{debug, warn};

/// Table entry fields kept from a matching GPT entry
#[derive(Copy, Clone, Debug)]
struct EntryMatch {
    index: u32,
    starting_lba: u64,
    ending_lba: u64,
    unique_guid: [u8; 16],
}

/// Resolves labels by reading the GPT of each attached logical unit.
///
/// The table is re-read on every lookup.
pub struct GptPartitionLookup<B: BlockIo> {
    disks: [Option<BlockDiskIo<B>>; LogicalUnit::COUNT],
}

impl<B: BlockIo> GptPartitionLookup<B> {
    pub const fn new() -> Self {
        Self { disks: [None, None] }
    }

    /// Attach the disk for `unit`, returning whatever was attached before
    pub fn attach(&mut self, unit: LogicalUnit, disk: BlockDiskIo<B>) -> Option<BlockDiskIo<B>> {
        self.disks[unit.index()].replace(disk)
    }

    pub fn detach(&mut self, unit: LogicalUnit) -> Option<BlockDiskIo<B>> {
        self.disks[unit.index()].take()
    }

    fn disk(&self, unit: LogicalUnit) -> Result<&BlockDiskIo<B>, LookupError> {
        self.disks[unit.index()]
            .as_ref()
            .ok_or(LookupError::NoDisk)
    }

    /// Walk the primary GPT looking for exactly one entry named `label`
    fn scan(disk: &BlockDiskIo<B>, label: &Label) -> Result<EntryMatch, LookupError> {
        let block_len = disk.media().block_size as usize;

        disk.with_device(|device| {
            let mut block_buf = Vec::new();
            block_buf
                .try_reserve_exact(block_len)
                .map_err(|_| LookupError::OutOfMemory)?;
            block_buf.resize(block_len, 0);

            let mut gpt = Disk::new(BlockIoRef(device)).map_err(|_| LookupError::Io)?;

            let header = gpt
                .read_primary_gpt_header(&mut block_buf)
                .map_err(|_| LookupError::Io)?;

            let layout = header
                .get_partition_entry_array_layout()
                .map_err(|_| LookupError::Io)?;

            let iter = gpt
                .gpt_partition_entry_array_iter(layout, &mut block_buf)
                .map_err(|_| LookupError::Io)?;

            let mut found: Option<EntryMatch> = None;

            for (index, entry_result) in iter.enumerate() {
                let entry = entry_result.map_err(|_| LookupError::Io)?;

                if !entry.is_used() {
                    continue;
                }

                // Copy the name out of the packed entry
                let name = entry.name;
                if !label.matches_utf16le(&name.0) {
                    continue;
                }

                if found.is_some() {
                    warn!("Label {} appears more than once in the GPT", label);
                    return Err(LookupError::Ambiguous);
                }

                let unique = entry.unique_partition_guid;
                found = Some(EntryMatch {
                    index: index as u32,
                    starting_lba: entry.starting_lba.to_u64(),
                    ending_lba: entry.ending_lba.to_u64(),
                    unique_guid: unique.to_bytes(),
                });
            }

            let found = found.ok_or(LookupError::NotFound)?;
            if found.ending_lba < found.starting_lba {
                warn!(
                    "GPT entry {} ({}) ends before it starts",
                    found.index, label
                );
                return Err(LookupError::Io);
            }

            Ok(found)
        })
    }
}

impl<B: BlockIo> PartitionLookup for GptPartitionLookup<B> {
    type Disk = BlockDiskIo<B>;

    fn root_disk(&self, unit: LogicalUnit) -> Result<&Self::Disk, LookupError> {
        self.disk(unit)
    }

    fn partition_by_label<'a>(
        &'a self,
        label: &'a Label,
        unit: LogicalUnit,
    ) -> Result<PartitionHandle<'a, Self::Disk>, LookupError> {
        let disk = self.disk(unit)?;
        let entry = Self::scan(disk, label)?;

        debug!(
            "{} on {} unit: entry {}, lba {}..={}",
            label,
            unit.name(),
            entry.index,
            entry.starting_lba,
            entry.ending_lba
        );

        Ok(PartitionHandle {
            label,
            starting_lba: entry.starting_lba,
            ending_lba: entry.ending_lba,
            block_size: disk.media().block_size,
            unique_guid: entry.unique_guid,
            io: disk,
        })
    }
}

//! Operations table handed to the verification engine
//!
//! [`AvbOps`] is the fixed callback contract; [`UefiAvbOps`] is the one
//! implementation, bound at construction to the root disk of the configured
//! logical unit.

use crate::anchor::TrustAnchor;
use crate::config::OpsConfig;
use crate::disk::{self, DiskIo, MediaInfo, PartitionLookup};
use crate::error::{AvbIoResult, IoResult};
use crate::guid;
use crate::lock_state::{self, UnlockState};
use crate::rollback::RollbackIndexStub;
use crate::trust;
use log::{debug, error};

/// Platform callbacks used during boot verification.
pub trait AvbOps {
    /// Read up to `buffer.len()` bytes from `partition`.
    ///
    /// A negative `offset` counts back from the partition end. Returns the
    /// number of bytes read, which is smaller than requested only when the
    /// end of the partition was reached.
    fn read_from_partition(
        &mut self,
        partition: &str,
        offset: i64,
        buffer: &mut [u8],
    ) -> IoResult<usize>;

    /// Write all of `data` to `partition`; nothing is written if it does not fit.
    fn write_to_partition(&mut self, partition: &str, offset: i64, data: &[u8]) -> IoResult<()>;

    /// Whether `public_key` may sign vbmeta images.
    fn validate_vbmeta_public_key(
        &mut self,
        public_key: &[u8],
        public_key_metadata: Option<&[u8]>,
    ) -> IoResult<bool>;

    fn read_rollback_index(&mut self, rollback_index_slot: usize) -> IoResult<u64>;

    fn write_rollback_index(&mut self, rollback_index_slot: usize, index: u64) -> IoResult<()>;

    fn read_is_device_unlocked(&mut self) -> IoResult<bool>;

    /// Write the partition's unique GUID as a NUL-terminated string.
    ///
    /// `guid_buf` must hold at least [`guid::GUID_BUF_SIZE`] bytes.
    fn get_unique_guid_for_partition(
        &mut self,
        partition: &str,
        guid_buf: &mut [u8],
    ) -> IoResult<()>;

    /// Status code for an operation result, as the engine numbers them
    fn status_of<T>(result: &IoResult<T>) -> AvbIoResult
    where
        Self: Sized,
    {
        AvbIoResult::from_result(result)
    }
}

/// Devices resolved once for the root logical unit.
///
/// Read-only after construction.
pub struct OpsContext<'p, D: ?Sized> {
    disk: &'p D,
    media: MediaInfo,
}

impl<'p, D: DiskIo + ?Sized> OpsContext<'p, D> {
    fn new(disk: &'p D) -> Self {
        Self {
            disk,
            media: disk.media(),
        }
    }

    /// Disk I/O for the whole root unit
    pub fn disk(&self) -> &'p D {
        self.disk
    }

    /// Media as seen when the table was built
    pub fn media(&self) -> &MediaInfo {
        &self.media
    }
}

/// The operations table bound to one platform.
pub struct UefiAvbOps<'p, P: PartitionLookup + ?Sized, U: UnlockState + ?Sized> {
    context: OpsContext<'p, P::Disk>,
    partitions: &'p P,
    unlock: &'p U,
    anchor: TrustAnchor,
    rollback: RollbackIndexStub,
    config: OpsConfig,
}

impl<'p, P, U> UefiAvbOps<'p, P, U>
where
    P: PartitionLookup + ?Sized,
    U: UnlockState + ?Sized,
{
    /// Resolve the root disk and build the table.
    ///
    /// Returns `None`, without building anything, when the configured
    /// logical unit has no disk.
    pub fn new(partitions: &'p P, unlock: &'p U, config: OpsConfig) -> Option<Self> {
        let disk = match partitions.root_disk(config.logical_unit) {
            Ok(disk) => disk,
            Err(e) => {
                error!("Failed to get disk information: {}", e);
                return None;
            }
        };

        let context = OpsContext::new(disk);
        let anchor = TrustAnchor::embedded();

        debug!(
            "AVB ops on {} unit: media {}, {} x {} bytes, anchor {} bytes ({} bit key)",
            config.logical_unit.name(),
            context.media.media_id,
            context.media.last_block.saturating_add(1),
            context.media.block_size,
            anchor.len(),
            anchor.key_num_bits().unwrap_or(0)
        );

        Some(Self {
            context,
            partitions,
            unlock,
            anchor,
            rollback: RollbackIndexStub::new(),
            config,
        })
    }

    /// Replace the trust anchor (board-specific keys)
    pub fn with_anchor(mut self, anchor: TrustAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Release the table and its context
    pub fn free(self) {
        debug!("AVB ops released");
    }

    pub fn context(&self) -> &OpsContext<'p, P::Disk> {
        &self.context
    }

    pub fn config(&self) -> &OpsConfig {
        &self.config
    }

    pub fn anchor(&self) -> &TrustAnchor {
        &self.anchor
    }
}

impl<P, U> AvbOps for UefiAvbOps<'_, P, U>
where
    P: PartitionLookup + ?Sized,
    U: UnlockState + ?Sized,
{
    fn read_from_partition(
        &mut self,
        partition: &str,
        offset: i64,
        buffer: &mut [u8],
    ) -> IoResult<usize> {
        disk::read_from_partition(
            self.partitions,
            self.config.logical_unit,
            partition,
            offset,
            buffer,
        )
    }

    fn write_to_partition(&mut self, partition: &str, offset: i64, data: &[u8]) -> IoResult<()> {
        disk::write_to_partition(
            self.partitions,
            self.config.logical_unit,
            partition,
            offset,
            data,
        )
    }

    fn validate_vbmeta_public_key(
        &mut self,
        public_key: &[u8],
        public_key_metadata: Option<&[u8]>,
    ) -> IoResult<bool> {
        trust::validate_vbmeta_public_key(&self.anchor, public_key, public_key_metadata)
    }

    fn read_rollback_index(&mut self, rollback_index_slot: usize) -> IoResult<u64> {
        self.rollback.read_index(rollback_index_slot)
    }

    fn write_rollback_index(&mut self, rollback_index_slot: usize, index: u64) -> IoResult<()> {
        self.rollback.write_index(rollback_index_slot, index)
    }

    fn read_is_device_unlocked(&mut self) -> IoResult<bool> {
        lock_state::read_is_device_unlocked(self.unlock)
    }

    fn get_unique_guid_for_partition(
        &mut self,
        partition: &str,
        guid_buf: &mut [u8],
    ) -> IoResult<()> {
        guid::get_unique_guid_for_partition(
            self.partitions,
            self.config.logical_unit,
            partition,
            guid_buf,
        )
    }
}

//! Byte-addressed access on top of a `gpt_disk_io::BlockIo` device
//!
//! Firmware normally layers EFI_DISK_IO over EFI_BLOCK_IO; this is the same
//! layering for devices that only speak whole blocks (VirtIO-blk, AHCI, and
//! in-memory images under test).
//!
//! Unaligned edges are handled with a one-block scratch buffer:
//!
//! ```text
//!   offset                                     offset + len
//!     │                                             │
//! ────┼──────┬──────────┬──────────┬──────────┬─────┼────
//!     │ head │  block   │  block   │  block   │tail │
//!     │(RMW) │  direct  │  direct  │  direct  │(RMW)│
//! ```

use super::{DiskError, DiskIo, MediaInfo};
use alloc::vec::Vec;
use core::cell::RefCell;
use gpt_disk_io::BlockIo;
use gpt_disk_types::{BlockSize, Lba};

/// Borrowed block device, for handing to `gpt_disk_io::Disk` without giving
/// up ownership
pub struct BlockIoRef<'a, B: BlockIo>(pub &'a mut B);

impl<B: BlockIo> BlockIo for BlockIoRef<'_, B> {
    type Error = B::Error;

    fn block_size(&self) -> BlockSize {
        self.0.block_size()
    }

    fn num_blocks(&mut self) -> Result<u64, Self::Error> {
        self.0.num_blocks()
    }

    fn read_blocks(&mut self, start_lba: Lba, dst: &mut [u8]) -> Result<(), Self::Error> {
        self.0.read_blocks(start_lba, dst)
    }

    fn write_blocks(&mut self, start_lba: Lba, src: &[u8]) -> Result<(), Self::Error> {
        self.0.write_blocks(start_lba, src)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.0.flush()
    }
}

/// `DiskIo` over a block device.
///
/// The device sits in a `RefCell`: operations run one at a time inside the
/// boot call chain, and each transfer holds the borrow only for its own
/// duration.
pub struct BlockDiskIo<B: BlockIo> {
    device: RefCell<B>,
    media: MediaInfo,
}

impl<B: BlockIo> BlockDiskIo<B> {
    /// Wrap `device`, reading its geometry once
    pub fn new(mut device: B, media_id: u32, read_only: bool) -> Result<Self, DiskError> {
        let block_size = device
            .block_size()
            .to_usize()
            .and_then(|bs| u32::try_from(bs).ok())
            .ok_or(DiskError::DeviceError)?;

        let num_blocks = device.num_blocks().map_err(|_| DiskError::DeviceError)?;
        let last_block = num_blocks.checked_sub(1).ok_or(DiskError::NoMedia)?;

        Ok(Self {
            device: RefCell::new(device),
            media: MediaInfo {
                media_id,
                block_size,
                last_block,
                read_only,
            },
        })
    }

    /// Run `f` with exclusive access to the block device
    pub fn with_device<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        let mut device = self.device.borrow_mut();
        f(&mut *device)
    }

    pub fn into_inner(self) -> B {
        self.device.into_inner()
    }

    fn block_len(&self) -> usize {
        self.media.block_size as usize
    }

    fn check_range(&self, offset: u64, len: usize) -> Result<(), DiskError> {
        let end = offset
            .checked_add(len as u64)
            .ok_or(DiskError::OutOfRange)?;
        let size = self.media.size_bytes().ok_or(DiskError::OutOfRange)?;
        if end > size {
            return Err(DiskError::OutOfRange);
        }
        Ok(())
    }

    fn scratch(&self) -> Result<Vec<u8>, DiskError> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(self.block_len())
            .map_err(|_| DiskError::OutOfResources)?;
        buf.resize(self.block_len(), 0);
        Ok(buf)
    }
}

impl<B: BlockIo> DiskIo for BlockDiskIo<B> {
    fn media(&self) -> MediaInfo {
        self.media
    }

    fn read_disk(&self, offset: u64, dst: &mut [u8]) -> Result<(), DiskError> {
        if dst.is_empty() {
            return Ok(());
        }
        self.check_range(offset, dst.len())?;

        let bs = self.block_len();
        let mut scratch: Option<Vec<u8>> = None;
        let mut device = self.device.borrow_mut();
        let mut pos = offset;
        let mut done = 0;

        while done < dst.len() {
            let lba = Lba(pos / bs as u64);
            let within = (pos % bs as u64) as usize;
            let remaining = dst.len() - done;

            let step = if within == 0 && remaining >= bs {
                let whole = remaining - remaining % bs;
                device
                    .read_blocks(lba, &mut dst[done..done + whole])
                    .map_err(|_| DiskError::DeviceError)?;
                whole
            } else {
                let take = (bs - within).min(remaining);
                if scratch.is_none() {
                    scratch = Some(self.scratch()?);
                }
                let block = scratch.as_mut().ok_or(DiskError::OutOfResources)?;
                device
                    .read_blocks(lba, block)
                    .map_err(|_| DiskError::DeviceError)?;
                dst[done..done + take].copy_from_slice(&block[within..within + take]);
                take
            };

            done += step;
            pos += step as u64;
        }

        Ok(())
    }

    fn write_disk(&self, offset: u64, src: &[u8]) -> Result<(), DiskError> {
        if self.media.read_only {
            return Err(DiskError::WriteProtected);
        }
        if src.is_empty() {
            return Ok(());
        }
        self.check_range(offset, src.len())?;

        let bs = self.block_len();
        let mut scratch: Option<Vec<u8>> = None;
        let mut device = self.device.borrow_mut();
        let mut pos = offset;
        let mut done = 0;

        while done < src.len() {
            let lba = Lba(pos / bs as u64);
            let within = (pos % bs as u64) as usize;
            let remaining = src.len() - done;

            let step = if within == 0 && remaining >= bs {
                let whole = remaining - remaining % bs;
                device
                    .write_blocks(lba, &src[done..done + whole])
                    .map_err(|_| DiskError::DeviceError)?;
                whole
            } else {
                // Read-modify-write for a partial block
                let take = (bs - within).min(remaining);
                if scratch.is_none() {
                    scratch = Some(self.scratch()?);
                }
                let block = scratch.as_mut().ok_or(DiskError::OutOfResources)?;
                device
                    .read_blocks(lba, block)
                    .map_err(|_| DiskError::DeviceError)?;
                block[within..within + take].copy_from_slice(&src[done..done + take]);
                device
                    .write_blocks(lba, block)
                    .map_err(|_| DiskError::DeviceError)?;
                take
            };

            done += step;
            pos += step as u64;
        }

        device.flush().map_err(|_| DiskError::DeviceError)
    }
}

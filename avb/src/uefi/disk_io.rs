//! UEFI Disk I/O Protocol adapter
//!
//! Firmware hands out a Block I/O / Disk I/O pair for each disk. Block I/O
//! supplies the media description, Disk I/O moves bytes at arbitrary
//! offsets. `UefiDiskIo` wraps the pair as a [`DiskIo`].

use super::block_io::BlockIoProtocol;
use crate::disk::{DiskError, DiskIo, MediaInfo};

const EFI_SUCCESS: usize = 0;

#[repr(C)]
pub struct DiskIoProtocol {
    pub revision: u64,
    pub read_disk: extern "efiapi" fn(
        *mut DiskIoProtocol,
        u32,     // MediaId
        u64,     // Offset
        usize,   // BufferSize
        *mut u8, // Buffer
    ) -> usize,
    pub write_disk: extern "efiapi" fn(*mut DiskIoProtocol, u32, u64, usize, *const u8) -> usize,
}

pub const EFI_DISK_IO_PROTOCOL_GUID: uguid::Guid =
    uguid::guid!("ce345171-ba0b-11d2-8e4f-00a0c969723b");

/// Disk I/O over a firmware protocol pair
pub struct UefiDiskIo {
    block_io: *mut BlockIoProtocol,
    disk_io: *mut DiskIoProtocol,
}

impl UefiDiskIo {
    /// Wrap a protocol pair belonging to the same handle
    ///
    /// # Safety
    /// Both pointers must be valid, and their media pointer readable, for the
    /// lifetime of this wrapper (boot services must not be exited).
    pub unsafe fn new(block_io: *mut BlockIoProtocol, disk_io: *mut DiskIoProtocol) -> Self {
        Self { block_io, disk_io }
    }

    pub fn block_io(&self) -> *mut BlockIoProtocol {
        self.block_io
    }

    pub fn disk_io(&self) -> *mut DiskIoProtocol {
        self.disk_io
    }
}

fn status(code: usize) -> Result<(), DiskError> {
    if code == EFI_SUCCESS {
        Ok(())
    } else {
        Err(DiskError::Status(code))
    }
}

impl DiskIo for UefiDiskIo {
    fn media(&self) -> MediaInfo {
        // SAFETY: Protocol and media pointers are valid (guaranteed by constructor)
        let media = unsafe { &*(*self.block_io).media };
        MediaInfo {
            media_id: media.media_id,
            block_size: media.block_size,
            last_block: media.last_block,
            read_only: media.read_only,
        }
    }

    fn read_disk(&self, offset: u64, dst: &mut [u8]) -> Result<(), DiskError> {
        let media_id = self.media().media_id;
        // SAFETY: Protocol pointer is valid (guaranteed by constructor)
        let code = unsafe {
            ((*self.disk_io).read_disk)(
                self.disk_io,
                media_id,
                offset,
                dst.len(),
                dst.as_mut_ptr(),
            )
        };
        status(code)
    }

    fn write_disk(&self, offset: u64, src: &[u8]) -> Result<(), DiskError> {
        let media_id = self.media().media_id;
        // SAFETY: Protocol pointer is valid (guaranteed by constructor)
        let code = unsafe {
            ((*self.disk_io).write_disk)(self.disk_io, media_id, offset, src.len(), src.as_ptr())
        };
        status(code)
    }
}

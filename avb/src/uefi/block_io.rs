// UEFI Block I/O Protocol, used here for media geometry only

#[repr(C)]
pub struct BlockIoProtocol {
    pub revision: u64,
    pub media: *const BlockIoMedia,
    pub reset: extern "efiapi" fn(*mut BlockIoProtocol, bool) -> usize,
    pub read_blocks: extern "efiapi" fn(
        *mut BlockIoProtocol,
        u32,     // MediaId
        u64,     // LBA
        usize,   // BufferSize
        *mut u8, // Buffer
    ) -> usize,
    pub write_blocks: extern "efiapi" fn(*mut BlockIoProtocol, u32, u64, usize, *const u8) -> usize,
    pub flush_blocks: extern "efiapi" fn(*mut BlockIoProtocol) -> usize,
}

#[repr(C)]
pub struct BlockIoMedia {
    pub media_id: u32,
    pub removable_media: bool,
    pub media_present: bool,
    pub logical_partition: bool,
    pub read_only: bool,
    pub write_caching: bool,
    pub block_size: u32,
    pub io_align: u32,
    pub last_block: u64,
    // UEFI 2.0+
    pub lowest_aligned_lba: u64,
    pub logical_blocks_per_physical_block: u32,
    // UEFI 2.1+
    pub optimal_transfer_length_granularity: u32,
}

pub const EFI_BLOCK_IO_PROTOCOL_GUID: uguid::Guid =
    uguid::guid!("964e5b21-6459-11d2-8e39-00a0c969723b");

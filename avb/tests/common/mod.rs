//! Common test utilities: in-memory devices and a fake partition table

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::io;

use gpt_disk_io::{BlockIo, Disk};
use gpt_disk_types::{
    guid, BlockSize, GptHeader, GptPartitionEntryArray, GptPartitionType, Lba, LbaLe, U32Le,
};
use morpheus_avb::disk::BlockIoRef;
use morpheus_avb::{
    DiskError, DiskIo, Label, LogicalUnit, LookupError, MediaInfo, PartitionHandle,
    PartitionLookup,
};

/// GUID bytes 01 02 .. 10
pub const SEQUENTIAL_GUID: [u8; 16] = [
    0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
    0x10,
];

/// Fill `buf` with a position-derived pattern so misplaced I/O shows up
pub fn pattern(buf: &mut [u8], base: u64) {
    for (i, byte) in buf.iter_mut().enumerate() {
        let pos = base + i as u64;
        *byte = (pos % 251) as u8;
    }
}

/// Byte-addressed in-memory disk with fault injection
pub struct MemDisk {
    pub data: RefCell<Vec<u8>>,
    pub media_id: u32,
    pub block_size: u32,
    pub fail_reads: Cell<bool>,
    pub fail_writes: Cell<bool>,
    pub read_calls: Cell<usize>,
    pub write_calls: Cell<usize>,
    pub last_read: Cell<Option<(u64, usize)>>,
}

impl MemDisk {
    pub fn new(block_size: u32, num_blocks: u64) -> Self {
        let mut data = vec![0u8; block_size as usize * num_blocks as usize];
        pattern(&mut data, 0);
        Self {
            data: RefCell::new(data),
            media_id: 7,
            block_size,
            fail_reads: Cell::new(false),
            fail_writes: Cell::new(false),
            read_calls: Cell::new(0),
            write_calls: Cell::new(0),
            last_read: Cell::new(None),
        }
    }

    pub fn snapshot(&self) -> Vec<u8> {
        self.data.borrow().clone()
    }
}

impl DiskIo for MemDisk {
    fn media(&self) -> MediaInfo {
        let len = self.data.borrow().len() as u64;
        MediaInfo {
            media_id: self.media_id,
            block_size: self.block_size,
            last_block: len / self.block_size as u64 - 1,
            read_only: false,
        }
    }

    fn read_disk(&self, offset: u64, dst: &mut [u8]) -> Result<(), DiskError> {
        self.read_calls.set(self.read_calls.get() + 1);
        self.last_read.set(Some((offset, dst.len())));
        if self.fail_reads.get() {
            return Err(DiskError::DeviceError);
        }
        let data = self.data.borrow();
        let start = offset as usize;
        if start + dst.len() > data.len() {
            return Err(DiskError::OutOfRange);
        }
        dst.copy_from_slice(&data[start..start + dst.len()]);
        Ok(())
    }

    fn write_disk(&self, offset: u64, src: &[u8]) -> Result<(), DiskError> {
        self.write_calls.set(self.write_calls.get() + 1);
        if self.fail_writes.get() {
            return Err(DiskError::DeviceError);
        }
        let mut data = self.data.borrow_mut();
        let start = offset as usize;
        if start + src.len() > data.len() {
            return Err(DiskError::OutOfRange);
        }
        data[start..start + src.len()].copy_from_slice(src);
        Ok(())
    }
}

/// One row of the fake partition table
#[derive(Clone, Debug)]
pub struct FakeEntry {
    pub name: &'static str,
    pub starting_lba: u64,
    pub ending_lba: u64,
    pub unique_guid: [u8; 16],
}

/// Map-backed partition lookup over a single root disk
pub struct FakePartitions<D> {
    pub root: Option<D>,
    pub unit: LogicalUnit,
    pub entries: Vec<FakeEntry>,
    pub out_of_memory: Cell<bool>,
    pub lookups: Cell<usize>,
}

impl<D: DiskIo> FakePartitions<D> {
    pub fn new(root: D) -> Self {
        Self {
            root: Some(root),
            unit: LogicalUnit::User,
            entries: Vec::new(),
            out_of_memory: Cell::new(false),
            lookups: Cell::new(0),
        }
    }

    pub fn without_disk() -> Self {
        Self {
            root: None,
            unit: LogicalUnit::User,
            entries: Vec::new(),
            out_of_memory: Cell::new(false),
            lookups: Cell::new(0),
        }
    }

    pub fn with_entry(mut self, name: &'static str, starting_lba: u64, ending_lba: u64) -> Self {
        self.entries.push(FakeEntry {
            name,
            starting_lba,
            ending_lba,
            unique_guid: SEQUENTIAL_GUID,
        });
        self
    }

    pub fn with_guid(mut self, name: &'static str, unique_guid: [u8; 16]) -> Self {
        for entry in self.entries.iter_mut().filter(|e| e.name == name) {
            entry.unique_guid = unique_guid;
        }
        self
    }

    pub fn disk(&self) -> &D {
        self.root.as_ref().expect("fake has a root disk")
    }
}

impl<D: DiskIo> PartitionLookup for FakePartitions<D> {
    type Disk = D;

    fn root_disk(&self, unit: LogicalUnit) -> Result<&D, LookupError> {
        if unit != self.unit {
            return Err(LookupError::NoDisk);
        }
        self.root.as_ref().ok_or(LookupError::NoDisk)
    }

    fn partition_by_label<'a>(
        &'a self,
        label: &'a Label,
        unit: LogicalUnit,
    ) -> Result<PartitionHandle<'a, D>, LookupError> {
        self.lookups.set(self.lookups.get() + 1);
        if self.out_of_memory.get() {
            return Err(LookupError::OutOfMemory);
        }
        let disk = self.root_disk(unit)?;

        let mut matches = self.entries.iter().filter(|e| {
            let name: Vec<u16> = e.name.encode_utf16().collect();
            label.matches(&name)
        });
        let entry = matches.next().ok_or(LookupError::NotFound)?;
        if matches.next().is_some() {
            return Err(LookupError::Ambiguous);
        }

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

/// In-memory block device for GPT-backed tests
#[derive(Debug, Clone)]
pub struct MemoryBlockDevice {
    pub data: Vec<u8>,
    pub block_size: usize,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub blocks_written: u64,
}

impl MemoryBlockDevice {
    pub fn new(block_size: usize, num_blocks: usize) -> Self {
        Self {
            data: vec![0u8; block_size * num_blocks],
            block_size,
            fail_reads: false,
            fail_writes: false,
            blocks_written: 0,
        }
    }
}

impl BlockIo for MemoryBlockDevice {
    type Error = io::Error;

    fn block_size(&self) -> BlockSize {
        BlockSize::new(self.block_size as u32).expect("valid block size")
    }

    fn num_blocks(&mut self) -> Result<u64, Self::Error> {
        Ok((self.data.len() / self.block_size) as u64)
    }

    fn read_blocks(&mut self, start_lba: Lba, dst: &mut [u8]) -> Result<(), Self::Error> {
        if self.fail_reads {
            return Err(io::Error::new(io::ErrorKind::Other, "injected read failure"));
        }
        assert_eq!(dst.len() % self.block_size, 0, "partial block read");
        let offset = start_lba.0 as usize * self.block_size;
        if offset + dst.len() > self.data.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "read beyond end of device",
            ));
        }
        dst.copy_from_slice(&self.data[offset..offset + dst.len()]);
        Ok(())
    }

    fn write_blocks(&mut self, start_lba: Lba, src: &[u8]) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::Other, "injected write failure"));
        }
        assert_eq!(src.len() % self.block_size, 0, "partial block write");
        let offset = start_lba.0 as usize * self.block_size;
        if offset + src.len() > self.data.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "write beyond end of device",
            ));
        }
        self.data[offset..offset + src.len()].copy_from_slice(src);
        self.blocks_written += (src.len() / self.block_size) as u64;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// A partition to lay down with [`write_gpt`]
pub struct GptPart {
    pub name: &'static str,
    pub starting_lba: u64,
    pub ending_lba: u64,
    pub unique_guid: [u8; 16],
}

/// Write a protective MBR, primary header and 128-entry array
pub fn write_gpt(device: &mut MemoryBlockDevice, parts: &[GptPart]) {
    let bs = device.block_size;
    let num_blocks = (device.data.len() / bs) as u64;
    let block_size = BlockSize::new(bs as u32).expect("valid block size");
    let entry_blocks = (128 * 128 / bs) as u64;

    let mut disk = Disk::new(BlockIoRef(device)).expect("disk handle");

    let mut header = GptHeader {
        my_lba: LbaLe::from_u64(1),
        alternate_lba: LbaLe::from_u64(num_blocks - 1),
        first_usable_lba: LbaLe::from_u64(2 + entry_blocks),
        last_usable_lba: LbaLe::from_u64(num_blocks - 2 - entry_blocks),
        disk_guid: guid!("57a3e9c0-1b5f-4d2e-9a61-3c7e0d4b8f21"),
        partition_entry_lba: LbaLe::from_u64(2),
        number_of_partition_entries: U32Le::from_u32(128),
        ..Default::default()
    };

    let layout = header
        .get_partition_entry_array_layout()
        .expect("entry layout");

    let mut entry_buf = vec![0u8; 128 * 128];
    let mut entry_array =
        GptPartitionEntryArray::new(layout, block_size, &mut entry_buf).expect("entry array");

    for (i, part) in parts.iter().enumerate() {
        let entry = entry_array
            .get_partition_entry_mut(i.try_into().expect("entry index"))
            .expect("entry slot");
        entry.partition_type_guid = GptPartitionType::BASIC_DATA;
        entry.unique_partition_guid = uguid::Guid::from_bytes(part.unique_guid);
        entry.starting_lba = LbaLe::from_u64(part.starting_lba);
        entry.ending_lba = LbaLe::from_u64(part.ending_lba);
        entry.name = part.name.parse().expect("partition name");
    }

    header.partition_entry_array_crc32 = entry_array.calculate_crc32();
    header.update_header_crc32();

    let mut block_buf = vec![0u8; bs];
    disk.write_protective_mbr(&mut block_buf).expect("mbr");
    disk.write_primary_gpt_header(&header, &mut block_buf)
        .expect("gpt header");
    disk.write_gpt_partition_entry_array(&entry_array)
        .expect("entry array write");
    disk.flush().expect("flush");
}

// Bounds-checked reads and writes against a labelled partition

use super::{DiskIo, Label, LookupError, PartitionHandle, PartitionLookup};
use crate::config::LogicalUnit;
use crate::error::{AvbIoError, IoResult};
use log::{error, trace};

/// Turn an engine offset into a byte offset from the partition start.
///
/// A negative offset counts back from the end of the partition. The result
/// always lies in `[0, partition_size)`.
pub fn resolve_offset(partition_size: u64, offset: i64) -> IoResult<u64> {
    let effective = if offset < 0 {
        let back = offset.unsigned_abs();
        if back > partition_size {
            error!("Offset outside range.");
            return Err(AvbIoError::RangeOutsidePartition);
        }
        partition_size - back
    } else {
        offset as u64
    };

    if effective >= partition_size {
        error!("Offset outside range.");
        return Err(AvbIoError::RangeOutsidePartition);
    }

    Ok(effective)
}

/// Map a lookup failure to the status the caller reports.
///
/// Allocation failure is always `OutOfMemory`; anything else becomes
/// `not_found`.
pub(crate) fn lookup_failed(label: &Label, err: LookupError, not_found: AvbIoError) -> AvbIoError {
    match err {
        LookupError::OutOfMemory => {
            error!("out of memory");
            AvbIoError::OutOfMemory
        }
        other => {
            error!("Partition {} not found: {}", label, other);
            not_found
        }
    }
}

fn make_label(partition: &str) -> IoResult<Label> {
    debug_assert!(!partition.is_empty(), "partition name is required");
    Label::new(partition).map_err(|e| {
        error!("out of memory");
        e
    })
}

/// Size and absolute start of a resolved partition.
///
/// The partition end must also be addressable, so `start + offset` cannot
/// overflow for any offset inside the partition.
fn geometry<D: ?Sized>(part: &PartitionHandle<'_, D>) -> IoResult<(u64, u64)> {
    let size = part.size();
    let start = part.byte_start();
    let end = size.zip(start).and_then(|(size, start)| start.checked_add(size));
    match (size, start, end) {
        (Some(size), Some(start), Some(_)) => Ok((size, start)),
        _ => {
            error!(
                "Partition {} has invalid extent {}..={}",
                part.label, part.starting_lba, part.ending_lba
            );
            Err(AvbIoError::Io)
        }
    }
}

/// Read from `partition` into `buffer`.
///
/// Reading past the end of the partition is not an error: the transfer is
/// clamped and the returned count is smaller than `buffer.len()`.
pub fn read_from_partition<P: PartitionLookup + ?Sized>(
    lookup: &P,
    unit: LogicalUnit,
    partition: &str,
    offset: i64,
    buffer: &mut [u8],
) -> IoResult<usize> {
    let label = make_label(partition)?;
    let part = lookup
        .partition_by_label(&label, unit)
        .map_err(|e| lookup_failed(&label, e, AvbIoError::NoSuchPartition))?;

    let (partition_size, partition_start) = geometry(&part)?;
    let offset = resolve_offset(partition_size, offset)?;

    // Partial read at the partition end
    let available = partition_size - offset;
    let num_read = if buffer.len() as u64 > available {
        available as usize
    } else {
        buffer.len()
    };

    let position = partition_start + offset;
    trace!(
        "read {}: {} bytes at {:#x} (offset {})",
        label,
        num_read,
        position,
        offset
    );

    part.io
        .read_disk(position, &mut buffer[..num_read])
        .map_err(|e| {
            error!("Could not read from Disk: {}", e);
            AvbIoError::Io
        })?;

    Ok(num_read)
}

/// Write all of `data` to `partition`.
///
/// Unlike reads there is no partial transfer: data that would run past the
/// partition end is rejected before any byte reaches the disk.
pub fn write_to_partition<P: PartitionLookup + ?Sized>(
    lookup: &P,
    unit: LogicalUnit,
    partition: &str,
    offset: i64,
    data: &[u8],
) -> IoResult<()> {
    let label = make_label(partition)?;
    let part = lookup
        .partition_by_label(&label, unit)
        .map_err(|e| lookup_failed(&label, e, AvbIoError::NoSuchPartition))?;

    let (partition_size, partition_start) = geometry(&part)?;
    let offset = resolve_offset(partition_size, offset)?;

    if data.len() as u64 > partition_size - offset {
        error!("Cannot write beyond partition boundary.");
        return Err(AvbIoError::RangeOutsidePartition);
    }

    let position = partition_start + offset;
    trace!(
        "write {}: {} bytes at {:#x} (offset {})",
        label,
        data.len(),
        position,
        offset
    );

    part.io.write_disk(position, data).map_err(|e| {
        error!("Could not write to Disk: {}", e);
        AvbIoError::Io
    })
}

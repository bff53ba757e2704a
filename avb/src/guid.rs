//! Partition unique GUID formatting
//!
//! GPT stores GUIDs in the mixed-endian EFI layout: the first three fields
//! are little-endian, the last two are a plain byte sequence.
//!
//! ```text
//! raw bytes:  b0 b1 b2 b3 │ b4 b5 │ b6 b7 │ b8 b9 │ b10 .. b15
//! text:       b3b2b1b0  - b5b4  - b7b6  - b8b9  - b10..b15
//! ```

use crate::config::LogicalUnit;
use crate::disk::{lookup_failed, Label, PartitionLookup};
use crate::error::{AvbIoError, IoResult};
use log::error;

/// Characters in the canonical `8-4-4-4-12` form
pub const GUID_STR_LEN: usize = 36;

/// Smallest buffer the engine may pass: the string plus a NUL
pub const GUID_BUF_SIZE: usize = GUID_STR_LEN + 1;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

fn set_hex(buf: &mut [u8], value: u8) {
    buf[0] = HEX_DIGITS[(value >> 4) as usize];
    buf[1] = HEX_DIGITS[(value & 0x0f) as usize];
}

/// Render raw GUID bytes as lowercase hyphenated ASCII
pub fn guid_to_ascii(unique: &[u8; 16]) -> [u8; GUID_STR_LEN] {
    // Output position for each raw byte, in raw byte order
    const POSITIONS: [usize; 16] = [6, 4, 2, 0, 11, 9, 16, 14, 19, 21, 24, 26, 28, 30, 32, 34];

    let mut out = [b'-'; GUID_STR_LEN];
    for (byte, &pos) in unique.iter().zip(POSITIONS.iter()) {
        set_hex(&mut out[pos..pos + 2], *byte);
    }
    out
}

/// Write the GUID string and its NUL terminator into `buf`.
///
/// Only the first [`GUID_BUF_SIZE`] bytes are touched.
pub fn format_guid(unique: &[u8; 16], buf: &mut [u8]) -> IoResult<()> {
    if buf.len() < GUID_BUF_SIZE {
        error!("GUID buffer size too small.");
        return Err(AvbIoError::Io);
    }

    buf[..GUID_STR_LEN].copy_from_slice(&guid_to_ascii(unique));
    buf[GUID_STR_LEN] = 0;
    Ok(())
}

/// Look up `partition` and write its unique GUID into `guid_buf`.
///
/// An unresolved label reports `Io` here, not `NoSuchPartition`.
pub fn get_unique_guid_for_partition<P: PartitionLookup + ?Sized>(
    lookup: &P,
    unit: LogicalUnit,
    partition: &str,
    guid_buf: &mut [u8],
) -> IoResult<()> {
    debug_assert!(!partition.is_empty(), "partition name is required");

    let label = Label::new(partition).map_err(|e| {
        error!("out of memory");
        e
    })?;
    let part = lookup
        .partition_by_label(&label, unit)
        .map_err(|e| lookup_failed(&label, e, AvbIoError::Io))?;

    format_guid(&part.unique_guid, guid_buf)
}

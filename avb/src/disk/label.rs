// Partition labels as the partition table stores them (UTF-16)

use crate::error::{AvbIoError, IoResult};
use alloc::vec::Vec;
use core::fmt;

/// A partition name converted from the engine's narrow string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
    utf16: Vec<u16>,
}

impl Label {
    /// Convert `name` to UTF-16; the only failure is allocation
    pub fn new(name: &str) -> IoResult<Self> {
        let mut utf16 = Vec::new();
        // UTF-16 never needs more units than UTF-8 has bytes
        utf16
            .try_reserve_exact(name.len())
            .map_err(|_| AvbIoError::OutOfMemory)?;
        utf16.extend(name.encode_utf16());
        Ok(Self { utf16 })
    }

    pub fn as_utf16(&self) -> &[u16] {
        &self.utf16
    }

    pub fn is_empty(&self) -> bool {
        self.utf16.is_empty()
    }

    /// Compare against a NUL-padded UTF-16 name
    pub fn matches(&self, name: &[u16]) -> bool {
        let len = name.iter().position(|&c| c == 0).unwrap_or(name.len());
        &name[..len] == self.utf16.as_slice()
    }

    /// Compare against a NUL-padded UTF-16LE byte array (GPT entry layout)
    pub fn matches_utf16le(&self, raw: &[u8]) -> bool {
        let mut units = raw
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .take_while(|&c| c != 0);

        for &expected in &self.utf16 {
            if units.next() != Some(expected) {
                return false;
            }
        }
        units.next().is_none()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in char::decode_utf16(self.utf16.iter().copied()) {
            f.write_fmt(format_args!("{}", c.unwrap_or(char::REPLACEMENT_CHARACTER)))?;
        }
        Ok(())
    }
}

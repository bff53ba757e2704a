//! Embedded trust anchor
//!
//! The public key that vbmeta signing keys are checked against. `build.rs`
//! copies it into OUT_DIR (see MORPHEUS_AVB_PK) and it is linked into the
//! image read-only.

static AVB_PUBLIC_KEY: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/avb_pk.bin"));

/// Read-only reference key bytes
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TrustAnchor {
    key: &'static [u8],
}

impl TrustAnchor {
    /// The key embedded at build time
    pub fn embedded() -> Self {
        Self::from_static(AVB_PUBLIC_KEY)
    }

    /// Anchor on other static key bytes (e.g. a key placed by a board crate)
    pub const fn from_static(key: &'static [u8]) -> Self {
        Self { key }
    }

    pub fn as_bytes(&self) -> &'static [u8] {
        self.key
    }

    pub fn len(&self) -> usize {
        self.key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }

    /// Modulus size from an AVB public key blob header (big-endian u32)
    pub fn key_num_bits(&self) -> Option<u32> {
        let header: [u8; 4] = self.key.get(..4)?.try_into().ok()?;
        Some(u32::from_be_bytes(header))
    }
}

// vbmeta public key trust against the embedded anchor

use crate::anchor::TrustAnchor;
use crate::error::{AvbIoError, IoResult};
use log::{debug, error};

/// Decide whether `public_key` is trusted.
///
/// A key is trusted when it is a byte prefix of the anchor: it may be shorter
/// than the anchor, but never longer. Note this is weaker than an exact match.
///
/// `public_key_metadata` is accepted and ignored. An empty key is an I/O
/// error, not an untrusted key.
pub fn validate_vbmeta_public_key(
    anchor: &TrustAnchor,
    public_key: &[u8],
    public_key_metadata: Option<&[u8]>,
) -> IoResult<bool> {
    let _ = public_key_metadata;

    if public_key.is_empty() {
        error!("vbmeta public key is empty");
        return Err(AvbIoError::Io);
    }

    let anchor = anchor.as_bytes();
    let trusted = public_key.len() <= anchor.len() && anchor[..public_key.len()] == *public_key;

    debug!(
        "vbmeta public key ({} bytes) trusted: {}",
        public_key.len(),
        trusted
    );
    Ok(trusted)
}

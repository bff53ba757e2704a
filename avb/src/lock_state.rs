// Device lock state, forwarded to the platform's secure-state store

use crate::error::IoResult;
use log::debug;

/// Secure-state capability: whether the device is currently unlocked.
pub trait UnlockState {
    fn device_is_unlocked(&self) -> bool;
}

impl<F: Fn() -> bool> UnlockState for F {
    fn device_is_unlocked(&self) -> bool {
        self()
    }
}

/// Query the platform on every call; the answer is never cached
pub fn read_is_device_unlocked<U: UnlockState + ?Sized>(state: &U) -> IoResult<bool> {
    let unlocked = state.device_is_unlocked();
    debug!("read_is_device_unlocked(): {}", unlocked);
    Ok(unlocked)
}

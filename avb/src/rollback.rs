// Rollback index store placeholder

use crate::error::IoResult;
use log::debug;

/// Rollback indexes without backing storage.
///
/// Every slot reads as 0 and writes are accepted and dropped, so downgrade
/// protection is effectively disabled. The slot/u64 interface is what a
/// tamper-resistant monotonic counter would plug into.
#[derive(Copy, Clone, Debug, Default)]
pub struct RollbackIndexStub;

impl RollbackIndexStub {
    pub const fn new() -> Self {
        Self
    }

    pub fn read_index(&self, rollback_index_slot: usize) -> IoResult<u64> {
        // TODO: back this with an RPMB or TPM NV monotonic counter
        debug!("read_rollback_index({}): no store, returning 0", rollback_index_slot);
        Ok(0)
    }

    pub fn write_index(&self, rollback_index_slot: usize, rollback_index: u64) -> IoResult<()> {
        debug!(
            "write_rollback_index({}, {}): no store, ignored",
            rollback_index_slot, rollback_index
        );
        Ok(())
    }
}

//! MorpheusX Verified Boot Operations
//!
//! Platform operations the verified boot engine calls during early boot:
//! partition reads and writes, public key trust, rollback indexes, device
//! lock state and partition GUIDs.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │       Verification engine (AvbOps)     │
//! └───────────────────┬────────────────────┘
//!                     │ seven operations
//!                     ▼
//! ┌────────────────────────────────────────┐
//! │            UefiAvbOps (ops)            │
//! │  partition_io │ trust │ rollback │ guid│
//! └───────┬───────────────────────┬────────┘
//!         │ PartitionLookup       │ UnlockState
//!         ▼                       ▼
//! ┌──────────────────┐   ┌─────────────────┐
//! │ GPT by label     │   │ secure state    │
//! │ DiskIo (bytes)   │   │ (platform)      │
//! └──────────────────┘   └─────────────────┘
//! ```
//!
//! Everything runs synchronously inside one boot call chain. Partitions are
//! resolved fresh on every call; nothing about the disk layout is cached.
//!
//! # Usage
//!
//! ```ignore
//! use morpheus_avb::{AvbOps, OpsConfig, UefiAvbOps};
//!
//! let mut ops = UefiAvbOps::new(&partitions, &unlock, OpsConfig::default())
//!     .ok_or(BootError::NoDisk)?;
//!
//! let mut header = [0u8; 256];
//! let read = ops.read_from_partition("vbmeta_a", 0, &mut header)?;
//! ```

#![no_std]
#![allow(clippy::new_without_default)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod anchor;
pub mod config;
pub mod disk;
pub mod error;
pub mod guid;
pub mod lock_state;
pub mod logger;
pub mod ops;
pub mod rollback;
pub mod trust;
pub mod uefi;

pub use anchor::TrustAnchor;
pub use config::{LogicalUnit, OpsConfig};
pub use disk::{DiskError, DiskIo, Label, LookupError, MediaInfo, PartitionHandle, PartitionLookup};
pub use error::{AvbIoError, AvbIoResult, IoResult};
pub use lock_state::UnlockState;
pub use ops::{AvbOps, OpsContext, UefiAvbOps};

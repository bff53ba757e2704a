pub mod block_io;
pub mod disk_io;

pub use disk_io::UefiDiskIo;

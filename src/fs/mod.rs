//! 文件系统模块
//!
//! 基于 littlefs2 的嵌入式文件系统支持，特性：
//! - ESP-IDF 分区表定位存储分区
//! - 挂载失败时可选的格式化重试
//! - 卷用量统计与单层目录巡检

pub mod inspect;
pub mod littlefs;
pub mod partition;
pub mod storage;

pub use inspect::{ChildEntry, ListOutcome, UsageSnapshot, Volume};
pub use littlefs::FsError;
#[cfg(target_arch = "xtensa")]
pub use littlefs::{mount, FsAllocation, FsVolume};
pub use partition::{Partition, PartitionTable, PartitionType};
#[cfg(target_arch = "xtensa")]
pub use storage::FlashStorage;
pub use storage::{PartitionWindow, StorageError};

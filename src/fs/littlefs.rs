//! LittleFS 挂载与卷封装
//!
//! 提供带格式化重试的挂载入口，以及实现 [`Volume`] 特征的已挂载卷。

use core::fmt;

#[cfg(target_arch = "xtensa")]
use littlefs2::fs::{Allocation, Filesystem};
#[cfg(target_arch = "xtensa")]
use littlefs2::io::Error as LfsError;
#[cfg(target_arch = "xtensa")]
use littlefs2::path::PathBuf;

#[cfg(target_arch = "xtensa")]
use super::inspect::{ChildEntry, ListOutcome, UsageSnapshot, Volume};
#[cfg(target_arch = "xtensa")]
use super::storage::FlashStorage;
use super::storage::StorageError;
use crate::util::log::*;

/// 文件系统错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "log-defmt", derive(defmt::Format))]
pub enum FsError {
    /// 存储层错误
    Storage(StorageError),
    /// 挂载失败
    MountFailed,
    /// 格式化失败
    FormatFailed,
    /// 文件/目录不存在
    NotFound,
    /// 不是目录
    NotADirectory,
    /// 文件系统损坏
    Corrupt,
    /// 空间不足
    NoSpace,
    /// IO 错误
    Io,
}

impl From<StorageError> for FsError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::MountFailed => write!(f, "Mount failed"),
            Self::FormatFailed => write!(f, "Format failed"),
            Self::NotFound => write!(f, "Not found"),
            Self::NotADirectory => write!(f, "Not a directory"),
            Self::Corrupt => write!(f, "Filesystem corrupt"),
            Self::NoSpace => write!(f, "No space"),
            Self::Io => write!(f, "IO error"),
        }
    }
}

#[cfg(target_arch = "xtensa")]
fn map_lfs(e: LfsError) -> FsError {
    match e {
        LfsError::NoSuchEntry => FsError::NotFound,
        LfsError::PathNotDir => FsError::NotADirectory,
        LfsError::Corruption => FsError::Corrupt,
        LfsError::NoSpace => FsError::NoSpace,
        _ => FsError::Io,
    }
}

/// littlefs2 挂载所需的静态分配
#[cfg(target_arch = "xtensa")]
pub type FsAllocation = Allocation<FlashStorage>;

/// 创建挂载分配
#[cfg(target_arch = "xtensa")]
pub fn allocate() -> FsAllocation {
    Filesystem::allocate()
}

/// 已挂载的 LittleFS 卷
///
/// 析构即放弃卷；设备复位是唯一的其他"卸载"方式。
#[cfg(target_arch = "xtensa")]
pub struct FsVolume<'a> {
    fs: Filesystem<'a, FlashStorage>,
}

/// 挂载文件系统
///
/// 先尝试直接挂载；失败且 `format_on_failure` 置位时，
/// 破坏性地格式化存储并重试一次，否则原样返回错误。
/// 挂载失败对调用方不是致命的：上层报告错误并跳过巡检即可。
#[cfg(target_arch = "xtensa")]
pub fn mount<'a>(
    alloc: &'a mut FsAllocation,
    storage: &'a mut FlashStorage,
    format_on_failure: bool,
) -> Result<FsVolume<'a>, FsError> {
    let needs_format = {
        let probe = Filesystem::mount(&mut *alloc, &mut *storage);
        match probe {
            Ok(_) => false,
            Err(e) => {
                if !format_on_failure {
                    return Err(map_lfs(e));
                }
                log_warn!("LittleFS mount failed ({}), formatting volume", map_lfs(e));
                true
            }
        }
    };

    if needs_format {
        Filesystem::format(&mut *storage).map_err(|_| FsError::FormatFailed)?;
    }

    let fs = Filesystem::mount(alloc, storage).map_err(|_| FsError::MountFailed)?;
    Ok(FsVolume { fs })
}

#[cfg(target_arch = "xtensa")]
impl Volume for FsVolume<'_> {
    fn usage(&self) -> UsageSnapshot {
        let total = self.fs.total_space() as u64;
        // 空闲块查询不可用时静默退化为全零快照
        match self.fs.available_space() {
            Ok(available) => UsageSnapshot {
                total_bytes: total,
                used_bytes: total.saturating_sub(available as u64),
            },
            Err(_) => UsageSnapshot::ZERO,
        }
    }

    fn visit_children(
        &self,
        path: &str,
        visit: &mut dyn FnMut(ChildEntry<'_>),
    ) -> Result<ListOutcome, FsError> {
        let path = PathBuf::from(path);
        let count = self
            .fs
            .read_dir_and_then(&path, |dir| {
                let mut count = 0usize;
                for entry in dir {
                    let entry = entry?;
                    let name: &str = entry.file_name().as_ref();
                    // littlefs 会合成 "." 与 ".." 两个目录项，不属于子项
                    if name == "." || name == ".." {
                        continue;
                    }
                    let metadata = entry.metadata();
                    visit(ChildEntry {
                        name,
                        is_directory: metadata.is_dir(),
                        size_bytes: metadata.len() as u64,
                    });
                    count += 1;
                }
                Ok(count)
            })
            .map_err(map_lfs)?;

        if count == 0 {
            Ok(ListOutcome::Empty)
        } else {
            Ok(ListOutcome::Entries(count))
        }
    }
}

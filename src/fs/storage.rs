//! Flash 存储抽象层
//!
//! 将片上 SPI Flash 的一个分区窗口暴露为 littlefs2 所需的块设备。
//! 底层读写经由 esp-storage 的 NOR Flash 接口完成。

use core::fmt;

#[cfg(target_arch = "xtensa")]
use embedded_storage::nor_flash::{NorFlash, ReadNorFlash};
#[cfg(target_arch = "xtensa")]
use esp_storage::FlashStorage as ChipFlash;
#[cfg(target_arch = "xtensa")]
use littlefs2::{consts, io};

use super::partition;

/// littlefs 读取粒度 (字节)
pub const READ_SIZE: usize = 256;

/// littlefs 编程粒度 (字节)
pub const PROG_SIZE: usize = 256;

/// 文件系统块大小 (等于 Flash 扇区大小)
pub const BLOCK_SIZE: usize = 4096;

/// 存储分区包含的块数 (由板级分区布局决定)
pub const BLOCK_COUNT: usize = partition::STORAGE_SIZE as usize / BLOCK_SIZE;

/// 存储操作错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "log-defmt", derive(defmt::Format))]
pub enum StorageError {
    /// 读取失败
    ReadError,
    /// 写入失败
    WriteError,
    /// 擦除失败
    EraseError,
    /// 地址越界
    OutOfBounds,
    /// 对齐错误
    AlignmentError,
    /// 分区几何与固件配置不符
    GeometryMismatch,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadError => write!(f, "Flash read error"),
            Self::WriteError => write!(f, "Flash write error"),
            Self::EraseError => write!(f, "Flash erase error"),
            Self::OutOfBounds => write!(f, "Address out of bounds"),
            Self::AlignmentError => write!(f, "Address alignment error"),
            Self::GeometryMismatch => write!(f, "Partition geometry mismatch"),
        }
    }
}

/// 分区窗口
///
/// 描述片上 Flash 中一段块对齐的字节区间，并负责
/// 卷内偏移到 Flash 绝对地址的换算与边界检查。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionWindow {
    base: u32,
    size: u32,
}

impl PartitionWindow {
    /// 创建分区窗口，要求起始与长度均按块对齐
    pub const fn new(base: u32, size: u32) -> Result<Self, StorageError> {
        if size == 0 || base % BLOCK_SIZE as u32 != 0 || size % BLOCK_SIZE as u32 != 0 {
            return Err(StorageError::AlignmentError);
        }
        Ok(Self { base, size })
    }

    /// 窗口起始地址
    pub const fn base(&self) -> u32 {
        self.base
    }

    /// 窗口长度 (字节)
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// 窗口包含的块数
    pub const fn block_count(&self) -> u32 {
        self.size / BLOCK_SIZE as u32
    }

    /// 将卷内偏移换算为 Flash 绝对地址，访问越界时报错
    pub fn translate(&self, offset: usize, len: usize) -> Result<u32, StorageError> {
        let end = offset.checked_add(len).ok_or(StorageError::OutOfBounds)?;
        if end > self.size as usize {
            return Err(StorageError::OutOfBounds);
        }
        Ok(self.base + offset as u32)
    }
}

/// Flash 存储
///
/// 持有片上 Flash 句柄和分区窗口，实现 littlefs2 的 `Storage` 特征。
#[cfg(target_arch = "xtensa")]
pub struct FlashStorage {
    flash: ChipFlash,
    window: PartitionWindow,
}

#[cfg(target_arch = "xtensa")]
impl FlashStorage {
    /// 在给定窗口上创建存储实例
    pub fn new(window: PartitionWindow) -> Self {
        Self {
            flash: ChipFlash::new(),
            window,
        }
    }

    /// 从分区表条目创建
    ///
    /// 分区几何必须与固件内置的块数一致，否则拒绝使用。
    pub fn from_partition(p: &partition::Partition) -> Result<Self, StorageError> {
        let window = PartitionWindow::new(p.offset, p.size)?;
        if window.block_count() as usize != BLOCK_COUNT {
            return Err(StorageError::GeometryMismatch);
        }
        Ok(Self::new(window))
    }
}

#[cfg(target_arch = "xtensa")]
impl littlefs2::driver::Storage for FlashStorage {
    const READ_SIZE: usize = READ_SIZE;
    const WRITE_SIZE: usize = PROG_SIZE;
    const BLOCK_SIZE: usize = BLOCK_SIZE;
    const BLOCK_COUNT: usize = BLOCK_COUNT;
    const BLOCK_CYCLES: isize = 500;
    type CACHE_SIZE = consts::U512;
    type LOOKAHEAD_SIZE = consts::U2;

    fn read(&mut self, off: usize, buf: &mut [u8]) -> io::Result<usize> {
        let addr = self
            .window
            .translate(off, buf.len())
            .map_err(|_| io::Error::Io)?;
        ReadNorFlash::read(&mut self.flash, addr, buf).map_err(|_| io::Error::Io)?;
        Ok(buf.len())
    }

    fn write(&mut self, off: usize, data: &[u8]) -> io::Result<usize> {
        let addr = self
            .window
            .translate(off, data.len())
            .map_err(|_| io::Error::Io)?;
        NorFlash::write(&mut self.flash, addr, data).map_err(|_| io::Error::Io)?;
        Ok(data.len())
    }

    fn erase(&mut self, off: usize, len: usize) -> io::Result<usize> {
        let from = self.window.translate(off, len).map_err(|_| io::Error::Io)?;
        let to = from + len as u32;
        NorFlash::erase(&mut self.flash, from, to).map_err(|_| io::Error::Io)?;
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_requires_block_alignment() {
        assert!(PartitionWindow::new(0x410000, 0xBF0000).is_ok());
        assert_eq!(
            PartitionWindow::new(0x410001, 0xBF0000),
            Err(StorageError::AlignmentError)
        );
        assert_eq!(
            PartitionWindow::new(0x410000, 0x100),
            Err(StorageError::AlignmentError)
        );
        assert_eq!(
            PartitionWindow::new(0x410000, 0),
            Err(StorageError::AlignmentError)
        );
    }

    #[test]
    fn window_translates_relative_offsets() {
        let window = PartitionWindow::new(0x410000, 0xBF0000).unwrap();
        assert_eq!(window.translate(0, 256).unwrap(), 0x410000);
        assert_eq!(window.translate(0x1000, 256).unwrap(), 0x411000);
    }

    #[test]
    fn window_rejects_out_of_bounds_access() {
        let window = PartitionWindow::new(0x410000, 0x2000).unwrap();
        assert_eq!(window.translate(0x2000, 1), Err(StorageError::OutOfBounds));
        assert_eq!(
            window.translate(0x1F00, 0x200),
            Err(StorageError::OutOfBounds)
        );
    }

    #[test]
    fn board_preset_matches_builtin_geometry() {
        let window =
            PartitionWindow::new(partition::STORAGE_OFFSET, partition::STORAGE_SIZE).unwrap();
        assert_eq!(window.block_count() as usize, BLOCK_COUNT);
    }
}

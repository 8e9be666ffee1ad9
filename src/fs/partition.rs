//! ESP32 分区表支持
//!
//! 解析 ESP-IDF 格式的分区表并定位文件系统分区。
//! 本固件只关心数据分区，应用分区仅按原始子类型记录。

use core::fmt;

/// 分区表魔数 (ESP-IDF 格式)
const PARTITION_TABLE_MAGIC: u16 = 0xAA50;

/// 固件支持的最大分区条目数
const MAX_PARTITION_ENTRIES: usize = 16;

/// 分区表在 Flash 中的偏移量 (默认 0x8000)
pub const PARTITION_TABLE_OFFSET: u32 = 0x8000;

/// 单个分区条目大小
const PARTITION_ENTRY_SIZE: usize = 32;

/// 板级布局: 存储分区起始偏移 (16MB Flash, 单应用)
pub const STORAGE_OFFSET: u32 = 0x410000;

/// 板级布局: 存储分区大小 (约 12MB)
pub const STORAGE_SIZE: u32 = 0xBF0000;

/// 分区类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionType {
    /// 应用程序分区
    App,
    /// 数据分区
    Data,
    /// 未知类型
    Unknown(u8),
}

impl From<u8> for PartitionType {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::App,
            0x01 => Self::Data,
            other => Self::Unknown(other),
        }
    }
}

/// 数据分区子类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSubType {
    /// NVS (Non-Volatile Storage)
    Nvs,
    /// PHY 初始化数据
    Phy,
    /// FAT 文件系统
    Fat,
    /// SPIFFS 文件系统
    Spiffs,
    /// LittleFS 文件系统 (用户自定义，常用 0x83)
    LittleFs,
    /// 未知子类型
    Unknown(u8),
}

impl From<u8> for DataSubType {
    fn from(value: u8) -> Self {
        match value {
            0x02 => Self::Nvs,
            0x01 => Self::Phy,
            0x81 => Self::Fat,
            0x82 => Self::Spiffs,
            0x83 => Self::LittleFs,
            other => Self::Unknown(other),
        }
    }
}

impl DataSubType {
    /// 转换为 u8 值
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Nvs => 0x02,
            Self::Phy => 0x01,
            Self::Fat => 0x81,
            Self::Spiffs => 0x82,
            Self::LittleFs => 0x83,
            Self::Unknown(v) => *v,
        }
    }
}

/// 单个分区描述
#[derive(Clone)]
pub struct Partition {
    /// 分区标签 (最长15字符 + null)
    pub label: heapless::String<16>,
    /// 分区类型
    pub partition_type: PartitionType,
    /// 子类型 (原始值)
    pub subtype: u8,
    /// 分区在 Flash 中的偏移量
    pub offset: u32,
    /// 分区大小 (字节)
    pub size: u32,
}

impl Partition {
    /// 从原始字节解析分区条目
    pub fn from_bytes(data: &[u8; PARTITION_ENTRY_SIZE]) -> Option<Self> {
        let magic = u16::from_le_bytes([data[0], data[1]]);
        if magic != PARTITION_TABLE_MAGIC {
            return None;
        }

        let partition_type = PartitionType::from(data[2]);
        let subtype = data[3];
        let offset = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        let size = u32::from_le_bytes([data[8], data[9], data[10], data[11]]);

        // 标签: 12-27 字节，null 结尾
        let label_bytes = &data[12..28];
        let label_len = label_bytes.iter().position(|&b| b == 0).unwrap_or(16);
        let label_str = core::str::from_utf8(&label_bytes[..label_len]).ok()?;
        let mut label = heapless::String::new();
        label.push_str(label_str).ok()?;

        Some(Self {
            label,
            partition_type,
            subtype,
            offset,
            size,
        })
    }

    /// 检查是否为数据分区
    pub fn is_data(&self) -> bool {
        matches!(self.partition_type, PartitionType::Data)
    }

    /// 检查是否为 LittleFS 分区
    pub fn is_littlefs(&self) -> bool {
        self.is_data() && self.subtype == DataSubType::LittleFs.as_u8()
    }

    /// 计算分区包含的块数 (给定块大小)
    pub fn block_count(&self, block_size: u32) -> u32 {
        self.size / block_size
    }
}

impl fmt::Debug for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partition")
            .field("label", &self.label.as_str())
            .field("type", &self.partition_type)
            .field("subtype", &self.subtype)
            .field("offset", &format_args!("0x{:08X}", self.offset))
            .field("size", &format_args!("0x{:08X}", self.size))
            .finish()
    }
}

/// 分区表
pub struct PartitionTable {
    partitions: heapless::Vec<Partition, MAX_PARTITION_ENTRIES>,
}

impl PartitionTable {
    /// 创建空分区表
    pub const fn new() -> Self {
        Self {
            partitions: heapless::Vec::new(),
        }
    }

    /// 从 Flash 数据解析分区表
    ///
    /// `data` 为从 [`PARTITION_TABLE_OFFSET`] 读出的原始字节。
    /// 遇到全 0xFF 的结束标记或无效条目即停止；解析不出任何条目时返回 None。
    pub fn from_flash_data(data: &[u8]) -> Option<Self> {
        let mut table = Self::new();

        if data.len() < PARTITION_ENTRY_SIZE {
            return None;
        }

        for chunk in data.chunks_exact(PARTITION_ENTRY_SIZE) {
            let entry_data: &[u8; PARTITION_ENTRY_SIZE] = chunk.try_into().ok()?;

            if entry_data[0] == 0xFF && entry_data[1] == 0xFF {
                break;
            }

            if let Some(partition) = Partition::from_bytes(entry_data) {
                table.partitions.push(partition).ok()?;
            } else {
                break;
            }
        }

        if table.partitions.is_empty() {
            None
        } else {
            Some(table)
        }
    }

    /// 手动添加分区 (用于已知的板级布局)
    pub fn add_partition(
        &mut self,
        label: &str,
        partition_type: PartitionType,
        subtype: u8,
        offset: u32,
        size: u32,
    ) -> Result<(), ()> {
        let mut label_str = heapless::String::new();
        label_str.push_str(label).map_err(|_| ())?;

        self.partitions
            .push(Partition {
                label: label_str,
                partition_type,
                subtype,
                offset,
                size,
            })
            .map_err(|_| ())
    }

    /// 按标签查找分区
    pub fn find_by_label(&self, label: &str) -> Option<&Partition> {
        self.partitions.iter().find(|p| p.label.as_str() == label)
    }

    /// 查找第一个 LittleFS 分区
    pub fn find_littlefs(&self) -> Option<&Partition> {
        self.partitions.iter().find(|p| p.is_littlefs())
    }

    /// 获取所有分区
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// 获取分区数量
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// 检查分区表是否为空
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

impl Default for PartitionTable {
    fn default() -> Self {
        Self::new()
    }
}

/// 板级分区布局预设
pub mod presets {
    use super::*;

    /// 16MB Flash 单应用布局 (最大存储空间)
    ///
    /// - nvs: 0x9000, 24KB
    /// - factory: 0x10000, 4MB
    /// - storage: 0x410000, ~12MB (LittleFS)
    pub fn board_16mb() -> PartitionTable {
        let mut table = PartitionTable::new();

        table
            .add_partition("nvs", PartitionType::Data, DataSubType::Nvs.as_u8(), 0x9000, 0x6000)
            .ok();

        // 工厂应用 (App/factory = 子类型 0x00)
        table
            .add_partition("factory", PartitionType::App, 0x00, 0x10000, 0x400000)
            .ok();

        table
            .add_partition(
                "storage",
                PartitionType::Data,
                DataSubType::LittleFs.as_u8(),
                STORAGE_OFFSET,
                STORAGE_SIZE,
            )
            .ok();

        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_from_bytes() {
        let mut data = [0u8; 32];
        data[0] = 0x50; // 魔数低字节
        data[1] = 0xAA; // 魔数高字节
        data[2] = 0x01; // 类型: Data
        data[3] = 0x83; // 子类型: LittleFS
        data[4..8].copy_from_slice(&0x00410000u32.to_le_bytes());
        data[8..12].copy_from_slice(&0x00BF0000u32.to_le_bytes());
        data[12..19].copy_from_slice(b"storage");

        let partition = Partition::from_bytes(&data).unwrap();
        assert_eq!(partition.label.as_str(), "storage");
        assert!(partition.is_data());
        assert!(partition.is_littlefs());
        assert_eq!(partition.offset, 0x00410000);
        assert_eq!(partition.size, 0x00BF0000);
    }

    #[test]
    fn partition_rejects_bad_magic() {
        let data = [0u8; 32];
        assert!(Partition::from_bytes(&data).is_none());
    }

    #[test]
    fn table_stops_at_terminator() {
        let mut data = [0xFFu8; 64];
        data[0] = 0x50;
        data[1] = 0xAA;
        data[2] = 0x01;
        data[3] = 0x02;
        data[12..15].copy_from_slice(b"nvs");
        data[15] = 0;

        let table = PartitionTable::from_flash_data(&data).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.find_by_label("nvs").is_some());
    }

    #[test]
    fn preset_sits_above_partition_table() {
        // 任何分区都不得与 0x8000 处的分区表区域重叠
        let table = presets::board_16mb();
        for p in table.partitions() {
            assert!(p.offset > PARTITION_TABLE_OFFSET);
        }
    }

    #[test]
    fn board_preset_has_littlefs_storage() {
        let table = presets::board_16mb();
        assert_eq!(table.len(), 3);
        let storage = table.find_littlefs().unwrap();
        assert_eq!(storage.label.as_str(), "storage");
        assert_eq!(storage.offset, STORAGE_OFFSET);
        assert_eq!(storage.size, STORAGE_SIZE);
    }
}

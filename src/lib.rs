//! FlashBlink - ESP32-S3 板级点亮测试固件库
//!
//! 本库提供以下核心功能:
//! - LittleFS 闪存文件系统挂载与巡检 (用量统计 + 根目录列表)
//! - 指示灯驱动 (板载 GPIO LED 或 WS2812 单像素，编译期二选一)
//! - 条件编译日志系统

#![no_std]

pub mod fs;
pub mod output;
pub mod util;

// ===== 重导出常用类型 =====
pub use fs::inspect::{ChildEntry, ListOutcome, UsageSnapshot, Volume};
pub use fs::littlefs::FsError;
#[cfg(target_arch = "xtensa")]
pub use fs::littlefs::FsVolume;
#[cfg(target_arch = "xtensa")]
pub use output::OutputDevice;
pub use output::OutputState;

// ===== 版本信息 =====
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// 固件配置常量
pub mod config {
    use smart_leds::RGB8;

    /// 指示灯翻转间隔 (ms)
    pub const BLINK_INTERVAL_MS: u64 = 2500;

    /// 巡检计数阈值: 计数超过该值时重新巡检文件系统
    pub const INSPECT_THRESHOLD: u32 = 10;

    /// 巡检计数初值
    ///
    /// 参考实现的计数器从 5 起步，因此首次重新巡检比后续周期来得早。
    /// 此处按原样保留该可观察时序。
    pub const INSPECT_COUNTER_BOOT: u32 = 5;

    /// 每次巡检后的额外延时 (ms)
    pub const INSPECT_SETTLE_MS: u64 = 2000;

    /// 巡检的根路径 (仅遍历该路径的直接子项)
    pub const ROOT_DIR: &str = "/";

    /// WS2812 像素亮度 (0-255)
    pub const PIXEL_BRIGHTNESS: u8 = 20;

    /// WS2812 点亮颜色 (蓝色)
    pub const PIXEL_ON_COLOR: RGB8 = RGB8 { r: 0, g: 0, b: 255 };
}

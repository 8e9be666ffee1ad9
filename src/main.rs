//! FlashBlink - ESP32-S3 板级点亮测试固件
//!
//! 启动流程:
//! 1. 初始化 HAL，打印版本横幅
//! 2. 初始化指示灯 (编译期选择 GPIO LED 或 WS2812 像素)
//! 3. 挂载 LittleFS 并打印用量报告与根目录列表 (失败仅报告，不致命)
//! 4. 进入主循环: 周期性翻转指示灯，按计数阈值重新巡检文件系统
//!
//! 硬件目标: ESP32-S3-N16R8 (16MB Flash)

#![no_std]
#![no_main]

esp_bootloader_esp_idf::esp_app_desc!();

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_hal::timer::timg::TimerGroup;
use static_cell::StaticCell;

use flashblink::config;
use flashblink::fs::littlefs::{self, FsAllocation};
use flashblink::fs::storage::FlashStorage;
use flashblink::fs::{inspect, partition};
use flashblink::output::OutputDevice;
use flashblink::{log_error, log_info};

// ===== 日志传输层 =====
#[cfg(feature = "log-defmt")]
use defmt_rtt as _;

// ===== Panic Handler =====
#[cfg(any(feature = "dev", feature = "log-println"))]
use esp_backtrace as _;

#[cfg(not(any(feature = "dev", feature = "log-println")))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {
        core::hint::spin_loop();
    }
}

// ===== 像素链路类型 (LED 构建下仅用于命名 OutputDevice 的泛型) =====
type PixelLink = ws2812_spi::Ws2812<esp_hal::spi::master::Spi<'static, esp_hal::Blocking>>;
type Indicator = OutputDevice<PixelLink>;

// ===== 静态分配: 文件系统存储与挂载内存 =====
static STORAGE: StaticCell<FlashStorage> = StaticCell::new();
static FS_ALLOC: StaticCell<FsAllocation> = StaticCell::new();

/// 执行一轮文件系统巡检
///
/// 每轮重新挂载 (必要时格式化)；挂载失败只报告，
/// 用量查询与目录遍历随之跳过。
fn run_inspection(storage: &mut FlashStorage, alloc: &mut FsAllocation) {
    log_info!("Initializing LittleFS...");
    match littlefs::mount(alloc, storage, true) {
        Ok(volume) => {
            log_info!("Info: LittleFS initialization OK.");
            inspect::report(&volume, config::ROOT_DIR);
        }
        Err(e) => {
            log_error!("Error: LittleFS initialization failed. ({})", e);
        }
    }
}

#[esp_rtos::main]
async fn main(_spawner: Spawner) {
    let peripherals = esp_hal::init(esp_hal::Config::default());

    log_info!("Program version: {}", flashblink::VERSION);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // ========================================
    // 指示灯初始化 (编译期选择变体)
    // ========================================
    #[cfg(not(feature = "neopixel"))]
    let mut device: Indicator = {
        use esp_hal::gpio::{Level, Output, OutputConfig};
        use flashblink::output::LedOutput;

        let pin = Output::new(peripherals.GPIO2, Level::Low, OutputConfig::default());
        log_info!("Using LED on GPIO2");
        OutputDevice::Led(LedOutput::new(pin))
    };

    #[cfg(feature = "neopixel")]
    let mut device: Indicator = {
        use esp_hal::spi::master::{Config as SpiConfig, Spi};
        use esp_hal::time::Rate;
        use flashblink::output::PixelOutput;
        use ws2812_spi::Ws2812;

        // WS2812 用 SPI MOSI 作为单线数据流，约 3MHz
        // 配置失败无灯可点，报告后停机等待复位
        let spi = match Spi::new(
            peripherals.SPI2,
            SpiConfig::default().with_frequency(Rate::from_mhz(3)),
        ) {
            Ok(spi) => spi.with_mosi(peripherals.GPIO48),
            Err(_) => {
                log_error!("Error: NeoPixel SPI init failed.");
                loop {
                    core::hint::spin_loop();
                }
            }
        };
        log_info!("Using NeoPixel on GPIO48");
        OutputDevice::Pixel(PixelOutput::new(Ws2812::new(spi)))
    };

    // ========================================
    // 文件系统初始化: 从板级分区布局定位存储分区
    // ========================================
    let table = partition::presets::board_16mb();
    let mut fs_ctx = match table.find_littlefs().map(FlashStorage::from_partition) {
        Some(Ok(storage)) => Some((STORAGE.init(storage), FS_ALLOC.init(littlefs::allocate()))),
        Some(Err(e)) => {
            log_error!("Error: storage partition unusable. ({})", e);
            None
        }
        None => {
            log_error!("Error: no LittleFS partition in table.");
            None
        }
    };

    // 开机先巡检一次
    if let Some((storage, alloc)) = fs_ctx.as_mut() {
        run_inspection(storage, alloc);
    }

    // ========================================
    // 主循环: 翻转指示灯 + 按计数阈值重新巡检
    // ========================================
    // 计数器从 5 起步，使首次重新巡检早于后续周期 (保留参考时序)
    let mut count: u32 = config::INSPECT_COUNTER_BOOT;

    loop {
        device.toggle();
        Timer::after(Duration::from_millis(config::BLINK_INTERVAL_MS)).await;

        if count > config::INSPECT_THRESHOLD {
            if let Some((storage, alloc)) = fs_ctx.as_mut() {
                run_inspection(storage, alloc);
            }
            count = 0;
            Timer::after(Duration::from_millis(config::INSPECT_SETTLE_MS)).await;
            continue;
        }
        count += 1;
    }
}

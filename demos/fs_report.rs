//! 文件系统报告演示
//!
//! 挂载 LittleFS (必要时格式化)，打印一次用量报告和根目录列表，然后空转。
//!
//! # 运行
//! ```bash
//! cargo run --example fs_report --features dev --target xtensa-esp32s3-none-elf
//! ```

#![no_std]
#![no_main]

esp_bootloader_esp_idf::esp_app_desc!();

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;
use esp_println::println;
use static_cell::StaticCell;

use flashblink::fs::littlefs::{self, FsAllocation};
use flashblink::fs::storage::FlashStorage;
use flashblink::fs::{inspect, partition};

static STORAGE: StaticCell<FlashStorage> = StaticCell::new();
static FS_ALLOC: StaticCell<FsAllocation> = StaticCell::new();

#[esp_rtos::main]
async fn main(_spawner: Spawner) {
    let peripherals = esp_hal::init(esp_hal::Config::default());

    println!("Filesystem report demo");
    println!("======================");

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let table = partition::presets::board_16mb();
    for p in table.partitions() {
        println!(
            "  {}: offset=0x{:X}, size=0x{:X} ({} KB)",
            p.label.as_str(),
            p.offset,
            p.size,
            p.size / 1024
        );
    }

    match table.find_littlefs().map(FlashStorage::from_partition) {
        Some(Ok(storage)) => {
            let storage = STORAGE.init(storage);
            let alloc = FS_ALLOC.init(littlefs::allocate());
            match littlefs::mount(alloc, storage, true) {
                Ok(volume) => inspect::report(&volume, "/"),
                Err(e) => println!("Mount failed: {}", e),
            }
        }
        Some(Err(e)) => println!("Storage partition unusable: {}", e),
        None => println!("No LittleFS partition in table"),
    }

    loop {
        Timer::after(Duration::from_secs(60)).await;
    }
}

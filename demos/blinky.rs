//! Blinky 演示 - 指示灯翻转
//!
//! 最简单的 FlashBlink 演示: 只驱动板载 LED，不挂载文件系统。
//!
//! # 运行
//! ```bash
//! cargo run --example blinky --features dev --target xtensa-esp32s3-none-elf
//! ```

#![no_std]
#![no_main]

esp_bootloader_esp_idf::esp_app_desc!();

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::timer::timg::TimerGroup;
use esp_println::println;

use flashblink::output::LedOutput;

#[esp_rtos::main]
async fn main(_spawner: Spawner) {
    let peripherals = esp_hal::init(esp_hal::Config::default());

    println!("Blinky demo ({} v{})", flashblink::NAME, flashblink::VERSION);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let pin = Output::new(peripherals.GPIO2, Level::Low, OutputConfig::default());
    let mut led = LedOutput::new(pin);

    loop {
        led.toggle();
        Timer::after(Duration::from_millis(500)).await;
    }
}

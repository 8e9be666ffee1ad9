//! 板载 GPIO LED 驱动

use esp_hal::gpio::Output;

use super::OutputState;
use crate::util::log::*;

/// 二值 LED 输出
///
/// 状态以引脚回读为准，日志报告的即是硬件实际电平。
pub struct LedOutput {
    pin: Output<'static>,
}

impl LedOutput {
    /// 接管一个已配置为输出的引脚 (调用方负责初始电平为低)
    pub fn new(pin: Output<'static>) -> Self {
        Self { pin }
    }

    /// 翻转引脚电平并报告新状态
    pub fn toggle(&mut self) -> OutputState {
        self.pin.toggle();
        let state = self.state();
        log_info!("LED is {}", state.label());
        state
    }

    /// 以引脚回读为准的当前状态
    pub fn state(&self) -> OutputState {
        if self.pin.is_set_high() {
            OutputState::On
        } else {
            OutputState::Off
        }
    }
}

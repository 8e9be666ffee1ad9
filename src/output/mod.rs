//! 指示灯输出驱动
//!
//! 两种设备变体，编译期选定其一构造 (cargo feature `neopixel`):
//! - `led`: 板载 GPIO LED，电平翻转
//! - `pixel`: WS2812 单像素，清灯/点亮固定颜色
//!
//! 两者共用同一个 [`OutputDevice`] 接口和 [`OutputState`] 状态机。

#[cfg(target_arch = "xtensa")]
pub mod led;
pub mod pixel;

#[cfg(target_arch = "xtensa")]
pub use led::LedOutput;
pub use pixel::PixelOutput;

#[cfg(target_arch = "xtensa")]
use smart_leds::{SmartLedsWrite, RGB8};

/// 指示灯状态机
///
/// 两个状态 {OFF, ON}，初始 OFF，仅由 `toggle()` 触发互相转换，无终态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputState {
    /// 熄灭
    #[default]
    Off,
    /// 点亮
    On,
}

impl OutputState {
    /// 翻转后的状态
    pub fn toggled(self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }

    /// 是否点亮
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    /// 日志标签
    pub fn label(self) -> &'static str {
        if self.is_on() {
            "ON"
        } else {
            "OFF"
        }
    }
}

/// 指示灯设备
///
/// 每次构建只会实例化一个变体；哪个变体被构造由编译期配置决定，
/// 运行期不做多态切换。
#[cfg(target_arch = "xtensa")]
pub enum OutputDevice<W: SmartLedsWrite<Color = RGB8>> {
    /// 板载 GPIO LED
    Led(LedOutput),
    /// WS2812 单像素
    Pixel(PixelOutput<W>),
}

#[cfg(target_arch = "xtensa")]
impl<W: SmartLedsWrite<Color = RGB8>> OutputDevice<W> {
    /// 翻转指示灯并返回新状态 (设备写入在此层视为不可失败)
    pub fn toggle(&mut self) -> OutputState {
        match self {
            Self::Led(led) => led.toggle(),
            Self::Pixel(pixel) => pixel.toggle(),
        }
    }

    /// 当前状态
    pub fn state(&self) -> OutputState {
        match self {
            Self::Led(led) => led.state(),
            Self::Pixel(pixel) => pixel.state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_between_two_states() {
        let state = OutputState::Off;
        assert_eq!(state.toggled(), OutputState::On);
        assert_eq!(state.toggled().toggled(), OutputState::Off);
    }

    #[test]
    fn default_state_is_off() {
        assert_eq!(OutputState::default(), OutputState::Off);
        assert!(!OutputState::default().is_on());
    }

    #[test]
    fn labels_match_log_text() {
        assert_eq!(OutputState::On.label(), "ON");
        assert_eq!(OutputState::Off.label(), "OFF");
    }
}

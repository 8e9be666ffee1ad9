//! WS2812 单像素驱动
//!
//! 通过 smart-leds 写接口驱动一颗像素: ON 写入固定颜色，OFF 清为黑色。

use smart_leds::{brightness, SmartLedsWrite, RGB8};

use super::OutputState;
use crate::config::{PIXEL_BRIGHTNESS, PIXEL_ON_COLOR};
use crate::util::log::*;

/// 单像素输出
pub struct PixelOutput<W: SmartLedsWrite<Color = RGB8>> {
    link: W,
    state: OutputState,
}

impl<W: SmartLedsWrite<Color = RGB8>> PixelOutput<W> {
    /// 接管像素写链路，上电先清灯
    pub fn new(mut link: W) -> Self {
        show(&mut link, RGB8::default());
        Self {
            link,
            state: OutputState::Off,
        }
    }

    /// 翻转像素并报告新状态
    pub fn toggle(&mut self) -> OutputState {
        self.state = self.state.toggled();
        let color = if self.state.is_on() {
            PIXEL_ON_COLOR
        } else {
            RGB8::default()
        };
        show(&mut self.link, color);
        log_info!("NeoPixel is {}", self.state.label());
        self.state
    }

    /// 当前状态
    pub fn state(&self) -> OutputState {
        self.state
    }
}

/// 写入单个像素颜色
///
/// 此层将链路视为不可失败: 写失败只记录，不上抛。
fn show<W: SmartLedsWrite<Color = RGB8>>(link: &mut W, color: RGB8) {
    if link
        .write(brightness([color].into_iter(), PIXEL_BRIGHTNESS))
        .is_err()
    {
        log_debug!("pixel write dropped");
    }
}

//! 采集端接口
//!
//! 摄像头子系统只通过这两个 trait 被消费：`open` 得到句柄，句柄逐帧读取，
//! `release` 后不再触碰设备。

use es_core::{Frame, Result};

/// 采集源：按设备号打开采集句柄
pub trait CaptureSource {
    /// 后端名称 (日志用)
    fn name(&self) -> &'static str;

    /// 打开设备，失败时返回 `EmoScopeError::DeviceUnavailable`
    fn open(&self, device_id: u32) -> Result<Box<dyn CaptureStream>>;
}

/// 已打开的采集句柄
pub trait CaptureStream {
    /// 读取一帧，失败视为瞬时错误
    fn read_frame(&mut self) -> Result<Frame>;

    /// 释放设备
    fn release(&mut self);
}

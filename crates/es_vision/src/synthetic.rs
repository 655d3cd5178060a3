//! 合成摄像头
//!
//! 生成确定性的移动渐变 BGR 测试图案，没有真实设备时用于演示与测试。

use tracing::debug;

use es_core::{EmoScopeError, Frame, PixelFormat, Result};

use crate::capture::{CaptureSource, CaptureStream};

/// 合成摄像头配置
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub width: u32,
    pub height: u32,
    /// 视为"已连接"的设备号
    pub devices: Vec<u32>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            devices: vec![0],
        }
    }
}

/// 合成摄像头
#[derive(Debug, Clone, Default)]
pub struct SyntheticCamera {
    config: SyntheticConfig,
}

impl SyntheticCamera {
    pub fn new(config: SyntheticConfig) -> Self {
        Self { config }
    }
}

impl CaptureSource for SyntheticCamera {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn open(&self, device_id: u32) -> Result<Box<dyn CaptureStream>> {
        if !self.config.devices.contains(&device_id) {
            return Err(EmoScopeError::DeviceUnavailable {
                device_id,
                reason: "no synthetic device with this id".to_string(),
            });
        }

        debug!(device_id, "synthetic camera opened");
        Ok(Box::new(SyntheticStream {
            width: self.config.width,
            height: self.config.height,
            phase: 0,
            released: false,
        }))
    }
}

/// 合成采集句柄
struct SyntheticStream {
    width: u32,
    height: u32,
    phase: u32,
    released: bool,
}

impl SyntheticStream {
    /// 生成当前相位的 BGR 图案
    fn render(&self) -> Vec<u8> {
        let (w, h) = (self.width as usize, self.height as usize);
        let mut data = Vec::with_capacity(w * h * 3);
        for y in 0..h {
            for x in 0..w {
                let shifted = (x + self.phase as usize) % w;
                data.push((shifted * 255 / w) as u8);
                data.push((y * 255 / h) as u8);
                data.push((self.phase % 256) as u8);
            }
        }
        data
    }
}

impl CaptureStream for SyntheticStream {
    fn read_frame(&mut self) -> Result<Frame> {
        if self.released {
            return Err(EmoScopeError::FrameRead("stream released".to_string()));
        }

        let frame = Frame::new(self.width, self.height, PixelFormat::Bgr8, self.render())?;
        self.phase = self.phase.wrapping_add(4);
        Ok(frame)
    }

    fn release(&mut self) {
        self.released = true;
    }
}

//! 帧快照
//!
//! 采集端每个 tick 产出一帧。像素数据在构造后不可变，`clone()` 只复制引用计数，
//! 因此交给推理任务的副本与显示转换之间不存在共享的可变状态。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EmoScopeError, Result};

/// 像素格式 (均为 8 bit 紧密排列)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// OpenCV 风格 BGR
    Bgr8,
    /// RGB
    Rgb8,
    /// 单通道灰度
    Gray8,
}

impl PixelFormat {
    /// 每像素字节数
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Bgr8 | PixelFormat::Rgb8 => 3,
            PixelFormat::Gray8 => 1,
        }
    }
}

/// 不可变帧快照
#[derive(Debug, Clone)]
pub struct Frame {
    /// 控制器分配的序号 (单调递增, 0 表示尚未分配)
    sequence: u64,
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Arc<[u8]>,
    /// 采集时间
    captured_at: DateTime<Utc>,
}

impl Frame {
    /// 从原始像素缓冲构造帧，缓冲长度必须与尺寸和格式一致
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(EmoScopeError::InvalidFrame(format!(
                "empty frame dimensions {width}x{height}"
            )));
        }

        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if data.len() != expected {
            return Err(EmoScopeError::InvalidFrame(format!(
                "{width}x{height} {format:?} frame needs {expected} bytes, got {}",
                data.len()
            )));
        }

        Ok(Self {
            sequence: 0,
            width,
            height,
            format,
            data: data.into(),
            captured_at: Utc::now(),
        })
    }

    /// 设置序号
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// 原始像素数据
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// 像素总数
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_rejects_mismatched_buffer() {
        let err = Frame::new(4, 2, PixelFormat::Bgr8, vec![0; 23]).unwrap_err();
        assert!(matches!(err, EmoScopeError::InvalidFrame(_)));

        let err = Frame::new(0, 2, PixelFormat::Gray8, Vec::new()).unwrap_err();
        assert!(matches!(err, EmoScopeError::InvalidFrame(_)));
    }

    #[test]
    fn test_frame_clone_shares_immutable_pixels() {
        let frame = Frame::new(2, 2, PixelFormat::Gray8, vec![1, 2, 3, 4])
            .unwrap()
            .with_sequence(7);
        let copy = frame.clone();

        assert_eq!(copy.sequence(), 7);
        assert_eq!(copy.data(), frame.data());
        assert_eq!(copy.captured_at(), frame.captured_at());
        assert_eq!(frame.pixel_count(), 4);
    }
}

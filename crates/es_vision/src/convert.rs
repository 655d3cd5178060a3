//! 色彩空间转换
//!
//! 纯函数，无状态。显示层使用 RGBA，模型编码使用 RGB。

use es_core::{Frame, PixelFormat};

use crate::display::DisplayImage;

/// 转换为紧密排列的 RGB
pub fn to_rgb8(frame: &Frame) -> Vec<u8> {
    let data = frame.data();
    match frame.format() {
        PixelFormat::Rgb8 => data.to_vec(),
        PixelFormat::Bgr8 => {
            let mut out = Vec::with_capacity(data.len());
            for px in data.chunks_exact(3) {
                out.extend_from_slice(&[px[2], px[1], px[0]]);
            }
            out
        }
        PixelFormat::Gray8 => {
            let mut out = Vec::with_capacity(data.len() * 3);
            for &v in data {
                out.extend_from_slice(&[v, v, v]);
            }
            out
        }
    }
}

/// 转换为 RGBA (alpha 恒为 255)
pub fn to_rgba8(frame: &Frame) -> Vec<u8> {
    let data = frame.data();
    let mut out = Vec::with_capacity(frame.pixel_count() * 4);
    match frame.format() {
        PixelFormat::Rgb8 => {
            for px in data.chunks_exact(3) {
                out.extend_from_slice(&[px[0], px[1], px[2], 255]);
            }
        }
        PixelFormat::Bgr8 => {
            for px in data.chunks_exact(3) {
                out.extend_from_slice(&[px[2], px[1], px[0], 255]);
            }
        }
        PixelFormat::Gray8 => {
            for &v in data {
                out.extend_from_slice(&[v, v, v, 255]);
            }
        }
    }
    out
}

/// 将帧转换为可显示图像
pub fn to_display_image(frame: &Frame) -> DisplayImage {
    DisplayImage {
        width: frame.width(),
        height: frame.height(),
        rgba: to_rgba8(frame),
        frame_sequence: frame.sequence(),
    }
}

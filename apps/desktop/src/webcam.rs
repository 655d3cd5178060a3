//! nokhwa 摄像头后端 (feature = "webcam")

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::Camera;
use tracing::{info, warn};

use es_core::{EmoScopeError, Frame, PixelFormat, Result};
use es_vision::{CaptureSource, CaptureStream};

/// 真实摄像头
#[derive(Debug, Clone)]
pub struct WebcamSource {
    width: u32,
    height: u32,
    fps: u32,
}

impl Default for WebcamSource {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30,
        }
    }
}

impl WebcamSource {
    fn requested_format(&self) -> RequestedFormat<'static> {
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            Resolution::new(self.width, self.height),
            FrameFormat::YUYV,
            self.fps,
        )))
    }
}

impl CaptureSource for WebcamSource {
    fn name(&self) -> &'static str {
        "nokhwa"
    }

    fn open(&self, device_id: u32) -> Result<Box<dyn CaptureStream>> {
        let unavailable = |reason: String| EmoScopeError::DeviceUnavailable { device_id, reason };

        let mut camera = Camera::new(CameraIndex::Index(device_id), self.requested_format())
            .map_err(|e| unavailable(e.to_string()))?;
        camera
            .open_stream()
            .map_err(|e| unavailable(format!("failed to open stream: {e}")))?;

        info!(
            device_id,
            camera = %camera.info().human_name(),
            resolution = %camera.resolution(),
            "webcam stream opened"
        );
        Ok(Box::new(WebcamStream {
            camera: Some(camera),
        }))
    }
}

/// 打开的摄像头流
struct WebcamStream {
    camera: Option<Camera>,
}

impl CaptureStream for WebcamStream {
    fn read_frame(&mut self) -> Result<Frame> {
        let camera = self
            .camera
            .as_mut()
            .ok_or_else(|| EmoScopeError::FrameRead("camera released".to_string()))?;

        let buffer = camera
            .frame()
            .map_err(|e| EmoScopeError::FrameRead(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| EmoScopeError::FrameRead(format!("decode failed: {e}")))?;

        let (width, height) = (decoded.width(), decoded.height());
        Frame::new(width, height, PixelFormat::Rgb8, decoded.into_raw())
    }

    fn release(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(e) = camera.stop_stream() {
                warn!(error = %e, "failed to stop webcam stream");
            }
        }
    }
}

impl Drop for WebcamStream {
    fn drop(&mut self) {
        self.release();
    }
}

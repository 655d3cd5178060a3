//! EmoScope Desktop - 实时情绪检测窗口

mod config;
mod headless;
mod ui;
#[cfg(feature = "webcam")]
mod webcam;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use es_model::DeepFaceClassifier;
use es_vision::{CaptureController, CaptureSource, DisplayState, EventBus, InferenceDispatcher};

use crate::config::AppConfig;

/// 命令行参数
#[derive(Debug, Parser)]
#[command(name = "emoscope", version, about = "Real-time facial emotion detection")]
struct Args {
    /// 配置文件路径 (默认读取 ./emoscope.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// 摄像头设备号
    #[arg(long)]
    device: Option<u32>,

    /// DeepFace 服务地址
    #[arg(long)]
    endpoint: Option<String>,

    /// 不开窗口，在终端打印状态
    #[arg(long)]
    headless: bool,

    /// headless 模式运行时长 (秒)
    #[arg(long, requires = "headless")]
    duration: Option<u64>,
}

#[cfg(feature = "webcam")]
fn capture_source() -> Box<dyn CaptureSource> {
    Box::new(webcam::WebcamSource::default())
}

#[cfg(not(feature = "webcam"))]
fn capture_source() -> Box<dyn CaptureSource> {
    tracing::warn!("built without the `webcam` feature, using the synthetic test pattern");
    Box::new(es_vision::SyntheticCamera::default())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(device) = args.device {
        config.capture.device_id = device;
    }
    if let Some(endpoint) = args.endpoint {
        config.deepface.base_url = endpoint;
    }
    config.validate()?;

    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("EmoScope starting...");

    // 推理任务运行在独立的多线程运行时上，UI 线程只负责 tick
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("emoscope-infer")
        .build()?;

    let display = Arc::new(DisplayState::new(config.inference.label_ordering));
    let events = EventBus::default();

    let classifier = Arc::new(DeepFaceClassifier::new(config.deepface.clone())?);
    tracing::info!("DeepFace classifier configured at {}", config.deepface.base_url);

    let dispatcher = InferenceDispatcher::new(
        classifier,
        display.clone(),
        events.clone(),
        runtime.handle().clone(),
    )
    .with_timeout(config.inference.timeout());

    let controller = CaptureController::new(
        capture_source(),
        dispatcher,
        display,
        events.clone(),
        config.capture.clone(),
    );

    if args.headless {
        let duration = args.duration.map(Duration::from_secs);
        runtime.block_on(headless::run(controller, events, duration))?;
    } else {
        ui::run(controller, &config.window)?;
    }

    tracing::info!("Shutting down...");
    Ok(())
}

//! eframe 窗口
//!
//! egui 的帧循环充当呈现上下文：每帧推进 `TickDriver`，并按 tick 间隔请求重绘。

use std::sync::Arc;
use std::time::Instant;

use egui::{Color32, RichText, TextureHandle, TextureOptions};
use tracing::warn;

use es_vision::{CaptureController, DisplayState, TickDriver};

use crate::config::WindowConfig;

const BACKGROUND: Color32 = Color32::from_rgb(0x1e, 0x1e, 0x1e);
const STATUS_COLOR: Color32 = Color32::from_rgb(0x00, 0xff, 0xcc);
const START_COLOR: Color32 = Color32::from_rgb(0x00, 0xcc, 0x88);
const STOP_COLOR: Color32 = Color32::from_rgb(0xff, 0x44, 0x44);

/// 主窗口
pub struct EmoScopeApp {
    controller: CaptureController,
    driver: TickDriver,
    display: Arc<DisplayState>,
    texture: Option<TextureHandle>,
    /// 已上传纹理对应的画面代数
    shown_generation: u64,
}

impl EmoScopeApp {
    pub fn new(cc: &eframe::CreationContext<'_>, controller: CaptureController) -> Self {
        let display = controller.display().clone();

        // 推理任务在其他线程写入标签时唤醒 UI
        let ctx = cc.egui_ctx.clone();
        display.set_repaint_hook(Arc::new(move || ctx.request_repaint()));

        Self {
            controller,
            driver: TickDriver::new(),
            display,
            texture: None,
            shown_generation: 0,
        }
    }

    fn on_start(&mut self) {
        match self.controller.start() {
            Ok(()) => self.driver.arm(),
            Err(e) => warn!(error = %e, "start failed"),
        }
    }

    fn on_stop(&mut self) {
        self.controller.stop();
        self.driver.disarm();
    }

    /// 画面有变化时重新上传纹理
    fn sync_texture(&mut self, ctx: &egui::Context) {
        let generation = self.display.image_generation();
        if generation == self.shown_generation {
            return;
        }
        self.shown_generation = generation;

        let Some(image) = self.display.image() else {
            self.texture = None;
            return;
        };

        let color_image = egui::ColorImage::from_rgba_unmultiplied(
            [image.width as usize, image.height as usize],
            &image.rgba,
        );
        match &mut self.texture {
            Some(texture) => texture.set(color_image, TextureOptions::LINEAR),
            None => {
                self.texture =
                    Some(ctx.load_texture("camera-frame", color_image, TextureOptions::LINEAR))
            }
        }
    }

    fn button(ui: &mut egui::Ui, text: &str, fill: Color32) -> bool {
        ui.add_sized(
            [160.0, 40.0],
            egui::Button::new(RichText::new(text).size(16.0).strong().color(Color32::WHITE))
                .fill(fill),
        )
        .clicked()
    }
}

impl eframe::App for EmoScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(delay) = self.driver.poll(&mut self.controller, Instant::now()) {
            ctx.request_repaint_after(delay);
        }
        self.sync_texture(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(BACKGROUND))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(20.0);
                    ui.label(
                        RichText::new("Real-Time Emotion Detector")
                            .size(26.0)
                            .strong()
                            .color(Color32::WHITE),
                    );
                    ui.add_space(10.0);

                    if let Some(texture) = &self.texture {
                        ui.add(egui::Image::new(texture).max_width(640.0).max_height(480.0));
                    } else {
                        ui.allocate_space(egui::vec2(640.0, 480.0));
                    }

                    ui.add_space(10.0);
                    ui.label(
                        RichText::new(self.display.label().to_string())
                            .size(18.0)
                            .color(STATUS_COLOR),
                    );
                    ui.add_space(20.0);

                    let mut start = false;
                    let mut stop = false;
                    ui.horizontal(|ui| {
                        // 让两个按钮整体居中
                        let used = 2.0 * 160.0 + ui.spacing().item_spacing.x;
                        ui.add_space(((ui.available_width() - used) / 2.0).max(0.0));
                        start = Self::button(ui, "Start Camera", START_COLOR);
                        stop = Self::button(ui, "Stop Camera", STOP_COLOR);
                    });

                    if start {
                        self.on_start();
                    }
                    if stop {
                        self.on_stop();
                    }
                });
            });
    }
}

/// 打开窗口并阻塞直到关闭
///
/// 关闭窗口时 app 被析构，控制器随之停止会话并释放摄像头。
pub fn run(controller: CaptureController, window: &WindowConfig) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([window.width, window.height])
            .with_title(window.title.clone()),
        ..Default::default()
    };

    eframe::run_native(
        &window.title,
        options,
        Box::new(move |cc| Ok(Box::new(EmoScopeApp::new(cc, controller)))),
    )
    .map_err(|e| anyhow::anyhow!("window error: {e}"))
}

//! 应用配置
//!
//! TOML 文件 + 命令行覆盖。所有字段都有默认值，文件里只需写要改的部分。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use es_core::{EmoScopeError, Result};
use es_model::DeepFaceConfig;
use es_vision::{CaptureConfig, InferenceConfig};

/// 未指定 `--config` 时尝试读取的文件
const DEFAULT_CONFIG_FILE: &str = "emoscope.toml";

/// 窗口配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Emotion Detection App".to_string(),
            width: 900.0,
            height: 700.0,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub capture: CaptureConfig,
    pub inference: InferenceConfig,
    pub deepface: DeepFaceConfig,
    pub window: WindowConfig,
    /// `RUST_LOG` 未设置时使用的过滤规则
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
            inference: InferenceConfig::default(),
            deepface: DeepFaceConfig::default(),
            window: WindowConfig::default(),
            log_filter: "emoscope=info,es_vision=info,es_model=info".to_string(),
        }
    }
}

impl AppConfig {
    /// 加载配置：显式路径 > 当前目录的 emoscope.toml > 默认值
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(&fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// 从文件加载
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| EmoScopeError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        if self.capture.tick_interval_ms == 0 {
            return Err(EmoScopeError::Config(
                "capture.tick_interval_ms must be > 0".to_string(),
            ));
        }
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            return Err(EmoScopeError::Config(
                "window width and height must be > 0".to_string(),
            ));
        }
        self.deepface.validate()
    }
}

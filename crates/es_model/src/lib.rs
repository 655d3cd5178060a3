//! # es_model - EmoScope Model Backends
//!
//! 情绪分类模型后端。目前提供 DeepFace REST API (`deepface api`) 客户端。

pub mod deepface;

pub use deepface::{DeepFaceClassifier, DeepFaceConfig};

pub use es_core::{EmoScopeError, Result};

// src/config/mod.rs

pub mod app;
pub mod loader;
pub mod validation;

pub use app::{AppConfig, EmitterConfig, PointTags, ServerConfig, SinkKind};
pub use loader::load_config;
pub use validation::ConfigValidator;

// src/sender/mod.rs

pub mod direct;
#[cfg(feature = "prometheus")]
pub mod facade;
pub mod line;
pub mod traits;

pub use direct::{DirectSender, SenderStats};
#[cfg(feature = "prometheus")]
pub use facade::FacadeSender;
pub use traits::MetricsSender;

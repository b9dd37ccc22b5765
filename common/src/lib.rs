//! Shared building blocks for the chat message service: configuration, the
//! error taxonomy, SurrealDB storage and the validation/processing pipeline.

pub mod error;
pub mod pipeline;
pub mod storage;
pub mod utils;

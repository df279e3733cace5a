pub mod blueprint;
pub mod cleanup;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod fallback;
pub mod pipeline;
pub mod render;

#[cfg(test)]
mod testing;

pub use client::{ClientRegistry, GenerativeClient};
pub use config::EngineConfig;
pub use error::{GenerationError, MediaError};
pub use pipeline::Pipeline;

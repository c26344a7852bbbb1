pub mod config;
pub mod engine;
pub mod error;
pub mod manifest;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use manifest::*;

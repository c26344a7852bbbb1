pub mod config;
pub mod entity;
pub mod manager;
pub mod policy;
pub mod state;

pub use config::*;
pub use entity::*;
pub use manager::*;
pub use policy::*;
pub use state::*;

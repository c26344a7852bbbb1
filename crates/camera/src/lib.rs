pub mod animator;
pub mod easing;
pub mod state;
pub mod store;
pub mod transform;

pub use animator::*;
pub use easing::*;
pub use state::*;
pub use store::*;
pub use transform::*;

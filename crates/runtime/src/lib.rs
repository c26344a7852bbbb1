pub mod debounce;
pub mod frame;
pub mod latch;
pub mod throttle;
pub mod ticker;
pub mod timers;

pub use debounce::*;
pub use frame::*;
pub use latch::*;
pub use throttle::*;
pub use ticker::*;
pub use timers::*;

pub mod registry;
pub mod sync;
pub mod transform;

pub use registry::*;
pub use sync::*;
pub use transform::*;

pub mod history;
pub mod path;
pub mod sync;

pub use history::*;
pub use path::*;
pub use sync::*;

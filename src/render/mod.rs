pub mod html;
pub mod sink;
pub mod structured;

pub use html::*;
pub use sink::*;
pub use structured::*;

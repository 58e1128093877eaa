pub mod task;
pub mod tree;

pub use task::*;
pub use tree::*;

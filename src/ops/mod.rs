pub mod tree_ops;

pub use tree_ops::*;

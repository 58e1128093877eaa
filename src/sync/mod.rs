pub mod adapter;
pub mod store;

pub use adapter::*;
pub use store::*;

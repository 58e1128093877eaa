pub mod calendar;
pub mod gesture;

pub use calendar::*;
pub use gesture::*;

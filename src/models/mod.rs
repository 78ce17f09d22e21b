pub mod common;
pub mod filter;
pub mod month;
pub mod subscription;

pub use common::*;
pub use filter::*;
pub use month::*;
pub use subscription::*;

mod error;
pub mod process;

pub use error::*;

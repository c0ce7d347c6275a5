mod error;
pub mod instagram;
mod model;

pub use error::*;
pub use model::*;

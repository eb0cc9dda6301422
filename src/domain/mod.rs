pub mod environment;
pub mod error;
pub mod pattern;
pub mod types;

pub use environment::*;
pub use error::*;
pub use pattern::*;
pub use types::*;

pub mod config;
pub mod games;
pub mod identifiers;
pub mod logger;
pub mod records;

pub use identifiers::*;

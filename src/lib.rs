pub mod browser;
pub mod config;
pub mod error;
pub mod logger;
pub mod runner;

// Re-export commonly used types
pub use error::{DriverError, Result};

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{DriverConfig, LaunchOptions, PartialConfig, RUNNING_SENTINEL, SUCCESS_SENTINEL};

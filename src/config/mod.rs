// Configuration module
pub mod grid_config;
pub mod viewer_config;

pub use grid_config::{GridConfig, MAX_COLS};
pub use viewer_config::{DisplayConfig, LoggingConfig, ServerConfig, ViewerConfig};

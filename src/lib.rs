pub mod api;
pub mod config;
pub mod error;
pub mod history;
pub mod http;
pub mod logger;
pub mod runner;
pub mod utils;

// Re-export commonly used types
pub use error::{ReqdeckError, Result};

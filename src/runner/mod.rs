pub mod executor;
pub mod types;

pub use executor::RequestExecutor;
pub use types::ResponseOutcome;

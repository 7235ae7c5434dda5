pub mod config;
pub mod error;
pub mod limiter;
pub mod traits;
pub mod types;

pub use config::AppConfig;
pub use error::{ItineraError, Result};
pub use limiter::RateLimiter;
pub use types::*;

pub mod pool;
pub mod rate_limiter;

pub use rate_limiter::{RateLimiter, WindowUnit};

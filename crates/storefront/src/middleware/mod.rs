//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. CORS
//! 4. Rate limiting (governor)

pub mod rate_limit;

pub use rate_limit::{api_rate_limiter, intake_rate_limiter};

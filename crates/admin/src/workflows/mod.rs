//! Multi-step back-office workflows that span services.

pub mod quote;

pub use quote::{QuoteCommand, QuoteOutcome, send_quote};

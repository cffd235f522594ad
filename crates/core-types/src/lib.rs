//! # Fixing Report Core Types
//!
//! The shared vocabulary of the workspace: currency pairs, individual fixings,
//! per-pair rate series and the calendar month a report covers. This crate has
//! no knowledge of HTTP, spreadsheets or mail.

pub mod enums;
pub mod error;
pub mod period;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::RowAlignment;
pub use error::CoreError;
pub use period::ReportPeriod;
pub use structs::{CurrencyPair, RateRecord, RateSeries};

//! Browser-facing helpers shared by the campaign console: form input
//! validation, URL query-string state, campaign list filters and
//! debounce/throttle wrappers for UI callbacks.
//!
//! # Modules
//!
//! - [`validation`]: Email/phone/URL checks, sanitizing, slugs, IDs
//! - [`query`]: Query-string parsing and building
//! - [`filters`]: Campaign list filter state
//! - [`timing`]: Debouncer and throttler

pub mod filters;
pub mod query;
pub mod timing;
pub mod validation;

pub use filters::{BudgetRange, CampaignFilters};
pub use query::{build_query_string, parse_query_params, QueryParams, QueryValue};
pub use timing::{Debouncer, Throttler};

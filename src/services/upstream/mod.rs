//! Upstream Catalog Integration
//!
//! This module is the resilient client side of the service. It provides:
//!
//! - **Fetch**: bounded-timeout, linear-backoff retrying GET against the
//!   catalog API, resolving every logical call to a tagged outcome
//! - **Shape coercion**: best-effort extraction of the payload sequence
//!   from inconsistently-wrapped JSON
//! - **Normalization**: projection of raw catalog objects into canonical
//!   [`DramaCard`](crate::models::DramaCard) records and quality selection
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::services::upstream::{coerce_to_list, normalize_card, UpstreamClient};
//!
//! let client = UpstreamClient::new(&base_url, &user_agent, policy);
//! let raw = client.fetch("/latest").await?;
//! let cards: Vec<_> = coerce_to_list(raw)
//!     .iter()
//!     .filter_map(normalize_card)
//!     .collect();
//! ```

pub mod client;
pub mod coerce;
pub mod normalize;

// Re-exports for convenience
pub use client::{FetchErrorKind, FetchFailure, FetchOutcome, RetryPolicy, UpstreamClient};
pub use coerce::coerce_to_list;
pub use normalize::{normalize_card, pick_default_quality};

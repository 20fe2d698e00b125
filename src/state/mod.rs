//! State module for tracking fetch progress
//!
//! # Components
//!
//! - `FetchState`: the retry cycle of one logical fetch (pending, attempting,
//!   waiting between attempts, succeeded, exhausted)

mod fetch_state;

pub use fetch_state::FetchState;

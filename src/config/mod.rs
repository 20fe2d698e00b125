//! Configuration module for Pagesweep
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use pagesweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("pagesweep.toml")).unwrap();
//! println!("Concurrency limit: {}", config.fetcher.concurrency_limit);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FetcherConfig, HeaderConfig, OutputConfig, SelectorConfig, TargetConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{select_categories, validate};

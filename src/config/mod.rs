//! Configuration module for ShelfScan
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every setting has a default, so the scanner also runs without a file.
//!
//! # Example
//!
//! ```no_run
//! use shelf_scan::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("shelf-scan.toml")).unwrap();
//! println!("Discovery will stop after {} pages", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    available_parallelism, Config, CrawlerConfig, HttpConfig, OutputConfig, DEFAULT_MAX_PAGES,
    DEFAULT_PAGE_PATTERN, DEFAULT_SEED_URL,
};

// Re-export parser functions
pub use parser::{load_config, load_or_default, parse_config};
pub use validation::validate;

//! Configuration module for Site-Tree
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! plus validation of the seed URL given on the command line.
//!
//! # Example
//!
//! ```no_run
//! use site_tree::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("site-tree.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawler.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser and validation functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, validate_seed_url, validate_worker_count, MAX_WORKERS};

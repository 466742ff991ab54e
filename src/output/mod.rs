//! Output module for presenting crawl results
//!
//! This module handles:
//! - Rendering the site tree as indented text
//! - Writing the rendered tree to a file
//! - Computing and printing statistics about a tree

pub mod stats;
mod text;

pub use stats::{print_statistics, TreeStatistics};
pub use text::{render_site_tree, write_site_tree};

use thiserror::Error;

/// Output errors
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output to {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to format output: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

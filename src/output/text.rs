//! Plain-text site tree
//!
//! Each page is printed with its images and external links, followed by its
//! child pages one level deeper:
//!
//! ```text
//! http://www.someurl.com
//!   Images
//!     http://www.someurl.com/logo.png
//!   ExternalLinks
//!     http://www.twitter.com
//!   Internal links
//!     http://www.someurl.com/about
//! ```

use crate::crawler::PageNode;
use crate::output::{OutputError, OutputResult};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const INDENT: &str = "  ";

/// Renders the tree rooted at `root`
///
/// Empty sections are omitted. Entries appear in sorted order, so the output
/// does not depend on the order pages were crawled in.
pub fn render_site_tree(root: &PageNode) -> OutputResult<String> {
    let mut out = String::new();
    // Explicit stack: trees from long page chains are too deep to recurse over
    let mut stack: Vec<(&PageNode, usize)> = vec![(root, 0)];

    while let Some((page, depth)) = stack.pop() {
        let prefix = INDENT.repeat(depth);
        writeln!(out, "{}{}", prefix, page.name)?;

        write_section(&mut out, &prefix, "Images", &page.images)?;
        write_section(&mut out, &prefix, "ExternalLinks", &page.external_links)?;

        if !page.children.is_empty() {
            writeln!(out, "{}{}Internal links", prefix, INDENT)?;
            for child in page.children.iter().rev() {
                stack.push((child, depth + 2));
            }
        }
    }

    Ok(out)
}

fn write_section<'a, I>(out: &mut String, prefix: &str, title: &str, entries: I) -> OutputResult<()>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut entries = entries.into_iter().peekable();
    if entries.peek().is_none() {
        return Ok(());
    }

    writeln!(out, "{}{}{}", prefix, INDENT, title)?;
    for entry in entries {
        writeln!(out, "{}{}{}{}", prefix, INDENT, INDENT, entry)?;
    }
    Ok(())
}

/// Renders the tree and writes it to `path`
///
/// # Arguments
///
/// * `root` - The site tree
/// * `path` - Destination file, created or truncated
pub fn write_site_tree(root: &PageNode, path: &Path) -> OutputResult<()> {
    let text = render_site_tree(root)?;
    fs::write(path, text).map_err(|source| OutputError::Write {
        path: path.display().to_string(),
        source,
    })?;

    tracing::info!("Site tree written to {}", path.display());
    Ok(())
}

//! Site tree construction
//!
//! Turns the flat result store into a tree of pages. Cycles are broken by
//! skipping any link that points at an ancestor on the current root-to-node
//! path. Pages reachable along several such paths appear once per path: the
//! output is a literal tree, not a shared graph.

use crate::state::{CrawlOutcome, PageEntry};
use crate::CrawlError;
use std::collections::{BTreeSet, HashSet};

/// A page in the site tree
///
/// `Clone` and `Drop` walk the tree with an explicit stack rather than recursing
/// once per level.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageNode {
    /// The page URL
    pub name: String,

    /// Internal links of this page, with links back to ancestors removed
    pub children: BTreeSet<PageNode>,

    /// Links to other sites
    pub external_links: BTreeSet<String>,

    /// Image sources
    pub images: BTreeSet<String>,
}

impl PageNode {
    /// Creates a page with no children, links or images
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: BTreeSet::new(),
            external_links: BTreeSet::new(),
            images: BTreeSet::new(),
        }
    }

    pub fn with_children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = PageNode>,
    {
        self.children.extend(children);
        self
    }

    pub fn with_external_links<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.external_links.extend(links.into_iter().map(Into::into));
        self
    }

    pub fn with_images<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images.extend(images.into_iter().map(Into::into));
        self
    }

    /// Returns the direct child named `name`
    pub fn child(&self, name: &str) -> Option<&PageNode> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Returns true if the page has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Total number of nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Returns true if `name` occurs anywhere below this node
    pub fn has_descendant(&self, name: &str) -> bool {
        let mut stack: Vec<&PageNode> = self.children.iter().collect();
        while let Some(node) = stack.pop() {
            if node.name == name {
                return true;
            }
            stack.extend(node.children.iter());
        }
        false
    }
}

impl PageNode {
    /// Copies this page without its children
    fn clone_shallow(&self) -> Self {
        Self {
            name: self.name.clone(),
            children: BTreeSet::new(),
            external_links: self.external_links.clone(),
            images: self.images.clone(),
        }
    }
}

impl Clone for PageNode {
    fn clone(&self) -> Self {
        let mut stack = vec![(self.clone_shallow(), self.children.iter())];

        while let Some((_, children)) = stack.last_mut() {
            if let Some(child) = children.next() {
                stack.push((child.clone_shallow(), child.children.iter()));
                continue;
            }

            if let Some((node, _)) = stack.pop() {
                match stack.last_mut() {
                    Some((parent, _)) => {
                        parent.children.insert(node);
                    }
                    None => return node,
                }
            }
        }

        // The loop returns once the root frame is popped
        self.clone_shallow()
    }
}

impl Drop for PageNode {
    fn drop(&mut self) {
        let mut stack: Vec<PageNode> = std::mem::take(&mut self.children).into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(std::mem::take(&mut node.children));
        }
    }
}

/// A page whose children are still being assembled
struct Frame {
    name: String,
    remaining: Vec<String>,
    children: BTreeSet<PageNode>,
    external_links: BTreeSet<String>,
    images: BTreeSet<String>,
}

impl Frame {
    fn open<F>(url: &str, lookup: &F) -> Result<Self, CrawlError>
    where
        F: Fn(&str) -> Option<PageEntry>,
    {
        let entry = lookup(url).ok_or_else(|| {
            CrawlError::InvariantViolation(format!("{} is linked but was never scheduled", url))
        })?;
        let CrawlOutcome {
            internal_links,
            external_links,
            images,
        } = entry.outcome().ok_or_else(|| {
            CrawlError::InvariantViolation(format!(
                "{} is still pending while building the site tree",
                url
            ))
        })?;

        Ok(Self {
            name: url.to_string(),
            // Popped from the back, so reverse to visit links in order
            remaining: internal_links.into_iter().rev().collect(),
            children: BTreeSet::new(),
            external_links,
            images,
        })
    }

    fn into_node(self) -> PageNode {
        PageNode {
            name: self.name,
            children: self.children,
            external_links: self.external_links,
            images: self.images,
        }
    }
}

/// Builds the site tree rooted at `root`
///
/// `lookup` returns the result store entry for a URL. The walk keeps the set of
/// URLs on the current root-to-node path; a link to any of them is skipped.
/// Depth-first with an explicit stack, so long chains of pages cannot exhaust
/// the thread stack.
///
/// # Errors
///
/// Returns `CrawlError::InvariantViolation` if a reachable URL is pending or
/// missing from the store.
pub fn build_site_tree<F>(root: &str, lookup: F) -> Result<PageNode, CrawlError>
where
    F: Fn(&str) -> Option<PageEntry>,
{
    let mut ancestors: HashSet<String> = HashSet::new();
    let mut stack = vec![Frame::open(root, &lookup)?];
    ancestors.insert(root.to_string());

    while let Some(frame) = stack.last_mut() {
        if let Some(link) = frame.remaining.pop() {
            if ancestors.contains(&link) {
                continue;
            }
            let child = Frame::open(&link, &lookup)?;
            ancestors.insert(link);
            stack.push(child);
            continue;
        }

        let Some(finished) = stack.pop() else {
            break;
        };
        ancestors.remove(&finished.name);
        let node = finished.into_node();

        match stack.last_mut() {
            Some(parent) => {
                parent.children.insert(node);
            }
            None => return Ok(node),
        }
    }

    Err(CrawlError::InvariantViolation(format!(
        "site tree for {} ended without a root",
        root
    )))
}

//! URL handling module for ShelfScan
//!
//! This module provides URL normalization for the visited and discovered sets,
//! and the single-site filter that keeps discovery on the catalogue's listing
//! pages.

mod matcher;
mod normalize;

// Re-export main functions
pub use matcher::{is_index_url, SiteFilter};
pub use normalize::{normalize_key, normalize_url};

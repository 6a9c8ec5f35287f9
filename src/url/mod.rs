//! URL handling for Meshcrawl
//!
//! This module provides URL normalization (the identity rule for frontier
//! entries), relative-link resolution, and domain extraction.

mod domain;
mod normalize;
mod resolve;

pub use domain::extract_domain;
pub use normalize::normalize_url;
pub use resolve::resolve_link;

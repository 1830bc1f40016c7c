//! Utility modules for the feed pipeline
//!
//! - **error**: Error handling and the crate-wide `Result` alias

pub mod error;

pub use error::{FeedError, Result};

/// Truncate string to specified length with ellipsis
///
/// The cut point backs up to a char boundary so multi-byte input never panics.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len.saturating_sub(3);
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

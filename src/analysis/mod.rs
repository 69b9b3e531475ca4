//! Analysis Module
//!
//! Labels each inbound request with its likely source (Slack, browser,
//! API tool, ...) from headers and body shape.
//!
//! ## Structure
//! - `rules`: Header names, user-agent markers and options
//! - `classifier`: Classification logic
//!
//! ## Usage
//! ```ignore
//! use crate::analysis::{classify_with_options, ClassifierOptions};
//!
//! let result = classify_with_options(&headers, body.as_ref(), &ClassifierOptions::default());
//! if result.is_platform_traffic {
//!     tracing::debug!("Slack request: {}", result.details);
//! }
//! ```

pub mod rules;
pub mod classifier;

pub use rules::ClassifierOptions;

pub use classifier::{classify_with_options, header_str};

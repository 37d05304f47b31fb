//! HTTP protocol layer module
//!
//! Response builders and conditional-request helpers, kept apart from the
//! dinners routes that use them.

pub mod cache;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_304_response, build_404_response, build_405_response, build_413_response,
    build_health_response, build_html_response, build_json_response, build_options_response,
    build_text_response,
};

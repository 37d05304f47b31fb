//! Request handler module
//!
//! Routes requests to the dinners page, the JSON data route, and the health
//! probes, and renders the page from the loaded data.

pub mod page;
pub mod router;

// Re-export main entry point
pub use router::handle_request;

// Internal modules - not part of public API
pub(crate) mod config;
pub(crate) mod context;
pub(crate) mod error;
pub(crate) mod fanout;
pub(crate) mod outcome;
pub(crate) mod output;
pub(crate) mod stats;
pub(crate) mod topology;

// Public API - curated exports only
pub mod api;

// Re-export key items at module level for convenience
pub use api::*;

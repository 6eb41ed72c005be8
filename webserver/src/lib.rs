//! HTTP shell for the seed assortment planner
//!
//! Exposes the planner operations as JSON endpoints. All planning work is
//! delegated to `planner::SeedPlanner`; this crate only maps requests,
//! responses and errors.

pub mod error;
pub mod state;
pub mod web;
pub mod webserver_impl;

// Re-export main types
pub use error::{WebServerError, WebServerResult};
pub use state::WebServerState;
pub use webserver_impl::WebServer;

//! Request and response messages exchanged with the planner
//!
//! These are the wire shapes used by the HTTP shell and printed by the CLI.

pub mod export;
pub mod seed;

pub use export::*;
pub use seed::*;

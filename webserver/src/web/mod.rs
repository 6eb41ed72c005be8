//! HTTP layer: request handlers

pub mod handlers;

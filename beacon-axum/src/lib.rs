//! An Axum server answering beacon queries.
//!

pub mod error;
pub mod handlers;
pub mod server;

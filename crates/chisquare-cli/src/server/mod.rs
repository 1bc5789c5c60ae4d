//! Local HTTP API for the test of independence.

pub mod app;
pub mod error;
pub mod handlers;
pub mod state;

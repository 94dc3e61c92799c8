//! Core types and trait definitions for the tally visit counter.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod civil;
pub mod error;
pub mod service;
pub mod stats;
pub mod store;

pub use error::{Error, Result};

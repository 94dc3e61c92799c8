//! Route handlers for the tally HTTP surface.

pub mod api;
pub mod badge;
pub mod dashboard;

//! HTTP handlers for the two inference endpoints.

pub mod detect;
pub mod predict;

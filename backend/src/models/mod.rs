//! Upstream payloads, session records, and API response bodies.

pub mod job;
pub mod session;
pub mod workflow;

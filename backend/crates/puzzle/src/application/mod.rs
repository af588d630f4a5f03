//! Application Layer - Use cases
//!
//! Orchestrates domain logic and repository calls.

pub mod attempt_status;
pub mod authoring;
pub mod check_solution;
pub mod config;
pub mod queries;
pub mod submit_attempt;

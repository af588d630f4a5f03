//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Client identification (player identity header, client IP)
//! - Bounded async retry with exponential backoff

pub mod client;
pub mod retry;

//! Puzzle Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Content validation, verification, attempt state, statistics
//! - `application/` - Use cases
//! - `infra/` - PostgreSQL and in-memory repositories
//! - `presentation/` - HTTP handlers
//!
//! ## Gameplay Model
//! - Content is validated into a typed value before it is ever stored
//! - Verification is a pure function of content and candidate
//! - A (puzzle, player) pair gets a bounded number of attempts and at most
//!   one correct attempt
//! - The attempt write and the statistics update commit together or not at all

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::PuzzleConfig;
pub use error::{PuzzleError, PuzzleResult};
pub use infra::memory::InMemoryPuzzleRepository;
pub use infra::postgres::PgPuzzleRepository;
pub use presentation::router::{puzzle_router, puzzle_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::content::PuzzleContent;
    pub use crate::domain::entities::*;
    pub use crate::domain::value_objects::*;
    pub use crate::presentation::dto::*;
}

pub mod store {
    pub use crate::infra::memory::InMemoryPuzzleRepository as MemoryStore;
    pub use crate::infra::postgres::PgPuzzleRepository as PuzzleStore;
}

#[cfg(test)]
mod tests;

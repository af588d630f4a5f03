//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Puzzle, Attempt)
//! - Domain value objects (PuzzleType, Difficulty, Title, SolveTime)
//! - Content schema validation per puzzle type
//! - Domain services (solution verification)
//! - The attempt state machine and the statistics recurrence
//! - Repository traits (interfaces)

pub mod attempt_state;
pub mod content;
pub mod entities;
pub mod repository;
pub mod services;
pub mod statistics;
pub mod value_objects;

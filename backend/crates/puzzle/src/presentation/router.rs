//! Puzzle Router

use crate::application::config::PuzzleConfig;
use crate::domain::repository::{AttemptRepository, PuzzleRepository};
use crate::infra::postgres::PgPuzzleRepository;
use crate::presentation::handlers::{self, PuzzleAppState};
use crate::presentation::middleware::require_player;
use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use std::sync::Arc;

/// Create the puzzle router with PostgreSQL repository
pub fn puzzle_router(repo: PgPuzzleRepository, config: PuzzleConfig) -> Router {
    puzzle_router_generic(repo, config)
}

/// Create a generic puzzle router for any repository implementation
///
/// Every route except `/validate` requires the player identity header.
pub fn puzzle_router_generic<R>(repo: R, config: PuzzleConfig) -> Router
where
    R: PuzzleRepository + AttemptRepository + Clone + Send + Sync + 'static,
{
    let config = Arc::new(config);
    let state = PuzzleAppState {
        repo: Arc::new(repo),
        config: config.clone(),
    };

    let player_routes = Router::new()
        .route(
            "/",
            post(handlers::create_puzzle::<R>).get(handlers::list_puzzles::<R>),
        )
        .route("/me/attempts", get(handlers::my_attempts::<R>))
        .route(
            "/{id}",
            get(handlers::get_puzzle::<R>)
                .put(handlers::update_puzzle::<R>)
                .delete(handlers::retire_puzzle::<R>),
        )
        .route("/{id}/publish", patch(handlers::toggle_publish::<R>))
        .route("/{id}/check", post(handlers::check_solution::<R>))
        .route(
            "/{id}/attempts",
            post(handlers::submit_attempt::<R>).get(handlers::attempt_status::<R>),
        )
        .route("/{id}/stats", get(handlers::puzzle_stats::<R>))
        .route_layer(middleware::from_fn_with_state(config, require_player));

    Router::new()
        .route("/validate", post(handlers::validate_content))
        .merge(player_routes)
        .with_state(state)
}

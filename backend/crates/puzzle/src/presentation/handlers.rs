//! HTTP Handlers

use crate::application::attempt_status::AttemptStatusUseCase;
use crate::application::authoring::{
    ActiveChange, CreatePuzzleUseCase, SetPuzzleActiveUseCase, UpdatePuzzleUseCase,
    validate_puzzle_content,
};
use crate::application::check_solution::CheckSolutionUseCase;
use crate::application::config::PuzzleConfig;
use crate::application::queries::{BrowsePuzzlesUseCase, PlayerAttemptsUseCase, PuzzleStatsUseCase};
use crate::application::submit_attempt::{SubmitAttemptInput, SubmitAttemptUseCase};
use crate::domain::repository::{AttemptRepository, PuzzleRepository};
use crate::error::{PuzzleError, PuzzleResult};
use crate::presentation::dto::{
    AttemptStatusResponse, CheckSolutionRequest, CheckSolutionResponse, CreatePuzzleRequest,
    ListPuzzlesQuery, PageResponse, PlayerAttemptsQuery, PlayerAttemptsResponse, PuzzleResponse,
    PuzzleStatsResponse, PuzzleSummaryResponse, SubmitAttemptRequest, SubmitAttemptResponse,
    UpdatePuzzleRequest, ValidateContentRequest, ValidateContentResponse,
};
use crate::presentation::middleware::Player;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use kernel::id::PuzzleId;
use std::sync::Arc;
use uuid::Uuid;

/// Shared state for puzzle handlers
#[derive(Clone)]
pub struct PuzzleAppState<R>
where
    R: PuzzleRepository + AttemptRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<PuzzleConfig>,
}

/// POST /api/puzzles/validate
///
/// Invalid content is a normal 200 answer here, not an error.
pub async fn validate_content(
    Json(req): Json<ValidateContentRequest>,
) -> PuzzleResult<Json<ValidateContentResponse>> {
    let response = match validate_puzzle_content(req.puzzle_type, &req.content, req.solution.as_ref())
    {
        Ok(content) => ValidateContentResponse {
            valid: true,
            normalized: Some(content.to_json()),
            solution: content.solution_json(),
            reason: None,
        },
        Err(PuzzleError::InvalidContent(err)) => ValidateContentResponse {
            valid: false,
            normalized: None,
            solution: None,
            reason: Some(err.reason()),
        },
        Err(other) => return Err(other),
    };
    Ok(Json(response))
}

/// POST /api/puzzles
pub async fn create_puzzle<R>(
    State(state): State<PuzzleAppState<R>>,
    Extension(player): Extension<Player>,
    Json(req): Json<CreatePuzzleRequest>,
) -> PuzzleResult<impl IntoResponse>
where
    R: PuzzleRepository + AttemptRepository + Clone + Send + Sync + 'static,
{
    let use_case = CreatePuzzleUseCase::new(state.repo.clone());
    let puzzle = use_case.execute(req.into(), player.id).await?;

    Ok((StatusCode::CREATED, Json(PuzzleResponse::authoring(&puzzle))))
}

/// GET /api/puzzles
pub async fn list_puzzles<R>(
    State(state): State<PuzzleAppState<R>>,
    Query(query): Query<ListPuzzlesQuery>,
) -> PuzzleResult<Json<PageResponse<PuzzleSummaryResponse>>>
where
    R: PuzzleRepository + AttemptRepository + Clone + Send + Sync + 'static,
{
    let use_case = BrowsePuzzlesUseCase::new(state.repo.clone());
    let page = use_case.list(query.into()).await?;

    Ok(Json(page.into()))
}

/// GET /api/puzzles/{id}
pub async fn get_puzzle<R>(
    State(state): State<PuzzleAppState<R>>,
    Path(id): Path<Uuid>,
) -> PuzzleResult<Json<PuzzleResponse>>
where
    R: PuzzleRepository + AttemptRepository + Clone + Send + Sync + 'static,
{
    let use_case = BrowsePuzzlesUseCase::new(state.repo.clone());
    let puzzle = use_case.get(PuzzleId::from_uuid(id)).await?;

    Ok(Json(PuzzleResponse::player(&puzzle)))
}

/// PUT /api/puzzles/{id}
pub async fn update_puzzle<R>(
    State(state): State<PuzzleAppState<R>>,
    Extension(player): Extension<Player>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePuzzleRequest>,
) -> PuzzleResult<Json<PuzzleResponse>>
where
    R: PuzzleRepository + AttemptRepository + Clone + Send + Sync + 'static,
{
    let use_case = UpdatePuzzleUseCase::new(state.repo.clone());
    let puzzle = use_case
        .execute(PuzzleId::from_uuid(id), req.into(), player.id)
        .await?;

    Ok(Json(PuzzleResponse::authoring(&puzzle)))
}

/// DELETE /api/puzzles/{id}
pub async fn retire_puzzle<R>(
    State(state): State<PuzzleAppState<R>>,
    Extension(player): Extension<Player>,
    Path(id): Path<Uuid>,
) -> PuzzleResult<StatusCode>
where
    R: PuzzleRepository + AttemptRepository + Clone + Send + Sync + 'static,
{
    let use_case = SetPuzzleActiveUseCase::new(state.repo.clone());
    use_case
        .execute(PuzzleId::from_uuid(id), ActiveChange::Retire, player.id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/puzzles/{id}/publish
pub async fn toggle_publish<R>(
    State(state): State<PuzzleAppState<R>>,
    Extension(player): Extension<Player>,
    Path(id): Path<Uuid>,
) -> PuzzleResult<Json<PuzzleResponse>>
where
    R: PuzzleRepository + AttemptRepository + Clone + Send + Sync + 'static,
{
    let use_case = SetPuzzleActiveUseCase::new(state.repo.clone());
    let puzzle = use_case
        .execute(PuzzleId::from_uuid(id), ActiveChange::Toggle, player.id)
        .await?;

    Ok(Json(PuzzleResponse::authoring(&puzzle)))
}

/// POST /api/puzzles/{id}/check
pub async fn check_solution<R>(
    State(state): State<PuzzleAppState<R>>,
    Path(id): Path<Uuid>,
    Json(req): Json<CheckSolutionRequest>,
) -> PuzzleResult<Json<CheckSolutionResponse>>
where
    R: PuzzleRepository + AttemptRepository + Clone + Send + Sync + 'static,
{
    let use_case = CheckSolutionUseCase::new(state.repo.clone(), state.config.clone());
    let output = use_case
        .execute(PuzzleId::from_uuid(id), &req.solution)
        .await?;

    Ok(Json(output.into()))
}

/// POST /api/puzzles/{id}/attempts
///
/// 201 when the attempt was recorded, 409 with a reason code when it was
/// turned away.
pub async fn submit_attempt<R>(
    State(state): State<PuzzleAppState<R>>,
    Extension(player): Extension<Player>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitAttemptRequest>,
) -> PuzzleResult<impl IntoResponse>
where
    R: PuzzleRepository + AttemptRepository + Clone + Send + Sync + 'static,
{
    let use_case =
        SubmitAttemptUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let input = SubmitAttemptInput {
        puzzle_id: PuzzleId::from_uuid(id),
        player_id: player.id,
        solution: req.solution,
        duration_secs: req.duration,
        client_ip: player.client_ip,
    };

    let output = use_case.execute(input).await?;
    let status = if output.accepted() {
        StatusCode::CREATED
    } else {
        StatusCode::CONFLICT
    };

    Ok((
        status,
        Json(SubmitAttemptResponse::from_output(
            output,
            state.config.attempt_policy(),
        )),
    ))
}

/// GET /api/puzzles/{id}/attempts
pub async fn attempt_status<R>(
    State(state): State<PuzzleAppState<R>>,
    Extension(player): Extension<Player>,
    Path(id): Path<Uuid>,
) -> PuzzleResult<Json<AttemptStatusResponse>>
where
    R: PuzzleRepository + AttemptRepository + Clone + Send + Sync + 'static,
{
    let use_case =
        AttemptStatusUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());
    let output = use_case
        .execute(PuzzleId::from_uuid(id), player.id)
        .await?;

    Ok(Json(output.into()))
}

/// GET /api/puzzles/{id}/stats
pub async fn puzzle_stats<R>(
    State(state): State<PuzzleAppState<R>>,
    Path(id): Path<Uuid>,
) -> PuzzleResult<Json<PuzzleStatsResponse>>
where
    R: PuzzleRepository + AttemptRepository + Clone + Send + Sync + 'static,
{
    let use_case = PuzzleStatsUseCase::new(state.repo.clone(), state.config.clone());
    let output = use_case.execute(PuzzleId::from_uuid(id)).await?;

    Ok(Json(output.into()))
}

/// GET /api/puzzles/me/attempts
pub async fn my_attempts<R>(
    State(state): State<PuzzleAppState<R>>,
    Extension(player): Extension<Player>,
    Query(query): Query<PlayerAttemptsQuery>,
) -> PuzzleResult<Json<PlayerAttemptsResponse>>
where
    R: PuzzleRepository + AttemptRepository + Clone + Send + Sync + 'static,
{
    let use_case = PlayerAttemptsUseCase::new(state.repo.clone());
    let output = use_case.execute(player.id, query.into()).await?;

    Ok(Json(output.into()))
}

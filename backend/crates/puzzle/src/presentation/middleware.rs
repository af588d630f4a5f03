//! Puzzle Middleware

use crate::application::config::PuzzleConfig;
use crate::error::PuzzleError;
use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use kernel::id::PlayerId;
use platform::client::{extract_client_ip, extract_player_id};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

/// The authenticated caller, as forwarded by the identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub client_ip: Option<IpAddr>,
}

/// Middleware that requires a player identity header and stores the
/// resulting [`Player`] in the request extensions
pub async fn require_player(
    State(config): State<Arc<PuzzleConfig>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, PuzzleError> {
    let headers = req.headers();

    let direct_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    let client_ip = extract_client_ip(headers, direct_ip);

    let id = extract_player_id(headers, &config.player_id_header).map_err(|e| {
        tracing::debug!(error = %e, client_ip = ?client_ip, "Request without player identity");
        PuzzleError::from(e)
    })?;

    req.extensions_mut().insert(Player {
        id: PlayerId::from_uuid(id),
        client_ip,
    });

    Ok(next.run(req).await)
}

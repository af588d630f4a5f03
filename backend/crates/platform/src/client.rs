//! Client identification utilities
//!
//! The identity provider sits in front of this service and forwards the
//! authenticated player as a UUID header. These helpers read it back.

use axum::http::HeaderMap;
use std::net::IpAddr;
use uuid::Uuid;

/// Default header carrying the authenticated player handle
pub const PLAYER_ID_HEADER: &str = "x-player-id";

/// Error when identifying the calling player
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("Missing required header: {0}")]
    MissingHeader(String),

    #[error("Malformed header: {0}")]
    MalformedHeader(String),
}

/// Extract the player handle from request headers
///
/// ## Arguments
/// * `headers` - HTTP request headers
/// * `header_name` - header set by the identity provider
///
/// ## Returns
/// * `Ok(Uuid)` - the opaque player handle
/// * `Err(IdentityError)` - header absent, not UTF-8, or not a UUID
pub fn extract_player_id(headers: &HeaderMap, header_name: &str) -> Result<Uuid, IdentityError> {
    let raw = headers
        .get(header_name)
        .ok_or_else(|| IdentityError::MissingHeader(header_name.to_string()))?
        .to_str()
        .map_err(|_| IdentityError::MalformedHeader(header_name.to_string()))?;

    Uuid::parse_str(raw.trim()).map_err(|_| IdentityError::MalformedHeader(header_name.to_string()))
}

/// Extract client IP address from headers
///
/// Checks X-Forwarded-For header first (for reverse proxy setups),
/// then falls back to direct connection IP.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    // First entry of X-Forwarded-For is the original client
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first_ip) = xff.split(',').next() {
            if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                return Some(ip);
            }
        }
    }
    direct_ip
}

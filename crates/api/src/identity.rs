//! Caller identity extracted from pre-validated claim headers.
//!
//! Authentication happens upstream; by the time a request reaches this
//! service the gateway has already verified the token and projected its
//! claims into headers. Requests without a subject are rejected before
//! any pipeline work happens.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::UserId;

use crate::error::ApiError;

const USER_ID_HEADER: &str = "x-user-id";
const GROUPS_HEADER: &str = "x-groups";

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: UserId,
    pub groups: Vec<String>,
    /// Raw bearer credential, forwarded unchanged to downstream calls.
    pub bearer_token: String,
}

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|subject| !subject.is_empty())
            .ok_or(ApiError::Unauthorized(
                "Unauthorized: only authenticated users can access their orders.",
            ))?;

        let groups = parts
            .headers
            .get(GROUPS_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|groups| {
                groups
                    .split(',')
                    .map(str::trim)
                    .filter(|group| !group.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let bearer_token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .unwrap_or_default()
            .to_string();

        Ok(Identity {
            user_id: UserId::new(user_id),
            groups,
            bearer_token,
        })
    }
}

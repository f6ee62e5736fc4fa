//! Service-level errors and their HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use codebreak_engine::{MatchError, MatchId, RejectedError};
use serde::Serialize;

use crate::store::StoreError;

/// Anything a service operation can fail with.
#[derive(Debug, derive_more::Display)]
pub enum ServiceError {
    /// No match with this id.
    #[display("Match {} not found", _0)]
    NotFound(MatchId),

    /// The engine refused the action.
    #[display("{}", _0)]
    Match(MatchError),

    /// Persistence failed or lost an optimistic race.
    #[display("{}", _0)]
    Store(StoreError),

    /// A timeout request arrived before the deadline.
    #[display("Turn timer has {} ms left", remaining_ms)]
    TurnNotExpired {
        /// Time left on the authoritative timer.
        remaining_ms: u64,
    },

    /// The request could not be understood.
    #[display("Bad request: {}", _0)]
    BadRequest(String),
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Match(e) => Some(e),
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MatchError> for ServiceError {
    fn from(err: MatchError) -> Self {
        Self::Match(err)
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl ServiceError {
    /// Whether the caller should re-fetch state before retrying.
    pub fn is_stale(&self) -> bool {
        match self {
            Self::Match(MatchError::Rejected(RejectedError::StaleVersion { .. })) => true,
            Self::Store(e) => e.is_conflict(),
            _ => false,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Match(e) => e.code(),
            Self::Store(e) if e.is_conflict() => "stale_state",
            Self::Store(_) => "storage",
            Self::TurnNotExpired { .. } => "turn_not_expired",
            Self::BadRequest(_) => "bad_request",
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Match(MatchError::Rejected(RejectedError::NotParticipant(_))) => {
                StatusCode::FORBIDDEN
            }
            Self::Match(MatchError::Rejected(_)) => StatusCode::CONFLICT,
            Self::Match(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(e) if e.is_conflict() => StatusCode::CONFLICT,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::TurnNotExpired { .. } => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

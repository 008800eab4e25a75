//! Error types for the player API.
//!
//! [`ApiError`] folds service failures and malformed request bodies into a
//! single enum that converts into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use foundry_core::ServiceError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The game service refused or failed the request.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The request body was missing or not the expected JSON.
    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl ApiError {
    /// HTTP status and machine-readable kind for this error.
    pub const fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            Self::InvalidBody(_) => (StatusCode::BAD_REQUEST, "validation"),
            Self::Service(e) => match e {
                ServiceError::InvalidUser(_) | ServiceError::InvalidResource(_) => {
                    (StatusCode::BAD_REQUEST, "validation")
                }
                ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                ServiceError::AlreadyRegistered(_) => (StatusCode::CONFLICT, "already_exists"),
                ServiceError::Upgrade(upgrade) => (StatusCode::CONFLICT, upgrade.kind()),
                ServiceError::Persistence(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "persistence")
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.classify();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            String::from("internal error")
        } else {
            tracing::debug!(error = %self, kind, "Request rejected");
            self.to_string()
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
            "kind": kind,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use foundry_db::DbError;
    use foundry_game::{ResourceKind, UpgradeError, UserId};

    use super::*;

    fn status_of(err: ServiceError) -> (StatusCode, &'static str) {
        ApiError::from(err).classify()
    }

    #[test]
    fn domain_refusals_are_conflicts_with_kind() {
        let err = ServiceError::Upgrade(UpgradeError::CooldownActive {
            resource: ResourceKind::Iron,
            remaining_secs: 3,
        });
        assert_eq!(status_of(err), (StatusCode::CONFLICT, "cooldown_active"));

        let err = ServiceError::Upgrade(UpgradeError::UnknownLevel {
            resource: ResourceKind::Gold,
            level: 5,
        });
        assert_eq!(status_of(err), (StatusCode::CONFLICT, "unknown_level"));
    }

    #[test]
    fn persistence_failures_are_internal() {
        let err = ServiceError::Persistence(DbError::Config("down".to_owned()));
        assert_eq!(status_of(err).0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_user_is_not_found() {
        let user = UserId::new("ghost").unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(
            status_of(ServiceError::NotFound(user)),
            (StatusCode::NOT_FOUND, "not_found")
        );
    }
}

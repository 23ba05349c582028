use axum::http::StatusCode;
use thiserror::Error;

/// Failures talking to the upstream AlumniLink API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no session token; sign in first")]
    MissingToken,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("request cancelled")]
    Cancelled,

    #[error("invalid API base URL: {0}")]
    BaseUrl(String),
}

impl ApiError {
    pub fn is_auth(&self) -> bool {
        match self {
            ApiError::MissingToken => true,
            ApiError::Status { status, .. } => {
                *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
            }
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        if err.is_auth() {
            return Self::unauthorized(err.to_string());
        }
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_auth_failures_map_to_unauthorized() {
        let err = ApiError::Status {
            status: StatusCode::FORBIDDEN,
            body: "nope".to_string(),
        };
        assert_eq!(AppError::from(err).status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::from(ApiError::MissingToken).status,
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn other_upstream_failures_map_to_bad_gateway() {
        let err = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        };
        let app = AppError::from(err);
        assert_eq!(app.status, StatusCode::BAD_GATEWAY);
        assert!(app.message.contains("boom"));
        assert_eq!(AppError::from(ApiError::Cancelled).status, StatusCode::BAD_GATEWAY);
    }
}

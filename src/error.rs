use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::service::period::PeriodError;

/// 接口错误, 映射为 HTTP 状态码
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("refresh cooldown active, retry in {0}s")]
    Cooldown(u64),

    #[error("data store error: {0}")]
    DataStore(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<PeriodError> for AppError {
    fn from(err: PeriodError) -> Self {
        match err {
            PeriodError::InvalidPeriod(_) => AppError::Validation("Período inválido".to_string()),
            PeriodError::OutOfRange => AppError::Internal(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Cooldown(secs) => {
                let body = ErrorBody {
                    error: format!("Aguarde {}s antes de atualizar novamente", secs),
                };
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    [(header::RETRY_AFTER, secs.to_string())],
                    Json(body),
                )
                    .into_response();
            }
            // 内部细节只写日志, 不返回给客户端
            AppError::DataStore(e) => {
                tracing::error!("数据库错误: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro interno do servidor".to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("内部错误: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro interno do servidor".to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        let cases = [
            (AppError::Validation("NIF inválido".into()), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Cooldown(12), StatusCode::TOO_MANY_REQUESTS),
            (AppError::DataStore(sqlx::Error::PoolTimedOut), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn invalid_period_is_a_validation_error() {
        let err: AppError = PeriodError::InvalidPeriod(9).into();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn cooldown_sets_retry_after() {
        let response = AppError::Cooldown(7).into_response();
        assert_eq!(response.headers()[header::RETRY_AFTER], "7");
    }
}

use serde::{Deserialize, Serialize};

use crate::domain::SessionKey;
use crate::engine::{EngineError, ErrorCode};

/// Ошибки внешнего API (то, что отдаём транспорту).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ApiError {
    /// Неправильные входные данные (например, битый JSON команды).
    BadRequest(String),

    /// Сессии в этом канале нет.
    SessionNotFound(SessionKey),

    /// Движок отклонил команду. `code` – для ветвления, `message` – для показа.
    Rejected { code: ErrorCode, message: String },

    /// Внутренняя ошибка сервиса.
    Internal(String),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::SessionNotFound(key) => ApiError::SessionNotFound(key),
            EngineError::Internal(_) => ApiError::Internal(err.to_string()),
            other => ApiError::Rejected {
                code: other.code(),
                message: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

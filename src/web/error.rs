//! Errors returned by chat routes.
//!
//! API routes answer with `{"error": "..."}`. The only exception is the
//! missing administrator on `/chat`, which is a plain-text page.

use crate::storage::StorageError;
use actix_web::http::{header::ContentType, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;

#[derive(Debug)]
pub enum ChatError {
    /// No session, or the session's user no longer exists
    Unauthorized,
    /// Authenticated, but not allowed to see this resource
    Forbidden(String),
    /// No user with the admin role exists, so there is nobody to chat with
    MissingAdmin,
    /// Query or insert failed
    Database(DbErr),
    /// Reading or writing an upload failed
    Storage(StorageError),
    /// Upload is missing or not acceptable
    InvalidUpload(String),
    /// Upload is larger than the configured limit, in bytes
    UploadTooLarge(usize),
    /// Malformed request body
    BadRequest(String),
    NotFound,
}

impl std::fmt::Display for ChatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatError::Unauthorized => write!(f, "Login required"),
            ChatError::Forbidden(msg) => write!(f, "{}", msg),
            ChatError::MissingAdmin => write!(f, "No administrator found."),
            ChatError::Database(e) => write!(f, "{}", e),
            ChatError::Storage(e) => write!(f, "{}", e),
            ChatError::InvalidUpload(msg) => write!(f, "{}", msg),
            ChatError::UploadTooLarge(limit) => {
                write!(f, "File is larger than the {} byte limit", limit)
            }
            ChatError::BadRequest(msg) => write!(f, "{}", msg),
            ChatError::NotFound => write!(f, "Not found"),
        }
    }
}

impl std::error::Error for ChatError {}

impl From<DbErr> for ChatError {
    fn from(e: DbErr) -> Self {
        ChatError::Database(e)
    }
}

impl From<StorageError> for ChatError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(_) => ChatError::NotFound,
            e => ChatError::Storage(e),
        }
    }
}

impl ResponseError for ChatError {
    fn status_code(&self) -> StatusCode {
        match self {
            ChatError::Unauthorized => StatusCode::UNAUTHORIZED,
            ChatError::Forbidden(_) => StatusCode::FORBIDDEN,
            ChatError::MissingAdmin | ChatError::Database(_) | ChatError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ChatError::InvalidUpload(_) | ChatError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ChatError::UploadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ChatError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ChatError::Database(_) | ChatError::Storage(_) => {
                log::error!("chat request failed: {}", self);
            }
            ChatError::MissingAdmin => {
                log::error!("/chat: no user has the admin role");
                return HttpResponse::build(self.status_code())
                    .content_type(ContentType::plaintext())
                    .body(self.to_string());
            }
            _ => {}
        }

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_rt::test]
    async fn test_missing_admin_is_plain_text() {
        let resp = ChatError::MissingAdmin.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(resp
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/plain"));

        let body = to_bytes(resp.into_body()).await.unwrap();
        assert_eq!(&body[..], b"No administrator found.");
    }

    #[actix_rt::test]
    async fn test_database_error_is_json() {
        let err = ChatError::from(DbErr::Custom("connection refused".to_string()));
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("connection refused"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ChatError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ChatError::InvalidUpload("File type not allowed".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ChatError::UploadTooLarge(10).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ChatError::from(StorageError::NotFound("x.png".into())).status_code(),
            StatusCode::NOT_FOUND
        );
    }
}

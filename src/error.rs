//! 에러 정의

use crate::assignment::AssignError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManitoError {
    #[error("Sign in first")]
    Unauthenticated,

    #[error("Room {0} not found")]
    RoomNotFound(String),

    #[error("Only the room admin can do this")]
    NotAdmin,

    #[error("Matching already done, members can no longer change")]
    AlreadyAssigned,

    #[error("Name must not be empty")]
    EmptyName,

    #[error("Name '{0}' already exists in this room")]
    DuplicateName(String),

    #[error("Room is full ({0} members max)")]
    RoomFull(usize),

    #[error("Member not found")]
    MemberNotFound,

    #[error("Invalid token")]
    TokenNotFound,

    #[error("Matching has not started yet")]
    NotAssigned,

    #[error(transparent)]
    Assign(#[from] AssignError),
}

impl ManitoError {
    /// 클라이언트용 에러 코드
    pub fn code(&self) -> &'static str {
        match self {
            ManitoError::Unauthenticated => "UNAUTHENTICATED",
            ManitoError::RoomNotFound(_) => "ROOM_NOT_FOUND",
            ManitoError::NotAdmin => "NOT_ADMIN",
            ManitoError::AlreadyAssigned => "ALREADY_ASSIGNED",
            ManitoError::EmptyName => "EMPTY_NAME",
            ManitoError::DuplicateName(_) => "DUPLICATE_NAME",
            ManitoError::RoomFull(_) => "ROOM_FULL",
            ManitoError::MemberNotFound => "MEMBER_NOT_FOUND",
            ManitoError::TokenNotFound => "TOKEN_NOT_FOUND",
            ManitoError::NotAssigned => "NOT_ASSIGNED",
            ManitoError::Assign(AssignError::InsufficientParticipants { .. }) => {
                "INSUFFICIENT_PARTICIPANTS"
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ManitoError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ManitoError::NotAdmin => StatusCode::FORBIDDEN,
            ManitoError::RoomNotFound(_)
            | ManitoError::MemberNotFound
            | ManitoError::TokenNotFound => StatusCode::NOT_FOUND,
            ManitoError::AlreadyAssigned
            | ManitoError::DuplicateName(_)
            | ManitoError::RoomFull(_)
            | ManitoError::NotAssigned => StatusCode::CONFLICT,
            ManitoError::EmptyName | ManitoError::Assign(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ManitoError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "code": self.code(),
            "message": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_error_keeps_its_code() {
        let err: ManitoError = AssignError::InsufficientParticipants { count: 1 }.into();
        assert_eq!(err.code(), "INSUFFICIENT_PARTICIPANTS");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn lookup_errors_map_to_http_status() {
        assert_eq!(ManitoError::TokenNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ManitoError::NotAssigned.status(), StatusCode::CONFLICT);
        assert_eq!(ManitoError::NotAdmin.status(), StatusCode::FORBIDDEN);
    }
}

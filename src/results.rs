//! 토큰으로 본인 배정 결과 조회

use crate::error::ManitoError;
use crate::models::Room;
use serde::{Deserialize, Serialize};

/// 본인 이름과 배정 대상만 담는다
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentResult {
    pub room_name: String,
    pub name: String,
    pub target_name: String,
}

pub fn lookup_result(room: &Room, token: &str) -> Result<AssignmentResult, ManitoError> {
    let member = room
        .member_by_token(token)
        .ok_or(ManitoError::TokenNotFound)?;

    if !room.is_assigned {
        return Err(ManitoError::NotAssigned);
    }

    let target_name = member
        .target_name
        .clone()
        .ok_or(ManitoError::NotAssigned)?;

    Ok(AssignmentResult {
        room_name: room.room_name.clone(),
        name: member.name.clone(),
        target_name,
    })
}

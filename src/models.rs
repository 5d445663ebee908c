//! 방/참가자 데이터 모델

use serde::{Deserialize, Serialize};

/// 참가자
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    pub token: String,
    /// 배정 이후에만 채워짐
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
}

impl Member {
    pub fn new(id: String, name: String, token: String) -> Self {
        Self {
            id,
            name,
            token,
            target_name: None,
        }
    }
}

/// 방 레코드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub room_name: String,
    pub admin_id: String,
    pub admin_name: String,
    pub is_assigned: bool,
    pub members: Vec<Member>,
    /// Unix epoch 기준 밀리초
    pub created_at: u64,
}

impl Room {
    pub fn member_by_token(&self, token: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.token == token)
    }

    pub fn has_member_named(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.name == name)
    }
}

//! 클라이언트-서버 메시지 프로토콜 정의

use crate::config::Config;
use crate::error::ManitoError;
use crate::models::Room;
use crate::results::AssignmentResult;
use serde::{Deserialize, Serialize};

/// 클라이언트 → 서버 메시지
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    // Connection
    Heartbeat,

    // Auth
    SignIn { resume: Option<String> },
    SignOut,

    // Room Management
    CreateRoom { room_name: String, admin_name: String },
    WatchRoom { room_id: String },
    AddMember { room_id: String, name: String },
    DeleteMember { room_id: String, member_id: String },
    RunMatching { room_id: String },
    Unwatch,

    // Result
    CheckResult { token: String },
}

/// 서버 → 클라이언트 메시지
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    // Connection
    Connected { socket_id: String },
    HeartbeatAck,
    Error { code: String, message: String },

    // Auth
    SignedIn { uid: String, credential: String },
    SignedOut,

    // Room Events
    RoomCreated { room: RoomView },
    RoomSnapshot { room: RoomView },
    MemberAdded { room_id: String, member_id: String },
    MemberDeleted { room_id: String, member_id: String },
    MatchingComplete { room_id: String, member_count: usize },

    // Result
    ResultPending { room_name: String, name: String },
    AssignmentResult(AssignmentResult),
}

impl From<&ManitoError> for ServerMessage {
    fn from(err: &ManitoError) -> Self {
        ServerMessage::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// 대표자 화면용 방 정보 (배정 결과는 포함하지 않음)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomView {
    pub id: String,
    pub room_name: String,
    pub admin_name: String,
    pub is_assigned: bool,
    pub members: Vec<MemberView>,
    pub created_at: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberView {
    pub id: String,
    pub name: String,
    pub token: String,
    pub link: String,
    pub is_admin: bool,
}

impl RoomView {
    pub fn from_room(room: &Room, config: &Config) -> Self {
        Self {
            id: room.id.clone(),
            room_name: room.room_name.clone(),
            admin_name: room.admin_name.clone(),
            is_assigned: room.is_assigned,
            members: room
                .members
                .iter()
                .map(|m| MemberView {
                    id: m.id.clone(),
                    name: m.name.clone(),
                    token: m.token.clone(),
                    link: config.share_link(&m.token),
                    is_admin: m.name == room.admin_name,
                })
                .collect(),
            created_at: room.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Member;

    #[test]
    fn client_messages_use_type_and_payload() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"AddMember","payload":{"room_id":"ABCD1234","name":"Bob"}}"#,
        )
        .unwrap();
        assert!(matches!(msg, ClientMessage::AddMember { ref name, .. } if name == "Bob"));

        let msg: ClientMessage = serde_json::from_str(r#"{"type":"Heartbeat"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Heartbeat));

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"SignIn","payload":{"resume":null}}"#).unwrap();
        assert!(matches!(msg, ClientMessage::SignIn { resume: None }));
    }

    #[test]
    fn error_message_carries_code() {
        let json = serde_json::to_value(ServerMessage::from(&ManitoError::TokenNotFound)).unwrap();
        assert_eq!(json["type"], "Error");
        assert_eq!(json["payload"]["code"], "TOKEN_NOT_FOUND");
    }

    #[test]
    fn admin_view_hides_targets() {
        let mut alice = Member::new("a".into(), "Alice".into(), "tok-a".into());
        alice.target_name = Some("Bob".into());
        let mut bob = Member::new("b".into(), "Bob".into(), "tok-b".into());
        bob.target_name = Some("Alice".into());
        let room = Room {
            id: "ROOM0001".into(),
            room_name: "Party".into(),
            admin_id: "uid".into(),
            admin_name: "Alice".into(),
            is_assigned: true,
            members: vec![alice, bob],
            created_at: 0,
        };

        let view = RoomView::from_room(&room, &Config::default());
        let json = serde_json::to_string(&ServerMessage::RoomSnapshot {
            room: view.clone(),
        })
        .unwrap();
        assert!(!json.contains("target"));
        assert!(view.members[0].is_admin);
        assert!(!view.members[1].is_admin);
        assert_eq!(view.members[1].link, "http://localhost:5502/?token=tok-b");
    }
}

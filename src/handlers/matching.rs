//! 마니또 배정 핸들러

use super::connection::{current_identity, send_error, send_to_peer};
use super::room::room_key;
use crate::protocol::ServerMessage;
use crate::state::AppState;
use std::sync::Arc;

/// 배정 실행 (되돌릴 수 없음)
pub async fn handle_run_matching(state: Arc<AppState>, peer_id: &str, room_id: &str) {
    let room_id = room_key(room_id);
    let result = async {
        let identity = current_identity(&state, peer_id).await?;
        state.store.commit_assignment(&identity, &room_id)
    }
    .await;

    match result {
        Ok(room) => {
            send_to_peer(
                &state,
                peer_id,
                ServerMessage::MatchingComplete {
                    room_id: room.id.clone(),
                    member_count: room.members.len(),
                },
            );
            tracing::info!(
                peer_id = %peer_id,
                room_id = %room.id,
                member_count = room.members.len(),
                "Matching complete"
            );
        }
        Err(err) => {
            tracing::warn!(peer_id = %peer_id, room_id = %room_id, error = %err, "Matching failed");
            send_error(&state, peer_id, &err);
        }
    }
}

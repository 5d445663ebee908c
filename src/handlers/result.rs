//! 결과 확인 핸들러

use super::connection::{replace_watch_task, send_error, sender_of};
use crate::error::ManitoError;
use crate::protocol::ServerMessage;
use crate::results::{lookup_result, AssignmentResult};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use futures::StreamExt;
use std::sync::Arc;

/// 토큰 결과 실시간 확인
///
/// 방 스냅샷이 올 때마다 다시 조회한다. 토큰이 사라지면 매번 에러를 보낸다.
/// 배정이 끝난 방은 더 이상 바뀌지 않으므로 결과를 보낸 뒤 구독을 끝낸다.
pub async fn handle_check_result(state: Arc<AppState>, peer_id: &str, token: &str) {
    let token = token.trim().to_string();

    let Some(subscription) = state
        .store
        .find_by_token(&token)
        .and_then(|room| state.store.subscribe(&room.id))
    else {
        send_error(&state, peer_id, &ManitoError::TokenNotFound);
        replace_watch_task(&state, peer_id, None).await;
        return;
    };
    let Some(sender) = sender_of(&state, peer_id) else {
        return;
    };

    let task = tokio::spawn(async move {
        let mut snapshots = Box::pin(subscription.into_stream());
        while let Some(room) = snapshots.next().await {
            let (message, done) = match lookup_result(&room, &token) {
                Ok(result) => (ServerMessage::AssignmentResult(result), true),
                Err(ManitoError::NotAssigned) => {
                    let name = room
                        .member_by_token(&token)
                        .map(|m| m.name.clone())
                        .unwrap_or_default();
                    (
                        ServerMessage::ResultPending {
                            room_name: room.room_name.clone(),
                            name,
                        },
                        false,
                    )
                }
                Err(err) => (ServerMessage::from(&err), false),
            };

            if sender.send(message).is_err() || done {
                break;
            }
        }
    });
    replace_watch_task(&state, peer_id, Some(task)).await;

    tracing::debug!(peer_id = %peer_id, "Result check started");
}

/// GET /api/results/:token
pub async fn result_handler(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<AssignmentResult>, ManitoError> {
    let room = state
        .store
        .find_by_token(&token)
        .ok_or(ManitoError::TokenNotFound)?;
    lookup_result(&room, &token).map(Json)
}

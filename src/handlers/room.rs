//! 방 관리 핸들러

use super::connection::{current_identity, replace_watch_task, send_error, send_to_peer, sender_of};
use crate::error::ManitoError;
use crate::protocol::{RoomView, ServerMessage};
use crate::state::AppState;
use futures::StreamExt;
use std::sync::Arc;

/// 방 생성 후 바로 실시간 구독 시작
pub async fn handle_create_room(
    state: Arc<AppState>,
    peer_id: &str,
    room_name: &str,
    admin_name: &str,
) {
    let result = async {
        let identity = current_identity(&state, peer_id).await?;
        state.store.create_room(&identity, room_name, admin_name)
    }
    .await;

    match result {
        Ok(room) => {
            send_to_peer(
                &state,
                peer_id,
                ServerMessage::RoomCreated {
                    room: RoomView::from_room(&room, &state.config),
                },
            );
            handle_watch_room(state, peer_id, &room.id).await;
        }
        Err(err) => send_error(&state, peer_id, &err),
    }
}

/// 대표자용 방 실시간 구독
pub async fn handle_watch_room(state: Arc<AppState>, peer_id: &str, room_id: &str) {
    let room_id = room_key(room_id);

    let subscription = async {
        let identity = current_identity(&state, peer_id).await?;
        let subscription = state
            .store
            .subscribe(&room_id)
            .ok_or_else(|| ManitoError::RoomNotFound(room_id.clone()))?;
        if subscription.current().admin_id != identity.uid {
            return Err(ManitoError::NotAdmin);
        }
        Ok::<_, ManitoError>((identity, subscription))
    }
    .await;

    let (identity, subscription) = match subscription {
        Ok(watch) => watch,
        Err(err) => {
            send_error(&state, peer_id, &err);
            return;
        }
    };
    let Some(sender) = sender_of(&state, peer_id) else {
        return;
    };

    // 같은 자격증명으로 접속한 다른 연결이 로그아웃해도 구독은 끝난다
    let watch_state = state.clone();
    let task = tokio::spawn(async move {
        let mut snapshots = Box::pin(subscription.into_stream());
        while let Some(room) = snapshots.next().await {
            if !watch_state.auth.is_valid(&identity) {
                tracing::debug!(uid = %identity.uid, "Identity signed out, room watch stopped");
                break;
            }
            let view = RoomView::from_room(&room, &watch_state.config);
            if sender.send(ServerMessage::RoomSnapshot { room: view }).is_err() {
                break;
            }
        }
    });
    replace_watch_task(&state, peer_id, Some(task)).await;

    tracing::info!(peer_id = %peer_id, room_id = %room_id, "Watching room");
}

/// 구독 해제
pub async fn handle_unwatch(state: Arc<AppState>, peer_id: &str) {
    replace_watch_task(&state, peer_id, None).await;
    tracing::debug!(peer_id = %peer_id, "Watch cancelled");
}

/// 참가자 추가
pub async fn handle_add_member(state: Arc<AppState>, peer_id: &str, room_id: &str, name: &str) {
    let room_id = room_key(room_id);
    let max_members = state.config.room.max_members;
    let result = async {
        let identity = current_identity(&state, peer_id).await?;
        state.store.add_member(&identity, &room_id, name, max_members)
    }
    .await;

    match result {
        Ok(member) => send_to_peer(
            &state,
            peer_id,
            ServerMessage::MemberAdded {
                room_id,
                member_id: member.id,
            },
        ),
        Err(err) => send_error(&state, peer_id, &err),
    }
}

/// 참가자 삭제
pub async fn handle_delete_member(
    state: Arc<AppState>,
    peer_id: &str,
    room_id: &str,
    member_id: &str,
) {
    let room_id = room_key(room_id);
    let result = async {
        let identity = current_identity(&state, peer_id).await?;
        state.store.delete_member(&identity, &room_id, member_id)
    }
    .await;

    match result {
        Ok(()) => send_to_peer(
            &state,
            peer_id,
            ServerMessage::MemberDeleted {
                room_id,
                member_id: member_id.to_string(),
            },
        ),
        Err(err) => send_error(&state, peer_id, &err),
    }
}

/// 방 코드는 대문자로 저장된다
pub(crate) fn room_key(room_id: &str) -> String {
    room_id.trim().to_uppercase()
}

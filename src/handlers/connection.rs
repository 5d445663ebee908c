//! 연결 / 인증 핸들러

use crate::auth::Identity;
use crate::error::ManitoError;
use crate::protocol::ServerMessage;
use crate::state::{AppState, PeerSession};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// 새 연결 처리
pub async fn handle_connection(
    state: Arc<AppState>,
    sender: UnboundedSender<ServerMessage>,
) -> String {
    let peer_id = Uuid::new_v4().to_string();

    state
        .peers
        .insert(peer_id.clone(), PeerSession::new(peer_id.clone(), sender.clone()));

    let _ = sender.send(ServerMessage::Connected {
        socket_id: peer_id.clone(),
    });

    tracing::info!(peer_id = %peer_id, "New connection established");
    peer_id
}

/// 연결 해제 처리
pub async fn handle_disconnect(state: Arc<AppState>, peer_id: &str) {
    if let Some((_, session)) = state.peers.remove(peer_id) {
        if let Some(task) = session.watch_task.lock().await.take() {
            task.abort();
        }
        tracing::info!(
            peer_id = %peer_id,
            connected_secs = session.connected_at.elapsed().as_secs(),
            "Connection closed"
        );
    }
}

/// Heartbeat 처리
pub fn handle_heartbeat(sender: &UnboundedSender<ServerMessage>) {
    let _ = sender.send(ServerMessage::HeartbeatAck);
}

/// 익명 로그인 (resume 이 유효하면 기존 계정 재사용)
pub async fn handle_sign_in(state: Arc<AppState>, peer_id: &str, resume: Option<&str>) {
    let identity = state.auth.sign_in(resume);

    if let Some(session) = state.peers.get(peer_id) {
        *session.identity.write().await = Some(identity.clone());
    }

    send_to_peer(
        &state,
        peer_id,
        ServerMessage::SignedIn {
            uid: identity.uid.clone(),
            credential: identity.credential,
        },
    );
    tracing::info!(peer_id = %peer_id, uid = %identity.uid, "Signed in");
}

/// 로그아웃: 자격증명 무효화 후 구독 해제
pub async fn handle_sign_out(state: Arc<AppState>, peer_id: &str) {
    let identity = match state.peers.get(peer_id) {
        Some(session) => session.identity.write().await.take(),
        None => None,
    };

    if let Some(identity) = identity {
        state.auth.sign_out(&identity);
        tracing::info!(peer_id = %peer_id, uid = %identity.uid, "Signed out");
    }

    replace_watch_task(&state, peer_id, None).await;
    send_to_peer(&state, peer_id, ServerMessage::SignedOut);
}

/// 현재 연결의 로그인 정보
pub(crate) async fn current_identity(
    state: &AppState,
    peer_id: &str,
) -> Result<Identity, ManitoError> {
    let identity = match state.peers.get(peer_id) {
        Some(session) => session.identity.read().await.clone(),
        None => None,
    };

    match identity {
        Some(identity) if state.auth.is_valid(&identity) => Ok(identity),
        _ => Err(ManitoError::Unauthenticated),
    }
}

/// 기존 구독 태스크를 중단하고 새 태스크로 교체
pub(crate) async fn replace_watch_task(
    state: &AppState,
    peer_id: &str,
    task: Option<JoinHandle<()>>,
) {
    match state.peers.get(peer_id) {
        Some(session) => {
            let mut slot = session.watch_task.lock().await;
            if let Some(previous) = slot.take() {
                previous.abort();
            }
            *slot = task;
        }
        None => {
            if let Some(task) = task {
                task.abort();
            }
        }
    }
}

pub(crate) fn sender_of(state: &AppState, peer_id: &str) -> Option<UnboundedSender<ServerMessage>> {
    state.peers.get(peer_id).map(|session| session.sender.clone())
}

/// 특정 피어에게 메시지 전송
pub(crate) fn send_to_peer(state: &AppState, peer_id: &str, message: ServerMessage) {
    if let Some(session) = state.peers.get(peer_id) {
        let _ = session.sender.send(message);
    }
}

pub(crate) fn send_error(state: &AppState, peer_id: &str, err: &ManitoError) {
    tracing::debug!(peer_id = %peer_id, code = err.code(), "Request rejected");
    send_to_peer(state, peer_id, ServerMessage::from(err));
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::Config;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    pub(crate) async fn connect(
        state: &Arc<AppState>,
    ) -> (String, UnboundedReceiver<ServerMessage>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let peer_id = handle_connection(state.clone(), tx).await;
        assert!(matches!(rx.recv().await, Some(ServerMessage::Connected { .. })));
        (peer_id, rx)
    }

    pub(crate) async fn signed_in(
        state: &Arc<AppState>,
    ) -> (String, UnboundedReceiver<ServerMessage>) {
        let (peer_id, mut rx) = connect(state).await;
        handle_sign_in(state.clone(), &peer_id, None).await;
        assert!(matches!(rx.recv().await, Some(ServerMessage::SignedIn { .. })));
        (peer_id, rx)
    }

    #[tokio::test]
    async fn sign_in_then_resume_keeps_uid() {
        let state = Arc::new(AppState::new(Config::default()));
        let (peer_id, mut rx) = connect(&state).await;

        handle_sign_in(state.clone(), &peer_id, None).await;
        let Some(ServerMessage::SignedIn { uid, credential }) = rx.recv().await else {
            panic!("expected SignedIn");
        };

        let (other, mut other_rx) = connect(&state).await;
        handle_sign_in(state.clone(), &other, Some(&credential)).await;
        let Some(ServerMessage::SignedIn { uid: resumed, .. }) = other_rx.recv().await else {
            panic!("expected SignedIn");
        };
        assert_eq!(uid, resumed);
    }

    #[tokio::test]
    async fn sign_out_drops_identity() {
        let state = Arc::new(AppState::new(Config::default()));
        let (peer_id, mut rx) = signed_in(&state).await;
        assert!(current_identity(&state, &peer_id).await.is_ok());

        handle_sign_out(state.clone(), &peer_id).await;
        assert_eq!(rx.recv().await, Some(ServerMessage::SignedOut));
        assert_eq!(
            current_identity(&state, &peer_id).await,
            Err(ManitoError::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn disconnect_removes_session() {
        let state = Arc::new(AppState::new(Config::default()));
        let (peer_id, _rx) = connect(&state).await;
        handle_disconnect(state.clone(), &peer_id).await;
        assert!(state.peers.get(&peer_id).is_none());
    }

    #[tokio::test]
    async fn heartbeat_is_acknowledged() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        handle_heartbeat(&tx);
        assert_eq!(rx.recv().await, Some(ServerMessage::HeartbeatAck));
    }
}

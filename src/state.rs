//! 애플리케이션 상태 관리

use crate::auth::{AuthRegistry, Identity};
use crate::config::Config;
use crate::protocol::ServerMessage;
use crate::store::RoomStore;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc::UnboundedSender, Mutex, RwLock};
use tokio::task::JoinHandle;

/// 전역 애플리케이션 상태
pub struct AppState {
    /// 방 저장소
    pub store: RoomStore,
    /// 익명 인증
    pub auth: AuthRegistry,
    /// 피어 세션 (peer_id -> PeerSession)
    pub peers: DashMap<String, PeerSession>,
    /// 설정
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            store: RoomStore::new(),
            auth: AuthRegistry::new(),
            peers: DashMap::new(),
            config: Arc::new(config),
        }
    }
}

/// 피어 세션 정보
pub struct PeerSession {
    #[allow(dead_code)]
    pub id: String,
    /// 로그인 전에는 None
    pub identity: RwLock<Option<Identity>>,
    pub sender: UnboundedSender<ServerMessage>,
    /// 방 또는 결과 실시간 구독 태스크 (연결당 하나)
    pub watch_task: Mutex<Option<JoinHandle<()>>>,
    pub connected_at: Instant,
}

impl PeerSession {
    pub fn new(id: String, sender: UnboundedSender<ServerMessage>) -> Self {
        Self {
            id,
            identity: RwLock::new(None),
            sender,
            watch_task: Mutex::new(None),
            connected_at: Instant::now(),
        }
    }
}

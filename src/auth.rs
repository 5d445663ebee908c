//! 익명 인증
//!
//! 로그인하면 명시적인 `Identity` 값을 돌려주고, 연결 세션이 이를 보관한다.
//! 권한이 필요한 작업에는 이 값을 직접 넘긴다.

use crate::identity;
use dashmap::DashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub credential: String,
}

/// credential -> uid
#[derive(Default)]
pub struct AuthRegistry {
    sessions: DashMap<String, String>,
}

impl AuthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 유효한 credential 이면 기존 uid 를 재사용, 아니면 새 익명 계정 발급
    pub fn sign_in(&self, resume: Option<&str>) -> Identity {
        if let Some(credential) = resume {
            if let Some(uid) = self.sessions.get(credential) {
                return Identity {
                    uid: uid.clone(),
                    credential: credential.to_string(),
                };
            }
        }

        let identity = Identity {
            uid: identity::new_uid(),
            credential: identity::new_credential(),
        };
        self.sessions
            .insert(identity.credential.clone(), identity.uid.clone());
        identity
    }

    pub fn sign_out(&self, identity: &Identity) {
        self.sessions.remove(&identity.credential);
    }

    pub fn is_valid(&self, identity: &Identity) -> bool {
        self.sessions
            .get(&identity.credential)
            .is_some_and(|uid| *uid == identity.uid)
    }
}

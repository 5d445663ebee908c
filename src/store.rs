//! 방 상태 저장소
//!
//! 방마다 하나의 레코드를 보관하고, 변경이 커밋될 때마다 전체 스냅샷을
//! `watch` 채널로 내보낸다. DashMap 엔트리 락은 동기 구간에서만 잡는다.

use crate::assignment;
use crate::auth::Identity;
use crate::error::ManitoError;
use crate::identity;
use crate::models::{Member, Room};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::stream::{self, Stream};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::watch;

struct RoomEntry {
    room: Room,
    updates: watch::Sender<Room>,
}

impl RoomEntry {
    fn new(room: Room) -> Self {
        let (updates, _) = watch::channel(room.clone());
        Self { room, updates }
    }

    fn publish(&self) {
        self.updates.send_replace(self.room.clone());
    }

    fn require_admin(&self, identity: &Identity) -> Result<(), ManitoError> {
        if self.room.admin_id == identity.uid {
            Ok(())
        } else {
            Err(ManitoError::NotAdmin)
        }
    }

    fn require_open(&self) -> Result<(), ManitoError> {
        if self.room.is_assigned {
            Err(ManitoError::AlreadyAssigned)
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
pub struct RoomStore {
    /// room_id -> RoomEntry
    rooms: DashMap<String, RoomEntry>,
    /// token -> room_id (삭제된 참가자의 토큰은 None 으로 남겨 재발급을 막는다)
    tokens: DashMap<String, Option<String>>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// 방 생성 (대표자가 첫 번째 참가자)
    pub fn create_room(
        &self,
        admin: &Identity,
        room_name: &str,
        admin_name: &str,
    ) -> Result<Room, ManitoError> {
        let room_name = normalize_name(room_name)?;
        let admin_name = normalize_name(admin_name)?;

        loop {
            let room_id = identity::new_room_code();
            let Entry::Vacant(vacant) = self.rooms.entry(room_id.clone()) else {
                continue;
            };

            let admin_member = Member::new(
                identity::new_member_id(),
                admin_name.clone(),
                self.issue_token(&room_id),
            );
            let room = Room {
                id: room_id.clone(),
                room_name,
                admin_id: admin.uid.clone(),
                admin_name,
                is_assigned: false,
                members: vec![admin_member],
                created_at: now_millis(),
            };

            vacant.insert(RoomEntry::new(room.clone()));
            tracing::info!(room_id = %room_id, admin = %admin.uid, "Room created");
            return Ok(room);
        }
    }

    pub fn get(&self, room_id: &str) -> Option<Room> {
        self.rooms.get(room_id).map(|entry| entry.room.clone())
    }

    /// 참가자 추가 (배정 전에만 가능)
    pub fn add_member(
        &self,
        admin: &Identity,
        room_id: &str,
        name: &str,
        max_members: usize,
    ) -> Result<Member, ManitoError> {
        let mut entry = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| ManitoError::RoomNotFound(room_id.to_string()))?;

        entry.require_admin(admin)?;
        entry.require_open()?;

        let name = normalize_name(name)?;
        if entry.room.has_member_named(&name) {
            return Err(ManitoError::DuplicateName(name));
        }
        if entry.room.members.len() >= max_members {
            return Err(ManitoError::RoomFull(max_members));
        }

        let member = Member::new(identity::new_member_id(), name, self.issue_token(room_id));
        entry.room.members.push(member.clone());
        entry.publish();

        tracing::info!(
            room_id = %room_id,
            member_id = %member.id,
            member_count = entry.room.members.len(),
            "Member added"
        );
        Ok(member)
    }

    /// 참가자 삭제 (배정 전에만 가능)
    pub fn delete_member(
        &self,
        admin: &Identity,
        room_id: &str,
        member_id: &str,
    ) -> Result<(), ManitoError> {
        let mut entry = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| ManitoError::RoomNotFound(room_id.to_string()))?;

        entry.require_admin(admin)?;
        entry.require_open()?;

        let index = entry
            .room
            .members
            .iter()
            .position(|m| m.id == member_id)
            .ok_or(ManitoError::MemberNotFound)?;
        let removed = entry.room.members.remove(index);
        self.tokens.insert(removed.token, None);
        entry.publish();

        tracing::info!(
            room_id = %room_id,
            member_id = %member_id,
            member_count = entry.room.members.len(),
            "Member deleted"
        );
        Ok(())
    }

    /// 배정 커밋
    ///
    /// `is_assigned` false -> true 전환과 참가자 목록 교체를 엔트리 락 안에서
    /// 한 번에 적용한다. 동시에 여러 번 호출돼도 한 번만 성공한다.
    /// 저장되는 목록은 배정 전 순서를 유지한다.
    pub fn commit_assignment(&self, admin: &Identity, room_id: &str) -> Result<Room, ManitoError> {
        let mut entry = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| ManitoError::RoomNotFound(room_id.to_string()))?;

        entry.require_admin(admin)?;
        entry.require_open()?;

        let mut assigned = assignment::assign(&entry.room.members)?;
        let position: HashMap<String, usize> = entry
            .room
            .members
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id.clone(), i))
            .collect();
        assigned.sort_by_key(|m| position.get(&m.id).copied().unwrap_or(usize::MAX));

        entry.room.members = assigned;
        entry.room.is_assigned = true;
        entry.publish();

        tracing::info!(
            room_id = %room_id,
            member_count = entry.room.members.len(),
            "Matching committed"
        );
        Ok(entry.room.clone())
    }

    /// 토큰으로 방 찾기
    pub fn find_by_token(&self, token: &str) -> Option<Room> {
        let room_id = self.tokens.get(token).and_then(|r| r.value().clone())?;
        self.get(&room_id)
    }

    /// 방 스냅샷 구독
    pub fn subscribe(&self, room_id: &str) -> Option<RoomSubscription> {
        self.rooms.get(room_id).map(|entry| RoomSubscription {
            rx: entry.updates.subscribe(),
        })
    }

    fn issue_token(&self, room_id: &str) -> String {
        loop {
            let token = identity::new_token();
            if let Entry::Vacant(vacant) = self.tokens.entry(token.clone()) {
                vacant.insert(Some(room_id.to_string()));
                return token;
            }
        }
    }
}

/// 방 하나에 대한 구독
///
/// 스트림의 첫 항목은 구독 시점의 스냅샷이고, 이후 커밋마다 새 스냅샷이 온다.
/// 다시 구독하면 현재 스냅샷부터 다시 시작한다.
pub struct RoomSubscription {
    rx: watch::Receiver<Room>,
}

impl RoomSubscription {
    pub fn current(&self) -> Room {
        self.rx.borrow().clone()
    }

    pub fn into_stream(self) -> impl Stream<Item = Room> + Send + 'static {
        stream::unfold((self.rx, true), |(mut rx, first)| async move {
            if !first {
                rx.changed().await.ok()?;
            }
            let room = rx.borrow_and_update().clone();
            Some((room, (rx, false)))
        })
    }
}

fn normalize_name(name: &str) -> Result<String, ManitoError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ManitoError::EmptyName);
    }
    Ok(trimmed.to_string())
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

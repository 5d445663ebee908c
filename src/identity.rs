//! 방 코드 / 참가자 ID / 토큰 발급

use rand::distributions::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

const ROOM_CODE_LEN: usize = 8;
const TOKEN_LEN: usize = 10;
const CREDENTIAL_LEN: usize = 32;

const UPPER_BASE36: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const LOWER_BASE36: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

fn random_from(charset: &[u8], len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| charset[rng.gen_range(0..charset.len())] as char)
        .collect()
}

/// 방 코드 (대문자 8자리)
pub fn new_room_code() -> String {
    random_from(UPPER_BASE36, ROOM_CODE_LEN)
}

pub fn new_member_id() -> String {
    Uuid::new_v4().to_string()
}

/// 결과 확인용 토큰 (소문자 10자리)
pub fn new_token() -> String {
    random_from(LOWER_BASE36, TOKEN_LEN)
}

pub fn new_uid() -> String {
    Uuid::new_v4().to_string()
}

/// 익명 세션 재개용 자격증명
pub fn new_credential() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CREDENTIAL_LEN)
        .map(char::from)
        .collect()
}

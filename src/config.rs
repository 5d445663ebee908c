//! 환경 변수 기반 설정 관리

use std::env;

/// 서버 설정
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    pub public_url: String,
    pub room: RoomConfig,
    pub log_level: String,
}

/// 방 설정
#[derive(Debug, Clone)]
pub struct RoomConfig {
    pub max_members: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5502,
            host: "0.0.0.0".to_string(),
            cors_origins: vec!["*".to_string()],
            public_url: "http://localhost:5502".to_string(),
            room: RoomConfig { max_members: 100 },
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// 환경 변수에서 설정 로드
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            host: env::var("HOST").unwrap_or(defaults.host),
            cors_origins: parse_origins(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()),
            ),
            public_url: env::var("PUBLIC_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.public_url),
            room: RoomConfig {
                max_members: env::var("MAX_MEMBERS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.room.max_members),
            },
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }

    /// 참가자 결과 확인 링크
    pub fn share_link(&self, token: &str) -> String {
        format!("{}/?token={}", self.public_url, token)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(
            parse_origins(" http://a.test , ,http://b.test"),
            vec!["http://a.test", "http://b.test"]
        );
    }

    #[test]
    fn wildcard_origin_allows_any() {
        let config = Config::default();
        assert!(config.allows_any_origin());

        let config = Config {
            cors_origins: vec!["http://a.test".to_string()],
            ..Config::default()
        };
        assert!(!config.allows_any_origin());
    }

    #[test]
    fn share_link_embeds_token() {
        let config = Config {
            public_url: "https://manito.example".to_string(),
            ..Config::default()
        };
        assert_eq!(config.share_link("abc123"), "https://manito.example/?token=abc123");
    }
}

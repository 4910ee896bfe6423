use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";
pub const DEFAULT_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";
pub const DEFAULT_PLAYER_ID: &str = "media_player.spotify";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub spotify: SpotifyConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub players: Vec<PlayerConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            spotify: SpotifyConfig::default(),
            search: SearchConfig::default(),
            players: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// 상위 세션 제공자가 발급한 사용자 토큰. 있으면 client credentials보다 우선한다.
    pub access_token: Option<String>,
    pub api_base: Option<String>,
    pub accounts_base: Option<String>,
}

impl SpotifyConfig {
    pub fn has_access_token(&self) -> bool {
        self.access_token.as_ref().is_some_and(|s| !s.is_empty())
    }

    pub fn has_client_credentials(&self) -> bool {
        self.client_id.as_ref().is_some_and(|s| !s.is_empty())
            && self.client_secret.as_ref().is_some_and(|s| !s.is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.has_access_token() || self.has_client_credentials()
    }

    pub fn api_base(&self) -> &str {
        self.api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
    }

    pub fn accounts_base(&self) -> &str {
        self.accounts_base
            .as_deref()
            .unwrap_or(DEFAULT_ACCOUNTS_BASE)
            .trim_end_matches('/')
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// 후보 엔티티를 찾을 도메인.
    #[serde(default = "default_entity_domain")]
    pub entity_domain: String,
    /// 엔티티 id에 포함되어야 하는 문자열 (대소문자 무시).
    #[serde(default = "default_entity_pattern")]
    pub entity_pattern: String,
    /// 음성 명령에서 온 질의의 "play " 같은 군더더기 단어를 제거한다.
    #[serde(default)]
    pub clean_queries: bool,
    #[serde(default = "default_true")]
    pub cache_user_playlists: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            entity_domain: default_entity_domain(),
            entity_pattern: default_entity_pattern(),
            clean_queries: false,
            cache_user_playlists: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub entity_id: String,
}

impl Config {
    /// 등록할 플레이어 목록. 설정에 없으면 Spotify가 설정된 경우 기본 플레이어 하나를 쓴다.
    pub fn player_ids(&self) -> Vec<String> {
        if !self.players.is_empty() {
            return self.players.iter().map(|p| p.entity_id.clone()).collect();
        }
        if self.spotify.is_configured() {
            vec![DEFAULT_PLAYER_ID.to_string()]
        } else {
            Vec::new()
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_entity_domain() -> String {
    "media_player".to_string()
}

fn default_entity_pattern() -> String {
    "spotify".to_string()
}

fn default_true() -> bool {
    true
}

fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join(".config")
        .join("spotify-search")
        .join("config.toml")
}

/// 설정 파일을 읽는다. 파일이 없으면 기본값, 읽거나 해석할 수 없으면 오류.
/// 로거가 설치되기 전에 불리므로 여기서는 로그를 남기지 않는다.
pub fn load_config() -> Result<Config> {
    load_config_from(&config_path())
}

fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("설정 파일을 읽을 수 없습니다: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("설정 파일 형식이 잘못되었습니다: {}", path.display()))
}

pub fn save_config(config: &Config) -> Result<()> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("설정 디렉토리를 만들 수 없습니다: {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content)
        .with_context(|| format!("설정 파일을 쓸 수 없습니다: {}", path.display()))?;
    Ok(())
}

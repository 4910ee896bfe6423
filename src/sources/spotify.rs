use std::sync::Arc;

use anyhow::{Context, Result};
use base64::Engine;
use log::{debug, warn};
use serde::Deserialize;

use crate::config::SpotifyConfig;
use crate::host::{Coordinator, MediaEntity};
use crate::models::Candidate;
use crate::sources::{CatalogClient, ClientHandle};

/// 사용자 플레이리스트 한 페이지 크기 (API 최대값).
const PLAYLIST_PAGE_LIMIT: usize = 50;

pub struct SpotifyClient {
    client: reqwest::blocking::Client,
    access_token: String,
    api_base: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize, Default)]
struct SearchResponse {
    #[serde(default)]
    artists: Option<Page>,
    #[serde(default)]
    albums: Option<Page>,
    #[serde(default)]
    tracks: Option<Page>,
    #[serde(default)]
    playlists: Option<Page>,
}

#[derive(Deserialize, Default)]
struct Page {
    // Spotify는 삭제된 플레이리스트 자리에 null을 넣어 보낸다.
    #[serde(default)]
    items: Vec<Option<SpotifyItem>>,
    next: Option<String>,
}

#[derive(Deserialize)]
struct SpotifyItem {
    name: String,
    uri: String,
}

impl SearchResponse {
    fn take_page(self, kind: &str) -> Option<Page> {
        match kind {
            "artist" => self.artists,
            "album" => self.albums,
            "track" => self.tracks,
            "playlist" => self.playlists,
            _ => None,
        }
    }
}

impl SpotifyClient {
    pub fn new(access_token: String, api_base: &str) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            access_token,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn get_page(&self, url: &str, query: &[(&str, String)]) -> Result<Page> {
        let page = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .context("Spotify 연결에 실패했습니다")?
            .error_for_status()
            .context("Spotify 요청이 실패했습니다")?
            .json()
            .context("Spotify 응답 파싱에 실패했습니다")?;
        Ok(page)
    }
}

/// null 항목을 건너뛰고 남은 순서대로 rank를 매긴다.
fn into_candidates(items: Vec<Option<SpotifyItem>>, offset: usize) -> Vec<Candidate> {
    items
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(i, item)| Candidate::new(item.name, item.uri, offset + i))
        .collect()
}

fn parse_search_response(body: &str, kind: &str) -> Result<Vec<Candidate>> {
    let resp: SearchResponse =
        serde_json::from_str(body).context("Spotify 검색 응답 파싱에 실패했습니다")?;
    let page = resp.take_page(kind).unwrap_or_default();
    Ok(into_candidates(page.items, 0))
}

impl CatalogClient for SpotifyClient {
    fn search(&self, query: &str, kind: &str, limit: usize) -> Result<Vec<Candidate>> {
        let limit = limit.to_string();
        let body = self
            .client
            .get(format!("{}/search", self.api_base))
            .bearer_auth(&self.access_token)
            .query(&[("q", query), ("type", kind), ("limit", limit.as_str())])
            .send()
            .context("Spotify 검색에 실패했습니다")?
            .error_for_status()
            .context("Spotify 검색 요청이 실패했습니다")?
            .text()
            .context("Spotify 검색 응답 읽기에 실패했습니다")?;

        let results = parse_search_response(&body, kind)?;
        debug!("Spotify {} search for '{}' returned {} items", kind, query, results.len());
        Ok(results)
    }

    fn current_user_playlists(&self) -> Result<Vec<Candidate>> {
        let mut playlists = Vec::new();
        let mut page = self.get_page(
            &format!("{}/me/playlists", self.api_base),
            &[("limit", PLAYLIST_PAGE_LIMIT.to_string())],
        )?;

        loop {
            let next = page.next.take();
            let fetched = into_candidates(page.items, playlists.len());
            playlists.extend(fetched);
            match next {
                Some(url) => page = self.get_page(&url, &[])?,
                None => break,
            }
        }

        debug!("Fetched {} saved playlists", playlists.len());
        Ok(playlists)
    }
}

/// Spotify 엔티티 뒤의 인증 세션. 토큰을 얻지 못했으면 클라이언트를 내주지 않는다.
pub struct SpotifySession {
    client: Option<ClientHandle>,
}

impl SpotifySession {
    /// 설정에 사용자 토큰이 있으면 그대로 쓰고, 없으면 client credentials로 앱 토큰을 받는다.
    /// 앱 토큰으로는 공개 카탈로그만 조회할 수 있다.
    pub fn connect(config: &SpotifyConfig) -> Self {
        match Self::access_token(config) {
            Ok(token) => Self::with_client(Arc::new(SpotifyClient::new(token, config.api_base()))),
            Err(e) => {
                warn!("Spotify session is not ready: {:#}", e);
                Self::pending()
            }
        }
    }

    pub fn with_client(client: ClientHandle) -> Self {
        Self {
            client: Some(client),
        }
    }

    pub fn pending() -> Self {
        Self { client: None }
    }

    fn access_token(config: &SpotifyConfig) -> Result<String> {
        if let Some(token) = config.access_token.as_ref().filter(|t| !t.is_empty()) {
            return Ok(token.clone());
        }
        let client_id = config
            .client_id
            .as_ref()
            .context("Spotify client_id가 설정되지 않았습니다")?;
        let client_secret = config
            .client_secret
            .as_ref()
            .context("Spotify client_secret가 설정되지 않았습니다")?;

        let client = reqwest::blocking::Client::new();
        Self::authenticate(&client, config.accounts_base(), client_id, client_secret)
    }

    fn authenticate(
        client: &reqwest::blocking::Client,
        accounts_base: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<String> {
        let credentials = format!("{}:{}", client_id, client_secret);
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);

        let resp: TokenResponse = client
            .post(format!("{}/api/token", accounts_base))
            .header("Authorization", format!("Basic {}", encoded))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .context("Spotify 연결에 실패했습니다")?
            .error_for_status()
            .context("Spotify 인증에 실패했습니다. client_id와 client_secret를 확인하세요.")?
            .json()
            .context("Spotify 토큰 응답 파싱에 실패했습니다")?;

        Ok(resp.access_token)
    }
}

impl Coordinator for SpotifySession {
    fn client(&self) -> Option<ClientHandle> {
        self.client.clone()
    }
}

/// Spotify 세션을 가진 미디어 플레이어 엔티티.
pub struct SpotifyPlayer {
    entity_id: String,
    session: Option<Arc<SpotifySession>>,
}

impl SpotifyPlayer {
    pub fn new(entity_id: impl Into<String>, session: Option<Arc<SpotifySession>>) -> Self {
        Self {
            entity_id: entity_id.into(),
            session,
        }
    }
}

impl MediaEntity for SpotifyPlayer {
    fn entity_id(&self) -> &str {
        &self.entity_id
    }

    fn coordinator(&self) -> Option<Arc<dyn Coordinator>> {
        self.session
            .clone()
            .map(|session| session as Arc<dyn Coordinator>)
    }
}

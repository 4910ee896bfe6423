use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// 한 번의 원격 검색에서 가져오는 후보 수.
pub const RESULT_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Artist,
    Album,
    Track,
    Playlist,
    UserPlaylist,
}

impl ContentType {
    pub const ALL: [ContentType; 5] = [
        ContentType::Artist,
        ContentType::Album,
        ContentType::Track,
        ContentType::Playlist,
        ContentType::UserPlaylist,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Artist => "artist",
            ContentType::Album => "album",
            ContentType::Track => "track",
            ContentType::Playlist => "playlist",
            ContentType::UserPlaylist => "user_playlist",
        }
    }

    /// 카탈로그 API에 보내는 검색 타입. 저장된 플레이리스트도 플레이리스트다.
    pub fn catalog_kind(self) -> &'static str {
        match self {
            ContentType::UserPlaylist => "playlist",
            other => other.as_str(),
        }
    }

    pub fn scope_tier(self) -> ScopeTier {
        match self {
            ContentType::UserPlaylist => ScopeTier::OwnerOnly,
            _ => ScopeTier::Public,
        }
    }

    fn valid_values() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                SearchError::InvalidRequest(format!(
                    "Invalid type. Must be one of: {}",
                    Self::valid_values()
                ))
            })
    }
}

/// 콘텐츠 타입별로 후보를 찾는 범위.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeTier {
    OwnerOnly,
    Public,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub content_type: ContentType,
    pub result_limit: usize,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, content_type: ContentType) -> Result<Self, SearchError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(SearchError::InvalidRequest("No query provided".to_string()));
        }
        Ok(Self {
            text,
            content_type,
            result_limit: RESULT_LIMIT,
        })
    }
}

/// 원격 API가 돌려준 검색 결과 한 건. `rank`는 응답 목록에서의 위치다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub uri: String,
    pub rank: usize,
}

impl Candidate {
    pub fn new(name: impl Into<String>, uri: impl Into<String>, rank: usize) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            rank,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Partial,
    First,
}

impl MatchKind {
    pub fn describe(self) -> &'static str {
        match self {
            MatchKind::Exact => "exact match",
            MatchKind::Partial => "partial match",
            MatchKind::First => "first result",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub uri: String,
    pub name: String,
    pub content_type: ContentType,
    pub match_kind: MatchKind,
}

/// 외부에서 들어오는 검색 요청. `type`이 없으면 artist로 검색한다.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Found {
        uri: String,
        name: String,
        #[serde(rename = "type")]
        content_type: String,
    },
    Failed {
        error: String,
    },
}

impl From<&MatchResult> for SearchResponse {
    fn from(result: &MatchResult) -> Self {
        SearchResponse::Found {
            uri: result.uri.clone(),
            name: result.name.clone(),
            content_type: result.content_type.catalog_kind().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
}

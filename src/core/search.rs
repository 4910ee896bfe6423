use std::sync::Arc;

use log::{debug, info, warn};

use crate::core::cache::ClientCache;
use crate::core::matcher::{self, MatchPolicy};
use crate::error::SearchError;
use crate::models::{ContentType, MatchResult, ScopeTier, SearchQuery};
use crate::sources::ClientHandle;

/// 콘텐츠 타입이 정한 범위 안에서 질의를 카탈로그 항목 하나로 변환한다.
///
/// `user_playlist`는 사용자가 저장한 플레이리스트만 본다. 공개 플레이리스트는
/// `playlist`로 요청해야 한다.
pub struct ScopedSearch {
    cache: Arc<ClientCache>,
}

impl ScopedSearch {
    pub fn new(cache: Arc<ClientCache>) -> Self {
        Self { cache }
    }

    pub fn search_for(&self, query: &SearchQuery) -> Result<MatchResult, SearchError> {
        let client = self.cache.get()?;
        let result = match query.content_type.scope_tier() {
            ScopeTier::Public => self.search_public(&client, query)?,
            ScopeTier::OwnerOnly => self.search_owned(&client, query)?,
        };

        if result.uri.is_empty() || result.name.is_empty() {
            return Err(SearchError::Unexpected(format!(
                "Invalid {} data from Spotify",
                query.content_type
            )));
        }

        info!(
            "Found Spotify {}: {} ({}) - {}",
            query.content_type,
            result.name,
            result.uri,
            result.match_kind.describe()
        );
        Ok(result)
    }

    fn search_public(
        &self,
        client: &ClientHandle,
        query: &SearchQuery,
    ) -> Result<MatchResult, SearchError> {
        let kind = query.content_type.catalog_kind();
        debug!("Searching for {}: {}", kind, query.text);
        let candidates = client
            .search(&query.text, kind, query.result_limit)
            .map_err(SearchError::remote)?;

        if candidates.is_empty() {
            warn!("No {} results found for query: {}", kind, query.text);
        }
        match query.content_type {
            ContentType::Playlist => {
                matcher::select_with(&candidates, query, MatchPolicy::ExactPartialOrFirst)
            }
            _ => matcher::select(&candidates, query),
        }
    }

    fn search_owned(
        &self,
        client: &ClientHandle,
        query: &SearchQuery,
    ) -> Result<MatchResult, SearchError> {
        debug!("Searching user's playlists for: {}", query.text);
        let playlists = self.cache.owner_playlists(client)?;

        if playlists.is_empty() {
            warn!("User has no saved playlists");
            return Err(SearchError::no_results(query.content_type, &query.text));
        }
        matcher::select_with(&playlists, query, MatchPolicy::ExactOrPartial).inspect_err(|_| {
            warn!(
                "No matching playlist found in user's library for: {}",
                query.text
            )
        })
    }
}

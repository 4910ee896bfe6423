use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::core::cache::ClientCache;
use crate::core::query::clean_query;
use crate::core::search::ScopedSearch;
use crate::error::SearchError;
use crate::models::{
    ClearResponse, ContentType, MatchResult, SearchQuery, SearchRequest, SearchResponse,
};

/// 외부 요청을 `{uri, name, type}` 또는 `{error}` 응답으로 바꾼다.
/// 어떤 실패도 호출자에게 그대로 전파하지 않는다.
pub struct SearchService {
    cache: Arc<ClientCache>,
    search: ScopedSearch,
    clean_queries: bool,
}

impl SearchService {
    pub fn new(cache: Arc<ClientCache>) -> Self {
        Self {
            search: ScopedSearch::new(cache.clone()),
            cache,
            clean_queries: false,
        }
    }

    pub fn with_query_cleaning(mut self, enabled: bool) -> Self {
        self.clean_queries = enabled;
        self
    }

    pub fn cache(&self) -> &ClientCache {
        &self.cache
    }

    pub fn handle_search(&self, request: &SearchRequest) -> SearchResponse {
        match panic::catch_unwind(AssertUnwindSafe(|| self.try_search(request))) {
            Ok(Ok(result)) => SearchResponse::from(&result),
            Ok(Err(err)) => {
                log_failure(&err);
                SearchResponse::Failed {
                    error: err.to_string(),
                }
            }
            Err(payload) => {
                error!(
                    "Unexpected error searching Spotify: {}",
                    panic_payload_to_string(&*payload)
                );
                SearchResponse::Failed {
                    error: "Search failed".to_string(),
                }
            }
        }
    }

    pub fn handle_clear(&self) -> ClearResponse {
        let cached = self.cache.cached_entity_id();
        if self.cache.clear() {
            debug!("Dropped cached client for {:?}", cached);
            ClearResponse {
                success: true,
                message: "Cache cleared".to_string(),
            }
        } else {
            ClearResponse {
                success: false,
                message: "Cache was already empty".to_string(),
            }
        }
    }

    fn try_search(&self, request: &SearchRequest) -> Result<MatchResult, SearchError> {
        let raw = request.query.as_deref().unwrap_or_default();
        if raw.trim().is_empty() {
            return Err(SearchError::InvalidRequest("No query provided".to_string()));
        }
        let content_type: ContentType = request
            .content_type
            .as_deref()
            .unwrap_or("artist")
            .parse()?;

        let text = if self.clean_queries {
            let cleaned = clean_query(raw, content_type);
            info!(
                "Searching Spotify ({}) for cleaned query: '{}' (raw: '{}')",
                content_type, cleaned, raw
            );
            cleaned
        } else {
            raw.to_string()
        };

        let query = SearchQuery::new(text, content_type)?;
        self.search.search_for(&query)
    }
}

fn log_failure(err: &SearchError) {
    match err {
        SearchError::NoResults { .. } => warn!("Search returned nothing [{}]: {}", err.kind(), err),
        SearchError::InvalidRequest(_) => warn!("Rejected search request: {}", err),
        _ => error!("Spotify search failed [{}]: {:?}", err.kind(), err),
    }
}

fn panic_payload_to_string(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        return (*s).to_string();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    "non-string panic payload".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolver::ClientResolver;
    use crate::core::testing::{loading_player, named, ready_player, CountingRegistry, FakeCatalog};
    use pretty_assertions::assert_eq;

    fn service_over(catalog: &Arc<FakeCatalog>) -> SearchService {
        let registry = Arc::new(CountingRegistry::new());
        let (player, _) = ready_player("media_player.spotify", catalog);
        registry.inner.register(player);
        SearchService::new(Arc::new(ClientCache::new(ClientResolver::new(
            registry,
            "media_player",
            "spotify",
        ))))
    }

    fn request(query: Option<&str>, content_type: Option<&str>) -> SearchRequest {
        SearchRequest {
            query: query.map(str::to_string),
            content_type: content_type.map(str::to_string),
        }
    }

    fn error_of(response: SearchResponse) -> String {
        match response {
            SearchResponse::Failed { error } => error,
            other => panic!("expected an error, got {:?}", other),
        }
    }

    #[test]
    fn test_found_payload() {
        let catalog = Arc::new(
            FakeCatalog::new().with_results("artist", named("spotify:artist", &["Taylor Swift", "Coldplay"])),
        );
        let service = service_over(&catalog);

        let response = service.handle_search(&request(Some("coldplay"), None));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({"uri": "spotify:artist:1", "name": "Coldplay", "type": "artist"})
        );
    }

    #[test]
    fn test_user_playlist_payload_type() {
        let catalog = Arc::new(
            FakeCatalog::new().with_playlists(named("spotify:playlist:mine", &["Road Trip"])),
        );
        let service = service_over(&catalog);

        let response = service.handle_search(&request(Some("road trip"), Some("user_playlist")));
        assert_eq!(
            response,
            SearchResponse::Found {
                uri: "spotify:playlist:mine:0".to_string(),
                name: "Road Trip".to_string(),
                content_type: "playlist".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_requests() {
        let service = service_over(&Arc::new(FakeCatalog::new()));

        assert_eq!(error_of(service.handle_search(&request(None, None))), "No query provided");
        assert_eq!(
            error_of(service.handle_search(&request(Some("  "), Some("track")))),
            "No query provided"
        );
        let error = error_of(service.handle_search(&request(Some("x"), Some("podcast"))));
        assert!(error.starts_with("Invalid type. Must be one of:"));
    }

    #[test]
    fn test_errors_are_payloads() {
        let service = service_over(&Arc::new(FakeCatalog::new().failing_search("HTTP status 500")));
        let error = error_of(service.handle_search(&request(Some("Coldplay"), Some("artist"))));
        assert!(error.contains("HTTP status 500"));

        let service = service_over(&Arc::new(FakeCatalog::new()));
        let error = error_of(service.handle_search(&request(Some("Coldplay"), Some("album"))));
        assert_eq!(error, "No album found for: Coldplay");
    }

    #[test]
    fn test_not_ready_integration() {
        let registry = Arc::new(CountingRegistry::new());
        registry.inner.register(loading_player("media_player.spotify"));
        let service = SearchService::new(Arc::new(ClientCache::new(ClientResolver::new(
            registry,
            "media_player",
            "spotify",
        ))));

        let error = error_of(service.handle_search(&request(Some("Coldplay"), None)));
        assert!(error.contains("Spotify client not available"));
        assert!(error.contains("Try again"));
    }

    #[test]
    fn test_panic_reported_as_generic_failure() {
        let service = service_over(&Arc::new(FakeCatalog::new().panicking()));
        let error = error_of(service.handle_search(&request(Some("Coldplay"), None)));
        assert_eq!(error, "Search failed");
    }

    #[test]
    fn test_query_cleaning() {
        let catalog = Arc::new(
            FakeCatalog::new().with_results("track", named("spotify:track", &["Clocks", "Yellow"])),
        );
        let service = service_over(&catalog).with_query_cleaning(true);

        let response = service.handle_search(&request(Some("Play song Yellow"), Some("track")));
        assert_eq!(
            response,
            SearchResponse::Found {
                uri: "spotify:track:1".to_string(),
                name: "Yellow".to_string(),
                content_type: "track".to_string(),
            }
        );
        assert_eq!(catalog.searches.lock().unwrap()[0].0, "yellow");

        let error = error_of(service.handle_search(&request(Some("play playlist"), Some("playlist"))));
        assert_eq!(error, "No query provided");
    }

    #[test]
    fn test_clear_cache() {
        let catalog = Arc::new(
            FakeCatalog::new().with_results("artist", named("spotify:artist", &["Coldplay"])),
        );
        let service = service_over(&catalog);

        assert_eq!(
            service.handle_clear(),
            ClearResponse {
                success: false,
                message: "Cache was already empty".to_string()
            }
        );
        service.handle_search(&request(Some("Coldplay"), None));
        assert_eq!(service.cache().cached_entity_id().as_deref(), Some("media_player.spotify"));
        assert_eq!(
            service.handle_clear(),
            ClearResponse {
                success: true,
                message: "Cache cleared".to_string()
            }
        );
        assert!(service.cache().cached_entity_id().is_none());
    }
}

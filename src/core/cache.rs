use std::sync::Arc;

use arc_swap::ArcSwapOption;
use log::{debug, info};

use crate::core::resolver::ClientResolver;
use crate::error::SearchError;
use crate::models::Candidate;
use crate::sources::ClientHandle;

/// 캐시된 핸들, 그 핸들을 찾은 엔티티 id, 그 핸들로 가져온 저장 플레이리스트.
/// 항상 한 덩어리로 교체된다.
struct CacheEntry {
    handle: ClientHandle,
    lookup_key: String,
    user_playlists: ArcSwapOption<Vec<Candidate>>,
}

/// 프로세스 전체에서 공유하는 인증 클라이언트 캐시.
///
/// `get`마다 레지스트리의 존재 확인으로 캐시된 엔티티를 재검증하고, 사라졌으면
/// 전체 조회로 돌아간다. 동시에 캐시 미스가 나면 각자 조회하고 마지막 저장이 남는다.
pub struct ClientCache {
    resolver: ClientResolver,
    entry: ArcSwapOption<CacheEntry>,
    cache_user_playlists: bool,
}

impl ClientCache {
    pub fn new(resolver: ClientResolver) -> Self {
        Self {
            resolver,
            entry: ArcSwapOption::empty(),
            cache_user_playlists: true,
        }
    }

    /// 사용자 저장 플레이리스트를 클라이언트와 함께 보관할지 여부.
    pub fn with_playlist_cache(mut self, enabled: bool) -> Self {
        self.cache_user_playlists = enabled;
        self
    }

    pub fn get(&self) -> Result<ClientHandle, SearchError> {
        if let Some(entry) = self.entry.load_full() {
            if self.resolver.registry().contains(&entry.lookup_key) {
                debug!("Using cached Spotify client ({})", entry.lookup_key);
                return Ok(entry.handle.clone());
            }
            info!(
                "Cached Spotify entity {} no longer exists, invalidating cache",
                entry.lookup_key
            );
            self.invalidate();
        } else {
            debug!("Cache miss, performing Spotify entity lookup");
        }

        let resolved = self.resolver.resolve()?;
        let handle = resolved.handle.clone();
        info!("Cached Spotify client for entity: {}", resolved.entity_id);
        self.entry.store(Some(Arc::new(CacheEntry {
            handle: resolved.handle,
            lookup_key: resolved.entity_id,
            user_playlists: ArcSwapOption::empty(),
        })));
        Ok(handle)
    }

    /// `client` 계정의 저장 플레이리스트.
    ///
    /// `client`가 현재 캐시된 핸들일 때만 그 항목에 메모해 둔다. 교체된 옛 핸들로
    /// 가져온 목록은 호출자에게만 돌려주고 캐시에는 남기지 않는다.
    pub fn owner_playlists(
        &self,
        client: &ClientHandle,
    ) -> Result<Arc<Vec<Candidate>>, SearchError> {
        let entry = if self.cache_user_playlists {
            self.entry
                .load_full()
                .filter(|entry| Arc::ptr_eq(&entry.handle, client))
        } else {
            None
        };

        if let Some(entry) = &entry {
            if let Some(playlists) = entry.user_playlists.load_full() {
                debug!("Using cached user playlists");
                return Ok(playlists);
            }
            debug!("Cache miss, fetching user playlists");
        }

        let playlists = Arc::new(
            client
                .current_user_playlists()
                .map_err(SearchError::remote)?,
        );
        if let Some(entry) = entry {
            entry.user_playlists.store(Some(playlists.clone()));
        }
        Ok(playlists)
    }

    /// 캐시를 비운다. 비울 것이 없었으면 `false`.
    pub fn clear(&self) -> bool {
        if self.entry.swap(None).is_some() {
            info!("Manually clearing Spotify cache");
            true
        } else {
            false
        }
    }

    pub fn cached_entity_id(&self) -> Option<String> {
        self.entry
            .load_full()
            .map(|entry| entry.lookup_key.clone())
    }

    fn invalidate(&self) {
        self.entry.store(None);
    }
}

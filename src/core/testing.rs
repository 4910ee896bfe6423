//! 코어 단위 테스트가 함께 쓰는 가짜 구현.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};

use crate::host::{EntityRegistry, HostRegistry, MediaEntity};
use crate::models::Candidate;
use crate::sources::spotify::{SpotifyPlayer, SpotifySession};
use crate::sources::{CatalogClient, ClientHandle};

/// 순위 순서로 이름을 붙인 후보. uri는 `{prefix}:{rank}`.
pub fn named(prefix: &str, names: &[&str]) -> Vec<Candidate> {
    names
        .iter()
        .enumerate()
        .map(|(rank, name)| Candidate::new(*name, format!("{}:{}", prefix, rank), rank))
        .collect()
}

#[derive(Default)]
pub struct FakeCatalog {
    results: HashMap<String, Vec<Candidate>>,
    playlists: Vec<Candidate>,
    search_error: Option<String>,
    playlists_error: Option<String>,
    panic_on_search: bool,
    pub searches: Mutex<Vec<(String, String, usize)>>,
    pub playlist_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(mut self, kind: &str, results: Vec<Candidate>) -> Self {
        self.results.insert(kind.to_string(), results);
        self
    }

    pub fn with_playlists(mut self, playlists: Vec<Candidate>) -> Self {
        self.playlists = playlists;
        self
    }

    pub fn failing_search(mut self, message: &str) -> Self {
        self.search_error = Some(message.to_string());
        self
    }

    pub fn failing_playlists(mut self, message: &str) -> Self {
        self.playlists_error = Some(message.to_string());
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panic_on_search = true;
        self
    }

    pub fn search_count(&self) -> usize {
        self.searches.lock().unwrap().len()
    }
}

impl CatalogClient for FakeCatalog {
    fn search(&self, query: &str, kind: &str, limit: usize) -> Result<Vec<Candidate>> {
        if self.panic_on_search {
            panic!("catalog exploded");
        }
        self.searches
            .lock()
            .unwrap()
            .push((query.to_string(), kind.to_string(), limit));
        if let Some(message) = &self.search_error {
            bail!("{}", message);
        }
        let mut results = self.results.get(kind).cloned().unwrap_or_default();
        results.truncate(limit);
        Ok(results)
    }

    fn current_user_playlists(&self) -> Result<Vec<Candidate>> {
        self.playlist_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.playlists_error {
            bail!("{}", message);
        }
        Ok(self.playlists.clone())
    }
}

/// 세션이 준비된 플레이어와 그 플레이어가 내주는 핸들.
pub fn ready_player(
    entity_id: &str,
    catalog: &Arc<FakeCatalog>,
) -> (Arc<dyn MediaEntity>, ClientHandle) {
    let client: ClientHandle = catalog.clone();
    let session = SpotifySession::with_client(client.clone());
    (
        Arc::new(SpotifyPlayer::new(entity_id, Some(Arc::new(session)))),
        client,
    )
}

pub fn bare_player(entity_id: &str) -> Arc<dyn MediaEntity> {
    Arc::new(SpotifyPlayer::new(entity_id, None))
}

pub fn loading_player(entity_id: &str) -> Arc<dyn MediaEntity> {
    Arc::new(SpotifyPlayer::new(
        entity_id,
        Some(Arc::new(SpotifySession::pending())),
    ))
}

/// 전체 나열 횟수와 존재 확인 횟수를 세는 레지스트리.
#[derive(Default)]
pub struct CountingRegistry {
    pub inner: EntityRegistry,
    pub enumerations: AtomicUsize,
    pub existence_checks: AtomicUsize,
}

impl CountingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enumerations(&self) -> usize {
        self.enumerations.load(Ordering::SeqCst)
    }
}

impl HostRegistry for CountingRegistry {
    fn entity_ids(&self, domain: &str) -> Vec<String> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        self.inner.entity_ids(domain)
    }

    fn contains(&self, entity_id: &str) -> bool {
        self.existence_checks.fetch_add(1, Ordering::SeqCst);
        self.inner.contains(entity_id)
    }

    fn entity(&self, entity_id: &str) -> Option<Arc<dyn MediaEntity>> {
        self.inner.entity(entity_id)
    }
}

//! 호스트 환경의 엔티티 조회 인터페이스.
//!
//! 미디어 플레이어 엔티티는 호스트가 소유한다. 코어는 이 트레이트들로 엔티티를
//! 나열하고 존재 여부를 확인하며 엔티티 -> 코디네이터 -> 클라이언트 순으로 따라간다.

pub mod registry;

use std::sync::Arc;

use crate::sources::ClientHandle;

pub use registry::EntityRegistry;

pub trait HostRegistry: Send + Sync {
    /// `domain`에 있는 엔티티 id 목록 (등록 순서).
    fn entity_ids(&self, domain: &str) -> Vec<String>;
    /// 캐시 적중 때마다 쓰는 빠른 존재 확인.
    fn contains(&self, entity_id: &str) -> bool;
    fn entity(&self, entity_id: &str) -> Option<Arc<dyn MediaEntity>>;
}

pub trait MediaEntity: Send + Sync {
    fn entity_id(&self) -> &str;
    /// 엔티티 뒤의 통합이 아직 로딩 중이면 `None`.
    fn coordinator(&self) -> Option<Arc<dyn Coordinator>>;
}

pub trait Coordinator: Send + Sync {
    fn client(&self) -> Option<ClientHandle>;
}

/// 엔티티 id의 도메인 부분 (`media_player.spotify` -> `media_player`).
pub fn entity_domain(entity_id: &str) -> &str {
    entity_id
        .split_once('.')
        .map(|(domain, _)| domain)
        .unwrap_or(entity_id)
}

use std::fmt;
use std::sync::Arc;

use log::{debug, error};

use crate::error::SearchError;
use crate::host::HostRegistry;
use crate::sources::ClientHandle;

/// 클라이언트 핸들과 그 핸들을 찾은 엔티티 id.
#[derive(Clone)]
pub struct ResolvedClient {
    pub handle: ClientHandle,
    pub entity_id: String,
}

impl fmt::Debug for ResolvedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedClient")
            .field("entity_id", &self.entity_id)
            .finish_non_exhaustive()
    }
}

/// 호스트 레지스트리에서 인증된 Spotify 클라이언트를 찾는다.
///
/// 캐시 미스 때만 타는 경로다. 도메인의 모든 엔티티를 훑은 뒤
/// 엔티티 -> 코디네이터 -> 클라이언트 순으로 따라간다.
pub struct ClientResolver {
    registry: Arc<dyn HostRegistry>,
    domain: String,
    pattern: String,
}

impl ClientResolver {
    pub fn new(registry: Arc<dyn HostRegistry>, domain: &str, pattern: &str) -> Self {
        Self {
            registry,
            domain: domain.to_string(),
            pattern: pattern.to_lowercase(),
        }
    }

    pub fn registry(&self) -> &Arc<dyn HostRegistry> {
        &self.registry
    }

    /// 패턴을 포함하는 (대소문자 무시) 도메인의 첫 엔티티 id.
    pub fn find_entity_id(&self) -> Option<String> {
        self.registry
            .entity_ids(&self.domain)
            .into_iter()
            .find(|id| id.to_lowercase().contains(&self.pattern))
    }

    pub fn resolve(&self) -> Result<ResolvedClient, SearchError> {
        let Some(entity_id) = self.find_entity_id() else {
            error!("No Spotify {} entity found", self.domain);
            return Err(SearchError::NotFound("Spotify not configured".to_string()));
        };
        debug!("Found Spotify entity: {}", entity_id);

        // 나열과 조회 사이에 엔티티가 사라질 수 있다.
        let Some(entity) = self.registry.entity(&entity_id) else {
            error!("Spotify entity {} not found in entities", entity_id);
            return Err(SearchError::NotFound(
                "Spotify entity not available".to_string(),
            ));
        };

        let Some(coordinator) = entity.coordinator() else {
            error!("Spotify entity {} does not have a coordinator", entity_id);
            return Err(SearchError::IntegrationState(
                "Spotify coordinator not available".to_string(),
            ));
        };

        let Some(handle) = coordinator.client() else {
            error!("Spotify coordinator for {} does not have a client", entity_id);
            return Err(SearchError::IntegrationState(
                "Spotify client not available".to_string(),
            ));
        };

        Ok(ResolvedClient { handle, entity_id })
    }
}

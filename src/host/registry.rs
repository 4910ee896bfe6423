use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use log::debug;

use super::{entity_domain, HostRegistry, MediaEntity};

#[derive(Default)]
struct Inner {
    order: Vec<String>,
    entities: HashMap<String, Arc<dyn MediaEntity>>,
}

/// 바이너리와 리졸버가 함께 쓰는 메모리 내 엔티티 목록.
#[derive(Default)]
pub struct EntityRegistry {
    inner: RwLock<Inner>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 엔티티를 등록한다. 같은 id가 있으면 그 자리에서 교체한다.
    pub fn register(&self, entity: Arc<dyn MediaEntity>) {
        let id = entity.entity_id().to_string();
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.entities.insert(id.clone(), entity).is_none() {
            inner.order.push(id.clone());
        }
        debug!("Registered entity {}", id);
    }

    pub fn remove(&self, entity_id: &str) -> Option<Arc<dyn MediaEntity>> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let removed = inner.entities.remove(entity_id)?;
        inner.order.retain(|id| id != entity_id);
        debug!("Removed entity {}", entity_id);
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HostRegistry for EntityRegistry {
    fn entity_ids(&self, domain: &str) -> Vec<String> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .order
            .iter()
            .filter(|id| entity_domain(id) == domain)
            .cloned()
            .collect()
    }

    fn contains(&self, entity_id: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entities
            .contains_key(entity_id)
    }

    fn entity(&self, entity_id: &str) -> Option<Arc<dyn MediaEntity>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entities
            .get(entity_id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Coordinator;

    struct Bare(&'static str);

    impl MediaEntity for Bare {
        fn entity_id(&self) -> &str {
            self.0
        }

        fn coordinator(&self) -> Option<Arc<dyn Coordinator>> {
            None
        }
    }

    #[test]
    fn test_enumerates_by_domain_in_order() {
        let registry = EntityRegistry::new();
        registry.register(Arc::new(Bare("media_player.kitchen")));
        registry.register(Arc::new(Bare("light.porch")));
        registry.register(Arc::new(Bare("media_player.spotify_den")));

        assert_eq!(
            registry.entity_ids("media_player"),
            vec!["media_player.kitchen", "media_player.spotify_den"]
        );
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_remove() {
        let registry = EntityRegistry::new();
        registry.register(Arc::new(Bare("media_player.spotify")));
        assert!(registry.contains("media_player.spotify"));

        assert!(registry.remove("media_player.spotify").is_some());
        assert!(!registry.contains("media_player.spotify"));
        assert!(registry.entity_ids("media_player").is_empty());
        assert!(registry.remove("media_player.spotify").is_none());
    }

    #[test]
    fn test_reregister_keeps_position() {
        let registry = EntityRegistry::new();
        registry.register(Arc::new(Bare("media_player.a")));
        registry.register(Arc::new(Bare("media_player.b")));
        registry.register(Arc::new(Bare("media_player.a")));
        assert_eq!(
            registry.entity_ids("media_player"),
            vec!["media_player.a", "media_player.b"]
        );
    }
}

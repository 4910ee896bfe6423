pub mod spotify;

use std::sync::Arc;

use anyhow::Result;

use crate::models::Candidate;

/// 인증된 세션을 통해 카탈로그를 조회하는 클라이언트 트레이트.
/// 토큰 발급과 갱신은 세션 쪽 책임이며 이 트레이트는 조회만 한다.
pub trait CatalogClient: Send + Sync {
    /// 공개 카탈로그에서 `kind` 타입으로 검색한다. 결과는 API가 준 순서 그대로다.
    fn search(&self, query: &str, kind: &str, limit: usize) -> Result<Vec<Candidate>>;
    /// 현재 사용자가 저장한 플레이리스트 목록을 가져온다.
    fn current_user_playlists(&self) -> Result<Vec<Candidate>>;
}

/// 캐시가 보관하고 호출자에게 나눠주는 클라이언트 핸들.
pub type ClientHandle = Arc<dyn CatalogClient>;

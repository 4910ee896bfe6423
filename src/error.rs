use thiserror::Error;

use crate::models::ContentType;

/// 검색 코어가 돌려주는 실패 종류.
#[derive(Debug, Error)]
pub enum SearchError {
    /// 호스트에 인증된 Spotify 리소스가 없다.
    #[error("{0}")]
    NotFound(String),

    /// 리소스는 있지만 세션이 아직 준비되지 않았다.
    #[error("{0}. Try again once the Spotify integration has finished loading")]
    IntegrationState(String),

    #[error("{}", no_results_message(.content_type, .query))]
    NoResults {
        content_type: ContentType,
        query: String,
    },

    #[error("Spotify request failed: {0}")]
    RemoteApi(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Unexpected(String),
}

impl SearchError {
    pub fn remote(err: anyhow::Error) -> Self {
        SearchError::RemoteApi(format!("{:#}", err))
    }

    pub fn no_results(content_type: ContentType, query: &str) -> Self {
        SearchError::NoResults {
            content_type,
            query: query.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::NotFound(_) => "not_found",
            SearchError::IntegrationState(_) => "integration_state",
            SearchError::NoResults { .. } => "no_results",
            SearchError::RemoteApi(_) => "remote_api",
            SearchError::InvalidRequest(_) => "invalid_request",
            SearchError::Unexpected(_) => "unexpected",
        }
    }
}

fn no_results_message(content_type: &ContentType, query: &str) -> String {
    match content_type {
        ContentType::UserPlaylist => {
            format!("No playlist matching '{}' found in your library", query)
        }
        other => format!("No {} found for: {}", other, query),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_results_names_query() {
        let err = SearchError::no_results(ContentType::UserPlaylist, "Chill Vibes");
        assert_eq!(
            err.to_string(),
            "No playlist matching 'Chill Vibes' found in your library"
        );
        let err = SearchError::no_results(ContentType::Album, "Parachutes");
        assert_eq!(err.to_string(), "No album found for: Parachutes");
    }

    #[test]
    fn test_remote_keeps_cause_chain() {
        let err = anyhow::anyhow!("HTTP status 502").context("Spotify 검색에 실패했습니다");
        let err = SearchError::remote(err);
        assert_eq!(err.kind(), "remote_api");
        assert!(err.to_string().contains("HTTP status 502"));
    }
}

use crate::error::SearchError;
use crate::models::{Candidate, MatchKind, MatchResult, SearchQuery};

/// 순위 목록에서 후보 하나를 고를 때 차례로 시도하는 단계.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    /// 정확히 같은 이름, 없으면 1위 결과.
    ExactOrFirst,
    /// 정확히 같은 이름, 없으면 질의를 포함하는 이름, 그것도 없으면 1위 결과.
    ExactPartialOrFirst,
    /// 정확히 같은 이름, 없으면 질의를 포함하는 이름. 순위로는 고르지 않는다.
    ExactOrPartial,
}

/// 대소문자만 무시한다.
fn normalize(text: &str) -> String {
    text.to_lowercase()
}

/// `ExactOrFirst` 정책으로 후보를 고른다.
pub fn select(candidates: &[Candidate], query: &SearchQuery) -> Result<MatchResult, SearchError> {
    select_with(candidates, query, MatchPolicy::ExactOrFirst)
}

/// `query`에 맞는 후보 하나를 고른다.
///
/// 원격 순위는 사용자의 청취 기록에 치우쳐 있으므로 목록 어디에 있든 정확히 같은
/// 이름이 1위 결과보다 우선한다. 같은 단계 안에서는 순위가 높은 후보가 이긴다.
pub fn select_with(
    candidates: &[Candidate],
    query: &SearchQuery,
    policy: MatchPolicy,
) -> Result<MatchResult, SearchError> {
    let no_results = || SearchError::no_results(query.content_type, &query.text);
    if candidates.is_empty() {
        return Err(no_results());
    }

    let wanted = normalize(&query.text);
    let exact = candidates
        .iter()
        .find(|c| normalize(&c.name) == wanted)
        .map(|c| (c, MatchKind::Exact));

    let partial = || {
        candidates
            .iter()
            .find(|c| normalize(&c.name).contains(&wanted))
            .map(|c| (c, MatchKind::Partial))
    };
    let first = || candidates.first().map(|c| (c, MatchKind::First));

    let picked = match policy {
        MatchPolicy::ExactOrFirst => exact.or_else(first),
        MatchPolicy::ExactPartialOrFirst => exact.or_else(partial).or_else(first),
        MatchPolicy::ExactOrPartial => exact.or_else(partial),
    };

    let (candidate, match_kind) = picked.ok_or_else(no_results)?;
    Ok(MatchResult {
        uri: candidate.uri.clone(),
        name: candidate.name.clone(),
        content_type: query.content_type,
        match_kind,
    })
}

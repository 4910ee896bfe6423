use crate::models::ContentType;

/// 음성 비서가 질의에 남기는 명령어 단어를 제거한다.
///
/// - "play coldplay" -> "coldplay"
/// - "song yellow" (track) -> "yellow"
/// - "my road trip playlist" (playlist) -> "my road trip"
///
/// 결과는 소문자이며 연속 공백은 하나로 합친다.
pub fn clean_query(query: &str, content_type: ContentType) -> String {
    let mut query = query.trim().to_lowercase();

    if let Some(rest) = query.strip_prefix("play ") {
        query = rest.to_string();
    }

    let filler: &[&str] = match content_type {
        ContentType::Artist => &["artist ", "group ", "band "],
        ContentType::Album => &["album "],
        ContentType::Track => &["song ", "track "],
        ContentType::Playlist | ContentType::UserPlaylist => &["playlists", "playlist"],
    };
    for word in filler {
        query = query.replace(word, "");
    }

    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

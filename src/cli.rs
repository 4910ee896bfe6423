use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};
use dialoguer::{Input, Password};
use log::{debug, warn};
use serde::Deserialize;

use crate::config::{self, Config};
use crate::core::{ClientCache, ClientResolver, SearchService};
use crate::host::{EntityRegistry, HostRegistry};
use crate::models::{SearchRequest, SearchResponse};
use crate::sources::spotify::{SpotifyPlayer, SpotifySession};

#[derive(Parser)]
#[command(name = "spotify-search", about = "음성 명령 검색어를 Spotify URI로 변환")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// 디버그 로그 출력
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 검색어 하나를 URI로 변환
    Search {
        /// 검색어
        query: String,
        /// artist, album, track, playlist, user_playlist
        #[arg(long = "type", short = 't', default_value = "artist")]
        content_type: String,
    },
    /// 표준 입력의 JSON 요청을 한 줄씩 처리
    Serve,
    /// 등록된 플레이어 목록 표시
    Players,
    /// Spotify 자격증명 설정
    Config,
}

/// `serve` 모드에서 한 줄로 들어오는 서비스 호출.
#[derive(Debug, Deserialize)]
#[serde(tag = "service", rename_all = "snake_case")]
enum ServiceCall {
    Search(SearchRequest),
    ClearCache,
}

/// 검색이 실패 응답으로 끝났을 때의 종료 코드.
const SEARCH_FAILED: u8 = 2;

pub fn run(cli: Cli, cfg: Config) -> Result<ExitCode> {
    match cli.command {
        Some(Commands::Search {
            query,
            content_type,
        }) => cmd_search(&cfg, query, content_type),
        Some(Commands::Serve) => cmd_serve(&cfg).map(|_| ExitCode::SUCCESS),
        Some(Commands::Players) => cmd_players(&cfg).map(|_| ExitCode::SUCCESS),
        Some(Commands::Config) => cmd_config(cfg).map(|_| ExitCode::SUCCESS),
        None => {
            println!("사용법: spotify-search <명령어>");
            println!("자세한 정보는 spotify-search --help를 실행하세요.");
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// 설정에 적힌 플레이어를 등록한다. 세션은 모든 플레이어가 공유한다.
fn build_registry(cfg: &Config) -> Arc<EntityRegistry> {
    let registry = Arc::new(EntityRegistry::new());
    let player_ids = cfg.player_ids();
    if player_ids.is_empty() {
        return registry;
    }

    let session = Arc::new(SpotifySession::connect(&cfg.spotify));
    for entity_id in player_ids {
        registry.register(Arc::new(SpotifyPlayer::new(entity_id, Some(session.clone()))));
    }
    debug!("Registered {} players", registry.len());
    registry
}

fn build_resolver(cfg: &Config, registry: Arc<EntityRegistry>) -> ClientResolver {
    ClientResolver::new(
        registry,
        &cfg.search.entity_domain,
        &cfg.search.entity_pattern,
    )
}

fn build_service(cfg: &Config) -> SearchService {
    let registry = build_registry(cfg);
    let cache = ClientCache::new(build_resolver(cfg, registry))
        .with_playlist_cache(cfg.search.cache_user_playlists);
    SearchService::new(Arc::new(cache)).with_query_cleaning(cfg.search.clean_queries)
}

fn print_json<T: serde::Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *out, value).context("응답 직렬화에 실패했습니다")?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn exit_status(response: &SearchResponse) -> u8 {
    match response {
        SearchResponse::Found { .. } => 0,
        SearchResponse::Failed { .. } => SEARCH_FAILED,
    }
}

fn cmd_search(cfg: &Config, query: String, content_type: String) -> Result<ExitCode> {
    let service = build_service(cfg);
    let response = service.handle_search(&SearchRequest {
        query: Some(query),
        content_type: Some(content_type),
    });

    print_json(&mut io::stdout().lock(), &response)?;
    Ok(ExitCode::from(exit_status(&response)))
}

fn cmd_serve(cfg: &Config) -> Result<()> {
    let service = build_service(cfg);
    let stdin = io::stdin();
    let mut out = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line.context("표준 입력을 읽을 수 없습니다")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<ServiceCall>(line) {
            Ok(ServiceCall::Search(request)) => {
                debug!("search request: {:?}", request);
                print_json(&mut out, &service.handle_search(&request))?;
            }
            Ok(ServiceCall::ClearCache) => print_json(&mut out, &service.handle_clear())?,
            Err(e) => {
                warn!("Ignoring malformed request {:?}: {}", line, e);
                print_json(
                    &mut out,
                    &SearchResponse::Failed {
                        error: format!("Invalid request: {}", e),
                    },
                )?;
            }
        }
    }
    Ok(())
}

fn cmd_players(cfg: &Config) -> Result<()> {
    let registry = build_registry(cfg);
    if registry.is_empty() {
        println!("등록된 플레이어가 없습니다. 먼저 'spotify-search config'를 실행하세요.");
        return Ok(());
    }
    let entity_ids = registry.entity_ids(&cfg.search.entity_domain);

    let selected = build_resolver(cfg, registry.clone()).find_entity_id();

    let mut table = Table::new();
    table.set_header(vec!["엔티티", "세션", "선택"]);
    for entity_id in &entity_ids {
        let session = match registry.entity(entity_id).and_then(|e| e.coordinator()) {
            Some(coordinator) if coordinator.client().is_some() => "준비됨",
            Some(_) => "클라이언트 없음",
            None => "연결 안 됨",
        };
        let mark = if selected.as_deref() == Some(entity_id.as_str()) {
            "*"
        } else {
            ""
        };
        table.add_row(vec![Cell::new(entity_id), Cell::new(session), Cell::new(mark)]);
    }

    println!("{table}");
    println!("\n총 {} 플레이어", entity_ids.len());
    Ok(())
}

fn cmd_config(mut cfg: Config) -> Result<()> {
    println!("Spotify API 설정");
    println!("(사용자 플레이리스트 검색에는 사용자 access token이 필요합니다)\n");

    let client_id: String = Input::new()
        .with_prompt("Client ID")
        .with_initial_text(cfg.spotify.client_id.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    let client_secret: String = Input::new()
        .with_prompt("Client Secret")
        .with_initial_text(cfg.spotify.client_secret.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    let access_token: String = Password::new()
        .with_prompt("Access Token (비워두면 client credentials 사용)")
        .allow_empty_password(true)
        .interact()?;

    let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };
    cfg.spotify.client_id = non_empty(client_id);
    cfg.spotify.client_secret = non_empty(client_secret);
    // 빈 입력이면 기존 토큰을 유지한다.
    if let Some(token) = non_empty(access_token) {
        cfg.spotify.access_token = Some(token);
    }

    config::save_config(&cfg)?;
    println!("\n설정이 저장되었습니다!");
    Ok(())
}

mod cli;
mod config;
mod core;
mod error;
mod host;
mod models;
mod sources;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    let loaded = config::load_config();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        loaded
            .as_ref()
            .map(config::Config::log_level)
            .unwrap_or(log::LevelFilter::Info)
    };
    let mut clog = colog::default_builder();
    clog.filter(None, level);
    clog.init();

    // 설정 오류는 로거가 준비된 뒤에 알린다.
    let cfg = loaded.unwrap_or_else(|e| {
        log::warn!("기본 설정으로 계속합니다: {:#}", e);
        config::Config::default()
    });

    match cli::run(cli, cfg) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("오류: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

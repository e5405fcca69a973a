mod bootstrap;

use clap::Parser;
use custos_application::decision::DecisionEngine;
use custos_application::ports::StorePort;
use custos_application::services::SnowflakeIdGenerator;
use custos_domain::config::CliOverrides;
use custos_domain::parse_bool_setting;
use custos_infrastructure::{
    AdblockMatcher, BlocklistSet, FilterRefresher, MemoryStore, PlatformProcessAttributor,
    Socks5Server, SqliteStore,
};
use custos_jobs::{JobRunner, RefreshJob};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "custos")]
#[command(version)]
#[command(about = "A SOCKS5 proxy with ad-blocking and traffic filtering")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// SOCKS5 listener port.
    #[arg(short = 'p', long)]
    proxy_port: Option<u16>,

    /// Control API port (bound to loopback only).
    #[arg(short = 'a', long)]
    api_port: Option<u16>,

    /// Bind address for the control API.
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Override the configured log level (e.g. "debug", "info").
    #[arg(long)]
    log_level: Option<String>,

    /// Override the SQLite database path.
    #[arg(long)]
    database_path: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        proxy_port: cli.proxy_port,
        api_port: cli.api_port,
        bind_address: cli.bind,
        log_level: cli.log_level,
        database_path: cli.database_path,
    };

    let config = bootstrap::load_config(cli.config.as_deref(), overrides)?;
    bootstrap::init_logging(&config);

    info!("custos starting");

    let store: Arc<dyn StorePort> =
        match bootstrap::init_database(&format!("sqlite://{}", config.database.path), &config.database).await {
            Ok((write_pool, read_pool)) => {
                let store = SqliteStore::new(write_pool, read_pool);
                store.seed().await;
                Arc::new(store)
            }
            Err(e) => {
                error!(error = %e, "failed to open database, falling back to in-memory store");
                Arc::new(MemoryStore::default())
            }
        };

    let settings = store.get_all_settings().await.unwrap_or_default();
    let setting = |key: &str, default: &str| -> String {
        settings
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.value.clone())
            .unwrap_or_else(|| default.to_string())
    };
    let adblock_enabled = parse_bool_setting(&setting("adblock_enabled", "true"), true);
    let protection_enabled = parse_bool_setting(&setting("protection_enabled", "false"), false);

    let blocklist = Arc::new(BlocklistSet::new());
    let adblock = Arc::new(AdblockMatcher::new());
    let process_attributor = Arc::new(PlatformProcessAttributor::new());
    let id_gen = Arc::new(SnowflakeIdGenerator::new(1));

    let decision = Arc::new(DecisionEngine::new(
        store.clone(),
        blocklist.clone(),
        adblock.clone(),
        process_attributor,
        id_gen,
        adblock_enabled,
        protection_enabled,
    ));

    let socks5 = Arc::new(Socks5Server::new(decision.clone(), adblock.clone()));

    let data_dir = PathBuf::from(&config.database.path)
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    let refresher = Arc::new(FilterRefresher::new(
        store.clone(),
        blocklist.clone(),
        adblock.clone(),
        data_dir,
    ));
    refresher.seed_default_filters().await;
    refresher.refresh().await;

    let initial_proxy_port = custos_domain::parse_port_setting(
        &setting("proxy_port", &config.server.proxy_port.to_string()),
        config.server.proxy_port,
    );
    socks5.start(initial_proxy_port).await?;
    info!(port = initial_proxy_port, "socks5 proxy listening");

    let refresh_job = RefreshJob::new(refresher.clone()).with_interval(config.refresher.interval_secs);
    let job_runner = JobRunner::new().with_refresh(refresh_job);
    job_runner.start().await;

    let state = custos_api::AppState {
        get_recent_logs: Arc::new(custos_application::use_cases::GetRecentLogsUseCase::new(store.clone())),
        get_stats: Arc::new(custos_application::use_cases::GetStatsUseCase::new(store.clone())),
        get_traffic_history: Arc::new(custos_application::use_cases::GetTrafficHistoryUseCase::new(store.clone())),
        reset_data: Arc::new(custos_application::use_cases::ResetDataUseCase::new(store.clone())),
        get_rules: Arc::new(custos_application::use_cases::GetRulesUseCase::new(store.clone())),
        create_rule: Arc::new(custos_application::use_cases::CreateRuleUseCase::new(store.clone())),
        update_rule: Arc::new(custos_application::use_cases::UpdateRuleUseCase::new(store.clone())),
        delete_rule: Arc::new(custos_application::use_cases::DeleteRuleUseCase::new(store.clone())),
        get_adblock_filters: Arc::new(custos_application::use_cases::GetAdblockFiltersUseCase::new(store.clone())),
        add_adblock_filter: Arc::new(custos_application::use_cases::AddAdblockFilterUseCase::new(store.clone())),
        delete_adblock_filter: Arc::new(custos_application::use_cases::DeleteAdblockFilterUseCase::new(store.clone())),
        get_settings: Arc::new(custos_application::use_cases::GetSettingsUseCase::new(store.clone())),
        update_setting: Arc::new(custos_application::use_cases::UpdateSettingUseCase::new(store.clone())),
        decision: decision.clone(),
        socks5: socks5.clone(),
        refresher: refresher.clone(),
        system_integration: Arc::new(custos_infrastructure::LinuxSystemIntegration::new()),
    };

    let router = custos_api::create_api_routes(state);
    let api_addr: SocketAddr = format!("{}:{}", config.server.bind_address, config.server.api_port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid control API address: {e}"))?;

    let listener = tokio::net::TcpListener::bind(api_addr).await?;
    info!(addr = %api_addr, "control api listening");

    let shutdown_signal = async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    warn!("control api stopped, draining socks5 proxy");
    socks5.stop().await;

    Ok(())
}

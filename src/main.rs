//! AXIOMA: business valuation engine
//!
//! Entry point. Loads configuration, initialises structured logging,
//! opens the valuation store, wires the pipeline and collaborators, and
//! serves the HTTP API until Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use axioma::api::{self, routes::ApiState};
use axioma::config::AppConfig;
use axioma::extraction::keyword::KeywordExtractor;
use axioma::report::NarrativeReport;
use axioma::storage::ValuationStore;
use axioma::valuation::engine::ValuationEngine;
use axioma::valuation::Valuator;

const BANNER: &str = r#"
    _   __  __ ___ ___  __  __    _
   /_\  \ \/ /|_ _/ _ \|  \/  |  /_\
  / _ \  >  <  | | (_) | |\/| | / _ \
 /_/ \_\/_/\_\|___\___/|_|  |_|/_/ \_\

  Business valuation engine
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = AppConfig::load(&AppConfig::default_path())?;

    init_logging();

    println!("{BANNER}");
    info!(
        app_name = %cfg.app.name,
        currency = %cfg.app.currency,
        store = %cfg.storage.path,
        "AXIOMA starting up"
    );

    // -- Initialise components -------------------------------------------

    let store = ValuationStore::open(&cfg.storage.path)?;
    let engine = ValuationEngine::new(cfg.engine.clone());
    let valuator = Valuator::new(engine.clone());
    info!(
        max_penalty_rate = cfg.engine.max_penalty_rate,
        max_governance_premium = cfg.engine.max_governance_premium,
        benchmark_governance = cfg.engine.benchmark_governance,
        "Valuation engine configured"
    );

    let state = Arc::new(ApiState::new(
        valuator,
        store,
        Box::new(KeywordExtractor::new(cfg.extraction.clone())),
        Box::new(NarrativeReport::new(&cfg.app.currency, engine)),
    ));

    if !cfg.server.enabled {
        info!("API server disabled in config. Nothing to do.");
        return Ok(());
    }

    api::serve(state, cfg.server.port).await?;

    info!("AXIOMA shut down cleanly.");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("axioma=info"));

    let json_logging = std::env::var("AXIOMA_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}

use chrono::Utc;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use oddsmith::cli::{Cli, Commands};
use oddsmith::config::AppConfig;
use oddsmith::domain::{BetKind, GameFinal, Sport};
use oddsmith::error::{EngineError, Result};
use oddsmith::evaluators::EVALUATOR_KEYS;
use oddsmith::models::ModelRegistry;
use oddsmith::store::{Ledger, MemoryRepository, PgRepository, Repository};
use oddsmith::{
    BacktestEngine, DynamicWeighting, GenerationRun, OutcomeVerifier, UserModelExecutor,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = match AppConfig::load_from(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {e}");
            return Err(e.into());
        }
    };
    if let Err(errors) = config.validate() {
        for message in &errors {
            error!("config: {message}");
        }
        return Err(EngineError::InvalidConfig(errors.join("; ")));
    }

    let repo = connect_repository(&config).await;
    let ledger = Ledger::with_page_size(repo, config.engine.page_size);
    let weighting = Arc::new(DynamicWeighting::new(
        ledger.clone(),
        config.weighting.clone(),
    ));

    match &cli.command {
        Commands::Models => {
            println!("Analysis models:");
            for name in ModelRegistry::list_available() {
                println!("  {name}");
            }
            println!("Evaluators:");
            for key in EVALUATOR_KEYS {
                println!("  {key}");
            }
        }

        Commands::Generate { sport, days } => {
            let sport = parse_sport(sport)?;
            let run = GenerationRun::new(ledger, weighting, config.engine.clone());
            let summary = run.generate(sport, *days).await?;
            println!(
                "Processed {} games: {} generated, {} skipped, {} failed{}",
                summary.games_processed,
                summary.generated,
                summary.skipped,
                summary.failed,
                if summary.timed_out { " (timed out)" } else { "" }
            );
        }

        Commands::Verify {
            sport,
            game_id,
            home_team,
            away_team,
            home_score,
            away_score,
        } => {
            let sport = parse_sport(sport)?;
            let outcome = GameFinal {
                game_id: game_id.clone(),
                sport,
                home_team: home_team.clone(),
                away_team: away_team.clone(),
                home_score: *home_score,
                away_score: *away_score,
                completed_at: Utc::now(),
            };
            let verifier = OutcomeVerifier::new(ledger).with_weighting(Arc::clone(&weighting));
            let summary = verifier.verify_game(&outcome).await?;
            println!(
                "Verified {} predictions ({} inverse), {} skipped, {} failed",
                summary.verified, summary.inverse_verified, summary.skipped, summary.failed
            );
        }

        Commands::Weights { sport, bet_type } => {
            let sport = parse_sport(sport)?;
            let bet_type = parse_bet_type(bet_type)?;
            let weights = weighting.compute_weights(sport, bet_type, Utc::now()).await?;
            let mut rows: Vec<_> = weights.values().collect();
            rows.sort_by(|a, b| {
                b.normalized_weight
                    .partial_cmp(&a.normalized_weight)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            println!(
                "{sport} {bet_type} weights over {} days:",
                config.weighting.lookback_days
            );
            for weight in rows {
                println!(
                    "  {:14} weight {:.3}  accuracy {:.3}  brier {:.3}  ({} samples)",
                    weight.model.as_str(),
                    weight.normalized_weight,
                    weight.recent_accuracy,
                    weight.recent_brier_score,
                    weight.sample_count
                );
            }
        }

        Commands::Backtest {
            user,
            model,
            start,
            end,
        } => {
            let user_model = ledger
                .user_model(user, model)
                .await?
                .ok_or_else(|| EngineError::Validation(format!("no model {model} for {user}")))?;
            let engine = BacktestEngine::new(ledger, config.backtest.clone());
            let result = engine
                .run_backtest(user, model, &user_model, *start, *end)
                .await?;
            println!(
                "Backtest {}: {} predictions, accuracy {:.1}%, roi {:.2}%, avg confidence {:.2}{}",
                result.backtest_id,
                result.total_predictions,
                result.metrics.accuracy * 100.0,
                result.metrics.roi * rust_decimal::Decimal::from(100),
                result.metrics.avg_confidence,
                match result.status {
                    oddsmith::domain::user_model::BacktestStatus::TimedOut => " (timed out)",
                    _ => "",
                }
            );
        }

        Commands::Execute { user, model, days } => {
            let user_model = ledger
                .user_model(user, model)
                .await?
                .ok_or_else(|| EngineError::Validation(format!("no model {model} for {user}")))?;
            let executor = UserModelExecutor::new(ledger);
            let (predictions, summary) = executor.run(&user_model, *days).await?;
            println!(
                "{} picks ({} dead zone, {} below threshold)",
                summary.published, summary.dead_zone, summary.below_threshold
            );
            for prediction in predictions {
                println!(
                    "  {} @ {}: {} ({:.0}%)",
                    prediction.away_team,
                    prediction.home_team,
                    prediction.prediction,
                    prediction.confidence * 100.0
                );
            }
        }
    }

    Ok(())
}

/// Connect Postgres, or fall back to the in-memory store so read-only
/// commands still work without a database.
async fn connect_repository(config: &AppConfig) -> Arc<dyn Repository> {
    match PgRepository::new(&config.database.url, config.database.max_connections).await {
        Ok(repo) => {
            if let Err(e) = repo.migrate().await {
                error!("Database migration failed: {e}");
            }
            info!("Database connected");
            Arc::new(repo)
        }
        Err(e) => {
            warn!("Database connection failed: {e} - running with in-memory store");
            Arc::new(MemoryRepository::new())
        }
    }
}

fn parse_sport(s: &str) -> Result<Sport> {
    Sport::parse(s).ok_or_else(|| EngineError::Validation(format!("unknown sport: {s}")))
}

fn parse_bet_type(s: &str) -> Result<BetKind> {
    BetKind::parse(s).ok_or_else(|| EngineError::Validation(format!("unknown bet type: {s}")))
}

fn init_logging() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,oddsmith=debug,sqlx=warn"));

    // Optional daily-rolling file output. `tracing_appender::rolling::daily`
    // panics if it cannot create the initial log file, so preflight
    // writability before wiring the layer.
    let file_layer = std::env::var("ODDSMITH_LOG_DIR").ok().and_then(|log_dir| {
        if std::fs::create_dir_all(&log_dir).is_err() {
            eprintln!("Warning: could not create log directory {log_dir}, file logging disabled");
            return None;
        }
        let test_path = std::path::Path::new(&log_dir).join(".oddsmith_write_test");
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&test_path)
        {
            Ok(_) => {
                let _ = std::fs::remove_file(&test_path);
                let file_appender = tracing_appender::rolling::daily(&log_dir, "oddsmith.log");
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                // Keep the guard alive for the process lifetime
                Box::leak(Box::new(guard));
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true),
                )
            }
            Err(e) => {
                eprintln!(
                    "Warning: could not write to log directory {log_dir} ({e}), file logging disabled"
                );
                None
            }
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(file_layer)
        .init();
}

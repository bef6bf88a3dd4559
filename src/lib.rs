pub mod backtest;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod evaluators;
pub mod executor;
pub mod models;
pub mod pipeline;
pub mod store;
pub mod verify;
pub mod weighting;

pub use backtest::BacktestEngine;
pub use config::AppConfig;
pub use error::{EngineError, Result};
pub use executor::{UserModelExecutor, UserPrediction};
pub use models::{AnalysisModel, ModelRegistry};
pub use pipeline::{GenerationRun, RunSummary};
pub use store::{Ledger, MemoryRepository, PgRepository, Repository};
pub use verify::{OutcomeVerifier, VerificationSummary};
pub use weighting::{DynamicWeighting, ModelWeight};

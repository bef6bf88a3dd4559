use thiserror::Error;

/// Main error type for the prediction engine
#[derive(Error, Debug)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Registry errors
    #[error("Unknown analysis model: {name}")]
    UnknownModel { name: String },

    #[error("Unknown evaluator: {name}")]
    UnknownEvaluator { name: String },

    // Verification errors
    #[error("Unparseable prediction: {text}")]
    UnparseablePrediction { text: String },

    #[error("Already verified: {key}")]
    AlreadyVerified { key: String },

    #[error("Outcome unavailable for game: {game_id}")]
    OutcomeUnavailable { game_id: String },

    // Data errors
    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    // Batch processing errors
    #[error("Run timed out after {elapsed_secs}s")]
    Timeout { elapsed_secs: u64 },

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

/// Specific error types for outcome grading
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradeError {
    #[error("Pick references neither team: {pick_team} not in ({home}, {away})")]
    UnknownTeam {
        pick_team: String,
        home: String,
        away: String,
    },

    #[error("Spread pick has no line")]
    MissingSpreadLine,

    #[error("Total pick has no line")]
    MissingTotalLine,

    #[error("No stat recorded for player {player} in game {game_id}")]
    MissingPlayerStat { player: String, game_id: String },

    #[error("Market key {market_key} maps to no stat field")]
    UnknownStatField { market_key: String },

    #[error("Avoid recommendations are not graded")]
    NotGradeable,
}

impl From<GradeError> for EngineError {
    fn from(err: GradeError) -> Self {
        EngineError::UnparseablePrediction {
            text: err.to_string(),
        }
    }
}

use thiserror::Error;

/// Errors produced by the season engines.
///
/// Every validation failure is detected before the first write of an
/// operation, so an `Err` never leaves partial state behind.
#[derive(Debug, Error)]
pub enum LeagueError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("unknown phase: {0}")]
    InvalidPhase(String),

    #[error("phase {to} does not come after {from}")]
    NotForward { from: String, to: String },

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("wrong turn: {0}")]
    WrongTurn(String),

    #[error("prompt unavailable: {0}")]
    PromptUnavailable(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("artist already on a roster: {0}")]
    DuplicateArtist(String),

    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database lock poisoned")]
    LockPoisoned,
}

pub type LeagueResult<T> = Result<T, LeagueError>;

impl LeagueError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Stable machine-readable kind, used by the HTTP layer.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Unauthorized(_) => "unauthorized",
            Self::InvalidPhase(_) => "invalid_phase",
            Self::NotForward { .. } => "not_forward",
            Self::InvalidTransition(_) => "invalid_transition",
            Self::WrongTurn(_) => "wrong_turn",
            Self::PromptUnavailable(_) => "prompt_unavailable",
            Self::AlreadyExists(_) => "already_exists",
            Self::DuplicateArtist(_) => "duplicate_artist",
            Self::CapacityExceeded(_) => "capacity_exceeded",
            Self::Storage(_) | Self::Serialization(_) | Self::LockPoisoned => "internal",
        }
    }

    /// True for failures caused by infrastructure rather than caller input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Storage(_) | Self::Serialization(_) | Self::LockPoisoned
        )
    }
}

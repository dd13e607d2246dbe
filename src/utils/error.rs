use thiserror::Error;

/// Why a state precondition was lost to another actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    AlreadyOccupied,
    /// Every precondition held on re-read, so the slot changed between the
    /// conditional update and the lookup.
    ConcurrentModification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateViolation {
    NotOccupied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputViolation {
    StopEndNotLater,
    InvalidCenter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    NotOccupier,
}

#[derive(Error, Debug)]
pub enum ParkingError {
    #[error("Parking slot not found: {slot_id}")]
    NotFound { slot_id: String },

    #[error("Conflict: {0:?}")]
    Conflict(ConflictReason),

    #[error("Invalid state: {0:?}")]
    InvalidState(StateViolation),

    #[error("Invalid input: {0:?}")]
    InvalidInput(InputViolation),

    #[error("Forbidden: {0:?}")]
    Forbidden(Denial),

    #[error("User {user_id} occupies {count} parking slots")]
    MultipleOccupations { user_id: String, count: usize },

    #[error("User not found: {email}")]
    UserNotFound { email: String },

    #[error("Token is not valid or has expired")]
    Unauthorized,

    #[error("Storage unavailable: {message}")]
    Unavailable { message: String },

    #[error("Corrupt slot document {slot_id}: {reason}")]
    CorruptDocument { slot_id: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    Conflict,
    InvalidState,
    InvalidInput,
    Forbidden,
    Unavailable,
    Configuration,
    Internal,
}

impl ParkingError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } | Self::UserNotFound { .. } => ErrorCategory::NotFound,
            Self::Conflict(_) | Self::MultipleOccupations { .. } => ErrorCategory::Conflict,
            Self::InvalidState(_) => ErrorCategory::InvalidState,
            Self::InvalidInput(_) => ErrorCategory::InvalidInput,
            Self::Forbidden(_) | Self::Unauthorized => ErrorCategory::Forbidden,
            Self::Unavailable { .. } => ErrorCategory::Unavailable,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::CorruptDocument { .. } | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorCategory::Internal
            }
        }
    }

    /// Only a storage outage is worth retrying, and that is the caller's job.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::NotFound => "Check the identifier and try again",
            ErrorCategory::Conflict => "Re-query the slot state before acting again",
            ErrorCategory::InvalidState => "The slot is free; occupy it instead",
            ErrorCategory::InvalidInput => "Check the supplied values",
            ErrorCategory::Forbidden => "Only the current occupier may change this slot",
            ErrorCategory::Unavailable => "Retry once the storage is reachable",
            ErrorCategory::Configuration => "Fix the configuration file and restart",
            ErrorCategory::Internal => "Inspect the slot data file",
        }
    }
}

pub type Result<T> = std::result::Result<T, ParkingError>;

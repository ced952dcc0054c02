//! Error types for Reel Raffle

use thiserror::Error;

use crate::candidate::CandidateId;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RaffleError {
    #[error("Candidate set is empty")]
    EmptyCandidateSet,

    #[error("Duplicate candidate id: {0}")]
    DuplicateCandidate(CandidateId),

    #[error("Unknown candidate: {0}")]
    UnknownCandidate(CandidateId),

    #[error("Invalid place: {0}")]
    InvalidPlace(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias
pub type RaffleResult<T> = Result<T, RaffleError>;

//! Error taxonomy.
//!
//! Two very different failure classes exist:
//!
//! - [`GameError`]: fatal configuration problems. Returned from `start`,
//!   `change_difficulty` and deck building. Session state is untouched when
//!   one of these is returned.
//! - [`RejectReason`]: input that arrived in a state that cannot accept it.
//!   Never an `Err` at the command boundary; reported through
//!   `RevealOutcome::Rejected` and a diagnostic event. The caller may simply
//!   retry later.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::config::Difficulty;

/// Fatal configuration error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Empty or malformed symbol catalog or difficulty profile.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// No profile is configured for the requested difficulty.
    #[error("invalid configuration: no profile for difficulty {0}")]
    UnknownDifficulty(Difficulty),

    /// Configuration text could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),
}

impl GameError {
    /// Shorthand for [`GameError::InvalidConfiguration`].
    pub fn invalid(message: impl Into<String>) -> Self {
        GameError::InvalidConfiguration(message.into())
    }

    /// True for every configuration-class error.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            GameError::InvalidConfiguration(_)
                | GameError::UnknownDifficulty(_)
                | GameError::ConfigParse(_)
        )
    }
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::ConfigParse(err.to_string())
    }
}

/// Why a reveal was not accepted.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    /// Session not running, card matched, card already face-up, or a pair
    /// is still resolving.
    #[error("not accepting input")]
    NotAcceptingInput,

    /// The move limit is exhausted. The session is lost.
    #[error("move limit reached")]
    MoveLimitReached,

    /// The instance id is not part of the active deck.
    #[error("unknown card")]
    UnknownCard,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GameError::invalid("empty symbol catalog");
        assert_eq!(err.to_string(), "invalid configuration: empty symbol catalog");
        assert!(err.is_configuration());

        let err = GameError::UnknownDifficulty(Difficulty::Hard);
        assert_eq!(err.to_string(), "invalid configuration: no profile for difficulty hard");
    }

    #[test]
    fn test_from_json_error() {
        let parse_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: GameError = parse_err.into();
        assert!(matches!(err, GameError::ConfigParse(_)));
    }

    #[test]
    fn test_reject_reason_display() {
        assert_eq!(RejectReason::NotAcceptingInput.to_string(), "not accepting input");
        assert_eq!(RejectReason::MoveLimitReached.to_string(), "move limit reached");
    }
}

use std::path::PathBuf;

use thiserror::Error;

use crate::models::{ConfigVersion, PresentationId};

#[allow(clippy::module_name_repetitions)]
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Voting has ended")]
    VotingClosed,
    #[error("The voting configuration changed (now version {current}), please reload")]
    ConfigStale { current: ConfigVersion },
    #[error("Exactly {expected} presentations must be selected, got {actual}")]
    WrongSelectionCount { expected: u32, actual: usize },
    #[error("Presentation {0} was selected more than once")]
    DuplicateSelection(PresentationId),
    #[error("Presentation {0} does not exist")]
    UnknownPresentation(PresentationId),
    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),
    #[error("Invalid theme selection {0}, must be between 1 and 6")]
    InvalidTheme(u8),
    #[error("Presentation at position {index} is invalid: {reason}")]
    InvalidPresentation { index: usize, reason: &'static str },
    #[error("Presentation id {0} appears more than once")]
    DuplicatePresentationId(PresentationId),
    #[error("Required selections must be at least 1")]
    InvalidRequiredSelections,
    #[error("This operation is not available in {mode} mode")]
    WrongMode { mode: &'static str },
    #[error("Session id must be a non-blank string of at most 128 characters")]
    InvalidSessionId,
    #[error("Session not found")]
    SessionNotFound,
    #[error("failed to read roster file {path}: {source}")]
    RosterFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse roster file {path}: {source}")]
    RosterJson {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Errors caused by the request payload rather than by store state.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::WrongSelectionCount { .. }
                | Self::DuplicateSelection(_)
                | Self::UnknownPresentation(_)
                | Self::InvalidRating(_)
                | Self::InvalidTheme(_)
                | Self::InvalidPresentation { .. }
                | Self::DuplicatePresentationId(_)
                | Self::InvalidRequiredSelections
                | Self::WrongMode { .. }
                | Self::InvalidSessionId
        )
    }
}

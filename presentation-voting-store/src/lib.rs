//! In-memory state of a presentation vote: sessions, ballots, roster and settings,
//! plus the tallies derived from them.

pub mod aggregation;
pub mod error;
pub mod models;
pub mod roster;
pub mod store;
pub mod theme;

pub use aggregation::{PresentationStats, Stats, Tally};
pub use error::StoreError;
pub use models::{
    Ballot, ConfigVersion, Presentation, PresentationId, Rating, Session, SessionId, Timestamp,
    VotingMode,
};
pub use roster::{Roster, RosterDocument};
pub use store::{ConfigSnapshot, SessionVotes, Store};
pub use theme::{Theme, ThemeId, ThemeSettings, THEMES};

use core::fmt::{self, Display, Write as _};
use core::num::NonZeroU32;
use std::collections::{BTreeMap, BTreeSet};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::{thread_rng, RngCore as _};
use serde::ser::SerializeStruct as _;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::StoreError;

/// Milliseconds since the unix epoch.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    #[must_use]
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default();
        Self(millis)
    }
}

/// Optimistic concurrency token for the roster and selection rules.
///
/// Every bump is strictly greater than the previous version even if the wall clock
/// stalls or goes backwards.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct ConfigVersion(pub u64);

impl ConfigVersion {
    #[must_use]
    pub fn initial() -> Self {
        Self(Timestamp::now().0)
    }

    #[must_use]
    pub fn bump(self) -> Self {
        Self(Timestamp::now().0.max(self.0.saturating_add(1)))
    }
}

impl Display for ConfigVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Longest id a client may bring along, in characters.
    pub const MAX_LEN: usize = 128;

    /// 128 random bits from the thread-local CSPRNG, hex encoded.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0_u8; 16];
        thread_rng().fill_bytes(&mut bytes);
        let mut id = String::with_capacity(32);
        for byte in bytes {
            // writing into a String cannot fail
            let _ = write!(id, "{byte:02x}");
        }
        Self(id)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Client-supplied ids must be non-blank and at most [`Self::MAX_LEN`] long.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.0.trim().is_empty() && self.0.chars().count() <= Self::MAX_LEN
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub created_at: Timestamp,
    pub last_updated: Timestamp,
}

impl Session {
    #[must_use]
    pub fn new(id: SessionId) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            created_at: now,
            last_updated: now,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct PresentationId(pub u32);

impl Display for PresentationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub id: PresentationId,
    pub team_name: String,
    pub title: String,
}

/// A score between 1 and 5 inclusive.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, StoreError> {
        if value >= Self::MIN && value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(StoreError::InvalidRating(value))
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VotingMode {
    Rating,
    Selection { required: NonZeroU32 },
}

impl VotingMode {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rating => "rating",
            Self::Selection { .. } => "selection",
        }
    }

    #[must_use]
    pub const fn required_selections(self) -> Option<NonZeroU32> {
        match self {
            Self::Rating => None,
            Self::Selection { required } => Some(required),
        }
    }

    #[must_use]
    pub fn empty_ballot(self) -> Ballot {
        match self {
            Self::Rating => Ballot::Ratings(BTreeMap::new()),
            Self::Selection { .. } => Ballot::Selection(BTreeSet::new()),
        }
    }
}

/// Everything a single session has voted for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ballot {
    Selection(BTreeSet<PresentationId>),
    Ratings(BTreeMap<PresentationId, Rating>),
}

impl Ballot {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Selection(selected) => selected.len(),
            Self::Ratings(ratings) => ratings.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct RatingEntry(PresentationId, Rating);

impl Serialize for RatingEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut entry = serializer.serialize_struct("RatingEntry", 2)?;
        entry.serialize_field("presentationId", &self.0)?;
        entry.serialize_field("rating", &self.1)?;
        entry.end()
    }
}

/// Selections serialize as `[1, 2]`, ratings as `[{"presentationId": 1, "rating": 4}]`.
impl Serialize for Ballot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Selection(selected) => serializer.collect_seq(selected),
            Self::Ratings(ratings) => serializer.collect_seq(
                ratings
                    .iter()
                    .map(|(presentation, rating)| RatingEntry(*presentation, *rating)),
            ),
        }
    }
}
